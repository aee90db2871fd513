//! Validation and catalog assembly for recycler definitions.
//!
//! The conversion core trusts its configs. Everything it would otherwise
//! have to guard against (negative rates, empty resource names, duplicate
//! part names) is rejected here, at load time.

use std::path::Path;

use recycler_core::catalog::{Catalog, CatalogBuilder, CatalogError, DeviceDefinition};
use recycler_core::config::ConversionConfig;

use crate::loader::{DataLoadError, Format, deserialize_list, parse_list, require_data_file};
use crate::schema::{RECYCLER_FILE, RECYCLER_TOML_KEY, RecyclerData};

// ===========================================================================
// Validation
// ===========================================================================

fn invalid(file: &Path, part: &str, reason: impl Into<String>) -> DataLoadError {
    DataLoadError::Invalid {
        file: file.to_path_buf(),
        part: part.to_string(),
        reason: reason.into(),
    }
}

fn check_rate(file: &Path, part: &str, field: &str, value: f64) -> Result<(), DataLoadError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(
            file,
            part,
            format!("{field} must be a non-negative number, got {value}"),
        ))
    }
}

/// Turn one data entry into a definition, rejecting unusable values.
pub fn resolve_definition(
    data: RecyclerData,
    file: &Path,
) -> Result<DeviceDefinition, DataLoadError> {
    let part = data.part.as_str();
    if part.trim().is_empty() {
        return Err(invalid(file, part, "part name is empty"));
    }
    if data.input.trim().is_empty() {
        return Err(invalid(file, part, "input resource is empty"));
    }
    if data.output.trim().is_empty() {
        return Err(invalid(file, part, "output resource is empty"));
    }
    check_rate(file, part, "energy_rate", data.energy_rate)?;
    check_rate(file, part, "input_rate", data.input_rate)?;
    check_rate(file, part, "filter_rate", data.filter_rate)?;
    if !(data.conversion_ratio.is_finite() && data.conversion_ratio > 0.0) {
        return Err(invalid(
            file,
            part,
            format!("conversion_ratio must be positive, got {}", data.conversion_ratio),
        ));
    }

    let filter_resource = data.filter.filter(|name| !name.trim().is_empty());
    if filter_resource.is_none() && data.filter_rate > 0.0 {
        tracing::warn!(
            part,
            filter_rate = data.filter_rate,
            "filter rate set without a filter; ignored"
        );
    }

    Ok(DeviceDefinition {
        part_name: data.part,
        display_name: data.display_name,
        enabled_by_default: data.enabled,
        config: ConversionConfig {
            input_resource: data.input,
            output_resource: data.output,
            energy_rate: data.energy_rate,
            input_rate: data.input_rate,
            conversion_ratio: data.conversion_ratio,
            filter_resource,
            filter_rate: data.filter_rate,
        },
    })
}

fn build_catalog(entries: Vec<RecyclerData>, file: &Path) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();
    for data in entries {
        let definition = resolve_definition(data, file)?;
        builder.register(definition).map_err(|e| match e {
            CatalogError::DuplicatePart(name) => DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name,
            },
        })?;
    }
    let catalog = builder.build();
    tracing::info!(file = %file.display(), recyclers = catalog.len(), "catalog loaded");
    Ok(catalog)
}

// ===========================================================================
// Entry points
// ===========================================================================

/// Load a catalog from text in the given format.
pub fn load_catalog_str(content: &str, format: Format) -> Result<Catalog, DataLoadError> {
    let origin = Path::new("<inline>");
    let entries = parse_list(content, format, RECYCLER_TOML_KEY, origin)?;
    build_catalog(entries, origin)
}

/// Load a catalog from a `.ron`, `.toml` or `.json` file.
pub fn load_catalog(path: &Path) -> Result<Catalog, DataLoadError> {
    let entries = deserialize_list(path, RECYCLER_TOML_KEY)?;
    build_catalog(entries, path)
}

/// Load `recyclers.{ron,toml,json}` from a directory.
pub fn load_catalog_dir(dir: &Path) -> Result<Catalog, DataLoadError> {
    let path = require_data_file(dir, RECYCLER_FILE)?;
    load_catalog(&path)
}
