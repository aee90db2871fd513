use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ConversionConfig;

/// Everything needed to spawn one type of recycler part.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceDefinition {
    /// Catalog key; unloaded part snapshots refer to their definition by it.
    pub part_name: String,
    /// Short label used for status and action text.
    pub display_name: String,
    pub enabled_by_default: bool,
    pub config: ConversionConfig,
}

impl DeviceDefinition {
    pub fn new(part_name: &str, config: ConversionConfig) -> Self {
        Self {
            part_name: part_name.to_string(),
            display_name: "Recycler".to_string(),
            enabled_by_default: true,
            config,
        }
    }

    /// Labels for the enable, disable and toggle actions.
    pub fn action_labels(&self) -> [String; 3] {
        [
            format!("Enable {}", self.display_name),
            format!("Disable {}", self.display_name),
            format!("Toggle {}", self.display_name),
        ]
    }
}

/// Errors raised while building a catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate part name: {0}")]
    DuplicatePart(String),
}

/// Builder for constructing an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    definitions: HashMap<String, Arc<DeviceDefinition>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Part names must be unique.
    pub fn register(&mut self, definition: DeviceDefinition) -> Result<(), CatalogError> {
        if self.definitions.contains_key(&definition.part_name) {
            return Err(CatalogError::DuplicatePart(definition.part_name));
        }
        self.definitions
            .insert(definition.part_name.clone(), Arc::new(definition));
        Ok(())
    }

    pub fn build(self) -> Catalog {
        Catalog {
            definitions: self.definitions,
        }
    }
}

/// Immutable part-name lookup for recycler definitions, frozen at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: HashMap<String, Arc<DeviceDefinition>>,
}

impl Catalog {
    pub fn get(&self, part_name: &str) -> Option<&Arc<DeviceDefinition>> {
        self.definitions.get(part_name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Part names in sorted order.
    pub fn part_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn register_and_lookup() {
        let mut builder = CatalogBuilder::new();
        builder
            .register(DeviceDefinition::new("water-recycler", water_recycler()))
            .unwrap();
        builder
            .register(DeviceDefinition::new("co2-scrubber", co2_scrubber()))
            .unwrap();
        let catalog = builder.build();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.part_names(), ["co2-scrubber", "water-recycler"]);
        let def = catalog.get("water-recycler").unwrap();
        assert_eq!(def.config.output_resource, "Water");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn duplicate_part_rejected() {
        let mut builder = CatalogBuilder::new();
        builder
            .register(DeviceDefinition::new("water-recycler", water_recycler()))
            .unwrap();
        let err = builder
            .register(DeviceDefinition::new("water-recycler", co2_scrubber()))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicatePart("water-recycler".to_string())
        );
    }

    #[test]
    fn action_labels_use_display_name() {
        let mut def = DeviceDefinition::new("water-recycler", water_recycler());
        def.display_name = "Water Recycler".to_string();
        assert_eq!(
            def.action_labels(),
            [
                "Enable Water Recycler".to_string(),
                "Disable Water Recycler".to_string(),
                "Toggle Water Recycler".to_string(),
            ]
        );
    }
}
