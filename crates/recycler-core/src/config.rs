use crate::format::human_readable_rate;

/// Name of the energy resource every recycler draws.
pub const ENERGY_RESOURCE: &str = "ElectricCharge";

// ---------------------------------------------------------------------------
// Conversion config
// ---------------------------------------------------------------------------

/// Immutable per-device-type conversion rates.
///
/// Shared read-only between every instance of the same device type. Rates
/// are not validated here: negative values produce deterministic but
/// meaningless results, and loaders are expected to reject them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversionConfig {
    /// Feedstock consumed by the conversion.
    pub input_resource: String,
    /// Resource produced by the conversion.
    pub output_resource: String,
    /// Energy drawn per second at full throttle.
    pub energy_rate: f64,
    /// Feedstock drawn per second at full throttle.
    pub input_rate: f64,
    /// Fraction of consumed feedstock that becomes output.
    pub conversion_ratio: f64,
    /// Optional catalytic resource consumed alongside the feedstock.
    pub filter_resource: Option<String>,
    /// Filter drawn per second at full throttle.
    pub filter_rate: f64,
}

impl ConversionConfig {
    /// The filter name when the filter participates in conversion.
    ///
    /// A filter is active only when its name is non-empty and its rate is
    /// strictly positive; both other cases are treated as "no filter".
    pub fn active_filter(&self) -> Option<&str> {
        match self.filter_resource.as_deref() {
            Some(name) if !name.is_empty() && self.filter_rate > 0.0 => Some(name),
            _ => None,
        }
    }

    /// Whether the filter constraint applies.
    pub fn is_filter_active(&self) -> bool {
        self.active_filter().is_some()
    }

    /// Static capability summary listing what the device needs and makes.
    pub fn info(&self) -> String {
        let mut out = format!(
            "Recycle some of the {}.\n\nRequires:\n - {}: {}\n - {}: {}",
            self.output_resource,
            ENERGY_RESOURCE,
            human_readable_rate(self.energy_rate),
            self.input_resource,
            human_readable_rate(self.input_rate),
        );
        if let Some(filter) = self.active_filter() {
            out.push_str(&format!(
                "\n - {}: {}",
                filter,
                human_readable_rate(self.filter_rate)
            ));
        }
        out.push_str(&format!(
            "\n\nProduces:\n - {}: {}",
            self.output_resource,
            human_readable_rate(self.input_rate * self.conversion_ratio)
        ));
        out
    }
}
