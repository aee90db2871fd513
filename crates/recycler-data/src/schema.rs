//! Serde data file structs for recycler definitions.
//!
//! One entry per recycler part. In TOML files the entries live under
//! `[[recycler]]`; RON and JSON files hold the list directly.

use serde::Deserialize;

/// TOML table key holding the recycler list.
pub const RECYCLER_TOML_KEY: &str = "recycler";

/// Base file name searched for by [`crate::load_catalog_dir`].
pub const RECYCLER_FILE: &str = "recyclers";

/// A recycler part definition as written in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecyclerData {
    /// Part name; unloaded snapshots refer to the definition by it.
    pub part: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Feedstock consumed.
    pub input: String,
    /// Resource produced.
    pub output: String,
    pub energy_rate: f64,
    pub input_rate: f64,
    #[serde(default = "default_ratio")]
    pub conversion_ratio: f64,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub filter_rate: f64,
}

fn default_display_name() -> String {
    "Recycler".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ratio() -> f64 {
    1.0
}
