//! Data-driven recycler definitions.
//!
//! Reads `recyclers.ron`, `recyclers.toml` or `recyclers.json`, validates each
//! entry, and freezes the result into a [`recycler_core::catalog::Catalog`].

pub mod definitions;
pub mod loader;
pub mod schema;

pub use definitions::{load_catalog, load_catalog_dir, load_catalog_str};
pub use loader::{DataLoadError, Format};
