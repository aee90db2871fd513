//! Serialized device state for unloaded entities.
//!
//! While an entity is unloaded its devices exist only as field-addressable
//! [`ModuleSnapshot`] records grouped into [`PartSnapshot`]s. The background
//! tick reads the enabled flag from here instead of from live memory.
//! Snapshots encode to bytes via `bitcode` behind a versioned header.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::RuntimeState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Module name under which recycler state is persisted.
pub const RECYCLER_MODULE: &str = "Recycler";

/// Field holding the persisted enabled flag.
pub const IS_ENABLED_FIELD: &str = "is_enabled";

/// Magic number identifying an encoded snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x5EC7_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding or decoding snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Module snapshot
// ---------------------------------------------------------------------------

/// Persisted fields of one device module, stored as text the way a host
/// save file would hold them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub module_name: String,
    pub fields: BTreeMap<String, String>,
}

impl ModuleSnapshot {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Snapshot a live recycler's state.
    pub fn from_state(state: &RuntimeState) -> Self {
        let mut snapshot = Self::new(RECYCLER_MODULE);
        snapshot.set_bool(IS_ENABLED_FIELD, state.is_enabled());
        snapshot
    }

    /// Rebuild the live state this snapshot was taken from.
    pub fn to_state(&self) -> RuntimeState {
        RuntimeState::new(self.get_bool(IS_ENABLED_FIELD))
    }

    pub fn is_recycler(&self) -> bool {
        self.module_name == RECYCLER_MODULE
    }

    /// Read a boolean field. Missing or unparseable values read as `false`.
    pub fn get_bool(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    pub fn set_bool(&mut self, field: &str, value: bool) {
        let text = if value { "True" } else { "False" };
        self.fields.insert(field.to_string(), text.to_string());
    }
}

// ---------------------------------------------------------------------------
// Part snapshot
// ---------------------------------------------------------------------------

/// One part of an unloaded entity: its catalog name and module snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSnapshot {
    pub part_name: String,
    pub modules: Vec<ModuleSnapshot>,
}

impl PartSnapshot {
    pub fn new(part_name: &str, modules: Vec<ModuleSnapshot>) -> Self {
        Self {
            part_name: part_name.to_string(),
            modules,
        }
    }

    /// Recycler modules on this part, in declaration order.
    pub fn recyclers(&self) -> impl Iterator<Item = &ModuleSnapshot> {
        self.modules.iter().filter(|m| m.is_recycler())
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Header prepended to every encoded snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
struct EncodedParts {
    header: SnapshotHeader,
    parts: Vec<PartSnapshot>,
}

/// Encode the parts of an unloaded entity.
pub fn encode_parts(parts: &[PartSnapshot]) -> Result<Vec<u8>, SnapshotError> {
    let encoded = EncodedParts {
        header: SnapshotHeader::new(),
        parts: parts.to_vec(),
    };
    bitcode::serialize(&encoded).map_err(|e| SnapshotError::Encode(e.to_string()))
}

/// Decode parts previously written by [`encode_parts`].
pub fn decode_parts(data: &[u8]) -> Result<Vec<PartSnapshot>, SnapshotError> {
    let decoded: EncodedParts =
        bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
    decoded.header.validate()?;
    Ok(decoded.parts)
}
