//! Recycler Core -- per-tick resource conversion for simulated devices.
//!
//! A recycler consumes a feedstock, energy, and an optional filter resource at
//! fixed rates and produces a single output resource. The actual throughput in
//! a tick is capped by whichever input is scarcest, and that one throttle is
//! applied to every flow at once.
//!
//! # Dual Execution Path
//!
//! Devices tick through one of two entry points:
//!
//! 1. **Foreground** -- [`executor::Recycler::fixed_update`] runs for devices
//!    on a loaded entity, reading the live [`state::RuntimeState`] and
//!    updating a human-readable status.
//! 2. **Background** -- [`executor::background_update`] runs for devices on an
//!    unloaded entity, reading the enabled flag from a
//!    [`snapshot::ModuleSnapshot`] instead.
//!
//! Both paths gather inputs from a [`pool::ResourcePool`], call the same
//! [`conversion::compute`], and request the same deltas, so moving an entity
//! between the loaded and unloaded states never changes its trajectory.
//!
//! # Key Types
//!
//! - [`config::ConversionConfig`] -- Immutable per-device-type rates.
//! - [`conversion::ConversionResult`] -- Throttle and per-flow deltas.
//! - [`catalog::Catalog`] -- Immutable map of part names to device
//!   definitions (frozen at startup).
//! - [`world::World`] -- Loaded and unloaded entities with the
//!   partial-state query and load/unload transitions.

pub mod catalog;
pub mod config;
pub mod conversion;
pub mod executor;
pub mod format;
pub mod id;
pub mod pool;
pub mod snapshot;
pub mod state;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
