//! Foreground and background tick entry points.
//!
//! A device on a loaded entity is a live [`Recycler`] and ticks through
//! [`Recycler::fixed_update`]. A device on an unloaded entity exists only as
//! a [`ModuleSnapshot`] and ticks through [`background_update`]. The two
//! differ only in where the enabled flag comes from and whether a status is
//! kept; gathering, computing and applying deltas go through one shared
//! helper so the resource trajectory cannot diverge between them.

use std::sync::Arc;

use crate::catalog::DeviceDefinition;
use crate::config::{ConversionConfig, ENERGY_RESOURCE};
use crate::conversion::{ConversionResult, TickInputs, compute};
use crate::id::EntityId;
use crate::pool::ResourcePool;
use crate::snapshot::{IS_ENABLED_FIELD, ModuleSnapshot};
use crate::state::RuntimeState;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// What a loaded recycler reports about its last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceStatus {
    #[default]
    Off,
    /// The feedstock store was empty.
    NoFeedstock,
    /// Feedstock was present but the energy store was empty.
    NoPower,
    Running,
}

impl DeviceStatus {
    /// Pick the status for an enabled tick. Feedstock exhaustion is reported
    /// ahead of power exhaustion.
    fn from_inputs(inputs: &TickInputs) -> Self {
        if inputs.available_input <= 0.0 {
            DeviceStatus::NoFeedstock
        } else if inputs.available_energy <= 0.0 {
            DeviceStatus::NoPower
        } else {
            DeviceStatus::Running
        }
    }

    /// Display text, naming the feedstock when it ran out.
    pub fn label(&self, config: &ConversionConfig) -> String {
        match self {
            DeviceStatus::Off => "Off".to_string(),
            DeviceStatus::NoFeedstock => format!("No {}", config.input_resource),
            DeviceStatus::NoPower => "No Power".to_string(),
            DeviceStatus::Running => "Running".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared conversion path
// ---------------------------------------------------------------------------

fn gather_inputs<P: ResourcePool + ?Sized>(
    config: &ConversionConfig,
    pool: &P,
    scope: EntityId,
    elapsed: f64,
) -> TickInputs {
    TickInputs {
        elapsed_seconds: elapsed,
        available_input: pool.amount(scope, &config.input_resource),
        available_energy: pool.amount(scope, ENERGY_RESOURCE),
        available_filter: config
            .active_filter()
            .map_or(0.0, |filter| pool.amount(scope, filter)),
    }
}

fn apply<P: ResourcePool + ?Sized>(
    config: &ConversionConfig,
    pool: &mut P,
    scope: EntityId,
    result: &ConversionResult,
) {
    pool.request(scope, &config.input_resource, result.input_delta);
    pool.request(scope, ENERGY_RESOURCE, result.energy_delta);
    if let Some(filter) = config.active_filter() {
        pool.request(scope, filter, result.filter_delta);
    }
    pool.request(scope, &config.output_resource, result.output_delta);
}

/// Gather, compute and apply one tick for an enabled device.
fn convert<P: ResourcePool + ?Sized>(
    config: &ConversionConfig,
    pool: &mut P,
    scope: EntityId,
    elapsed: f64,
) -> (TickInputs, ConversionResult) {
    let inputs = gather_inputs(config, pool, scope, elapsed);
    let result = compute(config, &inputs);
    apply(config, pool, scope, &result);
    tracing::trace!(
        ?scope,
        output = %config.output_resource,
        throttle = result.throttle,
        limiting = ?result.limiting,
        "conversion tick"
    );
    (inputs, result)
}

// ---------------------------------------------------------------------------
// Foreground: live recycler
// ---------------------------------------------------------------------------

/// A recycler on a loaded entity.
#[derive(Debug, Clone)]
pub struct Recycler {
    definition: Arc<DeviceDefinition>,
    state: RuntimeState,
    status: DeviceStatus,
}

impl Recycler {
    /// Spawn a recycler with the definition's default enabled flag.
    pub fn new(definition: Arc<DeviceDefinition>) -> Self {
        let state = RuntimeState::new(definition.enabled_by_default);
        Self::with_state(definition, state)
    }

    /// Rebuild a recycler around previously persisted state.
    pub fn with_state(definition: Arc<DeviceDefinition>, state: RuntimeState) -> Self {
        Self {
            definition,
            state,
            status: DeviceStatus::Off,
        }
    }

    pub fn definition(&self) -> &Arc<DeviceDefinition> {
        &self.definition
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.definition.config
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    pub fn status_label(&self) -> String {
        self.status.label(self.config())
    }

    pub fn editor_status(&self) -> &'static str {
        self.state.editor_status()
    }

    /// Foreground tick. Returns `None` without touching the pool when the
    /// recycler is disabled.
    pub fn fixed_update<P: ResourcePool + ?Sized>(
        &mut self,
        pool: &mut P,
        scope: EntityId,
        elapsed: f64,
    ) -> Option<ConversionResult> {
        if !self.state.is_enabled() {
            self.status = DeviceStatus::Off;
            return None;
        }
        let (inputs, result) = convert(&self.definition.config, pool, scope, elapsed);
        self.status = DeviceStatus::from_inputs(&inputs);
        Some(result)
    }

    /// Persist this recycler for an unloaded entity.
    pub fn snapshot(&self) -> ModuleSnapshot {
        ModuleSnapshot::from_state(&self.state)
    }
}

// ---------------------------------------------------------------------------
// Background: snapshot-only recycler
// ---------------------------------------------------------------------------

/// Background tick for a recycler on an unloaded entity. The enabled flag
/// is read from `snapshot`; everything else matches
/// [`Recycler::fixed_update`].
pub fn background_update<P: ResourcePool + ?Sized>(
    config: &ConversionConfig,
    snapshot: &ModuleSnapshot,
    pool: &mut P,
    scope: EntityId,
    elapsed: f64,
) -> Option<ConversionResult> {
    if !snapshot.get_bool(IS_ENABLED_FIELD) {
        return None;
    }
    let (_, result) = convert(config, pool, scope, elapsed);
    Some(result)
}
