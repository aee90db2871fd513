//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use slotmap::SlotMap;

use crate::catalog::DeviceDefinition;
use crate::config::ConversionConfig;
use crate::id::EntityId;
use crate::pool::ResourcePool;

// ===========================================================================
// Config constructors
// ===========================================================================

/// 1 WasteWater/s and 2 ElectricCharge/s into 0.5 Water/s, no filter.
pub fn water_recycler() -> ConversionConfig {
    ConversionConfig {
        input_resource: "WasteWater".to_string(),
        output_resource: "Water".to_string(),
        energy_rate: 2.0,
        input_rate: 1.0,
        conversion_ratio: 0.5,
        filter_resource: None,
        filter_rate: 0.0,
    }
}

/// CO2 into Oxygen, consuming a LithiumHydroxide filter.
pub fn co2_scrubber() -> ConversionConfig {
    ConversionConfig {
        input_resource: "CarbonDioxide".to_string(),
        output_resource: "Oxygen".to_string(),
        energy_rate: 0.5,
        input_rate: 0.2,
        conversion_ratio: 0.9,
        filter_resource: Some("LithiumHydroxide".to_string()),
        filter_rate: 0.01,
    }
}

pub fn with_filter(mut config: ConversionConfig, name: &str, rate: f64) -> ConversionConfig {
    config.filter_resource = Some(name.to_string());
    config.filter_rate = rate;
    config
}

/// [`water_recycler`] registered as part `water-recycler`.
pub fn water_definition() -> Arc<DeviceDefinition> {
    Arc::new(DeviceDefinition::new("water-recycler", water_recycler()))
}

// ===========================================================================
// Ids
// ===========================================================================

pub fn make_entity_ids<const N: usize>() -> [EntityId; N] {
    let mut sm = SlotMap::<EntityId, ()>::with_key();
    std::array::from_fn(|_| sm.insert(()))
}

// ===========================================================================
// Recording pool
// ===========================================================================

/// A [`ResourcePool`] that logs every query and request and never clamps.
#[derive(Debug, Default)]
pub struct RecordingPool {
    stocks: HashMap<(EntityId, String), f64>,
    queries: RefCell<Vec<(EntityId, String)>>,
    pub requests: Vec<(EntityId, String, f64)>,
}

impl RecordingPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stock(&mut self, scope: EntityId, resource: &str, amount: f64) {
        self.stocks.insert((scope, resource.to_string()), amount);
    }

    pub fn queries(&self) -> Vec<(EntityId, String)> {
        self.queries.borrow().clone()
    }
}

impl ResourcePool for RecordingPool {
    fn amount(&self, scope: EntityId, resource: &str) -> f64 {
        self.queries.borrow_mut().push((scope, resource.to_string()));
        self.stocks
            .get(&(scope, resource.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    fn request(&mut self, scope: EntityId, resource: &str, delta: f64) {
        self.requests.push((scope, resource.to_string(), delta));
        *self.stocks.entry((scope, resource.to_string())).or_insert(0.0) -= delta;
    }
}
