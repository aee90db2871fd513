//! Property-based tests for the conversion core.
//!
//! Uses proptest to generate random configs, stockpiles and tick lengths,
//! then verify the throttle invariants and the equivalence of the foreground
//! and background paths.

use proptest::prelude::*;
use recycler_core::config::{ConversionConfig, ENERGY_RESOURCE};
use recycler_core::conversion::{LimitingFactor, TickInputs, compute};
use recycler_core::executor::{Recycler, background_update};
use recycler_core::catalog::DeviceDefinition;
use recycler_core::pool::{ResourceCache, ResourcePool};
use recycler_core::state::RuntimeState;
use recycler_core::test_utils::*;
use std::sync::Arc;

const TOLERANCE: f64 = 1e-9;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_config() -> impl Strategy<Value = ConversionConfig> {
    (
        0.0..10.0f64,
        0.0..10.0f64,
        0.0..2.0f64,
        prop_oneof![
            Just(None),
            Just(Some(String::new())),
            Just(Some("Cat".to_string()))
        ],
        prop_oneof![Just(0.0), 0.0..1.0f64],
    )
        .prop_map(|(energy_rate, input_rate, conversion_ratio, filter_resource, filter_rate)| {
            ConversionConfig {
                input_resource: "WasteWater".to_string(),
                output_resource: "Water".to_string(),
                energy_rate,
                input_rate,
                conversion_ratio,
                filter_resource,
                filter_rate,
            }
        })
}

fn arb_inputs() -> impl Strategy<Value = TickInputs> {
    (0.001..1000.0f64, -1.0..100.0f64, -1.0..100.0f64, -1.0..100.0f64).prop_map(
        |(elapsed_seconds, available_input, available_energy, available_filter)| TickInputs {
            elapsed_seconds,
            available_input,
            available_energy,
            available_filter,
        },
    )
}

/// Stockpiles for the feedstock, energy, filter and output tanks.
fn arb_stock() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.0..50.0f64, 0.0..50.0f64, 0.0..5.0f64)
}

fn stocked_cache(scope: recycler_core::id::EntityId, stock: (f64, f64, f64)) -> ResourceCache {
    let mut cache = ResourceCache::new();
    cache.set(scope, "WasteWater", stock.0, 1000.0);
    cache.set(scope, ENERGY_RESOURCE, stock.1, 1000.0);
    cache.set(scope, "Cat", stock.2, 1000.0);
    cache.set(scope, "Water", 0.0, 1e9);
    cache
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Throttle stays within [0, 1].
    #[test]
    fn throttle_is_bounded(config in arb_config(), inputs in arb_inputs()) {
        let r = compute(&config, &inputs);
        prop_assert!((0.0..=1.0).contains(&r.throttle));
    }

    /// Every flow is scaled by the same throttle.
    #[test]
    fn flows_scale_uniformly(config in arb_config(), inputs in arb_inputs()) {
        let r = compute(&config, &inputs);
        let input_demand = config.input_rate * inputs.elapsed_seconds;
        let energy_demand = config.energy_rate * inputs.elapsed_seconds;
        if input_demand > 0.0 {
            prop_assert!((r.input_delta / input_demand - r.throttle).abs() < TOLERANCE);
            prop_assert!(
                (r.output_delta + input_demand * r.throttle * config.conversion_ratio).abs()
                    < TOLERANCE
            );
        }
        if energy_demand > 0.0 {
            prop_assert!((r.energy_delta / energy_demand - r.throttle).abs() < TOLERANCE);
        }
    }

    /// Nothing is withdrawn beyond what was available.
    #[test]
    fn never_overdraws(config in arb_config(), inputs in arb_inputs()) {
        let r = compute(&config, &inputs);
        prop_assert!(r.input_delta <= inputs.available_input.max(0.0) + TOLERANCE
            || config.input_rate == 0.0);
        prop_assert!(r.energy_delta <= inputs.available_energy.max(0.0) + TOLERANCE
            || config.energy_rate == 0.0);
        if config.is_filter_active() {
            prop_assert!(r.filter_delta <= inputs.available_filter.max(0.0) + TOLERANCE);
        }
    }

    /// Zero elapsed time moves nothing.
    #[test]
    fn zero_time_is_noop(config in arb_config(), inputs in arb_inputs()) {
        let inputs = TickInputs { elapsed_seconds: 0.0, ..inputs };
        let r = compute(&config, &inputs);
        prop_assert_eq!(r.throttle, 0.0);
        prop_assert_eq!(r.input_delta, 0.0);
        prop_assert_eq!(r.energy_delta, 0.0);
        prop_assert_eq!(r.filter_delta, 0.0);
        prop_assert_eq!(r.output_delta, 0.0);
    }

    /// An inactive filter contributes nothing and its stock is irrelevant.
    #[test]
    fn inactive_filter_is_irrelevant(
        config in arb_config(),
        inputs in arb_inputs(),
        other_filter in -1.0..100.0f64,
    ) {
        prop_assume!(!config.is_filter_active());
        let a = compute(&config, &inputs);
        let b = compute(&config, &TickInputs { available_filter: other_filter, ..inputs });
        prop_assert_eq!(a.filter_delta, 0.0);
        prop_assert_eq!(a, b);
        prop_assert_ne!(a.limiting, LimitingFactor::Filter);
    }

    /// Foreground and background ticks move the pool identically.
    #[test]
    fn foreground_matches_background(
        config in arb_config(),
        stock in arb_stock(),
        ticks in proptest::collection::vec(0.0..20.0f64, 1..20),
    ) {
        let [scope] = make_entity_ids::<1>();
        let mut fg_pool = stocked_cache(scope, stock);
        let mut bg_pool = stocked_cache(scope, stock);

        let mut recycler = Recycler::new(Arc::new(DeviceDefinition::new("p", config.clone())));
        let snapshot = recycler.snapshot();

        for dt in ticks {
            let fg = recycler.fixed_update(&mut fg_pool, scope, dt);
            let bg = background_update(&config, &snapshot, &mut bg_pool, scope, dt);
            prop_assert_eq!(fg, bg);
        }
        for resource in ["WasteWater", ENERGY_RESOURCE, "Cat", "Water"] {
            prop_assert_eq!(
                fg_pool.amount(scope, resource),
                bg_pool.amount(scope, resource)
            );
        }
    }

    /// A disabled device never touches the pool on either path.
    #[test]
    fn disabled_is_silent(config in arb_config(), dt in 0.0..100.0f64) {
        let [scope] = make_entity_ids::<1>();
        let state = RuntimeState::new(false);

        let mut pool = RecordingPool::new();
        let mut recycler =
            Recycler::with_state(Arc::new(DeviceDefinition::new("p", config.clone())), state);
        prop_assert!(recycler.fixed_update(&mut pool, scope, dt).is_none());

        let snapshot = recycler.snapshot();
        prop_assert!(background_update(&config, &snapshot, &mut pool, scope, dt).is_none());

        prop_assert!(pool.queries().is_empty());
        prop_assert!(pool.requests.is_empty());
    }
}
