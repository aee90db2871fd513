//! Conversion rate computation.
//!
//! [`compute`] turns a device's rates and the resources currently available
//! to it into a single throttle and the per-flow deltas that throttle implies.
//! It is a pure function: the executor decides where the availability numbers
//! come from and what happens to the deltas.

use crate::config::ConversionConfig;

// ---------------------------------------------------------------------------
// Tick inputs
// ---------------------------------------------------------------------------

/// Everything one tick of conversion needs besides the config. Built fresh
/// each tick from pool queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TickInputs {
    /// Simulated seconds covered by this tick, already time-warped.
    pub elapsed_seconds: f64,
    pub available_input: f64,
    pub available_energy: f64,
    /// Ignored when the config has no active filter.
    pub available_filter: f64,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Which flow bound the throttle this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LimitingFactor {
    /// Nothing held the device below full throttle.
    #[default]
    None,
    Input,
    Energy,
    Filter,
}

/// The outcome of one tick of conversion.
///
/// Deltas follow the pool sign convention: positive is withdrawn, negative is
/// deposited.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversionResult {
    /// Fraction of full throttle applied to every flow, in `[0, 1]`.
    pub throttle: f64,
    pub input_delta: f64,
    pub energy_delta: f64,
    /// Zero when the filter is inactive.
    pub filter_delta: f64,
    /// Negative: output is deposited.
    pub output_delta: f64,
    pub limiting: LimitingFactor,
}

impl ConversionResult {
    /// The no-op result: zero throttle, nothing moved.
    pub fn idle() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// compute
// ---------------------------------------------------------------------------

/// Compute the throttle and deltas for one tick.
///
/// The throttle is the smallest `available / demand` ratio over every flow
/// with positive demand, capped at 1. Flows are evaluated in the order input,
/// energy, filter; on a tie the earlier flow is reported as limiting. Every
/// delta, the output included, is scaled by that same throttle.
///
/// Never fails: negative availability counts as zero and a non-positive or
/// non-finite elapsed time yields [`ConversionResult::idle`]. Deltas are
/// `rate * (dt * throttle)`, so a demand that overflows to infinity throttles
/// to zero instead of producing NaN.
pub fn compute(config: &ConversionConfig, inputs: &TickInputs) -> ConversionResult {
    let dt = inputs.elapsed_seconds;
    if !(dt > 0.0 && dt.is_finite()) {
        return ConversionResult::idle();
    }

    let input_demand = config.input_rate * dt;
    let energy_demand = config.energy_rate * dt;
    let filter_rate = if config.is_filter_active() {
        config.filter_rate
    } else {
        0.0
    };
    let filter_demand = filter_rate * dt;

    let mut throttle = 1.0;
    let mut limiting = LimitingFactor::None;
    let constraints = [
        (input_demand, inputs.available_input, LimitingFactor::Input),
        (energy_demand, inputs.available_energy, LimitingFactor::Energy),
        (filter_demand, inputs.available_filter, LimitingFactor::Filter),
    ];
    for (demand, available, factor) in constraints {
        if !(demand > 0.0) {
            continue;
        }
        let ratio = (available.max(0.0) / demand).min(1.0);
        if ratio < throttle {
            throttle = ratio;
            limiting = factor;
        }
    }

    let effective_dt = dt * throttle;
    let consumed = config.input_rate * effective_dt;
    ConversionResult {
        throttle,
        input_delta: consumed,
        energy_delta: config.energy_rate * effective_dt,
        filter_delta: filter_rate * effective_dt,
        output_delta: -consumed * config.conversion_ratio,
        limiting,
    }
}
