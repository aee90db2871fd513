//! Human-readable formatting for per-second rates.

/// Smallest rate shown in a given unit before stepping to a coarser one.
const DISPLAY_THRESHOLD: f64 = 0.01;

/// Format a per-second rate, switching to per-minute, per-hour or per-day
/// when the value would otherwise round to zero.
///
/// Zero, negative and NaN rates read as `"none"`.
pub fn human_readable_rate(rate: f64) -> String {
    if !(rate > 0.0) {
        return "none".to_string();
    }
    let units = [("/s", 1.0), ("/m", 60.0), ("/h", 60.0), ("/d", 24.0)];
    let mut scaled = rate;
    for (suffix, factor) in units {
        scaled *= factor;
        if scaled >= DISPLAY_THRESHOLD {
            return format!("{scaled:.2}{suffix}");
        }
    }
    format!("< {DISPLAY_THRESHOLD:.2}/d")
}
