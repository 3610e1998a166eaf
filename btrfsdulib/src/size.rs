//! Human-readable byte magnitudes and quota limit strings.

use tracing::warn;

/// Binary unit suffixes, indexed by the number of divisions by 1024.
const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Width of a padded magnitude, the length of `"1023.9 EiB"`.
pub const MAGNITUDE_WIDTH: usize = 10;

/// Returned when a value does not fit in the largest unit.
pub const OVERFLOW_SENTINEL: &str = "NaN";

/// Format a byte count as a scaled binary magnitude: `"512.0 KiB"`.
///
/// With `padded`, the unit is left-justified to three characters and the
/// result right-aligned to [`MAGNITUDE_WIDTH`], so `0` becomes `"   0.0 B  "`
/// and `1024` becomes `"   1.0 KiB"`.
pub fn human_size(bytes: u64, padded: bool) -> String {
    format_magnitude(bytes as f64, padded)
}

/// Format a quota limit together with how much of it is used.
///
/// A zero limit means no limit is set and yields `"none"`. Otherwise the
/// percentage is truncated, never rounded: `human_limit(3, 2)` shows `66%`.
pub fn human_limit(limit: u64, used: u64) -> String {
    if limit == 0 {
        return "none".to_string();
    }
    let percentage = u128::from(used) * 100 / u128::from(limit);
    format!("{} ({:>3}%)", human_size(limit, false), percentage)
}

fn format_magnitude(mut value: f64, padded: bool) -> String {
    let mut unit = 0;
    while value >= 1024.0 {
        value /= 1024.0;
        unit += 1;
    }

    let Some(suffix) = UNITS.get(unit) else {
        warn!("value exceeds {} units, shown as {}", UNITS[UNITS.len() - 1], OVERFLOW_SENTINEL);
        return if padded {
            format!("{:>width$}", OVERFLOW_SENTINEL, width = MAGNITUDE_WIDTH)
        } else {
            OVERFLOW_SENTINEL.to_string()
        };
    };

    if padded {
        let text = format!("{:.1} {:<3}", value, suffix);
        format!("{:>width$}", text, width = MAGNITUDE_WIDTH)
    } else {
        format!("{:.1} {}", value, suffix)
    }
}
