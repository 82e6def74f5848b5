//! Display formatting for trip estimates.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

/// Render a duration given in minutes: `45min`, `2 h`, `1h 5min`.
/// Fractions are rounded to the nearest minute; negatives clamp to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_minutes(minutes: f64) -> String {
    let total = if minutes.is_finite() { minutes.round().max(0.0) as u64 } else { 0 };
    if total < 60 {
        return format!("{total}min");
    }
    match (total / 60, total % 60) {
        (hours, 0) => format!("{hours} h"),
        (hours, rest) => format!("{hours}h {rest}min"),
    }
}
