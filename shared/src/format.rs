//! Human-readable rendering of raw counters

use crate::TICKS_PER_SECOND;

/// Renders a centimeter counter at a human scale.
///
/// Below one meter the count stays in centimeters with a `c` marker.
/// Up to a kilometer it becomes whole rounded meters with no marker.
/// Beyond that it becomes kilometers with exactly two decimals and a
/// `k` marker. Callers append the base unit, so `1234` renders as
/// `12` and is displayed as `12m`.
pub fn si_prefix(cm: u64) -> String {
    if cm < 100 {
        format!("{} c", cm)
    } else if cm < 100_000 {
        format!("{}", (cm + 50) / 100)
    } else {
        // Round to the nearest ten meters first, then split into whole
        // kilometers and hundredths. Collapsing this into one division
        // changes results near the rounding boundary.
        let hundredths = (cm + 500) / 1_000;
        format!("{}.{:02} k", hundredths / 100, hundredths % 100)
    }
}

/// Renders a tick counter as a coarse duration, largest unit first.
///
/// Zero-valued units are skipped entirely, so 1d 0h 4m renders as
/// `1d 4m`. Anything under a second floors to `0s`.
pub fn pretty_duration(ticks: u64) -> String {
    let total_secs = ticks / TICKS_PER_SECOND;
    let days = total_secs / 86_400;
    let hours = total_secs % 86_400 / 3_600;
    let minutes = total_secs % 3_600 / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_si_prefix_centimeter_band() {
        assert_eq!(si_prefix(0), "0 c");
        assert_eq!(si_prefix(1), "1 c");
        assert_eq!(si_prefix(42), "42 c");
        assert_eq!(si_prefix(99), "99 c");
    }

    #[test]
    fn test_si_prefix_meter_band_rounds_half_up() {
        assert_eq!(si_prefix(100), "1");
        assert_eq!(si_prefix(149), "1");
        assert_eq!(si_prefix(150), "2");
        assert_eq!(si_prefix(15_070), "151");
        assert_eq!(si_prefix(99_949), "999");
        assert_eq!(si_prefix(99_999), "1000");
    }

    #[test]
    fn test_si_prefix_kilometer_band_keeps_two_decimals() {
        assert_eq!(si_prefix(100_000), "1.00 k");
        assert_eq!(si_prefix(100_499), "1.00 k");
        assert_eq!(si_prefix(100_500), "1.01 k");
        assert_eq!(si_prefix(1_234_567), "12.35 k");
        assert_eq!(si_prefix(1_500_000), "15.00 k");
        assert_eq!(si_prefix(123_456_789), "1234.57 k");
    }

    #[test]
    fn test_si_prefix_half_boundary_rounds_up() {
        // Exactly half a hundredth rounds up. A float rendering of
        // 1.005 km would print 1.00 because the value sits just below
        // the half in binary.
        assert_eq!(si_prefix(149_950), "1.50 k");
        assert_eq!(si_prefix(1_499_500), "15.00 k");
        assert_eq!(si_prefix(100_455), "1.00 k");
    }

    #[test]
    fn test_pretty_duration_floors_to_seconds() {
        assert_eq!(pretty_duration(0), "0s");
        assert_eq!(pretty_duration(19), "0s");
        assert_eq!(pretty_duration(20), "1s");
        assert_eq!(pretty_duration(20 * 59), "59s");
    }

    #[test]
    fn test_pretty_duration_unit_rollover() {
        assert_eq!(pretty_duration(20 * 60), "1m");
        assert_eq!(pretty_duration(20 * 61), "1m 1s");
        assert_eq!(pretty_duration(20 * 3_600), "1h");
        assert_eq!(pretty_duration(20 * 86_400), "1d");
        assert_eq!(pretty_duration(20 * 90_061), "1d 1h 1m 1s");
    }

    #[test]
    fn test_pretty_duration_skips_zero_units() {
        // 1 day and 4 minutes, with no hours or seconds in between.
        assert_eq!(pretty_duration(20 * (86_400 + 240)), "1d 4m");
        assert_eq!(pretty_duration(20 * (3_600 + 5)), "1h 5s");
    }
}
