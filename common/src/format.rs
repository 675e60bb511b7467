const SECONDS_IN_A_MINUTE: u64 = 60;
const SECONDS_IN_AN_HOUR: u64 = SECONDS_IN_A_MINUTE * 60;
const SECONDS_IN_A_DAY: u64 = SECONDS_IN_AN_HOUR * 24;

/// Spell out a duration, e.g. `"1 minute 5 seconds"`.
///
/// Larger units appear once any larger unit is non-zero, so an hour reads
/// `"1 hour 0 minutes 0 seconds"`.
pub fn format_duration(secs: u64) -> String {
    let days = secs / SECONDS_IN_A_DAY;
    let hours = secs % SECONDS_IN_A_DAY / SECONDS_IN_AN_HOUR;
    let minutes = secs % SECONDS_IN_AN_HOUR / SECONDS_IN_A_MINUTE;
    let seconds = secs % SECONDS_IN_A_MINUTE;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(unit(days, "day"));
    }
    if hours > 0 || days > 0 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 || hours > 0 || days > 0 {
        parts.push(unit(minutes, "minute"));
    }
    parts.push(unit(seconds, "second"));

    parts.join(" ")
}

fn unit(value: u64, name: &str) -> String {
    if value == 1 {
        format!("{} {}", value, name)
    } else {
        format!("{} {}s", value, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_only() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(59), "59 seconds");
    }

    #[test]
    fn keeps_zero_units_below_the_largest() {
        assert_eq!(format_duration(65), "1 minute 5 seconds");
        assert_eq!(format_duration(3600), "1 hour 0 minutes 0 seconds");
        assert_eq!(format_duration(7322), "2 hours 2 minutes 2 seconds");
        assert_eq!(
            format_duration(SECONDS_IN_A_DAY + 61),
            "1 day 0 hours 1 minute 1 second"
        );
        assert_eq!(
            format_duration(2 * SECONDS_IN_A_DAY),
            "2 days 0 hours 0 minutes 0 seconds"
        );
    }
}
