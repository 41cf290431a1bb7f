//! Display formatting for prices and auction countdowns.

use chrono::{DateTime, Utc};

/// Thousands-separated gold amount, e.g. `1,250,000 gold`.
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} gold")
}

/// Whole seconds until the auction deadline, clamped at zero.
pub fn seconds_remaining(end_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (end_at - now).num_seconds().max(0)
}

/// Compact countdown: coarser units dominate as more time remains.
pub fn format_time_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "ended".to_string();
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn price_grouping() {
        assert_eq!(format_price(0), "0 gold");
        assert_eq!(format_price(999), "999 gold");
        assert_eq!(format_price(1_000), "1,000 gold");
        assert_eq!(format_price(5_000_000), "5,000,000 gold");
        assert_eq!(format_price(-1_234), "-1,234 gold");
    }

    #[test]
    fn countdown_units() {
        assert_eq!(format_time_remaining(0), "ended");
        assert_eq!(format_time_remaining(-5), "ended");
        assert_eq!(format_time_remaining(45), "45s");
        assert_eq!(format_time_remaining(125), "2m 5s");
        assert_eq!(format_time_remaining(3_725), "1h 2m 5s");
        assert_eq!(format_time_remaining(90_000), "1d 1h 0m");
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let end = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 30).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 1, 1, 0, 1, 0).unwrap();

        assert_eq!(seconds_remaining(end, before), 30);
        assert_eq!(seconds_remaining(end, after), 0);
    }
}
