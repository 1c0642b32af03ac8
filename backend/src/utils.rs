use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    // P[nD]T[nH][nM][nS], as returned in contentDetails.duration
    static ref ISO8601_DURATION: Regex =
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
            .expect("duration pattern is valid");
}

/// Parse an ISO8601 duration (PT1H2M3S) into (hours, minutes, seconds).
///
/// Days are folded into hours. Returns `None` when the token does not match
/// or a component overflows.
pub fn parse_iso8601_duration(duration_str: &str) -> Option<(u64, u64, u64)> {
    let caps = ISO8601_DURATION.captures(duration_str.trim())?;

    let component = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<u64>().ok(),
            None => Some(0),
        }
    };

    let days = component(1)?;
    let hours = component(2)?;
    let minutes = component(3)?;
    let seconds = component(4)?;

    let hours = days.checked_mul(24)?.checked_add(hours)?;
    Some((hours, minutes, seconds))
}

/// Render a provider duration token as `H:MM:SS`, or `M:SS` under an hour.
/// Anything unparseable becomes `0:00`.
pub fn format_duration(duration_str: &str) -> String {
    let (hours, minutes, seconds) = parse_iso8601_duration(duration_str).unwrap_or((0, 0, 0));

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Date-only part of an RFC3339 timestamp.
pub fn upload_date(published_at: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(published_at) {
        return dt.date_naive().to_string();
    }

    published_at
        .split('T')
        .next()
        .unwrap_or_default()
        .to_string()
}

pub fn compare_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_duration("PT1H2M10S"), "1:02:10");
        assert_eq!(format_duration("PT2H"), "2:00:00");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration("PT5M30S"), "5:30");
        assert_eq!(format_duration("PT45S"), "0:45");
        assert_eq!(format_duration("PT12M"), "12:00");
        assert_eq!(format_duration("PT0M0S"), "0:00");
    }

    #[test]
    fn folds_days_into_hours() {
        assert_eq!(format_duration("P1DT2H3M4S"), "26:03:04");
        assert_eq!(format_duration("P0D"), "0:00");
    }

    #[test]
    fn unparseable_durations_degrade_to_zero() {
        assert_eq!(format_duration(""), "0:00");
        assert_eq!(format_duration("garbage"), "0:00");
        assert_eq!(format_duration("1:02:03"), "0:00");
        assert_eq!(format_duration("PT99999999999999999999999S"), "0:00");
    }

    #[test]
    fn upload_date_is_date_only() {
        assert_eq!(upload_date("2024-01-10T15:04:05Z"), "2024-01-10");
        assert_eq!(upload_date("2023-08-02T00:00:00.000+00:00"), "2023-08-02");
        assert_eq!(upload_date("2022-05-06Tnot-a-time"), "2022-05-06");
        assert_eq!(upload_date(""), "");
    }

    #[test]
    fn compare_desc_orders_largest_first() {
        let mut scores = vec![5.0, 20.0, 1.0];
        scores.sort_by(|a, b| compare_desc(*a, *b));
        assert_eq!(scores, vec![20.0, 5.0, 1.0]);
    }
}
