use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Rounds half-up (`floor(x + 0.5)`), so `-2.5` becomes `-2`.
///
/// `f64::round` rounds half away from zero, which disagrees on negative
/// halves with the values already published by the dashboard.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Parses the date part of an ISO-8601 date or date-time.
///
/// Accepts `2025-11-15`, `2025-11-15T20:30:00`, `2025-11-15T20:30:00.000`
/// and RFC 3339 strings with an offset. The calendar day is the one written
/// in the string, offsets are not converted.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|datetime| datetime.date())
}

/// Parses an ISO-8601 timestamp into a naive date-time, used to order detections.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| parse_calendar_date(raw).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

/// Signed number of whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_up_matches_dashboard_rounding() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49), 0.0);
    }

    #[test]
    fn parses_supported_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 15);
        assert_eq!(parse_calendar_date("2025-11-15"), expected);
        assert_eq!(parse_calendar_date("2025-11-15T21:00:00"), expected);
        assert_eq!(parse_calendar_date("2025-11-15T21:00:00.000"), expected);
        assert_eq!(parse_calendar_date("2025-11-15T21:00:00-06:00"), expected);
        assert_eq!(parse_calendar_date(" 2025-11-15 "), expected);
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_calendar_date("por confirmar"), None);
        assert_eq!(parse_calendar_date("2025-13-40"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn timestamps_fall_back_to_midnight() {
        let ts = parse_timestamp("2025-10-01").unwrap();
        assert_eq!(ts.to_string(), "2025-10-01 00:00:00");
        assert!(parse_timestamp("2025-10-01T10:15:00Z").unwrap() > ts);
    }

    #[test]
    fn days_between_is_signed() {
        let a = NaiveDate::from_ymd_opt(2025, 10, 9).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        assert_eq!(days_between(a, b), 7);
        assert_eq!(days_between(b, a), -7);
    }
}
