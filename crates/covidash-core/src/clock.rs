use chrono::{DateTime, NaiveDate, TimeZone};

use crate::{Error, Result};

/// Resolve a wall-clock `"HH:MM"` spec to the next instant at or after `now`
/// matching that time of day.
///
/// A bare hour (`"9"`) is accepted with the minute defaulting to `00`. If
/// today's occurrence has already passed, the result is tomorrow's. The
/// function is pure: the same spec and `now` always yield the same instant.
pub fn next_occurrence<Tz: TimeZone>(spec: &str, now: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    let (hour, minute) = parse_spec(spec)?;
    let tz = now.timezone();

    let mut date = now.date_naive();
    // Today's occurrence, or tomorrow's if it has passed. A local time that
    // does not exist (DST gap) counts as passed.
    for _ in 0..2 {
        if let Some(candidate) = instant_at(&tz, date, hour, minute) {
            if candidate >= *now {
                return Ok(candidate);
            }
        }
        date = date
            .succ_opt()
            .ok_or_else(|| invalid(spec, "date out of range"))?;
    }

    Err(invalid(spec, "no representable occurrence"))
}

fn parse_spec(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    // No colon means a bare hour; minute defaults to 00.
    let (hour_part, minute_part) = match trimmed.split_once(':') {
        Some((hour, minute)) => (hour, minute),
        None => (trimmed, "00"),
    };

    let hour: u32 = hour_part
        .parse()
        .map_err(|_| invalid(spec, "hour is not a number"))?;
    let minute: u32 = minute_part
        .parse()
        .map_err(|_| invalid(spec, "minute is not a number"))?;

    if hour > 23 {
        return Err(invalid(spec, "hour out of range"));
    }
    if minute > 59 {
        return Err(invalid(spec, "minute out of range"));
    }

    Ok((hour, minute))
}

fn instant_at<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    tz.from_local_datetime(&naive).earliest()
}

fn invalid(spec: &str, reason: &str) -> Error {
    Error::InvalidRefreshTime {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    #[test]
    fn test_passed_time_rolls_to_next_day() {
        let now = Utc.with_ymd_and_hms(2021, 12, 10, 12, 0, 0).unwrap();
        let fire_at = next_occurrence("00:00", &now).unwrap();
        assert_eq!(fire_at, Utc.with_ymd_and_hms(2021, 12, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_future_time_stays_today() {
        let now = Utc.with_ymd_and_hms(2021, 12, 10, 12, 0, 0).unwrap();
        let fire_at = next_occurrence("18:30", &now).unwrap();
        assert_eq!(fire_at, Utc.with_ymd_and_hms(2021, 12, 10, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_exact_now_fires_now() {
        let now = Utc.with_ymd_and_hms(2021, 12, 10, 12, 0, 0).unwrap();
        let fire_at = next_occurrence("12:00", &now).unwrap();
        assert_eq!(fire_at, now);
    }

    #[test]
    fn test_bare_hour_defaults_minute() {
        let now = Utc.with_ymd_and_hms(2021, 12, 10, 12, 0, 0).unwrap();
        let fire_at = next_occurrence("15", &now).unwrap();
        assert_eq!(fire_at, Utc.with_ymd_and_hms(2021, 12, 10, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_single_digit_hour() {
        let now = Utc.with_ymd_and_hms(2021, 12, 10, 12, 0, 0).unwrap();
        let fire_at = next_occurrence("9:05", &now).unwrap();
        assert_eq!(fire_at, Utc.with_ymd_and_hms(2021, 12, 11, 9, 5, 0).unwrap());
    }

    #[test]
    fn test_result_is_within_one_day() {
        let now = Utc.with_ymd_and_hms(2021, 12, 10, 23, 59, 30).unwrap();
        for spec in ["00:00", "12:00", "23:59", "23", "6:45"] {
            let fire_at = next_occurrence(spec, &now).unwrap();
            assert!(fire_at >= now, "{spec} resolved into the past");
            assert!(
                fire_at < now + Duration::hours(24) + Duration::seconds(1),
                "{spec} resolved more than a day out"
            );
        }
    }

    #[test]
    fn test_idempotent_for_same_now() {
        let now = Utc.with_ymd_and_hms(2021, 6, 1, 8, 15, 0).unwrap();
        let first = next_occurrence("08:30", &now).unwrap();
        let second = next_occurrence("08:30", &now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_respects_timezone_offset() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let now = tz.with_ymd_and_hms(2021, 12, 10, 12, 0, 0).unwrap();
        let fire_at = next_occurrence("13:00", &now).unwrap();
        assert_eq!(fire_at, tz.with_ymd_and_hms(2021, 12, 10, 13, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_malformed_specs() {
        let now = Utc.with_ymd_and_hms(2021, 12, 10, 12, 0, 0).unwrap();
        for spec in ["", "ab:cd", "12:xx", "24:00", "12:60", "1:2:3", ":30"] {
            assert!(
                matches!(
                    next_occurrence(spec, &now),
                    Err(Error::InvalidRefreshTime { .. })
                ),
                "{spec:?} should be rejected"
            );
        }
    }
}
