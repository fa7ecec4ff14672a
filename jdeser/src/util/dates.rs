/*!
 Contains date conversion functions for the time values Java writes into serialization streams.
*/

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::error::known_type::KnownTypeError;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert milliseconds since the Unix epoch, as written by `java.util.Date`
///
/// # Example:
///
/// ```
/// use jdeser::util::dates::from_epoch_millis;
///
/// let date = from_epoch_millis(1560919961088).unwrap();
/// assert_eq!(date.to_rfc3339(), "2019-06-19T04:52:41.088+00:00");
/// ```
pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Utc>, KnownTypeError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| KnownTypeError::InvalidDate(format!("{millis} ms since the epoch")))
}

/// Convert seconds and nanoseconds since the Unix epoch, as written by `java.time.Instant`
pub fn from_epoch_seconds(seconds: i64, nanos: i32) -> Result<DateTime<Utc>, KnownTypeError> {
    u32::try_from(nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(seconds, nanos))
        .ok_or_else(|| {
            KnownTypeError::InvalidDate(format!("{seconds} s + {nanos} ns since the epoch"))
        })
}

/// Build a duration from whole seconds and a nanosecond adjustment, as written by `java.time.Duration`
pub fn duration(seconds: i64, nanos: i32) -> Result<TimeDelta, KnownTypeError> {
    if !(0..NANOS_PER_SECOND).contains(&i64::from(nanos)) {
        return Err(KnownTypeError::InvalidDate(format!(
            "duration nanosecond adjustment {nanos}"
        )));
    }
    TimeDelta::try_seconds(seconds)
        .and_then(|delta| delta.checked_add(&TimeDelta::nanoseconds(i64::from(nanos))))
        .ok_or_else(|| KnownTypeError::InvalidDate(format!("duration of {seconds} s")))
}

/// Build a calendar date, as written by `java.time.LocalDate`
pub fn local_date(year: i32, month: i8, day: i8) -> Result<NaiveDate, KnownTypeError> {
    u32::try_from(month)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| KnownTypeError::InvalidDate(format!("{year}-{month}-{day}")))
}

/// Format a date the way the inspector prints it
pub fn format(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Format a duration as `PT<seconds>S`, i.e. `PT90.5S`
pub fn format_duration(duration: &TimeDelta) -> String {
    let seconds = duration.num_seconds();
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        return format!("PT{seconds}S");
    }
    let fraction = format!("{:09}", nanos.unsigned_abs());
    let sign = if seconds == 0 && nanos < 0 { "-" } else { "" };
    format!("PT{sign}{seconds}.{}S", fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};

    use crate::error::known_type::KnownTypeError;
    use crate::util::dates::{
        duration, format, format_duration, from_epoch_millis, from_epoch_seconds, local_date,
    };

    #[test]
    fn can_format_date_millis() {
        let date = from_epoch_millis(1_560_919_961_088).unwrap();
        assert_eq!(format(&date), "2019-06-19T04:52:41.088Z");
    }

    #[test]
    fn can_format_date_before_epoch() {
        let date = from_epoch_millis(-1).unwrap();
        assert_eq!(format(&date), "1969-12-31T23:59:59.999Z");
    }

    #[test]
    fn can_format_instant() {
        let date = from_epoch_seconds(0x5B1B_D9BB, 0x352A_D700).unwrap();
        assert_eq!(format(&date), "2018-06-09T13:44:27.892Z");
    }

    #[test]
    fn cant_build_instant_negative_nanos() {
        assert!(matches!(
            from_epoch_seconds(0, -1),
            Err(KnownTypeError::InvalidDate(_))
        ));
    }

    #[test]
    fn cant_build_date_out_of_range() {
        assert!(from_epoch_millis(i64::MAX).is_err());
    }

    #[test]
    fn can_build_duration() {
        let delta = duration(90, 500_000_000).unwrap();
        assert_eq!(delta, TimeDelta::milliseconds(90_500));
        assert_eq!(format_duration(&delta), "PT90.5S");
        assert_eq!(format_duration(&TimeDelta::seconds(3)), "PT3S");
    }

    #[test]
    fn cant_build_duration_bad_nanos() {
        assert!(duration(1, 1_000_000_000).is_err());
    }

    #[test]
    fn can_build_local_date() {
        assert_eq!(
            local_date(2024, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(local_date(2023, 2, 29).is_err());
        assert!(local_date(2023, -1, 1).is_err());
    }
}
