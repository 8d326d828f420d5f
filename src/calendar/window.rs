//! UTC day window resolution.
//!
//! Turns an optional, loosely ISO-8601 date string into the half-open
//! interval `[start, end)` covering one UTC calendar day. Inputs carrying a
//! non-UTC offset are first converted to an absolute instant; the UTC day of
//! that instant is used, not the day in the original offset.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::error::DateWindowError;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One UTC calendar day, `[start, end)`.
///
/// `start` is always UTC midnight and `end` is exactly one day later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DayWindow {
    /// Returns the window covering the UTC day of `instant`.
    ///
    /// Returns `None` if the following midnight is not representable.
    #[must_use]
    pub fn containing(instant: DateTime<Utc>) -> Option<Self> {
        let start = Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN));
        let end = start.checked_add_signed(Duration::days(1))?;
        Some(Self { start, end })
    }

    /// UTC midnight at the start of the day.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// UTC midnight at the start of the following day (exclusive).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Naive date-time layouts, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Offset date-time layouts not covered by RFC 3339 (e.g. `+0200`).
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

fn parse_offset_datetime(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(input, format).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Inserts `:00` seconds into `YYYY-MM-DDTHH:MM<offset>`, where the offset
/// is `Z` or starts with a sign.
fn with_zero_seconds(input: &str) -> Option<String> {
    let (minutes, offset) = (input.get(..16)?, input.get(16..)?);
    let separator = minutes.as_bytes()[10];
    let zoned = offset.starts_with(['Z', 'z', '+', '-']);

    (matches!(separator, b'T' | b't' | b' ') && minutes.as_bytes()[13] == b':' && zoned)
        .then(|| format!("{minutes}:00{offset}"))
}

/// Parses a date or date-time string into an absolute instant.
///
/// Returns `None` for anything that is not a recognisable date.
#[must_use]
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Some(dt) = parse_offset_datetime(input) {
        return Some(dt);
    }

    if let Some(dt) = with_zero_seconds(input).and_then(|s| parse_offset_datetime(&s)) {
        return Some(dt);
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    DateTime::parse_from_rfc2822(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Resolves an optional date input into a UTC day window.
///
/// Absent, empty and whitespace-only inputs all mean "today" according to
/// `clock`.
///
/// # Errors
///
/// Returns [`DateWindowError::InvalidDate`] if the input is not a date, or
/// [`DateWindowError::OutOfRange`] if its day cannot be represented.
pub fn resolve_day_window(
    input: Option<&str>,
    clock: &dyn Clock,
) -> Result<DayWindow, DateWindowError> {
    let (reference, raw) = match input.filter(|s| !s.trim().is_empty()) {
        None => (clock.now(), ""),
        Some(raw) => {
            let instant = parse_instant(raw).ok_or_else(|| DateWindowError::InvalidDate {
                input: raw.to_string(),
            })?;
            (instant, raw)
        }
    };

    DayWindow::containing(reference).ok_or_else(|| DateWindowError::OutOfRange {
        input: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn fixed() -> FixedClock {
        FixedClock(utc(2024, 5, 1, 15, 42, 7))
    }

    #[test]
    fn window_is_one_day_from_midnight() {
        let window = DayWindow::containing(utc(2024, 2, 29, 23, 59, 59)).unwrap();
        assert_eq!(window.start(), utc(2024, 2, 29, 0, 0, 0));
        assert_eq!(window.end(), utc(2024, 3, 1, 0, 0, 0));
        assert_eq!(window.end() - window.start(), Duration::hours(24));
    }

    #[test]
    fn contains_is_half_open() {
        let window = DayWindow::containing(utc(2024, 5, 1, 12, 0, 0)).unwrap();
        assert!(window.contains(window.start()));
        assert!(!window.contains(window.end()));
    }

    #[test]
    fn absent_and_empty_use_clock() {
        let clock = fixed();
        let absent = resolve_day_window(None, &clock).unwrap();
        let empty = resolve_day_window(Some(""), &clock).unwrap();
        let blank = resolve_day_window(Some("   "), &clock).unwrap();

        assert_eq!(absent, empty);
        assert_eq!(absent, blank);
        assert!(absent.contains(clock.now()));
    }

    #[test]
    fn date_only_is_utc_day() {
        let window = resolve_day_window(Some("2024-12-31"), &fixed()).unwrap();
        assert_eq!(window.start(), utc(2024, 12, 31, 0, 0, 0));
        assert_eq!(window.end(), utc(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn offset_is_converted_before_truncation() {
        // 01:30 at +02:00 is 23:30 UTC on the previous day.
        let window = resolve_day_window(Some("2024-05-02T01:30:00+02:00"), &fixed()).unwrap();
        assert_eq!(window.start(), utc(2024, 5, 1, 0, 0, 0));

        // 20:00 at -05:00 is 01:00 UTC on the next day.
        let window = resolve_day_window(Some("2024-05-01T20:00:00-0500"), &fixed()).unwrap();
        assert_eq!(window.start(), utc(2024, 5, 2, 0, 0, 0));

        // Seconds may be omitted when an offset is given.
        for (input, day) in [
            ("2024-05-01T10:00Z", 1),
            ("2024-05-01T10:00z", 1),
            ("2024-05-02T01:30+02:00", 1),
            ("2024-05-01T20:00-0500", 2),
            ("2024-05-01 20:00-05:00", 2),
        ] {
            let window = resolve_day_window(Some(input), &fixed()).unwrap();
            assert_eq!(window.start(), utc(2024, 5, day, 0, 0, 0), "{input}");
        }
    }

    #[test]
    fn minutes_only_with_offset_matches_naive_form() {
        assert_eq!(
            parse_instant("2024-05-01T10:00Z"),
            parse_instant("2024-05-01T10:00")
        );
        assert_eq!(parse_instant("2024-05-01T10:00Z"), Some(utc(2024, 5, 1, 10, 0, 0)));
        assert_eq!(parse_instant("2024-05-01T10:00+02:00"), Some(utc(2024, 5, 1, 8, 0, 0)));
        assert_eq!(parse_instant("2024-05-01T10:00Q"), None);
        assert_eq!(parse_instant("2024-05-01T1:00+02:00"), None);
    }

    #[test]
    fn naive_datetimes_are_utc() {
        for input in [
            "2024-05-01T23:59:59",
            "2024-05-01T23:59:59.999",
            "2024-05-01T08:15",
            "2024-05-01 08:15:00",
            "2024-05-01 08:15",
        ] {
            let window = resolve_day_window(Some(input), &fixed()).unwrap();
            assert_eq!(window.start(), utc(2024, 5, 1, 0, 0, 0), "input: {input}");
        }
    }

    #[test]
    fn zulu_with_millis() {
        let window = resolve_day_window(Some("2024-05-01T10:00:00.000Z"), &fixed()).unwrap();
        assert_eq!(window.start().hour(), 0);
        assert_eq!(window.start().minute(), 0);
        assert_eq!(window.start().second(), 0);
        assert_eq!(window.start().nanosecond(), 0);
    }

    #[test]
    fn rfc2822_is_accepted() {
        let window = resolve_day_window(Some("Wed, 01 May 2024 10:00:00 +0000"), &fixed()).unwrap();
        assert_eq!(window.start(), utc(2024, 5, 1, 0, 0, 0));
    }

    #[test]
    fn rejects_garbage() {
        for input in ["not-a-date", "2024-13-01", "2024-02-30", "yesterday", "12345"] {
            let err = resolve_day_window(Some(input), &fixed()).unwrap_err();
            assert_eq!(
                err,
                DateWindowError::InvalidDate {
                    input: input.to_string()
                }
            );
        }
    }

    #[test]
    fn end_of_range_is_rejected() {
        let last_day = DateTime::<Utc>::MAX_UTC;
        assert!(DayWindow::containing(last_day).is_none());
    }
}
