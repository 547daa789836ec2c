//! Civil wall-clock time.
//!
//! The organization operates in a single timezone, so all borrow/return
//! timestamps and reminder arithmetic use one fixed civil offset (default
//! UTC+7) independent of the server's local timezone setting. The offset is
//! configurable but global; there is no per-user timezone handling.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::error::LedgerError;

/// Default civil offset, hours east of UTC.
pub const DEFAULT_CIVIL_OFFSET_HOURS: i32 = 7;

/// Strict due-date format.
const DUE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Clock producing wall-clock time in the configured fixed civil offset.
#[derive(Debug, Clone, Copy)]
pub struct CivilClock {
    offset: FixedOffset,
}

impl CivilClock {
    /// Create a clock for an offset `hours_east` of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Configuration`] if the offset is not a valid
    /// UTC offset (|hours| must be below 24).
    pub fn new(hours_east: i32) -> Result<Self, LedgerError> {
        let offset = FixedOffset::east_opt(hours_east * 3600).ok_or_else(|| {
            LedgerError::Configuration(format!("invalid civil offset: {hours_east} hours"))
        })?;
        Ok(Self { offset })
    }

    /// The configured offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current wall-clock time in the civil offset.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Convert a civil wall-clock datetime to the UTC instant it names.
    #[must_use]
    pub fn to_instant(&self, civil: NaiveDateTime) -> DateTime<Utc> {
        let utc_naive = civil - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc_naive, Utc)
    }
}

impl Default for CivilClock {
    fn default() -> Self {
        // The constant is in range, so this cannot fail.
        Self::new(DEFAULT_CIVIL_OFFSET_HOURS).expect("default civil offset is valid")
    }
}

/// Parse a due-date string strictly as day/month/year.
///
/// No partial parse and no locale fallback: `31/12/2026` is accepted,
/// `2026-12-31` and `13/13/2026` are not.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidDueDate`] on any other format.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(input, DUE_DATE_FORMAT).map_err(|_| LedgerError::InvalidDueDate {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn valid_due_date_parses() {
        let date = parse_due_date("31/12/2026").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn iso_format_rejected() {
        assert!(matches!(
            parse_due_date("2026-12-31"),
            Err(LedgerError::InvalidDueDate { .. })
        ));
    }

    #[test]
    fn impossible_date_rejected() {
        assert!(parse_due_date("13/13/2026").is_err());
        assert!(parse_due_date("31/02/2026").is_err());
        assert!(parse_due_date("").is_err());
    }

    #[test]
    fn trailing_garbage_rejected() {
        assert!(parse_due_date("31/12/2026 extra").is_err());
    }

    #[test]
    fn clock_rejects_out_of_range_offset() {
        assert!(CivilClock::new(24).is_err());
        assert!(CivilClock::new(-24).is_err());
        assert!(CivilClock::new(7).is_ok());
    }

    #[test]
    fn to_instant_subtracts_offset() {
        let clock = CivilClock::new(7).unwrap();
        let civil = NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let instant = clock.to_instant(civil);
        assert_eq!(instant.hour(), 1);
        assert_eq!(instant.minute(), 30);
    }

    #[test]
    fn now_reports_in_offset() {
        let clock = CivilClock::new(7).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), 7 * 3600);
    }
}
