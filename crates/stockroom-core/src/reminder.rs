//! Due-date reminder timing.
//!
//! The fire time is anchored to the length of the borrow window,
//! front-loading reminders for short loans and spacing them out for longer
//! ones. `duration_days` counts the window inclusively: borrowing on the due
//! date itself is a one-day window.
//!
//! | duration_days | fire time |
//! |---|---|
//! | 1 | borrow hour < 12 → same day 12:30, else same day 15:00 |
//! | 2–3 | due date 08:30 |
//! | 4–5 | borrow + 2 days 08:30 |
//! | 6–7 | borrow + 4 days 08:30 |
//! | other | due − 2 days 08:30 |
//!
//! The "other" bucket also absorbs windows of zero or negative length (due
//! date already past); the computed checkpoint may then be in the past, and
//! the caller is responsible for suppressing reminders whose fire time is
//! not strictly in the future.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Compute the civil wall-clock fire time for one loan.
///
/// `borrowed_at` must already be expressed in the civil offset; the result
/// is a naive civil datetime in the same offset.
#[must_use]
pub fn reminder_fire_time(
    borrowed_at: DateTime<FixedOffset>,
    due_date: NaiveDate,
) -> NaiveDateTime {
    let borrow_date = borrowed_at.date_naive();
    let duration_days = (due_date - borrow_date).num_days() + 1;

    match duration_days {
        1 => {
            if borrowed_at.hour() < 12 {
                at(borrow_date, 12, 30)
            } else {
                at(borrow_date, 15, 0)
            }
        }
        2..=3 => at(due_date, 8, 30),
        4..=5 => at(borrow_date + Duration::days(2), 8, 30),
        6..=7 => at(borrow_date + Duration::days(4), 8, 30),
        _ => at(due_date - Duration::days(2), 8, 30),
    }
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    // Hour/minute are compile-time constants from the tier table.
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).expect("valid wall-clock time"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn civil(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
            .and_local_timezone(offset)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_morning_borrow_fires_at_half_past_noon() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 10, 0), date(2026, 3, 10));
        assert_eq!(fire, at(date(2026, 3, 10), 12, 30));
    }

    #[test]
    fn same_day_afternoon_borrow_fires_at_three() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 14, 0), date(2026, 3, 10));
        assert_eq!(fire, at(date(2026, 3, 10), 15, 0));
    }

    #[test]
    fn noon_borrow_counts_as_afternoon() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 12, 0), date(2026, 3, 10));
        assert_eq!(fire, at(date(2026, 3, 10), 15, 0));
    }

    #[test]
    fn two_day_window_fires_on_due_date() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 9, 0), date(2026, 3, 11));
        assert_eq!(fire, at(date(2026, 3, 11), 8, 30));
    }

    #[test]
    fn three_day_window_fires_on_due_date() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 9, 0), date(2026, 3, 12));
        assert_eq!(fire, at(date(2026, 3, 12), 8, 30));
    }

    #[test]
    fn four_day_window_fires_two_days_in() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 9, 0), date(2026, 3, 13));
        assert_eq!(fire, at(date(2026, 3, 12), 8, 30));
    }

    #[test]
    fn five_day_window_fires_two_days_in() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 9, 0), date(2026, 3, 14));
        assert_eq!(fire, at(date(2026, 3, 12), 8, 30));
    }

    #[test]
    fn seven_day_window_fires_four_days_in() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 9, 0), date(2026, 3, 16));
        assert_eq!(fire, at(date(2026, 3, 14), 8, 30));
    }

    #[test]
    fn long_window_anchors_two_days_before_due() {
        let fire = reminder_fire_time(civil(2026, 3, 10, 9, 0), date(2026, 3, 24));
        assert_eq!(fire, at(date(2026, 3, 22), 8, 30));
    }

    #[test]
    fn past_due_date_still_anchors_to_due_date() {
        // Zero-length window: the checkpoint lands in the past and the
        // caller's future-time check suppresses it.
        let fire = reminder_fire_time(civil(2026, 3, 10, 9, 0), date(2026, 3, 8));
        assert_eq!(fire, at(date(2026, 3, 6), 8, 30));
    }
}
