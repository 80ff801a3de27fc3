//! Month selection and month boundary arithmetic.
//!
//! A month is identified by a year and a month number in `1..=12`. Month numbers outside that
//! range are rejected with [Error::InvalidMonth] rather than wrapped, so that a bug upstream
//! shows up as an error instead of as the wrong month.

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::Error;

/// The range of years that can be selected from the query string.
///
/// Stops a year short of the last representable year so that every selectable month has a
/// representable following month.
const SELECTABLE_YEARS: std::ops::RangeInclusive<i32> = 1..=9998;

/// The raw `y` and `m` query parameters of the dashboard.
///
/// The values are kept as strings so that garbage input falls back to the current month
/// instead of rejecting the whole request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MonthQuery {
    /// The year, e.g. "2025".
    pub y: Option<String>,
    /// The month number, e.g. "9".
    pub m: Option<String>,
}

/// A validated year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSelector {
    /// The calendar year.
    pub year: i32,
    /// The month number in `1..=12`.
    pub month: u8,
}

impl MonthSelector {
    /// Select the month given by `query`, using `today` for any missing or invalid part.
    ///
    /// A month number outside `1..=12` counts as invalid, so the result is always a valid month.
    pub fn from_query(query: &MonthQuery, today: Date) -> Self {
        let year = query
            .y
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .filter(|year| SELECTABLE_YEARS.contains(year))
            .unwrap_or(today.year());

        let month = query
            .m
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|month| (1..=12).contains(month))
            .unwrap_or(today.month() as u8);

        Self { year, month }
    }
}

/// The boundaries of a month and its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthBounds {
    /// The first day of the month.
    pub month_start: Date,
    /// The first day of the following month, i.e. the exclusive end of the month.
    pub next_month_start: Date,
    /// The number of days in the month.
    pub days_in_month: u8,
    /// The year of the previous month.
    pub prev_year: i32,
    /// The previous month number.
    pub prev_month: u8,
    /// The year of the following month.
    pub next_year: i32,
    /// The following month number.
    pub next_month: u8,
}

impl MonthBounds {
    /// Whether `date` falls inside the month.
    pub fn contains(&self, date: Date) -> bool {
        self.month_start <= date && date < self.next_month_start
    }
}

/// Compute the half-open date range of a month, its length and its neighbouring months.
///
/// # Errors
/// Returns an:
/// - [Error::InvalidMonth] if `month` is not in `1..=12`,
/// - [Error::InvalidYear] if the month or the month after it cannot be represented as a date.
pub fn compute_month_bounds(year: i32, month: u8) -> Result<MonthBounds, Error> {
    let month_start = first_day_of(year, month)?;

    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let next_month_start = first_day_of(next_year, next_month)?;
    let days_in_month = (next_month_start - month_start).whole_days() as u8;

    Ok(MonthBounds {
        month_start,
        next_month_start,
        days_in_month,
        prev_year,
        prev_month,
        next_year,
        next_month,
    })
}

/// The first day of `month` in `year`.
fn first_day_of(year: i32, month: u8) -> Result<Date, Error> {
    let calendar_month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;

    Date::from_calendar_date(year, calendar_month, 1).map_err(|_| Error::InvalidYear(year))
}

#[cfg(test)]
mod month_bounds_tests {
    use time::macros::date;

    use crate::Error;

    use super::compute_month_bounds;

    #[test]
    fn days_in_month_follows_gregorian_calendar() {
        let cases = [
            (2024, 2, 29),
            (2023, 2, 28),
            (2024, 4, 30),
            (2025, 1, 31),
            (1900, 2, 28),
            (2000, 2, 29),
        ];

        for (year, month, want_days) in cases {
            let bounds = compute_month_bounds(year, month).unwrap();

            assert_eq!(
                bounds.days_in_month, want_days,
                "{year}-{month} should have {want_days} days"
            );
        }
    }

    #[test]
    fn bounds_are_half_open() {
        let bounds = compute_month_bounds(2025, 9).unwrap();

        assert_eq!(bounds.month_start, date!(2025 - 09 - 01));
        assert_eq!(bounds.next_month_start, date!(2025 - 10 - 01));
        assert!(bounds.contains(date!(2025 - 09 - 01)));
        assert!(bounds.contains(date!(2025 - 09 - 30)));
        assert!(!bounds.contains(date!(2025 - 10 - 01)));
        assert!(!bounds.contains(date!(2025 - 08 - 31)));
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let bounds = compute_month_bounds(2025, 12).unwrap();

        assert_eq!((bounds.next_year, bounds.next_month), (2026, 1));
        assert_eq!((bounds.prev_year, bounds.prev_month), (2025, 11));
        assert_eq!(bounds.next_month_start, date!(2026 - 01 - 01));
        assert_eq!(bounds.days_in_month, 31);
    }

    #[test]
    fn january_rolls_back_to_previous_year() {
        let bounds = compute_month_bounds(2025, 1).unwrap();

        assert_eq!((bounds.prev_year, bounds.prev_month), (2024, 12));
        assert_eq!((bounds.next_year, bounds.next_month), (2025, 2));
    }

    #[test]
    fn rejects_month_out_of_range() {
        assert_eq!(compute_month_bounds(2025, 0), Err(Error::InvalidMonth(0)));
        assert_eq!(compute_month_bounds(2025, 13), Err(Error::InvalidMonth(13)));
    }

    #[test]
    fn rejects_unrepresentable_year() {
        assert_eq!(
            compute_month_bounds(9999, 12),
            Err(Error::InvalidYear(10000))
        );
        assert_eq!(
            compute_month_bounds(10000, 1),
            Err(Error::InvalidYear(10000))
        );
    }
}
