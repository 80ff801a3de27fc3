//! Calendar matrix construction for the monthly dashboard.

use time::Weekday;

use crate::{Error, dashboard::month::compute_month_bounds};

/// The number of days in a calendar week row.
const DAYS_PER_WEEK: usize = 7;

/// One row of the calendar. Each cell holds a day of the month, or 0 for a day that belongs to
/// the previous or next month.
pub type CalendarWeek = [u8; DAYS_PER_WEEK];

/// Lays out a month as rows of weeks starting on `first_day_of_week`.
///
/// Days before the first and after the last day of the month are padded with zeros, so every
/// row has seven cells and only as many rows as needed to cover the month are returned.
///
/// # Errors
/// Returns an [Error::InvalidMonth] if `month` is not in `1..=12`, or an [Error::InvalidYear] if
/// the month cannot be represented as a date.
pub fn build_calendar_weeks(
    year: i32,
    month: u8,
    first_day_of_week: Weekday,
) -> Result<Vec<CalendarWeek>, Error> {
    let bounds = compute_month_bounds(year, month)?;

    let leading_padding = usize::from(
        (bounds.month_start.weekday().number_days_from_sunday() + 7
            - first_day_of_week.number_days_from_sunday())
            % 7,
    );

    let mut weeks = Vec::new();
    let mut week: CalendarWeek = [0; DAYS_PER_WEEK];
    let mut column = leading_padding;

    for day in 1..=bounds.days_in_month {
        week[column] = day;
        column += 1;

        if column == DAYS_PER_WEEK {
            weeks.push(week);
            week = [0; DAYS_PER_WEEK];
            column = 0;
        }
    }

    if column > 0 {
        weeks.push(week);
    }

    Ok(weeks)
}
