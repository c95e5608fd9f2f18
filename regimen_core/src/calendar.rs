//! Calendar date utilities shared by the rule engine and the views.
//!
//! Weeks run Sunday to Saturday throughout.

use crate::types::{CalendarDate, MonthCell};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar view granularity, used for navigation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Day,
    Week,
    Month,
}

/// Sunday of the week containing `date`
///
/// At the lower end of the representable range, where that Sunday does not
/// exist, `NaiveDate::MIN` is returned.
pub fn start_of_week(date: CalendarDate) -> CalendarDate {
    let offset = date.weekday().num_days_from_sunday();
    date.checked_sub_days(Days::new(offset as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// The seven dates of the week containing `date`, Sunday through Saturday
///
/// Days past `NaiveDate::MAX` are clamped to it.
pub fn week_dates(date: CalendarDate) -> [CalendarDate; 7] {
    let start = start_of_week(date);
    std::array::from_fn(|i| {
        start
            .checked_add_days(Days::new(i as u64))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// True when both dates fall in the same Sunday-anchored week
pub fn same_week(a: CalendarDate, b: CalendarDate) -> bool {
    start_of_week(a) == start_of_week(b)
}

/// Equality by calendar day
///
/// `CalendarDate` carries no time of day, so this is plain equality; it
/// stays a named function because every "is this today / is this special"
/// check goes through it.
pub fn same_calendar_day(a: CalendarDate, b: CalendarDate) -> bool {
    a == b
}

/// First day of the month containing `date`
pub fn first_of_month(date: CalendarDate) -> CalendarDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in the given month (1-based)
///
/// Returns 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        // Only December of the last representable year can land here
        None => 31,
    }
}

/// Grid of cells covering the month containing `date`
///
/// The 1st is aligned to its weekday column by leading days of the
/// previous month, and the grid is padded with days of the next month up
/// to a multiple of 7. Padding cells have `is_current_month == false`.
pub fn month_grid(date: CalendarDate) -> Vec<MonthCell> {
    let first = first_of_month(date);
    let leading = first.weekday().num_days_from_sunday() as u64;
    let len = days_in_month(first.year(), first.month()) as u64;

    // Padding that would leave the representable range is dropped
    let (grid_start, leading) = match first.checked_sub_days(Days::new(leading)) {
        Some(start) => (start, leading),
        None => (first, 0),
    };
    let total = (leading + len).div_ceil(7) * 7;

    (0..total)
        .map_while(|i| {
            let day = grid_start.checked_add_days(Days::new(i))?;
            Some(MonthCell {
                date: day,
                is_current_month: i >= leading && i < leading + len,
            })
        })
        .collect()
}

/// Move `date` by `steps` units of `view` (negative steps go back)
///
/// Month steps keep the day of month, clamped to the length of the target
/// month (Jan 31 + 1 month = Feb 28/29).
pub fn navigate(date: CalendarDate, view: View, steps: i32) -> CalendarDate {
    let forward = steps >= 0;
    let n = steps.unsigned_abs();

    let moved = match view {
        View::Day => shift_days(date, n as u64, forward),
        View::Week => shift_days(date, n as u64 * 7, forward),
        View::Month => {
            if forward {
                date.checked_add_months(Months::new(n))
            } else {
                date.checked_sub_months(Months::new(n))
            }
        }
    };

    moved.unwrap_or_else(|| {
        tracing::warn!("Navigation from {} by {} {:?} out of range", date, steps, view);
        date
    })
}

fn shift_days(date: CalendarDate, days: u64, forward: bool) -> Option<CalendarDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}
