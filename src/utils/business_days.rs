use chrono::{Datelike, NaiveDate};

/// Count the days in the inclusive range whose weekday is Monday through
/// Friday. No holiday calendar. An inverted range counts zero days.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| day.weekday().num_days_from_monday() < 5)
        .count() as i64
}
