//! California public-holiday calendar.
//!
//! Covers the state holidays observed in the incident data's era: the federal
//! set minus Columbus Day, plus César Chávez Day and the day after
//! Thanksgiving. Holidays falling on a Saturday add the preceding Friday as
//! the observed date, Sunday holidays add the following Monday.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_california_holiday(date: NaiveDate) -> bool {
    // A New Year's Day observed on Dec 31 belongs to the following year's
    // calendar, so the next year's set is consulted as well.
    holidays_for_year(date.year()).contains(&date)
        || holidays_for_year(date.year() + 1).contains(&date)
}

fn holidays_for_year(year: i32) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(16);

    push_observed(&mut dates, ymd(year, 1, 1)); // New Year's Day
    dates.push(nth_weekday_of_month(year, 1, Weekday::Mon, 3)); // MLK Day
    dates.push(nth_weekday_of_month(year, 2, Weekday::Mon, 3)); // Washington's Birthday
    push_sunday_observed(&mut dates, ymd(year, 3, 31)); // César Chávez Day
    dates.push(last_weekday_of_month(year, 5, Weekday::Mon)); // Memorial Day
    push_observed(&mut dates, ymd(year, 7, 4)); // Independence Day
    dates.push(nth_weekday_of_month(year, 9, Weekday::Mon, 1)); // Labor Day
    push_observed(&mut dates, ymd(year, 11, 11)); // Veterans Day

    let thanksgiving = nth_weekday_of_month(year, 11, Weekday::Thu, 4);
    dates.push(thanksgiving);
    dates.push(thanksgiving + Duration::days(1)); // Day after Thanksgiving

    push_observed(&mut dates, ymd(year, 12, 25)); // Christmas Day

    dates
}

fn push_observed(dates: &mut Vec<NaiveDate>, date: NaiveDate) {
    dates.push(date);
    match date.weekday() {
        Weekday::Sat => dates.push(date - Duration::days(1)),
        Weekday::Sun => dates.push(date + Duration::days(1)),
        _ => {}
    }
}

// César Chávez Day only shifts forward when it lands on a Sunday.
fn push_sunday_observed(dates: &mut Vec<NaiveDate>, date: NaiveDate) {
    dates.push(date);
    if date.weekday() == Weekday::Sun {
        dates.push(date + Duration::days(1));
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, nth: u8) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, nth).unwrap()
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
        .unwrap_or_else(|| nth_weekday_of_month(year, month, weekday, 4))
}
