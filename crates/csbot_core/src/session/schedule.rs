use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Teams are rolled this long before kick-off.
pub const ROLL_LEAD_MINUTES: i64 = 30;

/// The next date falling on `playday`, today included.
pub fn next_playdate(today: NaiveDate, playday: Weekday) -> NaiveDate {
    let mut days_to =
        playday.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64;
    if days_to < 0 {
        // past playday this week
        days_to += 7;
    }
    today + Duration::days(days_to)
}

pub fn next_playtime(today: NaiveDate, playday: Weekday, time: NaiveTime) -> NaiveDateTime {
    next_playdate(today, playday).and_time(time)
}

pub fn roll_time(date: NaiveDateTime) -> NaiveDateTime {
    date - Duration::minutes(ROLL_LEAD_MINUTES)
}
