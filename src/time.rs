//! Safe time functions.
use std::time::SystemTime;

fn is_leap_year(year: i64) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

fn year_len_days(year: i64) -> i64 {
    if is_leap_year(year) { 366 } else { 365 }
}

#[allow(clippy::match_same_arms)]
#[must_use]
fn month_len_days(year: i64, month: i64) -> i64 {
    match month {
        1 => 31,
        2 if is_leap_year(year) => 29,
        2 => 28,
        3 => 31,
        4 => 30,
        5 => 31,
        6 => 30,
        7 => 31,
        8 => 31,
        9 => 30,
        10 => 31,
        11 => 30,
        12 => 31,
        _ => unimplemented!(),
    }
}

pub struct DateTime {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub min: i64,
    pub sec: i64,
}
impl DateTime {
    // Epoch time assumes that every day is the same length, 24 * 60 * 60 seconds.
    // It ignores leap seconds.
    #[must_use]
    pub fn new(epoch_seconds: i64) -> Self {
        let days = epoch_seconds.div_euclid(86400);
        let day_seconds = epoch_seconds.rem_euclid(86400);
        let mut year = 1970;
        let mut days_left = days;
        while days_left >= year_len_days(year) {
            days_left -= year_len_days(year);
            year += 1;
        }
        let mut month = 1;
        while days_left >= month_len_days(year, month) {
            days_left -= month_len_days(year, month);
            month += 1;
        }
        Self {
            year,
            month,
            day: days_left + 1,
            hour: day_seconds / 3600,
            min: (day_seconds / 60) % 60,
            sec: day_seconds % 60,
        }
    }
}

pub trait ToDateTime {
    fn to_datetime(&self) -> DateTime;
}
impl ToDateTime for SystemTime {
    fn to_datetime(&self) -> DateTime {
        let epoch_seconds = match self.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
            Err(_) => 0,
        };
        DateTime::new(epoch_seconds)
    }
}

pub trait FormatTime {
    fn iso8601_utc(&self) -> String;
}
impl FormatTime for SystemTime {
    fn iso8601_utc(&self) -> String {
        let dt = self.to_datetime();
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            dt.year, dt.month, dt.day, dt.hour, dt.min, dt.sec
        )
    }
}
