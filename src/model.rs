//! Rows of the five tables the loader writes.

use chrono::{ DateTime, Datelike, Timelike, Utc, Weekday };

/// Format of `time.start_time` and `songplays.start_time`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// `level` is the only column a later observation of the same user may change.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
}

/// Calendar attributes of one play timestamp. Every field is a function of `start_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRow {
    pub start_time: String,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: &'static str,
}

impl TimeRow {
    pub fn from_datetime(ts: &DateTime<Utc>) -> Self {
        TimeRow {
            start_time: ts.format(TIMESTAMP_FORMAT).to_string(),
            hour: ts.hour(),
            day: ts.day(),
            week: ts.iso_week().week(),
            month: ts.month(),
            year: ts.year(),
            weekday: weekday_name(ts.weekday()),
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Identity of a catalogued song, as resolved from a play event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRef {
    pub song_id: String,
    pub artist_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Songplay {
    pub start_time: String,
    pub user_id: i64,
    pub level: String,
    pub song: Option<SongRef>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_row_is_derived_from_timestamp() {
        let ts = DateTime::from_timestamp_millis(1541121934796).unwrap();
        let row = TimeRow::from_datetime(&ts);
        assert_eq!(row.start_time, "2018-11-02 01:25:34.796");
        assert_eq!(row.hour, 1);
        assert_eq!(row.day, 2);
        assert_eq!(row.week, 44);
        assert_eq!(row.month, 11);
        assert_eq!(row.year, 2018);
        assert_eq!(row.weekday, "Friday");
    }

    #[test]
    fn same_timestamp_same_weekday() {
        let a = TimeRow::from_datetime(&DateTime::from_timestamp_millis(1543622400000).unwrap());
        let b = TimeRow::from_datetime(&DateTime::from_timestamp_millis(1543622400000).unwrap());
        assert_eq!(a, b);
        assert_eq!(a.weekday, "Saturday");
    }

    #[test]
    fn iso_week_crosses_year_boundary() {
        // 2018-12-31 is a Monday in ISO week 1 of 2019
        let row = TimeRow::from_datetime(&DateTime::from_timestamp_millis(1546214400000).unwrap());
        assert_eq!(row.start_time, "2018-12-31 00:00:00.000");
        assert_eq!(row.week, 1);
        assert_eq!(row.year, 2018);
        assert_eq!(row.weekday, "Monday");
    }
}
