//! Calendar-day helpers.
//!
//! Everything here works on naive calendar dates. Offset-aware timestamps from
//! the leave service are converted to the server's local timezone before the
//! day is taken, so `2024-01-14T18:30:00Z` is the 15th in Asia/Kolkata.

use chrono::{DateTime, Local, Months, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};

/// Key format used for the date → leave lookup and for leave API queries.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// First and last day of `month`/`year`, or `None` for an impossible month.
pub fn month_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

#[cfg(test)]
pub fn days_in_month(month: u32, year: i32) -> Option<u32> {
    month_bounds(month, year).map(|(first, last)| (last - first).num_days() as u32 + 1)
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn month_name(month: u32) -> Option<&'static str> {
    let month = chrono::Month::try_from(u8::try_from(month).ok()?).ok()?;
    Some(month.name())
}

/// Today's date on the server's local calendar.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses `YYYY-MM-DD` or a timestamp into the local calendar day it names.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    parse_calendar_date_in(raw, &Local)
}

/// Like [`parse_calendar_date`], reading offset-aware timestamps in `tz`.
/// Plain dates and naive timestamps are taken as already local.
pub fn parse_calendar_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT) {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(tz).date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

pub fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {raw}")))
}
