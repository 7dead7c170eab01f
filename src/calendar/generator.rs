use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, instrument};

use crate::calendar::dates::{self, date_key};
use crate::error::CalendarError;
use crate::leave::LeaveSource;
use crate::model::calendar::{CalendarCell, DayStatus, MonthlyCalendar};
use crate::model::leave_record::LeaveRecord;

/// Six full weeks.
pub const CALENDAR_CELLS: usize = 42;

/// Fetches the month's leaves for `user_id` and derives the calendar
/// against the server's local date.
pub async fn generate_monthly_calendar<S: LeaveSource>(
    source: &S,
    user_id: &str,
    month: u32,
    year: i32,
    joining_date: &str,
) -> Result<MonthlyCalendar, CalendarError> {
    generate_monthly_calendar_on(source, user_id, month, year, joining_date, dates::local_today())
        .await
}

#[instrument(name = "generate_calendar", skip(source, joining_date))]
pub async fn generate_monthly_calendar_on<S: LeaveSource>(
    source: &S,
    user_id: &str,
    month: u32,
    year: i32,
    joining_date: &str,
    today: NaiveDate,
) -> Result<MonthlyCalendar, CalendarError> {
    if user_id.trim().is_empty() {
        return Err(CalendarError::InvalidInput("user_id must not be empty".into()));
    }
    if !(1000..=9999).contains(&year) {
        return Err(CalendarError::InvalidInput(format!(
            "year must have four digits, got {year}"
        )));
    }
    let (first, last) = dates::month_bounds(month, year).ok_or_else(|| {
        CalendarError::InvalidInput(format!("month must be between 1 and 12, got {month}"))
    })?;
    let joining = dates::parse_calendar_date(joining_date).ok_or_else(|| {
        CalendarError::InvalidInput(format!("invalid joining date: {joining_date}"))
    })?;

    let records = source.fetch_leaves(user_id, first, last).await?;
    debug!(leaves = records.len(), "Building calendar");

    build_calendar(month, year, joining, today, records)
}

/// Lays out the 42-day grid for `month`/`year` and derives every cell's status.
pub fn build_calendar(
    month: u32,
    year: i32,
    joining: NaiveDate,
    today: NaiveDate,
    records: Vec<LeaveRecord>,
) -> Result<MonthlyCalendar, CalendarError> {
    let (first, _) = dates::month_bounds(month, year).ok_or_else(|| {
        CalendarError::InvalidInput(format!("no such month: {year}-{month}"))
    })?;
    let month_name = dates::month_name(month).unwrap_or_default().to_string();

    // last record for a day wins
    let mut leaves: HashMap<String, LeaveRecord> = HashMap::with_capacity(records.len());
    for record in records {
        leaves.insert(date_key(record.leave_date), record);
    }

    let lead = i64::from(first.weekday().num_days_from_sunday());
    let grid_start = first - Duration::days(lead);

    let cells = grid_start
        .iter_days()
        .take(CALENDAR_CELLS)
        .map(|date| {
            let is_current_month = date.month() == month && date.year() == year;
            let leave = leaves.get(&date_key(date)).cloned();
            let status = derive_status(date, joining, today, leave.as_ref());

            CalendarCell {
                date,
                day: date.day(),
                month: date.month(),
                year: date.year(),
                is_clickable: status == DayStatus::Future && is_current_month,
                is_today: date == today,
                is_current_month,
                status,
                leave,
            }
        })
        .collect();

    Ok(MonthlyCalendar {
        month,
        year,
        month_name,
        evaluated_on: today,
        cells,
    })
}

/// First match wins: before joining, leave status, future, present.
pub fn derive_status(
    date: NaiveDate,
    joining: NaiveDate,
    today: NaiveDate,
    leave: Option<&LeaveRecord>,
) -> DayStatus {
    if date < joining {
        return DayStatus::BeforeJoining;
    }
    if let Some(leave) = leave {
        return leave.status.into();
    }
    if date > today {
        return DayStatus::Future;
    }
    DayStatus::Present
}
