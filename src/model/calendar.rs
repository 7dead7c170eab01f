use chrono::NaiveDate;
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::model::leave_record::{LeaveRecord, LeaveStatus};

/// Derived status of a single calendar day.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayStatus {
    Present,
    /// Never derived for a cell today; still counted by the summary.
    Absent,
    LeavePending,
    LeaveApproved,
    LeaveRejected,
    Future,
    BeforeJoining,
}

impl From<LeaveStatus> for DayStatus {
    fn from(status: LeaveStatus) -> Self {
        match status {
            LeaveStatus::Pending => DayStatus::LeavePending,
            LeaveStatus::Approved => DayStatus::LeaveApproved,
            LeaveStatus::Rejected => DayStatus::LeaveRejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarCell {
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = 15)]
    pub day: u32,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    pub status: DayStatus,
    /// The leave record governing this day, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave: Option<LeaveRecord>,
    pub is_current_month: bool,
    pub is_today: bool,
    /// Future, current-month days without a leave can start a new request.
    pub is_clickable: bool,
}

/// Six Sunday-first weeks around the requested month.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyCalendar {
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = "January")]
    pub month_name: String,
    /// Local day the statuses were derived against.
    #[schema(example = "2024-01-25", format = "date", value_type = String)]
    pub evaluated_on: NaiveDate,
    pub cells: Vec<CalendarCell>,
}

impl MonthlyCalendar {
    pub fn current_month_cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.cells.iter().filter(|cell| cell.is_current_month)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = 16)]
    pub total_working_days: u32,
    #[schema(example = 14)]
    pub present_days: u32,
    /// Absences including approved leave days
    #[schema(example = 1)]
    pub absent_days: u32,
    #[schema(example = 1)]
    pub leaves_approved: u32,
    #[schema(example = 1)]
    pub leaves_pending: u32,
    #[schema(example = 0)]
    pub leaves_rejected: u32,
    #[schema(example = 88)]
    pub attendance_percentage: u32,
}
