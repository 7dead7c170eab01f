use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::model::calendar::DayStatus;

pub const UNKNOWN_COLOR: &str = "gray";
pub const UNKNOWN_TEXT: &str = "Unknown";

pub fn status_color(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Present => "green",
        DayStatus::Absent => "red",
        DayStatus::LeavePending => "yellow",
        DayStatus::LeaveApproved => "blue",
        DayStatus::LeaveRejected => "orange",
        DayStatus::Future => "slate",
        DayStatus::BeforeJoining => "zinc",
    }
}

pub fn status_text(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Present => "Present",
        DayStatus::Absent => "Absent",
        DayStatus::LeavePending => "Leave Pending",
        DayStatus::LeaveApproved => "Leave Approved",
        DayStatus::LeaveRejected => "Leave Rejected",
        DayStatus::Future => "Upcoming",
        DayStatus::BeforeJoining => "Before Joining",
    }
}

/// One legend row for the calendar UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusDisplay {
    #[schema(example = "leave_pending")]
    pub status: String,
    #[schema(example = "yellow")]
    pub color: String,
    #[schema(example = "Leave Pending")]
    pub label: String,
}

impl From<DayStatus> for StatusDisplay {
    fn from(status: DayStatus) -> Self {
        StatusDisplay {
            status: status.to_string(),
            color: status_color(status).to_string(),
            label: status_text(status).to_string(),
        }
    }
}

/// Resolves a raw status string, falling back to a neutral entry for values
/// this service does not know.
pub fn display_for(raw: &str) -> StatusDisplay {
    match raw.trim().parse::<DayStatus>() {
        Ok(status) => status.into(),
        Err(_) => StatusDisplay {
            status: raw.to_string(),
            color: UNKNOWN_COLOR.to_string(),
            label: UNKNOWN_TEXT.to_string(),
        },
    }
}

pub fn status_legend() -> Vec<StatusDisplay> {
    DayStatus::iter().map(StatusDisplay::from).collect()
}
