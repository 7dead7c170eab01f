use chrono::Datelike;

use crate::model::calendar::{AttendanceSummary, DayStatus, MonthlyCalendar};

/// Folds the requested month's cells into attendance counts.
///
/// For the month containing `evaluated_on` only days up to and including that
/// date count. Approved leaves are reported as absences.
pub fn calculate_attendance_summary(calendar: &MonthlyCalendar) -> AttendanceSummary {
    let today = calendar.evaluated_on;
    let is_running_month = calendar.month == today.month() && calendar.year == today.year();

    let mut summary = AttendanceSummary::default();

    for cell in calendar
        .current_month_cells()
        .filter(|cell| !is_running_month || cell.date <= today)
    {
        match cell.status {
            DayStatus::BeforeJoining | DayStatus::Future => continue,
            DayStatus::Present => summary.present_days += 1,
            DayStatus::Absent => summary.absent_days += 1,
            DayStatus::LeaveApproved => {
                summary.leaves_approved += 1;
                summary.absent_days += 1;
            }
            DayStatus::LeavePending => summary.leaves_pending += 1,
            DayStatus::LeaveRejected => summary.leaves_rejected += 1,
        }
        summary.total_working_days += 1;
    }

    summary.attendance_percentage = percentage(summary.present_days, summary.total_working_days);
    summary
}

fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(total) * 100.0).round() as u32
}
