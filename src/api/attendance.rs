use crate::auth::auth::AuthUser;
use crate::calendar::display::{self, StatusDisplay};
use crate::calendar::{calculate_attendance_summary, generate_monthly_calendar};
use crate::leave::LeaveBackend;
use crate::model::calendar::{AttendanceSummary, MonthlyCalendar};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    /// Employee whose attendance is requested
    #[schema(example = "1000")]
    pub user_id: String,
    /// Month number, 1 = January
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    /// Employment start date, `YYYY-MM-DD` or an ISO timestamp
    #[schema(example = "2024-01-10")]
    pub joining_date: String,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarResponse {
    pub calendar: MonthlyCalendar,
    pub summary: AttendanceSummary,
}

#[derive(Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Resolve a single raw status value
    pub status: Option<String>,
}

async fn build_month(
    auth: &AuthUser,
    source: &LeaveBackend,
    query: &CalendarQuery,
) -> actix_web::Result<MonthlyCalendar> {
    let user_id = query.user_id.trim();
    auth.require_attendance_access(user_id)?;

    let calendar = generate_monthly_calendar(
        source,
        user_id,
        query.month,
        query.year,
        &query.joining_date,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id, "Calendar generation failed");
        e
    })?;

    Ok(calendar)
}

/// Monthly attendance calendar with its summary
#[utoipa::path(
    get,
    path = "/api/attendance/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "42-day calendar and monthly summary", body = CalendarResponse),
        (status = 400, description = "Invalid month, year or joining date", body = Object, example = json!({
            "message": "month must be between 1 and 12, got 13"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 502, description = "Leave service failure", body = Object, example = json!({
            "message": "leave service unreachable: connection refused"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_calendar", skip(auth, source), fields(requested_by = auth.user_id, username = %auth.username))]
pub async fn monthly_calendar(
    auth: AuthUser,
    source: web::Data<LeaveBackend>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    let calendar = build_month(&auth, source.get_ref(), &query).await?;
    let summary = calculate_attendance_summary(&calendar);

    info!(
        present = summary.present_days,
        working = summary.total_working_days,
        "Calendar served"
    );

    Ok(HttpResponse::Ok().json(CalendarResponse { calendar, summary }))
}

/// Monthly attendance summary only
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Monthly attendance summary", body = AttendanceSummary),
        (status = 400, description = "Invalid month, year or joining date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 502, description = "Leave service failure")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_summary", skip(auth, source), fields(requested_by = auth.user_id, username = %auth.username))]
pub async fn monthly_summary(
    auth: AuthUser,
    source: web::Data<LeaveBackend>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    let calendar = build_month(&auth, source.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(calculate_attendance_summary(&calendar)))
}

/// Color and label for calendar statuses
#[utoipa::path(
    get,
    path = "/api/attendance/statuses",
    params(StatusQuery),
    responses(
        (status = 200, description = "Status legend, or a single entry when `status` is given", body = [StatusDisplay]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn status_legend(query: web::Query<StatusQuery>) -> impl Responder {
    match query.status.as_deref() {
        Some(raw) => HttpResponse::Ok().json(display::display_for(raw)),
        None => HttpResponse::Ok().json(display::status_legend()),
    }
}
