use crate::api::attendance::{CalendarQuery, CalendarResponse};
use crate::calendar::display::StatusDisplay;
use crate::model::calendar::{AttendanceSummary, CalendarCell, DayStatus, MonthlyCalendar};
use crate::model::leave_record::{LeaveDocument, LeaveRecord, LeaveStatus};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance calendar

Derives an employee's monthly attendance calendar from their leave records.

### 🔹 Key Features
- **Monthly calendar**
  - Six Sunday-first weeks, each day tagged present, leave, upcoming or before joining
- **Attendance summary**
  - Working days, presence, absences (approved leave included) and percentage
- **Status legend**
  - Color and label for every calendar status

### 🔐 Security
All endpoints require a **JWT Bearer** access token. Employees can only read
their own attendance; **HR** and **Admin** can read anyone's.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::monthly_calendar,
        crate::api::attendance::monthly_summary,
        crate::api::attendance::status_legend,
    ),
    components(
        schemas(
            CalendarQuery,
            CalendarResponse,
            MonthlyCalendar,
            CalendarCell,
            DayStatus,
            AttendanceSummary,
            LeaveRecord,
            LeaveStatus,
            LeaveDocument,
            StatusDisplay
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Attendance", description = "Attendance calendar APIs"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_attendance_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/attendance/calendar"));
        assert!(doc.paths.paths.contains_key("/api/attendance/summary"));
        assert!(doc.paths.paths.contains_key("/api/attendance/statuses"));

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("MonthlyCalendar"));
    }
}
