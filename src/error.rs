use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failure of the leave-data dependency. Surfaced to callers unmodified.
#[derive(Debug, Display)]
pub enum LeaveFetchError {
    #[display(fmt = "leave service unreachable: {}", _0)]
    Transport(String),
    #[display(fmt = "leave service rejected our credentials")]
    Unauthorized,
    #[display(fmt = "leave service error: {}", _0)]
    Api(String),
    #[display(fmt = "unexpected leave payload: {}", _0)]
    Decode(String),
    #[display(fmt = "leave query failed: {}", _0)]
    Database(String),
}

impl std::error::Error for LeaveFetchError {}

impl From<reqwest::Error> for LeaveFetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LeaveFetchError::Decode(e.to_string())
        } else {
            LeaveFetchError::Transport(e.to_string())
        }
    }
}

impl From<sqlx::Error> for LeaveFetchError {
    fn from(e: sqlx::Error) -> Self {
        LeaveFetchError::Database(e.to_string())
    }
}

#[derive(Debug, Display)]
pub enum CalendarError {
    #[display(fmt = "{}", _0)]
    InvalidInput(String),
    #[display(fmt = "{}", _0)]
    LeaveFetch(LeaveFetchError),
}

impl std::error::Error for CalendarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalendarError::LeaveFetch(e) => Some(e),
            CalendarError::InvalidInput(_) => None,
        }
    }
}

impl From<LeaveFetchError> for CalendarError {
    fn from(e: LeaveFetchError) -> Self {
        CalendarError::LeaveFetch(e)
    }
}

impl ResponseError for CalendarError {
    fn status_code(&self) -> StatusCode {
        match self {
            CalendarError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CalendarError::LeaveFetch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_http_status() {
        assert_eq!(
            CalendarError::InvalidInput("month must be 1-12".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CalendarError::from(LeaveFetchError::Unauthorized).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn fetch_failure_message_passes_through() {
        let err = CalendarError::from(LeaveFetchError::Api("Employee not found".into()));
        assert_eq!(err.to_string(), "leave service error: Employee not found");
    }
}
