use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::calendar::dates;

/// Review state of a leave request, as reported by the leave service.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveDocument {
    #[schema(example = "Medical certificate")]
    pub title: String,
    #[schema(example = "https://files.example.com/leave/42/certificate.pdf")]
    pub url: String,
}

/// A single-day leave request owned by the external leave service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRecord {
    #[schema(example = "42")]
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Owner of the leave. Remote payloads may omit it; the client fills it in.
    #[schema(example = "1000")]
    #[serde(default, alias = "userId", alias = "employeeId")]
    pub owner_id: String,

    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    #[serde(
        rename = "date",
        alias = "leaveDate",
        deserialize_with = "dates::deserialize_calendar_date"
    )]
    pub leave_date: NaiveDate,

    pub status: LeaveStatus,

    #[schema(example = "Family event")]
    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub documents: Vec<LeaveDocument>,
}

/// Ids arrive as strings from some leave APIs and as integers from others.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_remote_payload_with_numeric_id_and_timestamp() {
        let record: LeaveRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "userId": "emp-1",
            "leaveDate": "2024-03-05T00:00:00.000+05:30",
            "status": "approved",
            "reason": "Doctor",
            "documents": [{ "title": "note", "url": "https://x/y.pdf" }]
        }))
        .unwrap();

        assert_eq!(record.id, "7");
        assert_eq!(record.owner_id, "emp-1");
        assert_eq!(record.leave_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(record.status, LeaveStatus::Approved);
        assert_eq!(record.documents.len(), 1);
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let record: LeaveRecord = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "date": "2024-01-20",
            "status": "pending"
        }))
        .unwrap();

        assert!(record.owner_id.is_empty());
        assert!(record.reason.is_empty());
        assert!(record.documents.is_empty());
    }

    #[test]
    fn rejects_unknown_status() {
        let result = serde_json::from_value::<LeaveRecord>(serde_json::json!({
            "id": "1",
            "date": "2024-01-20",
            "status": "cancelled"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn status_parses_from_database_text() {
        assert_eq!("rejected".parse::<LeaveStatus>().unwrap(), LeaveStatus::Rejected);
        assert_eq!(LeaveStatus::Pending.to_string(), "pending");
    }
}
