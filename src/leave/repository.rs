use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, instrument};

use crate::error::LeaveFetchError;
use crate::leave::LeaveSource;
use crate::model::leave_record::{LeaveDocument, LeaveRecord, LeaveStatus};

/// Reads leaves from the HR database.
///
/// Expects `leave_records(id, employee_id, leave_date, status, reason)` and
/// `leave_documents(leave_id, title, url, position)`.
#[derive(Clone)]
pub struct MySqlLeaveRepository {
    pool: MySqlPool,
}

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    leave_date: NaiveDate,
    status: String,
    reason: Option<String>,
}

#[derive(FromRow)]
struct DocumentRow {
    leave_id: String,
    title: String,
    url: String,
}

impl MySqlLeaveRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn documents_for(
        &self,
        leave_ids: &[String],
    ) -> Result<HashMap<String, Vec<LeaveDocument>>, LeaveFetchError> {
        if leave_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; leave_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT CAST(leave_id AS CHAR) AS leave_id, title, url
            FROM leave_documents
            WHERE leave_id IN ({})
            ORDER BY leave_id, position
            "#,
            placeholders
        );

        let mut q = sqlx::query_as::<_, DocumentRow>(&sql);
        for id in leave_ids {
            q = q.bind(id.as_str());
        }

        Ok(group_documents(q.fetch_all(&self.pool).await?))
    }
}

/// Groups document rows by leave id, keeping the row order within each leave.
fn group_documents(rows: Vec<DocumentRow>) -> HashMap<String, Vec<LeaveDocument>> {
    let mut by_leave: HashMap<String, Vec<LeaveDocument>> = HashMap::new();
    for row in rows {
        by_leave.entry(row.leave_id).or_default().push(LeaveDocument {
            title: row.title,
            url: row.url,
        });
    }
    by_leave
}

fn assemble_records(
    rows: Vec<LeaveRow>,
    mut documents: HashMap<String, Vec<LeaveDocument>>,
) -> Result<Vec<LeaveRecord>, LeaveFetchError> {
    rows.into_iter()
        .map(|row| {
            let status = row.status.parse::<LeaveStatus>().map_err(|_| {
                LeaveFetchError::Decode(format!(
                    "leave {} has unknown status '{}'",
                    row.id, row.status
                ))
            })?;

            Ok(LeaveRecord {
                documents: documents.remove(&row.id).unwrap_or_default(),
                id: row.id,
                owner_id: row.employee_id,
                leave_date: row.leave_date,
                status,
                reason: row.reason.unwrap_or_default(),
            })
        })
        .collect()
}

impl LeaveSource for MySqlLeaveRepository {
    #[instrument(name = "leave_db_fetch", skip(self), fields(user_id = %user_id))]
    async fn fetch_leaves(
        &self,
        user_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveFetchError> {
        let rows = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT
                CAST(id AS CHAR) AS id,
                CAST(employee_id AS CHAR) AS employee_id,
                leave_date,
                status,
                reason
            FROM leave_records
            WHERE employee_id = ?
            AND leave_date BETWEEN ? AND ?
            ORDER BY leave_date, id
            "#,
        )
        .bind(user_id)
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch leave records");
            LeaveFetchError::from(e)
        })?;

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let documents = self.documents_for(&ids).await?;

        debug!(count = rows.len(), "Leave records loaded");

        assemble_records(rows, documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leave_row(id: &str, day: u32, status: &str, reason: Option<&str>) -> LeaveRow {
        LeaveRow {
            id: id.into(),
            employee_id: "1000".into(),
            leave_date: ymd(2024, 1, day),
            status: status.into(),
            reason: reason.map(Into::into),
        }
    }

    fn doc_row(leave_id: &str, title: &str) -> DocumentRow {
        DocumentRow {
            leave_id: leave_id.into(),
            title: title.into(),
            url: format!("https://files.example.com/{title}"),
        }
    }

    #[test]
    fn documents_attach_to_their_leave_in_position_order() {
        let documents = group_documents(vec![
            doc_row("7", "ticket.pdf"),
            doc_row("7", "hotel.pdf"),
            doc_row("9", "note.png"),
        ]);

        let records = assemble_records(
            vec![
                leave_row("7", 15, "approved", Some("Trip")),
                leave_row("8", 16, "rejected", Some("Errand")),
                leave_row("9", 20, "pending", Some("Doctor")),
            ],
            documents,
        )
        .unwrap();

        assert_eq!(records.len(), 3);
        let titles: Vec<_> = records[0].documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, ["ticket.pdf", "hotel.pdf"]);
        assert!(records[1].documents.is_empty());
        assert_eq!(records[2].documents.len(), 1);
        assert_eq!(records[2].documents[0].url, "https://files.example.com/note.png");

        assert_eq!(records[0].owner_id, "1000");
        assert_eq!(records[0].leave_date, ymd(2024, 1, 15));
        assert_eq!(records[0].status, LeaveStatus::Approved);
        assert_eq!(records[1].status, LeaveStatus::Rejected);
        assert_eq!(records[2].status, LeaveStatus::Pending);
    }

    #[test]
    fn null_reason_becomes_empty() {
        let records =
            assemble_records(vec![leave_row("1", 3, "pending", None)], HashMap::new()).unwrap();
        assert_eq!(records[0].reason, "");
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let err = assemble_records(
            vec![
                leave_row("1", 3, "approved", None),
                leave_row("2", 4, "cancelled", None),
            ],
            HashMap::new(),
        )
        .unwrap_err();

        assert!(matches!(err, LeaveFetchError::Decode(m) if m.contains("cancelled")));
    }
}
