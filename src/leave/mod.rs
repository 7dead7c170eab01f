//! Where leave records come from.

pub mod client;
pub mod repository;
pub mod token;

use std::future::Future;

use chrono::NaiveDate;

use crate::error::LeaveFetchError;
use crate::model::leave_record::LeaveRecord;

pub use client::HttpLeaveClient;
pub use repository::MySqlLeaveRepository;

/// Read-only access to a user's leave records over an inclusive date range.
pub trait LeaveSource {
    fn fetch_leaves(
        &self,
        user_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<LeaveRecord>, LeaveFetchError>> + Send;
}

/// The leave source selected by `LEAVE_SOURCE` at startup.
#[derive(Clone)]
pub enum LeaveBackend {
    Database(MySqlLeaveRepository),
    Remote(HttpLeaveClient),
}

impl LeaveSource for LeaveBackend {
    async fn fetch_leaves(
        &self,
        user_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveFetchError> {
        match self {
            LeaveBackend::Database(repo) => repo.fetch_leaves(user_id, date_from, date_to).await,
            LeaveBackend::Remote(client) => client.fetch_leaves(user_id, date_from, date_to).await,
        }
    }
}
