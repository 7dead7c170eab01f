use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::calendar::dates::date_key;
use crate::error::LeaveFetchError;
use crate::leave::LeaveSource;
use crate::leave::token::{TokenManager, Tokens};
use crate::model::leave_record::LeaveRecord;

const BACKOFF_BASE_MS: u64 = 200;
const BACKOFF_MAX_MS: u64 = 10_000;

/// Response envelope shared by the leave API endpoints.
#[derive(Debug, Deserialize)]
struct LeaveEnvelope {
    success: bool,
    #[serde(default)]
    data: Vec<LeaveRecord>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// REST client for the external leave service.
#[derive(Clone)]
pub struct HttpLeaveClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    tokens: Arc<TokenManager>,
}

impl HttpLeaveClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
        tokens: TokenManager,
    ) -> Result<Self, LeaveFetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeaveFetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            tokens: Arc::new(tokens),
        })
    }

    async fn request_refresh(&self, refresh_token: String) -> Result<Tokens, LeaveFetchError> {
        let url = format!("{}/auth/refresh", self.base_url);
        debug!("Refreshing leave API access token");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Leave API token refresh rejected");
            return Err(LeaveFetchError::Unauthorized);
        }

        let body: RefreshResponse = response.json().await?;
        info!("Leave API access token refreshed");

        Ok(Tokens {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
        })
    }

    async fn backoff(&self, attempt: u32) {
        tokio::time::sleep(backoff_delay(attempt)).await;
    }
}

impl LeaveSource for HttpLeaveClient {
    #[instrument(name = "leave_api_fetch", skip(self), fields(user_id = %user_id))]
    async fn fetch_leaves(
        &self,
        user_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveFetchError> {
        let url = format!("{}/leave-requests", self.base_url);
        let date_from = date_key(date_from);
        let date_to = date_key(date_to);
        let query = [
            ("userId", user_id),
            ("dateFrom", date_from.as_str()),
            ("dateTo", date_to.as_str()),
        ];

        let mut attempt = 0;
        let mut refreshed = false;

        loop {
            let token = self.tokens.access_token();
            let request_id = Uuid::new_v4().to_string();

            let mut request = self
                .client
                .get(&url)
                .query(&query)
                .header("X-Request-Id", &request_id);
            if let Some(token) = &token {
                request = request.bearer_auth(token);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries => {
                    warn!(error = %e, attempt, %request_id, "Leave API unreachable, retrying");
                    self.backoff(attempt).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                if refreshed {
                    return Err(LeaveFetchError::Unauthorized);
                }
                self.tokens
                    .refresh(token.as_deref(), |rt| self.request_refresh(rt))
                    .await?;
                refreshed = true;
                continue;
            }

            if status.is_server_error() && attempt < self.max_retries {
                warn!(%status, attempt, %request_id, "Leave API server error, retrying");
                self.backoff(attempt).await;
                attempt += 1;
                continue;
            }

            let body = response.text().await?;
            let records = read_envelope(status, &body, user_id)?;
            debug!(count = records.len(), %request_id, "Leave records received");
            return Ok(records);
        }
    }
}

/// Exponential delay before retry `attempt`, capped at `BACKOFF_MAX_MS`.
fn backoff_delay(attempt: u32) -> Duration {
    let millis = BACKOFF_BASE_MS
        .saturating_mul(2u64.saturating_pow(attempt))
        .min(BACKOFF_MAX_MS);
    Duration::from_millis(millis)
}

fn read_envelope(
    status: StatusCode,
    body: &str,
    user_id: &str,
) -> Result<Vec<LeaveRecord>, LeaveFetchError> {
    let envelope = serde_json::from_str::<LeaveEnvelope>(body);

    if !status.is_success() {
        let message = envelope
            .ok()
            .and_then(|env| env.message.or(env.error))
            .unwrap_or_else(|| body.trim().to_string());
        return Err(LeaveFetchError::Api(format!("{status}: {message}")));
    }

    let envelope = envelope.map_err(|e| LeaveFetchError::Decode(e.to_string()))?;

    if !envelope.success {
        let message = envelope
            .message
            .or(envelope.error)
            .unwrap_or_else(|| "request failed".to_string());
        return Err(LeaveFetchError::Api(message));
    }

    Ok(envelope
        .data
        .into_iter()
        .map(|mut record| {
            if record.owner_id.is_empty() {
                record.owner_id = user_id.to_string();
            }
            record
        })
        .collect())
}
