//! Scoring service client.
//!
//! The [`ScoreService`] trait is the network seam: the batch fetcher only
//! talks to the trait, and [`HttpScoreService`] implements it over HTTP.

use crate::error::FetchError;
use crate::models::ScoreRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Score lookup for a single handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserScore {
    pub handle: String,
    /// `None` when the service does not know the handle.
    pub score: Option<f64>,
    pub recent_active_date: Option<String>,
}

/// A source of participant scores.
#[async_trait]
pub trait ScoreService: Send + Sync {
    /// Look up scores for one batch of handles.
    async fn fetch_batch(&self, handles: &[String]) -> Result<Vec<ScoreRecord>, FetchError>;

    /// Look up a single handle.
    async fn fetch_user(&self, handle: &str) -> Result<UserScore, FetchError>;
}

#[derive(Debug, Serialize)]
struct ScoresRequest<'a> {
    usernames: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ScoresResponse {
    scores: Vec<WireScore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireScore {
    username: String,
    custom_score: Option<Value>,
    user_not_found: Option<bool>,
    is_active: Option<bool>,
    recent_active_date: Option<String>,
}

impl From<WireScore> for ScoreRecord {
    fn from(wire: WireScore) -> Self {
        let score = wire.custom_score.as_ref().and_then(Value::as_f64);
        match score {
            Some(score) if !wire.user_not_found.unwrap_or(false) => ScoreRecord {
                active: wire.is_active,
                last_active_date: wire.recent_active_date,
                ..ScoreRecord::found(wire.username, score)
            },
            _ => ScoreRecord::not_found(wire.username),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    custom_score: Value,
    recent_active_date: Option<String>,
}

/// Parse a batch response body into score records.
///
/// Anything other than `{"scores": [...]}` with a `username` on every
/// element is a malformed payload.
pub fn parse_scores_payload(body: &str) -> Result<Vec<ScoreRecord>, FetchError> {
    let response: ScoresResponse =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

    Ok(response.scores.into_iter().map(ScoreRecord::from).collect())
}

/// Parse a single-user response body.
pub fn parse_user_payload(handle: &str, body: &str) -> Result<UserScore, FetchError> {
    let response: UserResponse =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

    Ok(UserScore {
        handle: handle.to_string(),
        score: response.custom_score.as_f64(),
        recent_active_date: response.recent_active_date,
    })
}

/// HTTP implementation of [`ScoreService`].
pub struct HttpScoreService {
    base_url: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl HttpScoreService {
    /// Create a client for the service rooted at `base_url`.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            http_client,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_seconds)
        } else if e.is_connect() {
            FetchError::Connect(self.base_url.clone())
        } else {
            FetchError::Transport(e.to_string())
        }
    }

    /// URL of the single-user endpoint, with `handle` as one encoded path segment.
    fn user_url(&self, handle: &str) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| FetchError::Transport(format!("invalid service URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("invalid service URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "user", handle]);
        Ok(url)
    }

    /// Read the body of a response, turning non-2xx statuses into errors.
    async fn read_body(&self, response: reqwest::Response) -> Result<String, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| self.map_send_error(e))
    }
}

#[async_trait]
impl ScoreService for HttpScoreService {
    async fn fetch_batch(&self, handles: &[String]) -> Result<Vec<ScoreRecord>, FetchError> {
        let url = format!("{}/api/users/scores", self.base_url);
        debug!("POST {} with {} handles", url, handles.len());

        let response = self
            .http_client
            .post(&url)
            .json(&ScoresRequest { usernames: handles })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let body = self.read_body(response).await?;
        parse_scores_payload(&body)
    }

    async fn fetch_user(&self, handle: &str) -> Result<UserScore, FetchError> {
        let url = self.user_url(handle)?;
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let body = self.read_body(response).await?;
        parse_user_payload(handle, &body)
    }
}
