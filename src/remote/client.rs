use super::http_client::{DEFAULT_TIMEOUT_SECS, build_client_with_timeout};
use super::types::{AckOutcome, PollResponse, UserInfo};
use crate::config::Config;
use crate::error::ApiError;
use crate::reminders::AcknowledgmentRequest;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Acknowledgments always get this long, whatever `poll.timeout_secs` says.
pub const ACK_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

/// Client for the kHealth HA API. All calls carry the bearer token. Reads use
/// the configured per-request timeout; acknowledgments use [`ACK_TIMEOUT_SECS`].
#[derive(Clone)]
pub struct KhealthClient {
    base_url: String,
    api_token: String,
    client: Client,
}

impl KhealthClient {
    pub fn new(base_url: &str, api_token: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            client: build_client_with_timeout(timeout_secs),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url(), &config.api_token, config.poll.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    /// `GET /api/v1/ha/poll`
    pub async fn poll(&self) -> Result<PollResponse, ApiError> {
        let response = self
            .client
            .get(self.url("ha/poll"))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let response = expect_ok(response)?;
        Ok(response.json::<PollResponse>().await?)
    }

    /// `GET /api/v1/me`
    pub async fn me(&self) -> Result<UserInfo, ApiError> {
        let response = self
            .client
            .get(self.url("me"))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let response = expect_ok(response)?;
        Ok(response.json::<UserInfo>().await?)
    }

    /// `POST /api/v1/ha/acknowledge`
    ///
    /// 409 means another surface already acknowledged the reminder and is
    /// reported as a conclusive outcome, not an error. The response body is
    /// ignored beyond the status.
    pub async fn acknowledge(
        &self,
        request: &AcknowledgmentRequest,
    ) -> Result<AckOutcome, ApiError> {
        let response = self
            .client
            .post(self.url("ha/acknowledge"))
            .bearer_auth(&self.api_token)
            .timeout(Duration::from_secs(ACK_TIMEOUT_SECS))
            .json(request)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(AckOutcome::Recorded),
            StatusCode::CONFLICT => Ok(AckOutcome::AlreadyAcknowledged),
            other => Err(status_error(other)),
        }
    }
}

fn status_error(status: StatusCode) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        other => ApiError::UnexpectedStatus(other.as_u16()),
    }
}

fn expect_ok(response: Response) -> Result<Response, ApiError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        other => Err(status_error(other)),
    }
}
