use anyhow::Context;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::converters::convert_history_value;
use crate::error::{ApiError, ErrorCode, ErrorType, Surface};
use crate::models::ui::UiMessage;

/// Error body returned by the chat API and the agent service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    cause: Option<Value>,
}

/// HTTP client for the agent service history endpoint.
///
/// One request per call, no retries.
pub struct HistoryClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Full URL of the history endpoint
    history_endpoint: String,
}

impl HistoryClient {
    /// Create a new HTTP client
    pub fn new(
        history_endpoint: impl Into<String>,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            history_endpoint: history_endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.history_endpoint(),
            config.http_connect_timeout,
            config.http_request_timeout,
        )
    }

    pub fn history_endpoint(&self) -> &str {
        &self.history_endpoint
    }

    /// Fetch the raw history body
    pub async fn fetch_history(&self, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.fetch_json(&self.history_endpoint, query, Surface::History)
            .await
    }

    /// Fetch history and convert it into UI messages
    pub async fn fetch_ui_messages(
        &self,
        query: &[(String, String)],
    ) -> Result<Vec<UiMessage>, ApiError> {
        let body = self.fetch_history(query).await?;
        Ok(convert_history_value(&body))
    }

    /// GET `url` and decode the JSON body.
    ///
    /// Non-2xx responses become [`ApiError::ChatError`] built from the
    /// `{code, cause}` body; `surface` is used when the body carries no valid code.
    pub async fn fetch_json<T>(
        &self,
        url: &str,
        query: &[(String, String)],
        surface: Surface,
    ) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url = %url, params = query.len(), "Sending HTTP request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, url))?;

        let status = response.status();
        tracing::debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            return Err(error_from_response(response, surface).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid JSON from {}: {}", url, e)))
    }
}

fn classify_transport_error(e: reqwest::Error, url: &str) -> ApiError {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else {
        "unknown"
    };

    tracing::warn!(
        error_kind = error_kind,
        error = %e,
        url = %url,
        "HTTP request error"
    );

    if e.is_connect() || e.is_timeout() {
        ApiError::Offline
    } else {
        ApiError::Internal(anyhow::anyhow!(
            "HTTP request failed: {} (kind: {})",
            e,
            error_kind
        ))
    }
}

async fn error_from_response(response: Response, surface: Surface) -> ApiError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    tracing::warn!(
        status = status,
        response_body = %text,
        "HTTP request failed with error response"
    );

    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();

    let code = body
        .as_ref()
        .and_then(|b| b.code.as_deref())
        .and_then(|c| c.parse::<ErrorCode>().ok())
        .unwrap_or_else(|| ErrorCode::new(ErrorType::from_status(status), surface));

    let cause = match body.and_then(|b| b.cause) {
        Some(Value::String(cause)) => Some(cause),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    ApiError::ChatError { code, cause }
}
