//! Shared HTTP client for the crmkit pipelines.
//!
//! Provides a minimal reqwest wrapper with explicit bearer auth and helpers for
//! JSON, multipart and raw PUT requests. Helpers that return [`RawResponse`]
//! keep the status and body untouched so each pipeline can map failures onto
//! its own error variants.

use bytes::Bytes;
use crmkit_core::{Credential, PipelineConfig};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Failure of a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to build request: {0}")]
    Build(String),

    #[error("Failed to send request: {0}")]
    Transport(String),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response as JSON: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the server put in its error body, if any.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::Status { body, .. } => server_message(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Build(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Status and body of a response, whatever the status.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Extract a human-readable message from a JSON error body.
///
/// Understands `{ "message": ".." }`, `{ "error": { "message": ".." } }` and
/// `{ "error": ".." }`.
pub fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
        })
        .or_else(|| value.get("error").and_then(|e| e.as_str()))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Join a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// HTTP client shared by the upload and import pipelines.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Build(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ApiError> {
        Self::new(Duration::from_secs(config.http_timeout_secs))
    }

    fn apply_auth(
        request: reqwest::RequestBuilder,
        credential: Option<&Credential>,
    ) -> reqwest::RequestBuilder {
        match credential {
            Some(credential) => request.header(AUTHORIZATION, credential.header_value()),
            None => request,
        }
    }

    async fn send(
        &self,
        method: &'static str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<RawResponse, ApiError> {
        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::debug!(method, url, error = %e, "HTTP request failed before a response");
            ApiError::from(e)
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(
            method,
            url,
            status = status.as_u16(),
            body_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "HTTP request completed"
        );

        Ok(RawResponse { status, body })
    }

    /// POST a JSON body and deserialize a JSON response. Non-2xx is an error.
    pub async fn post_json<T, B>(
        &self,
        url: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = Self::apply_auth(self.client.post(url).json(body), credential);
        let response = self.send("POST", url, request).await?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status.as_u16(),
                body: response.text(),
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a JSON body, ignoring any response body. Non-2xx is an error.
    pub async fn post_json_unit<B>(
        &self,
        url: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = Self::apply_auth(self.client.post(url).json(body), credential);
        let response = self.send("POST", url, request).await?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status.as_u16(),
                body: response.text(),
            });
        }

        Ok(())
    }

    /// POST a multipart form. The response is returned whatever its status.
    pub async fn post_multipart(
        &self,
        url: &str,
        form: reqwest::multipart::Form,
    ) -> Result<RawResponse, ApiError> {
        let request = self.client.post(url).multipart(form);
        self.send("POST", url, request).await
    }

    /// PUT a raw body with an explicit length. The response is returned whatever its status.
    pub async fn put_body(
        &self,
        url: &str,
        body: reqwest::Body,
        content_type: &str,
        content_length: u64,
    ) -> Result<RawResponse, ApiError> {
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, content_length)
            .body(body);
        self.send("PUT", url, request).await
    }
}
