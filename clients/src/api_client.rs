//! Shared HTTP plumbing for every adapter.
//!
//! [`ApiClient`] owns the `reqwest` connection pool, the API base URL and the
//! credential capability. Adapters build requests with [`ApiClient::request`]
//! and finish them with [`ApiClient::send`] or [`ApiClient::send_json`], which
//! attach the bearer token and turn non-success statuses into
//! [`ClientError::Status`].

use crate::credentials::CredentialProvider;
use crate::error::ClientError;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    /// Builds a client rooted at `base_url` (e.g. `https://host/api`).
    ///
    /// `timeout` caps every request unless the request overrides it.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Builds a client from `API_BASE_URL` and `REQUEST_TIMEOUT_SECS`.
    pub fn from_config(credentials: Arc<dyn CredentialProvider>) -> Result<Self, ClientError> {
        Self::new(
            common::config::api_base_url(),
            credentials,
            Duration::from_secs(common::config::request_timeout_secs()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `score/bulk`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Authorizes and sends `builder`, failing on any non-2xx status.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let token = self.credentials.credential().await?;
        let response = builder.bearer_auth(token).send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// [`ApiClient::send`] followed by decoding the JSON body as `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Extracts the server's message from an error response.
///
/// The API reports failures as `{"error": "..."}` or `{"message": "..."}`;
/// anything else falls back to `HTTP <code>`.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));

    warn!(status, url = %url, error = %message, "API request failed");
    ClientError::Status { status, message }
}
