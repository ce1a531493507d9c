//! HTTP request wrapper for the AgriWatch backend.
//!
//! [`ApiClient`] builds URLs from a base address, serializes query
//! parameters, sends JSON bodies, and normalizes every failure into
//! [`ApiClientError`]. On a non-2xx response the body is read and a
//! structured `{"detail": ...}` message extracted before failing, so
//! the caller always gets the backend's own wording when one exists.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::ApiClientError;

/// Structured error body produced by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP client for one AgriWatch backend.
///
/// Cheap to share: endpoint methods take `&self` and the underlying
/// `reqwest::Client` pools connections internally.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    pub(crate) cache: QueryCache,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(http, config.api_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across clients).
    pub fn with_client(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: QueryCache::new(),
        }
    }

    /// Backend base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The client's query cache.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ---- request helpers ----

    /// Absolute URL for an API path, e.g. `/farms` ->
    /// `http://host:8000/api/farms`.
    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// `GET` a JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiClientError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::parse_response(response).await
    }

    /// `GET` a JSON response with query parameters. Repeated keys are
    /// serialized as repeated parameters.
    pub(crate) async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiClientError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::parse_response(response).await
    }

    /// `POST` a JSON body, expecting a JSON response.
    pub(crate) async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::parse_response(response).await
    }

    /// `PUT` a JSON body, expecting a JSON response.
    pub(crate) async fn put_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::parse_response(response).await
    }

    /// `DELETE`, discarding any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiClientError> {
        let response = self.http.delete(self.url(path)).send().await?;
        Self::check_status(response).await
    }

    // ---- response handling ----

    /// Ensure the response has a success status. On failure, read the
    /// body and extract the backend's `detail` message, substituting a
    /// generic one when the body is missing or unparseable.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
            return Err(ApiClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert a success status, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Build a deterministic cache key from a path and its query parameters.
pub(crate) fn cache_key(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{path}?{}", params.join("&"))
}
