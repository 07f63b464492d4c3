//! HTTP client for the dialkit backend.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use dialkit_core::{AppConfig, Automation, Contact};

use crate::error::ApiError;
use crate::retry::retry_with_backoff;
use crate::types::{AutomationsResponse, ImportReceipt};

/// Client for the dialkit backend REST API.
///
/// Handles bearer-key auth, rate limiting (429), auth failures (401/403),
/// not-found (404), and other non-2xx responses as typed errors. Transient
/// errors (429, network failures, 5xx) are automatically retried with
/// exponential backoff up to the configured retry count.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl ApiClient {
    /// Creates a client pointed at the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if the configured
    /// base URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config, &config.api_base_url)
    }

    /// Creates a client with an explicit base URL (for pointing tests at a
    /// mock server).
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so join() appends to the
        // root path rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        })
    }

    /// Fetches the automation collection.
    ///
    /// # Errors
    ///
    /// - [`ApiError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ApiError::Unauthorized`] — HTTP 401/403 (not retried).
    /// - [`ApiError::NotFound`] — HTTP 404 (not retried).
    /// - [`ApiError::UnexpectedStatus`] — other non-2xx (5xx retried).
    /// - [`ApiError::Http`] — network failure after all retries exhausted.
    /// - [`ApiError::Deserialize`] — body is not the expected envelope.
    pub async fn list_automations(&self) -> Result<Vec<Automation>, ApiError> {
        let url = self.endpoint("v1/automations")?;
        let envelope: AutomationsResponse = self.request_json(Method::GET, &url, None).await?;
        Ok(envelope.automations)
    }

    /// Submits validated contacts for import and returns the server's
    /// receipt, including rejections from its deeper checks.
    ///
    /// # Errors
    ///
    /// Same classes as [`ApiClient::list_automations`].
    pub async fn submit_contacts(&self, contacts: &[Contact]) -> Result<ImportReceipt, ApiError> {
        let url = self.endpoint("v1/contacts/import")?;
        let body = serde_json::json!({ "contacts": contacts });
        self.request_json(Method::POST, &url, Some(&body)).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidBaseUrl {
            url: self.base_url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let method = method.clone();
            let url = url.clone();
            let body = body.cloned();
            async move {
                let mut request = self.client.request(method, url.clone());
                if let Some(key) = &self.api_key {
                    request = request.bearer_auth(key);
                }
                if let Some(body) = &body {
                    request = request.json(body);
                }

                let response = request.send().await?;
                let status = response.status();

                if status.is_success() {
                    let bytes = response.bytes().await?;
                    return serde_json::from_slice(&bytes).map_err(|e| ApiError::Deserialize {
                        context: url.to_string(),
                        source: e,
                    });
                }

                match status {
                    StatusCode::TOO_MANY_REQUESTS => {
                        let retry_after_secs = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(1);
                        Err(ApiError::RateLimited { retry_after_secs })
                    }
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
                    StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                        url: url.to_string(),
                    }),
                    other => Err(ApiError::UnexpectedStatus {
                        status: other.as_u16(),
                        url: url.to_string(),
                    }),
                }
            }
        })
        .await
    }
}
