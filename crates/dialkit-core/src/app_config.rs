/// Application configuration resolved from the environment.
///
/// Built by [`crate::config::load_app_config`]; every consumer receives this
/// struct rather than reading env vars itself.
#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the backend API, e.g. `https://api.example.com`.
    pub api_base_url: String,
    /// Bearer token for authenticated endpoints. Absent in anonymous/dev use.
    pub api_key: Option<String>,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable HTTP errors.
    pub max_retries: u32,
    /// Base delay in seconds for exponential retry backoff.
    pub retry_backoff_base_secs: u64,
    /// Automation polling cadence.
    pub poll_interval_ms: u64,
    /// Upper bound on the polling backoff applied after consecutive fetch
    /// failures.
    pub poll_backoff_cap_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_backoff_cap_secs", &self.poll_backoff_cap_secs)
            .finish()
    }
}
