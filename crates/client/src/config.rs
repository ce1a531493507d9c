use std::time::Duration;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a
/// backend on `localhost:8000`. Binaries are expected to call
/// `dotenvy::dotenv()` before [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (default: `http://localhost:8000`).
    pub api_url: String,
    /// Map-provider access token, passed through to map components.
    /// Optional: nothing in this crate consumes it directly.
    pub map_access_token: Option<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Job-status polling cadence in milliseconds (default: `2000`).
    pub poll_interval_ms: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `AGRIWATCH_API_URL`    | `http://localhost:8000` |
    /// | `MAP_ACCESS_TOKEN`     | unset                   |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `POLL_INTERVAL_MS`     | `2000`                  |
    pub fn from_env() -> Self {
        let api_url = std::env::var("AGRIWATCH_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into());

        let map_access_token = std::env::var("MAP_ACCESS_TOKEN").ok().filter(|t| !t.is_empty());

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let poll_interval_ms: u64 = std::env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("POLL_INTERVAL_MS must be a valid u64");

        Self {
            api_url,
            map_access_token,
            request_timeout_secs,
            poll_interval_ms,
        }
    }

    /// Polling cadence as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            map_access_token: None,
            request_timeout_secs: 30,
            poll_interval_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_poll_interval_is_two_seconds() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
    }
}
