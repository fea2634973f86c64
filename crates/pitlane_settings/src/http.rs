use crate::env_or;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct HttpConfig {
    pub server_uri: String,
    pub api_prefix: String,
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn new(
        server_uri: Option<String>,
        api_prefix: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let defaults = HttpConfig::default();

        HttpConfig {
            server_uri: server_uri.unwrap_or(defaults.server_uri),
            api_prefix: api_prefix.unwrap_or(defaults.api_prefix),
            timeout_secs: timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }

    /// Root every route is joined onto, e.g. `http://localhost:5000/api`
    pub fn base_path(&self) -> String {
        let server_uri = self.server_uri.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');

        if prefix.is_empty() {
            server_uri.to_string()
        } else {
            format!("{server_uri}/{prefix}")
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            server_uri: std::env::var("PITLANE_API_URI")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            api_prefix: std::env::var("PITLANE_API_PREFIX").unwrap_or_else(|_| "api".to_string()),
            timeout_secs: env_or("PITLANE_HTTP_TIMEOUT_SECS", 60),
        }
    }
}
