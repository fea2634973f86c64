use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

pub mod http;
pub mod paging;

pub use http::HttpConfig;
pub use paging::PagingSettings;

/// Reads an environment variable, falling back to `default` when it is unset
/// or does not parse
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Ignoring invalid value for {}: {}", key, value);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ForumSettings {
    pub http: HttpConfig,
    pub paging: PagingSettings,
}
