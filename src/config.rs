use std::time::Duration;

use crate::errors::{ConsoleError, ConsoleResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the admin backend gateway, read from the
/// environment (`.env` supported via [`load_env`]).
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the admin API, e.g. `https://api.example.com/admin`.
    pub api_base_url: String,
    /// Bearer token attached to every request when present.
    pub api_token: Option<String>,
    /// Transport-level timeout; the subsystem itself imposes none.
    pub request_timeout: Duration,
}

impl ConsoleConfig {
    pub fn from_env() -> ConsoleResult<Self> {
        let api_base_url = std::env::var("ADMIN_API_URL")
            .map_err(|_| ConsoleError::configuration("ADMIN_API_URL not set"))?;

        let api_token = std::env::var("ADMIN_API_TOKEN").ok().filter(|t| !t.is_empty());

        let request_timeout = match std::env::var("ADMIN_API_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    ConsoleError::configuration(format!(
                        "ADMIN_API_TIMEOUT_SECS is not a number: {raw}"
                    ))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_token,
            request_timeout,
        })
    }

    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Load `.env` from CWD; when the binary runs from elsewhere (e.g. a
/// container) fall back to the crate-local `.env`.
pub fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}
