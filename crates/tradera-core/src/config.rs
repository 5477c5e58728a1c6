//! Client configuration.
//!
//! Credentials and endpoint settings come from the environment (a `.env`
//! file is loaded by the binary before this runs):
//!
//! | variable | default |
//! |---|---|
//! | `TRADERA_APP_ID` | required |
//! | `TRADERA_SERVICE_KEY` | required |
//! | `TRADERA_PUBLIC_KEY` | required |
//! | `TRADERA_BASE_URL` | `https://api.tradera.com/v3` |
//! | `TRADERA_TIMEOUT` | `30` seconds |
//! | `TRADERA_SANDBOX` | `false` |
//! | `TRADERA_MAX_RESULT_AGE` | `3600` seconds |
//!
//! Session and auth info files live in `<data dir>/tradera-kit/`.

use std::fmt;
use std::path::PathBuf;

use crate::api::{ApiError, Result};

/// Application name used for data directory paths
const APP_NAME: &str = "tradera-kit";

pub const DEFAULT_BASE_URL: &str = "https://api.tradera.com/v3";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Accepted age of cached results on the restricted service, in seconds.
pub const DEFAULT_MAX_RESULT_AGE: u32 = 3600;

#[derive(Clone, PartialEq)]
pub struct Config {
    pub app_id: String,
    pub service_key: String,
    pub public_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub sandbox: bool,
    pub max_result_age: u32,
}

impl Config {
    pub fn new(
        app_id: impl Into<String>,
        service_key: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            service_key: service_key.into(),
            public_key: public_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sandbox: false,
            max_result_age: DEFAULT_MAX_RESULT_AGE,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let mut config = Self::new(
            get("TRADERA_APP_ID"),
            get("TRADERA_SERVICE_KEY"),
            get("TRADERA_PUBLIC_KEY"),
        );

        let base_url = get("TRADERA_BASE_URL");
        if !base_url.is_empty() {
            config = config.with_base_url(base_url);
        }

        let timeout = get("TRADERA_TIMEOUT");
        if !timeout.is_empty() {
            config.timeout_secs = timeout.parse().map_err(|_| {
                ApiError::Configuration(format!("TRADERA_TIMEOUT must be a number, got {:?}", timeout))
            })?;
        }

        let sandbox = get("TRADERA_SANDBOX");
        if !sandbox.is_empty() {
            config.sandbox = match sandbox.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ApiError::Configuration(format!(
                        "TRADERA_SANDBOX must be true or false, got {:?}",
                        sandbox
                    )))
                }
            };
        }

        let max_age = get("TRADERA_MAX_RESULT_AGE");
        if !max_age.is_empty() {
            config.max_result_age = max_age.parse().map_err(|_| {
                ApiError::Configuration(format!(
                    "TRADERA_MAX_RESULT_AGE must be a number, got {:?}",
                    max_age
                ))
            })?;
        }

        Ok(config)
    }

    /// Check the credential fields and return the numeric application id.
    pub fn validate(&self) -> Result<i64> {
        for (name, value) in [
            ("app_id", &self.app_id),
            ("service_key", &self.service_key),
            ("public_key", &self.public_key),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Configuration(format!(
                    "Missing required configuration field: {} (set TRADERA_{})",
                    name,
                    name.to_uppercase()
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::Configuration("Timeout must be at least 1 second".into()));
        }
        self.app_id.trim().parse::<i64>().map_err(|_| {
            ApiError::Configuration(format!("app_id must be an integer, got {:?}", self.app_id))
        })
    }

    /// Human-readable summary with secrets masked.
    pub fn summary(&self) -> String {
        let mask = |v: &str| {
            if v.is_empty() {
                "NOT SET".to_string()
            } else {
                "*".repeat(v.len().min(20))
            }
        };
        let mut lines = vec![
            format!("App ID: {}", if self.app_id.is_empty() { "NOT SET" } else { &self.app_id }),
            format!("Service Key: {}", mask(&self.service_key)),
            format!("Public Key: {}", mask(&self.public_key)),
            format!("Base URL: {}", self.base_url),
            format!("Timeout: {}s", self.timeout_secs),
            format!("Environment: {}", if self.sandbox { "sandbox" } else { "production" }),
            format!("Max result age: {}s", self.max_result_age),
        ];
        match self.validate() {
            Ok(_) => lines.push("Configuration validation passed".to_string()),
            Err(e) => lines.push(format!("Configuration validation failed: {}", e)),
        }
        lines.join("\n")
    }

    /// Directory for the session and auth info files.
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ApiError::Configuration("Could not find data directory".into()))?;
        Ok(data_dir.join(APP_NAME))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("service_key", &"<redacted>")
            .field("public_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("sandbox", &self.sandbox)
            .field("max_result_age", &self.max_result_age)
            .finish()
    }
}
