use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, Result};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Token lifetime when the token reply carries no expiration.
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// A bearer token bound to one Tradera user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, user_id: i64, expires_at: Option<DateTime<Utc>>) -> Self {
        let created_at = Utc::now();
        Self {
            token,
            user_id,
            expires_at: expires_at
                .unwrap_or_else(|| created_at + Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS)),
            created_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }

    /// First characters of the token, for log lines.
    pub fn token_preview(&self) -> String {
        let preview: String = self.token.chars().take(8).collect();
        format!("{}...", preview)
    }
}

/// Persists a session between CLI invocations. The API client never
/// touches the filesystem itself.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Load the stored session, ignoring it if it has expired.
    pub fn load(&self) -> Result<Option<Session>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| ApiError::Storage(format!("Failed to read session file: {}", e)))?;
        let session: Session = serde_json::from_str(&contents)
            .map_err(|e| ApiError::Storage(format!("Failed to parse session file: {}", e)))?;

        if session.is_expired() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ApiError::Storage(format!("Failed to create {}: {}", self.dir.display(), e)))?;
        let contents = serde_json::to_string_pretty(session)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        std::fs::write(self.session_path(), contents)
            .map_err(|e| ApiError::Storage(format!("Failed to write session file: {}", e)))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)
                .map_err(|e| ApiError::Storage(format!("Failed to remove session file: {}", e)))?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}
