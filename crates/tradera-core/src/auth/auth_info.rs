//! The user id / expiration pair delivered by the login redirect.
//!
//! Whatever receives the redirect writes this file; `fetch-token` reads it
//! back so only the secret key has to be supplied by hand.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, Result};

const AUTH_INFO_FILE: &str = "auth_info.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub user_id: i64,
    /// Raw `exp` query value as received; Tradera's format is not pinned down.
    pub expiration: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl AuthInfo {
    pub fn new(user_id: i64, expiration: Option<String>) -> Self {
        Self {
            user_id,
            expiration,
            received_at: Utc::now(),
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(AUTH_INFO_FILE)
    }

    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| ApiError::Storage(format!("Failed to read auth info: {}", e)))?;
        let info = serde_json::from_str(&contents)
            .map_err(|e| ApiError::Storage(format!("Failed to parse auth info: {}", e)))?;
        Ok(Some(info))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .map_err(|e| ApiError::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| ApiError::Storage(e.to_string()))?;
        std::fs::write(Self::path_in(dir), contents)
            .map_err(|e| ApiError::Storage(format!("Failed to write auth info: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("tradera-auth-info-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        assert!(AuthInfo::load(&dir).unwrap().is_none());

        let info = AuthInfo::new(5986811, Some("2026-04-19".into()));
        info.save(&dir).unwrap();
        assert_eq!(AuthInfo::load(&dir).unwrap(), Some(info));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = std::env::temp_dir().join(format!("tradera-auth-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(AuthInfo::path_in(&dir), "not json").unwrap();

        assert!(matches!(AuthInfo::load(&dir), Err(ApiError::Storage(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
