//! Persisted bearer credential for the backend API.
//!
//! Everything that reads, writes, renews, or deletes the token goes through
//! [`CredentialStore`]; nothing else touches the file or decides its expiry
//! attributes. The token lives next to the config as a small TOML file and
//! carries a 2-day sliding expiry: every successful verification or sign-in
//! pushes the horizon out from the current time.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config;

/// Sliding validity window, renewed on each successful use.
pub const CREDENTIAL_TTL_DAYS: i64 = 2;

const CREDENTIAL_FILE: &str = "credential.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// The store at its standard location in the user config directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self {
            path: config::config_dir()?.join(CREDENTIAL_FILE),
        })
    }

    /// A store backed by an explicit file path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// The current token, or `None` when nothing is stored or the stored
    /// entry has passed its expiry horizon (expired entries are deleted on
    /// read). An unreadable file counts as no credential.
    pub fn get(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let stored: StoredCredential = match toml::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Discarding unreadable credential file: {}", e);
                self.remove();
                return None;
            }
        };
        if stored.expires_at <= Utc::now() {
            tracing::info!("Stored credential expired at {}", stored.expires_at);
            self.remove();
            return None;
        }
        Some(stored.token)
    }

    /// Persists a token with a fresh expiry horizon.
    pub fn set(&self, token: &str) -> Result<()> {
        let stored = StoredCredential {
            token: token.to_string(),
            expires_at: Utc::now() + Duration::days(CREDENTIAL_TTL_DAYS),
        };
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&stored)?)?;
        Ok(())
    }

    /// Sliding-window renewal: rewrites the current token with a new expiry
    /// horizon. A no-op when no live token is stored.
    pub fn renew(&self) -> Result<()> {
        match self.get() {
            Some(token) => self.set(&token),
            None => Ok(()),
        }
    }

    /// Deletes the stored credential. Idempotent.
    pub fn remove(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to delete credential file: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::at(dir.path().join(CREDENTIAL_FILE))
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get(), None);
        store.set("token-1").unwrap();
        assert_eq!(store.get(), Some("token-1".to_string()));
    }

    #[test]
    fn test_expired_entry_reads_as_absent_and_is_deleted() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let stale = StoredCredential {
            token: "old".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        };
        std::fs::write(&store.path, toml::to_string_pretty(&stale).unwrap()).unwrap();

        assert_eq!(store.get(), None);
        assert!(!store.path.exists());
    }

    #[test]
    fn test_renew_extends_horizon() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let near_expiry = StoredCredential {
            token: "live".to_string(),
            expires_at: Utc::now() + Duration::minutes(5),
        };
        std::fs::write(&store.path, toml::to_string_pretty(&near_expiry).unwrap()).unwrap();

        store.renew().unwrap();
        let content = std::fs::read_to_string(&store.path).unwrap();
        let stored: StoredCredential = toml::from_str(&content).unwrap();
        assert_eq!(stored.token, "live");
        assert!(stored.expires_at > Utc::now() + Duration::days(CREDENTIAL_TTL_DAYS) - Duration::minutes(1));
    }

    #[test]
    fn test_renew_without_credential_is_noop() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.renew().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set("token").unwrap();
        store.remove();
        assert_eq!(store.get(), None);
        store.remove();
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(&store.path, "not = [valid").unwrap();
        assert_eq!(store.get(), None);
        assert!(!store.path.exists());
    }
}
