//! Persists the signed-in session between runs and refreshes it when expired.

use anyhow::{Context, Result};
use pairdays_core::config::ClientConfig;
use pairdays_core::error::PairDaysError;
use pairdays_core::gateway::AuthSession;
use std::path::{Path, PathBuf};

use crate::SupabaseGateway;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// `~/.config/pairdays/session.toml`
    pub fn new() -> Result<Self> {
        Ok(SessionStore {
            path: ClientConfig::config_dir()?.join("session.toml"),
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, if any. Doesn't check expiry.
    pub fn load(&self) -> Result<Option<AuthSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        let session: AuthSession = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))?;

        Ok(Some(session))
    }

    // Load the session and refresh it if expired. A refresh token the auth
    // service rejects signs the user out. Any other refresh failure keeps the
    // file so the next run can try again.
    pub async fn load_valid(&self, gateway: &SupabaseGateway) -> Result<Option<AuthSession>> {
        let Some(session) = self.load()? else {
            return Ok(None);
        };

        if !session.is_expired() {
            return Ok(Some(session));
        }

        tracing::debug!(expired_at = %session.expires_at, "refreshing session");
        match gateway.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                self.save(&fresh)?;
                Ok(Some(fresh))
            }
            Err(PairDaysError::AuthRejected(reason)) => {
                tracing::warn!(%reason, "refresh token rejected, signing out");
                self.clear()?;
                Ok(None)
            }
            Err(e) => Err(e).context("Could not refresh the stored session"),
        }
    }

    pub fn save(&self, session: &AuthSession) -> Result<()> {
        let contents = toml::to_string_pretty(session).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Owner-only (0600), the file holds tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Forget the stored session. Returns whether there was one.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}
