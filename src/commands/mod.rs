pub mod auth;
pub mod calendar;
pub mod events;
pub mod memories;
pub mod messages;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use pairdays_core::config::ClientConfig;
use pairdays_supabase::{SessionStore, SupabaseGateway};

/// Everything a command needs: loaded config, the stored session and a
/// gateway acting as the signed-in user (or anonymously when signed out).
pub struct Context {
    pub config: ClientConfig,
    pub sessions: SessionStore,
    pub gateway: SupabaseGateway,
}

impl Context {
    pub async fn load() -> Result<Self> {
        let config = ClientConfig::load().context("Failed to load config")?;
        config.require_backend()?;

        let sessions = SessionStore::new()?;
        let mut gateway = SupabaseGateway::new(&config.supabase)?;

        if let Some(session) = sessions.load_valid(&gateway).await? {
            tracing::debug!(user = %session.user.id, "using stored session");
            gateway = gateway.with_session(&session);
        }

        Ok(Context {
            config,
            sessions,
            gateway,
        })
    }
}

/// Parse "YYYY-MM" to the first day of that month.
pub fn parse_month(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{input}', expected YYYY-MM"))
}
