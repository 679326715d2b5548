//! Client configuration.
//!
//! Read from `~/.config/pairdays/config.toml`, with `PAIRDAYS__*` environment
//! variables layered on top (`PAIRDAYS__SUPABASE__URL`,
//! `PAIRDAYS__SUPABASE__ANON_KEY`, ...).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::calendar::MonthStep;
use crate::constants::{DEFAULT_IMAGE_BUCKET, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::{PairDaysError, PairDaysResult};

fn default_bucket() -> String {
    DEFAULT_IMAGE_BUCKET.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub supabase: SupabaseConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Where the backend lives. `url` and `anon_key` are the project URL and
/// public anon key from the Supabase dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        SupabaseConfig {
            url: String::new(),
            anon_key: String::new(),
            bucket: default_bucket(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub month_step: MonthStep,
}

impl ClientConfig {
    /// `~/.config/pairdays`
    pub fn config_dir() -> PairDaysResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| PairDaysError::Config("Could not determine config directory".into()))?
            .join("pairdays"))
    }

    pub fn config_path() -> PairDaysResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the user's config, writing a commented template on first run.
    pub fn load() -> PairDaysResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> PairDaysResult<Self> {
        let config: ClientConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("PAIRDAYS").separator("__"))
            .build()
            .map_err(|e| PairDaysError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PairDaysError::Config(e.to_string()))?;

        tracing::debug!(path = %path.display(), url = %config.supabase.url, "loaded config");
        Ok(config)
    }

    /// Fail early with a pointer to the config file when the backend isn't set up.
    pub fn require_backend(&self) -> PairDaysResult<()> {
        if self.supabase.url.is_empty() || self.supabase.anon_key.is_empty() {
            let path = Self::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "config.toml".to_string());
            return Err(PairDaysError::Config(format!(
                "Supabase is not configured.\n\n\
                Set `url` and `anon_key` under [supabase] in {path}\n\
                or export PAIRDAYS__SUPABASE__URL and PAIRDAYS__SUPABASE__ANON_KEY"
            )));
        }
        Ok(())
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PairDaysResult<()> {
        let contents = format!(
            "\
# pairdays configuration

[supabase]
# Project URL and public anon key from the Supabase dashboard:
# url = \"https://your-project.supabase.co\"
# anon_key = \"eyJ...\"

# Storage bucket for memory images:
# bucket = \"{DEFAULT_IMAGE_BUCKET}\"

# Seconds before a request is abandoned:
# timeout_secs = {DEFAULT_REQUEST_TIMEOUT_SECS}

[calendar]
# How the previous/next month controls move: \"thirty-days\" or \"calendar-month\"
# month_step = \"thirty-days\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PairDaysError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PairDaysError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
