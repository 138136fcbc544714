// src/config.rs
use serde::Deserialize;
use std::time::Duration;

use crate::errors::{InterviewError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
const DEFAULT_BIND: &str = "0.0.0.0:8081";

/// Where the interview backend lives.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_base: String,
}

/// Per-session behaviour, loadable from a TOML file.
///
/// ```toml
/// duration_minutes = 45
/// tick_millis = 1000
/// subjective_question_target = 4
/// finished_retention_secs = 900
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Countdown length for every session.
    pub duration_minutes: u32,

    /// Real time between two countdown ticks. One tick is always one second
    /// of countdown; tests shorten this.
    pub tick_millis: u64,

    /// Subjective questions a session should have. Sets that come without
    /// enough of them are topped up from the built-in prompts.
    pub subjective_question_target: usize,

    /// How long a submitted session stays queryable before it is evicted.
    pub finished_retention_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration_minutes: 45,
            tick_millis: 1000,
            subjective_question_target: 4,
            finished_retention_secs: 900,
        }
    }
}

impl SessionSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let settings: SessionSettings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes == 0 {
            return Err(InterviewError::Config("duration_minutes must be positive".to_string()));
        }
        if self.tick_millis == 0 {
            return Err(InterviewError::Config("tick_millis must be positive".to_string()));
        }
        Ok(())
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub session: SessionSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base = lookup("INTERVIEW_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(InterviewError::Config(format!(
                "INTERVIEW_API_BASE must be an http(s) URL, got '{}'",
                api_base
            )));
        }

        let mut session = match lookup("INTERVIEW_CONFIG") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)?;
                SessionSettings::from_toml_str(&raw)?
            }
            None => SessionSettings::default(),
        };

        if let Some(minutes) = lookup("INTERVIEW_DURATION_MINUTES") {
            session.duration_minutes = minutes.trim().parse().map_err(|_| {
                InterviewError::Config(format!("INTERVIEW_DURATION_MINUTES is not a number: '{}'", minutes))
            })?;
            session.validate()?;
        }

        Ok(AppConfig {
            backend: BackendConfig { api_base },
            bind_addr: lookup("INTERVIEW_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            database_url: lookup("DATABASE_URL"),
            session,
        })
    }
}
