use anyhow::{Context, Result};
use std::env;

/// Default cap on reminders kept per user
pub const DEFAULT_MAX_REMINDERS_PER_USER: usize = 100;
/// Default cap on delivery tasks waiting to fire
pub const DEFAULT_MAX_PENDING_REMINDERS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub log_level: String,
    pub reminders: ReminderSettings,
}

/// Bounds handed to the reminder store and scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    pub max_reminders_per_user: usize,
    pub max_pending_reminders: usize,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        ReminderSettings {
            max_reminders_per_user: DEFAULT_MAX_REMINDERS_PER_USER,
            max_pending_reminders: DEFAULT_MAX_PENDING_REMINDERS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("DISCORD_TOKEN environment variable not set")?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let reminders = ReminderSettings {
            max_reminders_per_user: positive_or(
                &lookup,
                "MAX_REMINDERS_PER_USER",
                DEFAULT_MAX_REMINDERS_PER_USER,
            )?,
            max_pending_reminders: positive_or(
                &lookup,
                "MAX_PENDING_REMINDERS",
                DEFAULT_MAX_PENDING_REMINDERS,
            )?,
        };

        Ok(Config {
            discord_token,
            log_level,
            reminders,
        })
    }
}

fn positive_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a positive integer, got '{raw}'"))?;
    if value == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(value)
}
