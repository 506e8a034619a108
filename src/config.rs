use crate::domain::Roster;
use chrono::{DateTime, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub scoreboard: ScoreboardConfig,
    #[serde(default)]
    pub poll: PollConfig,
    pub roster: Roster,
    pub telegram: TelegramConfig,
    pub contest: ContestConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardConfig {
    /// Submission history endpoint (JSON array of event tuples)
    pub history_url: String,
    /// Score table endpoint (JSON object, entity -> task -> score)
    pub scores_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds between ticks
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    /// Max notifications per tick; also the bootstrap seed size.
    /// Excess fresh events carry over to the next tick.
    #[serde(default = "default_batch_cap")]
    pub batch_cap: usize,
    /// Notifications between ranking summaries
    #[serde(default = "default_summary_threshold")]
    pub summary_threshold: u32,
}

fn default_poll_interval() -> u64 {
    10
}

fn default_batch_cap() -> usize {
    10
}

fn default_summary_threshold() -> u32 {
    10
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            batch_cap: default_batch_cap(),
            summary_threshold: default_summary_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; supplied via PODIUM__TELEGRAM__BOT_TOKEN in deployments
    pub bot_token: String,
    /// Destination chat id (group ids are negative, hence a string)
    pub chat_id: String,
    /// Bot API base, overridable for tests
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestConfig {
    /// Contest start instant; summary headers show elapsed time from here
    pub start: DateTime<Utc>,
    /// Hours to shift displayed submission clock times by (0 = UTC)
    #[serde(default)]
    pub display_utc_offset_hours: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Announce-state file, one per deployment
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("sent.json")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load deployment-specific config (e.g. config/uzb.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PODIUM_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PODIUM__TELEGRAM__BOT_TOKEN, etc.)
            .add_source(
                Environment::with_prefix("PODIUM")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.poll.interval_secs == 0 {
            errors.push("poll.interval_secs must be positive".to_string());
        }
        if self.poll.batch_cap == 0 {
            errors.push("poll.batch_cap must be positive".to_string());
        }
        if self.poll.summary_threshold == 0 {
            errors.push("poll.summary_threshold must be positive".to_string());
        }

        if self.roster.is_empty() {
            errors.push("roster.members must not be empty".to_string());
        }
        if self.roster.prefix.is_empty() {
            errors.push("roster.prefix must not be empty".to_string());
        }
        for team_id in self.roster.members.keys() {
            if !team_id.starts_with(&self.roster.prefix) {
                errors.push(format!(
                    "roster member {team_id} does not match prefix {}",
                    self.roster.prefix
                ));
            }
        }

        if self.scoreboard.history_url.is_empty() || self.scoreboard.scores_url.is_empty() {
            errors.push("scoreboard URLs must be set".to_string());
        }
        if self.telegram.bot_token.is_empty() {
            errors.push("telegram.bot_token must be set".to_string());
        }
        if self.telegram.chat_id.is_empty() {
            errors.push("telegram.chat_id must be set".to_string());
        }

        if !(-23..=23).contains(&self.contest.display_utc_offset_hours) {
            errors.push("contest.display_utc_offset_hours must be between -23 and 23".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample() -> AppConfig {
        AppConfig {
            scoreboard: ScoreboardConfig {
                history_url: "https://ranking.example/history".to_string(),
                scores_url: "https://ranking.example/scores".to_string(),
                request_timeout_secs: 10,
            },
            poll: PollConfig::default(),
            roster: Roster {
                prefix: "UZB".to_string(),
                members: HashMap::from([("UZB1".to_string(), "Alice".to_string())]),
            },
            telegram: TelegramConfig {
                bot_token: "123:abc".to_string(),
                chat_id: "-100200300".to_string(),
                api_url: default_api_url(),
            },
            contest: ContestConfig {
                start: Utc::now(),
                display_utc_offset_hours: 0,
            },
            state: StateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn sample_config_validates() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn prefix_mismatch_is_rejected() {
        let mut cfg = sample();
        cfg.roster
            .members
            .insert("KGZ1".to_string(), "Dana".to_string());
        let errors = cfg.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("KGZ1")));
    }

    #[test]
    fn out_of_range_display_offset_is_rejected() {
        let mut cfg = sample();
        cfg.contest.display_utc_offset_hours = 24;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("display_utc_offset_hours")));

        cfg.contest.display_utc_offset_hours = -23;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut cfg = sample();
        cfg.poll.interval_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
