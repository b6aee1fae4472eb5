// In: src/config.rs

//! The single source of truth for lacuna's runtime configuration.
//!
//! `LacunaConfig` is created once at the application boundary (from a JSON
//! document or `Default`) and then handed to the `Evaluator` as a shared,
//! read-only `Arc<LacunaConfig>`.

use serde::{Deserialize, Serialize};

use crate::error::{LacunaError, Result};

//==================================================================================
// I. Evaluator Settings
//==================================================================================

/// What the evaluator does with an operation name it has no policy for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// **Default:** unknown operations auto-propagate Missing.
    #[default]
    Propagate,

    /// Unknown operations fail with `UndefinedOperation`.
    Reject,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct EvaluatorConfig {
    #[serde(default)]
    pub unclassified_policy: UnclassifiedPolicy,
}

//==================================================================================
// II. Logging Settings
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// An `env_logger` filter string, e.g. `"info"` or `"lacuna=debug"`.
    /// `RUST_LOG` still takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Appends log lines to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

//==================================================================================
// III. The Unified LacunaConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LacunaConfig {
    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl LacunaConfig {
    /// Parses and validates a JSON document. Absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LacunaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every directive in `logging.level` names a known level.
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(LacunaError::Config("logging.level must not be empty".into()));
        }
        for directive in self.logging.level.split(',') {
            // A directive is either `level` or `module=level`.
            let level = directive.rsplit('=').next().unwrap_or(directive).trim();
            if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(LacunaError::Config(format!(
                    "unknown log level '{}' in logging.level",
                    level
                )));
            }
        }
        if let Some(path) = &self.logging.log_file {
            if path.trim().is_empty() {
                return Err(LacunaError::Config("logging.log_file must not be empty".into()));
            }
        }
        Ok(())
    }
}
