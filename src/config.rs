//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. File given with `--config`
//! 4. `.sql-advisor.toml` in current directory
//! 5. `~/.config/sql-advisor/config.toml`
//! 6. Default values
//!
//! A file replaces the configuration loaded before it as a whole; sections it
//! omits fall back to their defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [rules]
//! ignore = ["COL.002", "ALI.*"]
//!
//! [rules.severity]
//! "COL.001" = "warning"
//!
//! [rules.limits]
//! max_in_count = 10
//! max_join_tables = 5
//! max_distinct_count = 5
//! max_subquery_depth = 3
//!
//! [engine]
//! dialect = "mysql"            # generic, mysql, postgresql, sqlite
//! parallel = false
//! timeout_ms = 0               # 0 disables the deadline
//!
//! [log]
//! level = "warn"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_ADVISOR_IGNORE` | Comma separated rule patterns, appended to `rules.ignore` |
//! | `SQL_ADVISOR_DIALECT` | Parser dialect |
//! | `SQL_ADVISOR_LOG` | Log level or filter directive |

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppResult, config_error, file_read_error},
    query::SqlDialect
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rules:  RulesConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub log:    LogConfig
}

/// Rules configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RulesConfig {
    /// Suppressed rule patterns (`COL.001` or `ALI.*`)
    #[serde(default, alias = "disabled")]
    pub ignore:   Vec<String>,
    /// Severity overrides (rule_id -> severity)
    #[serde(default)]
    pub severity: HashMap<String, String>,
    #[serde(default)]
    pub limits:   RuleLimits
}

/// Thresholds used by the built-in rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleLimits {
    pub max_in_count:       usize,
    pub max_join_tables:    usize,
    pub max_distinct_count: usize,
    pub max_subquery_depth: usize
}

impl Default for RuleLimits {
    fn default() -> Self {
        Self {
            max_in_count:       10,
            max_join_tables:    5,
            max_distinct_count: 5,
            max_subquery_depth: 3
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub dialect:    SqlDialect,
    /// Evaluate rules of one statement on the rayon pool
    #[serde(default)]
    pub parallel:   bool,
    /// Per-statement deadline in milliseconds, 0 disables it
    #[serde(default)]
    pub timeout_ms: u64
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String
}

fn default_log_level() -> String {
    String::from("warn")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level()
        }
    }
}

impl Config {
    /// Load configuration from the default locations and environment
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration, with an explicit file taking precedence over the
    /// default locations
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Explicit file
    /// 3. Config file in current directory (.sql-advisor.toml)
    /// 4. Config file in home directory (~/.config/sql-advisor/config.toml)
    /// 5. Default values
    pub fn load_from(explicit: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-advisor")
                .join("config.toml");
            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sql-advisor.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        if let Some(path) = explicit {
            config = Self::from_file(path)?;
        }

        config.with_env(|key| env::var(key).ok())
    }

    /// Read and parse one TOML file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| file_read_error(&path.display().to_string(), e))?;
        Self::from_toml(&content)
            .map_err(|e| config_error(format!("Invalid config file '{}': {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config: {}", e)))
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        if let Some(ignore) = lookup("SQL_ADVISOR_IGNORE") {
            self.rules.ignore.extend(
                ignore
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
            );
        }
        if let Some(dialect) = lookup("SQL_ADVISOR_DIALECT") {
            self.engine.dialect = dialect.parse().map_err(|e| config_error(format!("{}", e)))?;
        }
        if let Some(level) = lookup("SQL_ADVISOR_LOG") {
            self.log.level = level;
        }
        Ok(self)
    }
}
