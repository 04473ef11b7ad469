//! Plugin configuration loaded from host initialization options
//!
//! The host may pass a JSON object such as
//!
//! ```json
//! { "completion": { "maxItems": 50, "metricNames": ["up"] },
//!   "lint": { "enabled": true, "severity": "warning" } }
//! ```
//!
//! Environment variables override individual fields:
//! - `PROMQL_LINT_ENABLED` - `true`/`false`/`on`/`off`/`1`/`0`
//! - `PROMQL_COMPLETION_MAX_ITEMS` - positive integer

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::lsp::features::completion::CompleteConfiguration;
use crate::lsp::features::lint::LintConfiguration;

pub const LINT_ENABLED_ENV: &str = "PROMQL_LINT_ENABLED";
pub const COMPLETION_MAX_ITEMS_ENV: &str = "PROMQL_COMPLETION_MAX_ITEMS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid initialization options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Strategy configuration for both services; `None` selects the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub completion: Option<CompleteConfiguration>,
    pub lint: Option<LintConfiguration>,
}

impl PluginConfig {
    /// Parse initialization options, then apply environment overrides
    ///
    /// A missing or `null` value yields the default configuration.
    pub fn from_init_options(options: Option<&serde_json::Value>) -> Result<Self, ConfigError> {
        let config = match options {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())?,
            _ => Self::default(),
        };
        config.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides looked up through `lookup` (normally the process
    /// environment)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(LINT_ENABLED_ENV) {
            let enabled = parse_switch(&value).ok_or_else(|| ConfigError::InvalidEnv {
                var: LINT_ENABLED_ENV,
                value: value.clone(),
            })?;
            debug!("{} overrides lint enabled = {}", LINT_ENABLED_ENV, enabled);
            self.lint.get_or_insert_with(LintConfiguration::default).enabled = enabled;
        }

        if let Some(value) = lookup(COMPLETION_MAX_ITEMS_ENV) {
            let max = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidEnv {
                    var: COMPLETION_MAX_ITEMS_ENV,
                    value: value.clone(),
                })?;
            debug!("{} overrides completion max items = {}", COMPLETION_MAX_ITEMS_ENV, max);
            self.completion
                .get_or_insert_with(CompleteConfiguration::default)
                .max_items = Some(max);
        }

        Ok(self)
    }
}

fn parse_switch(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
