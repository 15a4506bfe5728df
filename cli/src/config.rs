//! Deployment configuration with TOML file support.

use serde::{Deserialize, Serialize};

use crate::CliError;

/// Defaults for deploying a new token ledger.
///
/// Can be loaded from a TOML file via [`DeployConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Command-line flags override
/// whatever the file provides.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Token name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Token ticker symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Initial supply in whole tokens, as a decimal string (e.g. "1000000"
    /// or "1000000.5").
    #[serde(default = "default_initial_supply")]
    pub initial_supply: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_name() -> String {
    "Rayls Token".to_string()
}

fn default_symbol() -> String {
    "RAYLS".to_string()
}

fn default_initial_supply() -> String {
    "1000000".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DeployConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, CliError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CliError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("DeployConfig is always serializable to TOML")
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            initial_supply: default_initial_supply(),
        }
    }
}
