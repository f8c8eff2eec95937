//! Configuration loaded from `config/default.toml`.
//!
//! Every section is optional.  A missing file yields the built-in defaults;
//! a file that exists but does not parse, or whose rules are invalid, is an
//! error rather than a silent fallback.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use triage_core::{Defaults, Rule, RuleTable, builtin_rules};

/// Environment variable that overrides `store.path`.
pub const STORE_ENV: &str = "TRIAGE_STORE";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub store: StoreSection,
    pub classifier: ClassifierSection,
}

/// `[store]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// JSON file holding the request records.
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/requests.json"),
        }
    }
}

/// `[classifier]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    /// Replacement rule table; the built-in rules apply when absent.
    pub rules: Option<Vec<Rule>>,
    pub defaults: Defaults,
}

impl TriageConfig {
    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `TRIAGE_STORE` if set to a non-empty value.
    pub fn apply_env(&mut self) {
        self.apply_store_override(std::env::var(STORE_ENV).ok());
    }

    fn apply_store_override(&mut self, value: Option<String>) {
        if let Some(path) = value.filter(|v| !v.trim().is_empty()) {
            debug!(path = %path, "store path overridden from environment");
            self.store.path = PathBuf::from(path);
        }
    }

    /// Compile the configured rule table.
    pub fn rule_table(&self) -> Result<RuleTable> {
        let rules = self
            .classifier
            .rules
            .clone()
            .unwrap_or_else(builtin_rules);
        RuleTable::new(rules, self.classifier.defaults.clone())
            .context("invalid classifier rules")
    }
}
