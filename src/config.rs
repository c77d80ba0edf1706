//! Session Configuration
//!
//! Two variants of the identification flow disagree on when free-text and
//! advanced filters take effect, and on what an empty search string means.
//! Both are settings here rather than hard-coded behavior.
//!
//! JSON layout (every field optional):
//! ```json
//! { "searchPolicy": "gated", "emptyQuery": "clears", "allowReviseResults": false, "trimQuery": false }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// When the match engine runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPolicy {
    /// Only once every step is answered. Query and filter changes made
    /// earlier are stored and applied at completion.
    #[default]
    Gated,
    /// After every change, including before completion (narrowing preview)
    Live,
}

/// What an empty query string does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyQuery {
    /// Replaces the stored query, removing the text constraint
    #[default]
    Clears,
    /// Ignored; the previous query stays in effect
    Ignored,
}

impl FromStr for SearchPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gated" => Ok(SearchPolicy::Gated),
            "live" => Ok(SearchPolicy::Live),
            other => anyhow::bail!("Unknown search policy: '{}' (expected 'gated' or 'live')", other),
        }
    }
}

impl FromStr for EmptyQuery {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clears" => Ok(EmptyQuery::Clears),
            "ignored" => Ok(EmptyQuery::Ignored),
            other => anyhow::bail!("Unknown empty-query behavior: '{}' (expected 'clears' or 'ignored')", other),
        }
    }
}

/// Per-session behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub search_policy: SearchPolicy,
    pub empty_query: EmptyQuery,
    /// `back()` from results returns to the last step instead of doing nothing
    pub allow_revise_results: bool,
    /// Strip surrounding whitespace from query text before it is stored
    pub trim_query: bool,
}

impl SessionConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session config: {:?}", path))?;

        let config: SessionConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse session config JSON")?;

        tracing::info!("Loaded session config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn with_search_policy(mut self, policy: SearchPolicy) -> Self {
        self.search_policy = policy;
        self
    }

    pub fn with_empty_query(mut self, empty_query: EmptyQuery) -> Self {
        self.empty_query = empty_query;
        self
    }

    pub fn with_revise_results(mut self, allow: bool) -> Self {
        self.allow_revise_results = allow;
        self
    }

    pub fn with_trimmed_query(mut self, trim: bool) -> Self {
        self.trim_query = trim;
        self
    }
}
