//! Configuration system.
//!
//! Loads translator configuration from JSON strings (file IO left to app).

use serde::{Deserialize, Serialize};

/// Root configuration shared by the translator and its binaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslatorConfig {
    /// Reject front-client "god bridging" placements.
    #[serde(default)]
    pub disable_front_scaffolding: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            disable_front_scaffolding: false,
            log_filter: default_log_filter(),
        }
    }
}

impl TranslatorConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
