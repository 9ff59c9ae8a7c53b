//! Tweak system configuration.

use serde::{Deserialize, Serialize};

/// Tweak system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweakConfig {
    /// Identifiers of the built-in tweaks to load on startup.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
    /// Directory containing tweak shared libraries (dynamic loading only).
    #[serde(default = "default_tweak_directory")]
    pub directory: String,
    /// Whether to automatically load enabled tweaks on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
}

impl Default for TweakConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            directory: default_tweak_directory(),
            auto_load: default_true(),
        }
    }
}

fn default_enabled() -> Vec<String> {
    vec!["audiofix".to_string()]
}

fn default_tweak_directory() -> String {
    "./tweaks".to_string()
}

fn default_true() -> bool {
    true
}
