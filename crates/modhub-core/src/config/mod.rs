//! Host configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a default so the host can start with no
//! configuration files at all.

pub mod logging;
pub mod tweak;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::tweak::TweakConfig;

use crate::error::HubError;

/// Root host configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Tweak system settings.
    #[serde(default)]
    pub tweaks: TweakConfig,
}

impl HostConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `MODHUB_`.
    pub fn load(env: &str) -> Result<Self, HubError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MODHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| HubError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| HubError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
