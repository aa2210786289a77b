//! Configuration data types for docklite.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default name of the shared workload network.
pub const DEFAULT_NETWORK_NAME: &str = "docklite_network";

/// Shared network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Name of the bridge network every workload joins.
    pub name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_NETWORK_NAME),
        }
    }
}

/// Host-side site content configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SitesConfig {
    /// Directory holding one subdirectory per site domain.
    pub base_dir: Utf8PathBuf,

    /// Write starter content into new site directories.
    pub seed_default_content: bool,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            base_dir: Utf8PathBuf::from("/var/www/sites"),
            seed_default_content: true,
        }
    }
}

/// Reverse-proxy routing configuration written into site labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy entrypoint that terminates TLS.
    pub entrypoint: String,

    /// Certificate resolver used for issued certificates.
    pub cert_resolver: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            entrypoint: String::from("websecure"),
            cert_resolver: String::from("letsencrypt"),
        }
    }
}

/// Deadlines applied to each class of engine operation, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Site and database provisioning.
    pub provision_secs: u64,

    /// Start, stop, restart, remove, inspect and logs.
    pub action_secs: u64,

    /// Container listings and utilization sampling.
    pub inventory_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            provision_secs: 30,
            action_secs: 10,
            inventory_secs: 5,
        }
    }
}

impl TimeoutsConfig {
    /// Provisioning deadline.
    #[must_use]
    pub const fn provision(&self) -> Duration {
        Duration::from_secs(self.provision_secs)
    }

    /// Lifecycle action deadline.
    #[must_use]
    pub const fn action(&self) -> Duration {
        Duration::from_secs(self.action_secs)
    }

    /// Inventory and metrics deadline.
    #[must_use]
    pub const fn inventory(&self) -> Duration {
        Duration::from_secs(self.inventory_secs)
    }

    /// Rejects zero deadlines.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first zero field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("timeouts.provision_secs", self.provision_secs),
            ("timeouts.action_secs", self.action_secs),
            ("timeouts.inventory_secs", self.inventory_secs),
        ];
        match fields.into_iter().find(|(_, secs)| *secs == 0) {
            Some((field, _)) => Err(ConfigError::InvalidValue {
                field: String::from(field),
                reason: String::from("deadline must be at least one second"),
            }),
            None => Ok(()),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,

    /// Emit JSON log lines instead of human-readable text.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            json: false,
        }
    }
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `DOCKLITE_CONFIG_PATH` environment variable
/// 2. `.docklite.toml` in the current working directory
/// 3. `.docklite.toml` in the home directory
/// 4. `~/.config/docklite/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "DOCKLITE",
    post_merge_hook,
    discovery(
        app_name = "docklite",
        env_var = "DOCKLITE_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".docklite.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The container engine socket path or URL.
    pub engine_socket: Option<String>,

    /// Shared network configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub network: NetworkConfig,

    /// Site content configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub sites: SitesConfig,

    /// Reverse-proxy label configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub proxy: ProxyConfig,

    /// Operation deadlines.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub timeouts: TimeoutsConfig,

    /// Logging configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Checks cross-field invariants after all layers are merged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a blank network name or a zero
    /// deadline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: String::from("network.name"),
                reason: String::from("must not be empty"),
            });
        }
        self.timeouts.validate()
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        self.network.name = String::from(self.network.name.trim());
        if self.log.level.trim().is_empty() {
            self.log.level = LogConfig::default().level;
        }
        Ok(())
    }
}
