//! Configuration system for docklite.
//!
//! This module provides the configuration structures, CLI definitions, and the
//! layered loader. Precedence: CLI flags override environment variables, which
//! override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/docklite/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! engine_socket = "unix:///var/run/docker.sock"
//!
//! [network]
//! name = "docklite_network"
//!
//! [sites]
//! base_dir = "/var/www/sites"
//! seed_default_content = true
//!
//! [proxy]
//! entrypoint = "websecure"
//! cert_resolver = "letsencrypt"
//!
//! [timeouts]
//! provision_secs = 30
//! action_secs = 10
//! inventory_secs = 5
//!
//! [log]
//! level = "info"
//! json = false
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{
    Cli, Commands, ContainerArgs, CreateDatabaseArgs, CreateSiteArgs, LogsArgs, PsArgs,
};
pub use loader::{env_var_names, load_config};
pub use types::{
    AppConfig, DEFAULT_NETWORK_NAME, LogConfig, NetworkConfig, ProxyConfig, SitesConfig,
    TimeoutsConfig,
};
