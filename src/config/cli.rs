//! Command-line argument definitions for docklite.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for docklite.
#[derive(Debug, Parser)]
#[command(name = "docklite")]
#[command(
    author,
    version,
    about = "Provision hosted sites and databases on a container engine"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine socket path or URL.
    #[arg(long, global = true)]
    pub engine_socket: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the container engine answers.
    Ping,

    /// Provision a site container.
    CreateSite(CreateSiteArgs),

    /// Provision a Postgres database container.
    CreateDatabase(CreateDatabaseArgs),

    /// List containers.
    Ps(PsArgs),

    /// List database containers with their connection details.
    Databases,

    /// Report CPU and memory utilization for a container.
    Stats(ContainerArgs),

    /// Start a container.
    Start(ContainerArgs),

    /// Stop a container.
    Stop(ContainerArgs),

    /// Restart a container.
    Restart(ContainerArgs),

    /// Force-remove a container.
    Rm(ContainerArgs),

    /// Show the engine's full view of a container.
    Inspect(ContainerArgs),

    /// Print recent container output.
    Logs(LogsArgs),
}

/// Arguments for the `create-site` subcommand.
#[derive(Debug, Parser)]
pub struct CreateSiteArgs {
    /// Public domain the site answers on.
    #[arg(required = true)]
    pub domain: String,

    /// Site template: static, php or node.
    #[arg(long, default_value = "static")]
    pub template: String,

    /// Do not route the `www.` host.
    #[arg(long)]
    pub no_www: bool,

    /// Application port for node sites.
    #[arg(long)]
    pub port: Option<u32>,
}

/// Arguments for the `create-database` subcommand.
#[derive(Debug, Parser)]
pub struct CreateDatabaseArgs {
    /// Logical database name.
    #[arg(required = true)]
    pub name: String,

    /// Database user; defaults to `docklite`.
    #[arg(long, default_value = "")]
    pub username: String,

    /// Database password; generated when omitted.
    #[arg(long, default_value = "")]
    pub password: String,

    /// Host port; the engine assigns one when omitted.
    #[arg(long)]
    pub port: Option<u32>,
}

/// Arguments for the `ps` subcommand.
#[derive(Debug, Parser)]
pub struct PsArgs {
    /// Include stopped containers.
    #[arg(long, short)]
    pub all: bool,
}

/// Arguments naming a single container.
#[derive(Debug, Parser)]
pub struct ContainerArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,
}

/// Arguments for the `logs` subcommand.
#[derive(Debug, Parser)]
pub struct LogsArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Number of trailing lines to return.
    #[arg(long, default_value_t = crate::api::DEFAULT_LOG_TAIL)]
    pub tail: u32,
}
