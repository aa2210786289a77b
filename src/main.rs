//! `docklite` application entry point.
//!
//! This binary exposes the provisioning and inventory operations of the
//! library as subcommands. It uses `eyre` for opaque error handling at the
//! application boundary, converting domain-specific errors into
//! human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/docklite/config.toml` or path from `DOCKLITE_CONFIG_PATH`)
//! 3. Environment variables (`DOCKLITE_*`)
//! 4. Command-line arguments

use bollard::Docker;
use bollard::models::ContainerInspectResponse;
use clap::Parser;
use docklite::api::{self, DatabaseParams, SiteParams};
use docklite::config::{AppConfig, Cli, Commands, LogConfig, load_config};
use docklite::engine::{
    ContainerAction, CreatedContainer, EngineConnector, ProvisionedDatabase, SocketResolver,
};
use docklite::error::Result as DockliteResult;
use docklite::inventory::{DatabaseRecord, ManagedResource};
use docklite::metrics::UtilizationReport;
use eyre::{Report, Result as EyreResult, eyre};
use mockable::DefaultEnv;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// What a subcommand hands back for printing.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Site(CreatedContainer),
    Database(ProvisionedDatabase),
    Containers(Vec<ManagedResource>),
    Databases(Vec<DatabaseRecord>),
    Utilization(UtilizationReport),
    Inspect(Box<ContainerInspectResponse>),
    #[serde(skip)]
    Text(String),
}

/// Application entry point.
///
/// Loads configuration, installs the log subscriber, connects to the engine
/// and dispatches to the subcommand handler.
fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;
    init_tracing(&config.log)?;

    let output = run(&cli, &config).map_err(Report::from)?;
    emit(&output)
}

/// Install the global subscriber on stderr.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log: &LogConfig) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| eyre!("failed to install log subscriber: {e}"))
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli, config: &AppConfig) -> DockliteResult<Output> {
    let runtime = EngineConnector::create_runtime()?;
    let env = DefaultEnv::new();
    let resolver = SocketResolver::new(&env);
    let docker =
        EngineConnector::connect_with_fallback(config.engine_socket.as_deref(), &resolver)?;
    runtime.block_on(dispatch(&cli.command, &docker, config))
}

async fn dispatch(
    command: &Commands,
    docker: &Docker,
    config: &AppConfig,
) -> DockliteResult<Output> {
    match command {
        Commands::Ping => {
            api::ping(docker).await?;
            Ok(Output::Text(String::from("engine is reachable")))
        }
        Commands::CreateSite(args) => {
            let params = SiteParams {
                domain: &args.domain,
                template: &args.template,
                include_www: !args.no_www,
                port: args.port,
            };
            api::create_site(docker, config, params).await.map(Output::Site)
        }
        Commands::CreateDatabase(args) => {
            let params = DatabaseParams {
                name: &args.name,
                username: &args.username,
                password: &args.password,
                port: args.port,
            };
            api::create_database(docker, config, params)
                .await
                .map(Output::Database)
        }
        Commands::Ps(args) => api::list_containers(docker, config, args.all)
            .await
            .map(Output::Containers),
        Commands::Databases => api::list_databases(docker, config)
            .await
            .map(Output::Databases),
        Commands::Stats(args) => api::get_utilization(docker, config, &args.container)
            .await
            .map(Output::Utilization),
        Commands::Start(args) => {
            apply(docker, config, &args.container, ContainerAction::Start).await
        }
        Commands::Stop(args) => {
            apply(docker, config, &args.container, ContainerAction::Stop).await
        }
        Commands::Restart(args) => {
            apply(docker, config, &args.container, ContainerAction::Restart).await
        }
        Commands::Rm(args) => {
            apply(docker, config, &args.container, ContainerAction::Remove).await
        }
        Commands::Inspect(args) => api::inspect(docker, config, &args.container)
            .await
            .map(|details| Output::Inspect(Box::new(details))),
        Commands::Logs(args) => api::logs(docker, config, &args.container, args.tail)
            .await
            .map(Output::Text),
    }
}

async fn apply(
    docker: &Docker,
    config: &AppConfig,
    container: &str,
    action: ContainerAction,
) -> DockliteResult<Output> {
    api::container_action(docker, config, container, action).await?;
    Ok(Output::Text(format!("{} {container}", action.as_str())))
}

/// Print structured results as JSON and text results verbatim.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn emit(output: &Output) -> EyreResult<()> {
    match output {
        Output::Text(text) if text.ends_with('\n') => print!("{text}"),
        Output::Text(text) => println!("{text}"),
        structured => println!("{}", serde_json::to_string_pretty(structured)?),
    }
    Ok(())
}
