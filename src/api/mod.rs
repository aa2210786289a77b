//! Caller-facing operations.
//!
//! One async function per operation. Each validates its input before any
//! engine call and bounds its whole engine interaction by the matching
//! deadline from [`TimeoutsConfig`](crate::config::TimeoutsConfig):
//! provisioning uses `provision_secs`, inventory uses `inventory_secs`, and
//! everything else uses `action_secs`.
//!
//! Functions accept library-owned types (not clap types) and any client
//! implementing the engine traits they need. They do not print to
//! stdout/stderr or call `std::process::exit`.

use bollard::Docker;
use bollard::models::ContainerInspectResponse;
use tracing::debug;

use crate::config::AppConfig;
use crate::engine::{
    ContainerAction, ContainerCreator, ContainerInventoryClient, ContainerLifecycleClient,
    ContainerLogsClient, ContainerStatsClient, CreatedContainer, DatabaseRequest,
    EngineConnector, ImageClient, NetworkClient, ProvisionSettings, ProvisionedDatabase,
    SiteRequest, with_deadline,
};
use crate::error::Result as DockliteResult;
use crate::inventory::{DatabaseRecord, ManagedResource};
use crate::metrics::UtilizationReport;
use crate::site_files::seed_site_content;

/// Log lines returned when the caller does not specify a tail.
pub const DEFAULT_LOG_TAIL: u32 = 200;

/// Caller input for [`create_site`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteParams<'a> {
    /// Domain to serve.
    pub domain: &'a str,
    /// Template name; blank selects `static`.
    pub template: &'a str,
    /// Whether `www.<domain>` is routed too.
    pub include_www: bool,
    /// Node listen port.
    pub port: Option<u32>,
}

/// Caller input for [`create_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseParams<'a> {
    /// Logical database name, sanitised before use.
    pub name: &'a str,
    /// User; blank selects the default.
    pub username: &'a str,
    /// Password; blank generates one.
    pub password: &'a str,
    /// Host port; `None` or 0 lets the engine choose.
    pub port: Option<u32>,
}

/// Check that the engine answers.
///
/// # Errors
///
/// Returns `EngineError::HealthCheckFailed` or
/// `EngineError::HealthCheckTimeout`.
pub async fn ping(docker: &Docker) -> DockliteResult<()> {
    EngineConnector::health_check_async(docker).await
}

/// Provision a site and return its container.
///
/// When `sites.seed_default_content` is set, the mount source directory is
/// created and starter files are written before the engine is contacted.
///
/// # Errors
///
/// Returns `ValidationError` for bad input (with no engine call made),
/// `FilesystemError` if seeding fails, `EngineError::Timeout` if the
/// provisioning deadline elapses, or any engine failure.
pub async fn create_site<C>(
    client: &C,
    config: &AppConfig,
    params: SiteParams<'_>,
) -> DockliteResult<CreatedContainer>
where
    C: NetworkClient + ImageClient + ContainerCreator + ContainerLifecycleClient,
{
    let request = SiteRequest::new(
        params.domain,
        params.template,
        params.include_www,
        params.port,
    )?;
    let settings = ProvisionSettings::from_config(config);

    if config.sites.seed_default_content {
        let site_dir = settings.site_directory(&request.domain);
        let written = seed_site_content(
            &site_dir,
            &request.domain,
            request.template,
            request.internal_port,
        )?;
        debug!(path = %site_dir, files = ?written, "seeded site content");
    }

    with_deadline(
        "create site",
        config.timeouts.provision(),
        EngineConnector::create_site_async(client, &request, &settings),
    )
    .await
}

/// Provision a database and return its connection details.
///
/// # Errors
///
/// Returns `ValidationError` for bad input (with no engine call made),
/// `CredentialError` if a password cannot be generated,
/// `EngineError::Timeout` if the provisioning deadline elapses, or any
/// engine failure.
pub async fn create_database<C>(
    client: &C,
    config: &AppConfig,
    params: DatabaseParams<'_>,
) -> DockliteResult<ProvisionedDatabase>
where
    C: NetworkClient + ImageClient + ContainerCreator + ContainerLifecycleClient,
{
    let request = DatabaseRequest::new(
        params.name,
        params.username,
        params.password,
        params.port,
    )?;
    with_deadline(
        "create database",
        config.timeouts.provision(),
        EngineConnector::create_database_async(client, &request, &config.network.name),
    )
    .await
}

/// List containers, optionally including stopped ones.
///
/// # Errors
///
/// Returns `EngineError::ListFailed` or `EngineError::Timeout`.
pub async fn list_containers<C: ContainerInventoryClient>(
    client: &C,
    config: &AppConfig,
    include_stopped: bool,
) -> DockliteResult<Vec<ManagedResource>> {
    with_deadline(
        "list containers",
        config.timeouts.inventory(),
        EngineConnector::list_containers_async(client, include_stopped),
    )
    .await
}

/// List database containers with their connection details.
///
/// # Errors
///
/// Returns `EngineError::ListFailed` or `EngineError::Timeout`.
pub async fn list_databases<C: ContainerInventoryClient>(
    client: &C,
    config: &AppConfig,
) -> DockliteResult<Vec<DatabaseRecord>> {
    with_deadline(
        "list databases",
        config.timeouts.inventory(),
        EngineConnector::list_databases_async(client),
    )
    .await
}

/// Report a container's current CPU and memory utilization.
///
/// # Errors
///
/// Returns `EngineError::StatsUnavailable`, `EngineError::OperationFailed`,
/// or `EngineError::Timeout`.
pub async fn get_utilization<C: ContainerStatsClient>(
    client: &C,
    config: &AppConfig,
    container_id: &str,
) -> DockliteResult<UtilizationReport> {
    with_deadline(
        "stats",
        config.timeouts.action(),
        EngineConnector::get_utilization_async(client, container_id),
    )
    .await
}

/// Start, stop, restart, or force-remove a container.
///
/// # Errors
///
/// Returns `EngineError::OperationFailed` or `EngineError::Timeout`.
pub async fn container_action<C: ContainerLifecycleClient>(
    client: &C,
    config: &AppConfig,
    container_id: &str,
    action: ContainerAction,
) -> DockliteResult<()> {
    with_deadline(
        action.as_str(),
        config.timeouts.action(),
        EngineConnector::apply_action_async(client, container_id, action),
    )
    .await
}

/// Return the engine's raw view of a container.
///
/// # Errors
///
/// Returns `EngineError::OperationFailed` or `EngineError::Timeout`.
pub async fn inspect<C: ContainerLifecycleClient>(
    client: &C,
    config: &AppConfig,
    container_id: &str,
) -> DockliteResult<ContainerInspectResponse> {
    with_deadline(
        "inspect",
        config.timeouts.action(),
        EngineConnector::inspect_async(client, container_id),
    )
    .await
}

/// Return the last `tail` lines of a container's combined output.
///
/// # Errors
///
/// Returns `EngineError::OperationFailed` or `EngineError::Timeout`.
pub async fn logs<C: ContainerLogsClient>(
    client: &C,
    config: &AppConfig,
    container_id: &str,
    tail: u32,
) -> DockliteResult<String> {
    with_deadline(
        "logs",
        config.timeouts.action(),
        EngineConnector::logs_async(client, container_id, tail),
    )
    .await
}
