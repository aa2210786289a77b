//! Socket resolution, engine connection, and the operations run over it.
//!
//! Socket endpoints are resolved from configuration, fallback environment
//! variables, or the platform default, and connected with Bollard. Every
//! engine operation is written against the narrow client traits in
//! [`client`] so it can be exercised without a running daemon.

mod client;
mod create_container;
mod database;
mod deadline;
mod error_classification;
mod health_check;
mod image;
mod inventory;
mod lifecycle;
mod network;
mod site;
mod stats;

#[cfg(test)]
pub(crate) mod test_support;

use bollard::Docker;
use tracing::debug;

use crate::error::{DockliteError, EngineError};

pub use client::{
    ContainerCreator, ContainerInventoryClient, ContainerLifecycleClient, ContainerLogsClient,
    ContainerStatsClient, EngineFuture, EngineStream, ImageClient, NetworkClient,
};
pub use create_container::{
    CreateContainerRequest, CreatedContainer, HostPort, NameDisambiguation,
};
pub use database::{DatabaseRequest, ProvisionedDatabase};
pub use deadline::with_deadline;
pub use inventory::is_database_entry;
pub use lifecycle::ContainerAction;
pub use site::{DEFAULT_NODE_PORT, ProvisionSettings, SiteRequest};

/// Variables consulted, in order, when configuration names no socket.
const FALLBACK_ENV_VARS: &[&str] = &["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// Request timeout in seconds handed to Bollard.
const CONNECTION_TIMEOUT_SECS: u64 = 120;

/// Timeout in seconds for a liveness ping.
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 10;

#[cfg(unix)]
const DEFAULT_SOCKET: &str = "unix:///var/run/docker.sock";

#[cfg(windows)]
const DEFAULT_SOCKET: &str = "npipe:////./pipe/docker_engine";

/// Looks up the engine endpoint in the process environment.
///
/// Generic over [`mockable::Env`] so the lookup can be driven from a
/// variable table in tests.
pub struct SocketResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> SocketResolver<'a, E> {
    /// Wrap an environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// First non-empty value among `DOCKER_HOST`, `CONTAINER_HOST` and
    /// `PODMAN_HOST`.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|var_name| self.env.string(var_name))
            .find(|value| !value.is_empty())
    }

    /// Socket used when nothing else is configured.
    #[must_use]
    pub const fn default_socket() -> &'static str {
        DEFAULT_SOCKET
    }
}

/// A socket string sorted into the transport Bollard should use for it.
#[derive(Debug, PartialEq, Eq)]
enum Endpoint {
    /// Local transport: a Unix socket or Windows named pipe URI.
    Local(String),
    /// Remote transport over HTTP(S). `tcp://` arrives here as `http://`.
    Remote(String),
}

impl Endpoint {
    /// Sort `socket` by scheme, adding one when it is a bare path.
    ///
    /// Bare paths beginning with `//` or `\\` become named pipes on every
    /// platform; any other bare path is a Unix socket.
    fn parse(socket: &str) -> Self {
        if socket.starts_with("unix://") || socket.starts_with("npipe://") {
            return Self::Local(String::from(socket));
        }
        if let Some(rest) = socket.strip_prefix("tcp://") {
            return Self::Remote(format!("http://{rest}"));
        }
        if socket.starts_with("http://") || socket.starts_with("https://") {
            return Self::Remote(String::from(socket));
        }
        if socket.starts_with("//") || socket.starts_with("\\\\") {
            Self::Local(format!("npipe://{socket}"))
        } else {
            Self::Local(format!("unix://{socket}"))
        }
    }
}

/// Entry point for connecting to the engine and running operations on it.
///
/// Operation methods live in the sibling submodules, one concern each.
pub struct EngineConnector;

impl EngineConnector {
    /// Build a Bollard client for `socket`.
    ///
    /// Accepts `unix://`, `npipe://`, `tcp://`, `http://` and `https://`
    /// URIs as well as bare socket or pipe paths. Building the client does
    /// not contact the daemon; use [`Self::health_check_async`] for that.
    ///
    /// # Errors
    ///
    /// `EngineError::SocketNotFound` or `EngineError::PermissionDenied` when
    /// a local socket is missing or unreadable, `EngineError::ConnectionFailed`
    /// for anything else Bollard rejects.
    pub fn connect(socket: &str) -> Result<Docker, DockliteError> {
        let built = match Endpoint::parse(socket) {
            Endpoint::Local(uri) => Docker::connect_with_socket(
                &uri,
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            Endpoint::Remote(uri) => Docker::connect_with_http(
                &uri,
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
        };
        let docker = built.map_err(|error| {
            DockliteError::from(error_classification::classify_connection_error(
                &error, socket,
            ))
        })?;

        debug!(socket, "container engine client created");
        Ok(docker)
    }

    /// [`Self::connect`] to whatever [`Self::resolve_socket`] picks.
    ///
    /// # Errors
    ///
    /// As for [`Self::connect`].
    pub fn connect_with_fallback<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> Result<Docker, DockliteError> {
        Self::connect(&Self::resolve_socket(config_socket, resolver))
    }

    /// Pick the endpoint to use: a non-empty configured socket, then the
    /// fallback variables, then the platform default.
    #[must_use]
    pub fn resolve_socket<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> String {
        config_socket
            .filter(|configured| !configured.is_empty())
            .map(String::from)
            .or_else(|| resolver.resolve_from_env())
            .unwrap_or_else(|| String::from(SocketResolver::<E>::default_socket()))
    }
}
