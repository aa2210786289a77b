//! Container engine connection and every operation run against it.
//!
//! The socket endpoint is resolved through a priority-based fallback chain:
//!
//! 1. CLI argument (`--engine-socket`)
//! 2. Config file (`engine_socket` in TOML)
//! 3. `DOCKLITE_ENGINE_SOCKET` environment variable
//! 4. `DOCKER_HOST` environment variable
//! 5. `CONTAINER_HOST` environment variable
//! 6. `PODMAN_HOST` environment variable
//! 7. Platform default (`/var/run/docker.sock` on Unix)
//!
//! Operations are associated functions on [`EngineConnector`] that take any
//! client implementing the narrow traits they need. [`bollard::Docker`]
//! implements all of them.

mod connection;

pub use connection::{
    ContainerAction, ContainerCreator, ContainerInventoryClient, ContainerLifecycleClient,
    ContainerLogsClient, ContainerStatsClient, CreateContainerRequest, CreatedContainer,
    DEFAULT_NODE_PORT, DatabaseRequest, EngineConnector, EngineFuture, EngineStream, HostPort,
    ImageClient, NameDisambiguation, NetworkClient, ProvisionSettings, ProvisionedDatabase,
    SiteRequest, SocketResolver, is_database_entry, with_deadline,
};

#[cfg(test)]
pub(crate) use connection::test_support;
