//! Shared engine test double and fixtures for operation tests.

use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::models::{
    ContainerCreateBody, ContainerCreateResponse, ContainerInspectResponse, ContainerStatsResponse,
    ContainerSummary, CreateImageInfo, Network, NetworkCreateRequest,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, ListContainersOptions, LogsOptions,
    RemoveContainerOptions, StatsOptions,
};
use mockall::mock;
use rstest::fixture;

use super::client::{
    ContainerCreator, ContainerInventoryClient, ContainerLifecycleClient, ContainerLogsClient,
    ContainerStatsClient, EngineFuture, EngineStream, ImageClient, NetworkClient,
};

mock! {
    #[derive(Debug)]
    pub Engine {}

    impl NetworkClient for Engine {
        fn list_networks(&self) -> EngineFuture<'_, Vec<Network>>;
        fn create_network(&self, request: NetworkCreateRequest) -> EngineFuture<'_, ()>;
    }

    impl ImageClient for Engine {
        fn pull_image(&self, options: CreateImageOptions) -> EngineStream<'_, CreateImageInfo>;
    }

    impl ContainerCreator for Engine {
        fn create_container(
            &self,
            options: Option<CreateContainerOptions>,
            config: ContainerCreateBody,
        ) -> EngineFuture<'_, ContainerCreateResponse>;
    }

    impl ContainerLifecycleClient for Engine {
        fn start_container(&self, container_id: &str) -> EngineFuture<'_, ()>;
        fn stop_container(&self, container_id: &str) -> EngineFuture<'_, ()>;
        fn restart_container(&self, container_id: &str) -> EngineFuture<'_, ()>;
        fn remove_container(
            &self,
            container_id: &str,
            options: RemoveContainerOptions,
        ) -> EngineFuture<'_, ()>;
        fn inspect_container(&self, container_id: &str) -> EngineFuture<'_, ContainerInspectResponse>;
    }

    impl ContainerInventoryClient for Engine {
        fn list_containers(
            &self,
            options: ListContainersOptions,
        ) -> EngineFuture<'_, Vec<ContainerSummary>>;
    }

    impl ContainerStatsClient for Engine {
        fn stats_snapshot(
            &self,
            container_id: &str,
            options: StatsOptions,
        ) -> EngineFuture<'_, Option<ContainerStatsResponse>>;
    }

    impl ContainerLogsClient for Engine {
        fn logs(&self, container_id: &str, options: LogsOptions) -> EngineFuture<'_, Vec<LogOutput>>;
    }
}

#[fixture]
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
}

/// An engine error carrying an HTTP status and message.
pub fn server_error(status_code: u16, message: &str) -> BollardError {
    BollardError::DockerResponseServerError {
        status_code,
        message: String::from(message),
    }
}

/// The error the engine returns for a duplicate container name.
pub fn name_conflict(name: &str) -> BollardError {
    server_error(
        409,
        &format!("Conflict. The container name \"/{name}\" is already in use"),
    )
}

pub fn ready<T: Send + 'static>(value: Result<T, BollardError>) -> EngineFuture<'static, T> {
    Box::pin(async move { value })
}

/// A network list already containing `name`.
pub fn network_named(name: &str) -> Network {
    Network {
        name: Some(String::from(name)),
        ..Network::default()
    }
}

/// A mock that already has the shared network and pulls images cleanly.
pub fn engine_with_network_and_image(network: &str) -> MockEngine {
    let mut engine = MockEngine::new();
    let existing = vec![network_named(network)];
    engine
        .expect_list_networks()
        .returning(move || ready(Ok(existing.clone())));
    engine.expect_pull_image().returning(|_| {
        Box::pin(futures_util::stream::iter(vec![Ok(CreateImageInfo {
            status: Some(String::from("Pull complete")),
            ..CreateImageInfo::default()
        })]))
    });
    engine
}

pub fn created(id: &str) -> ContainerCreateResponse {
    ContainerCreateResponse {
        id: String::from(id),
        warnings: vec![],
    }
}

/// Wraps a test failure message in an I/O error.
pub fn io_error(message: impl Into<String>) -> std::io::Error {
    std::io::Error::other(message.into())
}

/// Fails with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> std::io::Result<()> {
    if condition {
        return Ok(());
    }

    Err(io_error(message))
}
