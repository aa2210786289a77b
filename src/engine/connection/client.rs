//! Narrow engine-client traits and their Bollard implementations.
//!
//! Each trait covers one concern so provisioning, inventory, and metrics
//! logic can be exercised against test doubles without a running daemon.

use std::future::Future;
use std::pin::{Pin, pin};

use bollard::Docker;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::models::{
    ContainerCreateBody, ContainerCreateResponse, ContainerInspectResponse, ContainerStatsResponse,
    ContainerSummary, CreateImageInfo, Network, NetworkCreateRequest,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, ListContainersOptions,
    ListNetworksOptions, LogsOptions, RemoveContainerOptions, RestartContainerOptions,
    StartContainerOptions, StatsOptions, StopContainerOptions,
};
use futures_util::{Stream, StreamExt, TryStreamExt};

/// Boxed future returned by every engine-client call.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BollardError>> + Send + 'a>>;

/// Boxed stream returned by streaming engine-client calls.
pub type EngineStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T, BollardError>> + Send + 'a>>;

/// Network listing and creation.
pub trait NetworkClient {
    /// List every network the engine knows about.
    fn list_networks(&self) -> EngineFuture<'_, Vec<Network>>;

    /// Create a network.
    fn create_network(&self, request: NetworkCreateRequest) -> EngineFuture<'_, ()>;
}

/// Image pulls.
pub trait ImageClient {
    /// Pull an image, yielding progress records.
    fn pull_image(&self, options: CreateImageOptions) -> EngineStream<'_, CreateImageInfo>;
}

/// Container creation.
pub trait ContainerCreator {
    /// Create a container from Bollard options and body payload.
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> EngineFuture<'_, ContainerCreateResponse>;
}

/// Lifecycle transitions and inspection of existing containers.
pub trait ContainerLifecycleClient {
    /// Start a created or stopped container.
    fn start_container(&self, container_id: &str) -> EngineFuture<'_, ()>;

    /// Stop a running container.
    fn stop_container(&self, container_id: &str) -> EngineFuture<'_, ()>;

    /// Restart a container.
    fn restart_container(&self, container_id: &str) -> EngineFuture<'_, ()>;

    /// Remove a container with the given options.
    fn remove_container(
        &self,
        container_id: &str,
        options: RemoveContainerOptions,
    ) -> EngineFuture<'_, ()>;

    /// Return the engine's full view of a container.
    fn inspect_container(&self, container_id: &str) -> EngineFuture<'_, ContainerInspectResponse>;
}

/// Container listing.
pub trait ContainerInventoryClient {
    /// List containers.
    fn list_containers(
        &self,
        options: ListContainersOptions,
    ) -> EngineFuture<'_, Vec<ContainerSummary>>;
}

/// Resource-accounting snapshots.
pub trait ContainerStatsClient {
    /// Return the first resource-accounting record for a container, if any.
    fn stats_snapshot(
        &self,
        container_id: &str,
        options: StatsOptions,
    ) -> EngineFuture<'_, Option<ContainerStatsResponse>>;
}

/// Container output.
pub trait ContainerLogsClient {
    /// Collect container output frames.
    fn logs(&self, container_id: &str, options: LogsOptions) -> EngineFuture<'_, Vec<LogOutput>>;
}

impl NetworkClient for Docker {
    fn list_networks(&self) -> EngineFuture<'_, Vec<Network>> {
        Box::pin(async move { Self::list_networks(self, None::<ListNetworksOptions>).await })
    }

    fn create_network(&self, request: NetworkCreateRequest) -> EngineFuture<'_, ()> {
        Box::pin(async move {
            Self::create_network(self, request).await?;
            Ok(())
        })
    }
}

impl ImageClient for Docker {
    fn pull_image(&self, options: CreateImageOptions) -> EngineStream<'_, CreateImageInfo> {
        Box::pin(Self::create_image(self, Some(options), None, None))
    }
}

impl ContainerCreator for Docker {
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> EngineFuture<'_, ContainerCreateResponse> {
        Box::pin(async move { Self::create_container(self, options, config).await })
    }
}

impl ContainerLifecycleClient for Docker {
    fn start_container(&self, container_id: &str) -> EngineFuture<'_, ()> {
        let id = String::from(container_id);
        Box::pin(async move {
            Self::start_container(self, &id, None::<StartContainerOptions>).await
        })
    }

    fn stop_container(&self, container_id: &str) -> EngineFuture<'_, ()> {
        let id = String::from(container_id);
        Box::pin(async move { Self::stop_container(self, &id, None::<StopContainerOptions>).await })
    }

    fn restart_container(&self, container_id: &str) -> EngineFuture<'_, ()> {
        let id = String::from(container_id);
        Box::pin(async move {
            Self::restart_container(self, &id, None::<RestartContainerOptions>).await
        })
    }

    fn remove_container(
        &self,
        container_id: &str,
        options: RemoveContainerOptions,
    ) -> EngineFuture<'_, ()> {
        let id = String::from(container_id);
        Box::pin(async move { Self::remove_container(self, &id, Some(options)).await })
    }

    fn inspect_container(&self, container_id: &str) -> EngineFuture<'_, ContainerInspectResponse> {
        let id = String::from(container_id);
        Box::pin(async move {
            Self::inspect_container(self, &id, None::<InspectContainerOptions>).await
        })
    }
}

impl ContainerInventoryClient for Docker {
    fn list_containers(
        &self,
        options: ListContainersOptions,
    ) -> EngineFuture<'_, Vec<ContainerSummary>> {
        Box::pin(async move { Self::list_containers(self, Some(options)).await })
    }
}

impl ContainerStatsClient for Docker {
    fn stats_snapshot(
        &self,
        container_id: &str,
        options: StatsOptions,
    ) -> EngineFuture<'_, Option<ContainerStatsResponse>> {
        let id = String::from(container_id);
        Box::pin(async move {
            let mut records = pin!(Self::stats(self, &id, Some(options)));
            records.next().await.transpose()
        })
    }
}

impl ContainerLogsClient for Docker {
    fn logs(&self, container_id: &str, options: LogsOptions) -> EngineFuture<'_, Vec<LogOutput>> {
        let id = String::from(container_id);
        Box::pin(async move { Self::logs(self, &id, Some(options)).try_collect().await })
    }
}
