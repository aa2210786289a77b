//! In-memory engine that records every call made by a provisioning flow.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bollard::errors::Error as BollardError;
use bollard::models::{
    ContainerCreateBody, ContainerCreateResponse, ContainerInspectResponse, ContainerSummary,
    CreateImageInfo, Network, NetworkCreateRequest, NetworkSettings, PortBinding,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, ListContainersOptions, RemoveContainerOptions,
};
use docklite::engine::{
    ContainerCreator, ContainerInventoryClient, ContainerLifecycleClient, EngineFuture,
    EngineStream, ImageClient, NetworkClient,
};
use futures_util::stream;

/// One accepted or rejected create call.
#[derive(Debug, Clone)]
pub struct CreateCall {
    /// Requested container name.
    pub name: Option<String>,
    /// Payload forwarded to the engine.
    pub body: ContainerCreateBody,
}

#[derive(Debug, Default)]
struct EngineLog {
    networks: Vec<String>,
    created_networks: Vec<String>,
    pulled_images: Vec<String>,
    create_calls: Vec<CreateCall>,
    conflicts_remaining: usize,
    started: Vec<String>,
    assigned_database_port: Option<u16>,
    inventory: Vec<ContainerSummary>,
    total_calls: usize,
}

/// Cheaply cloneable handle over a shared call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    log: Arc<Mutex<EngineLog>>,
}

fn poisoned() -> BollardError {
    BollardError::RequestTimeoutError
}

impl RecordingEngine {
    /// An engine that already knows about `networks`.
    pub fn with_networks(networks: &[&str]) -> Self {
        let engine = Self::default();
        if let Ok(mut log) = engine.log.lock() {
            log.networks = networks.iter().map(|name| String::from(*name)).collect();
        }
        engine
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineLog>, String> {
        self.log
            .lock()
            .map_err(|_| String::from("engine log mutex is poisoned"))
    }

    /// Reject the next `count` create calls with a name conflict.
    pub fn conflict_times(&self, count: usize) -> Result<(), String> {
        self.lock()?.conflicts_remaining = count;
        Ok(())
    }

    /// Report `port` as the host binding for database containers on inspect.
    pub fn assign_database_port(&self, port: u16) -> Result<(), String> {
        self.lock()?.assigned_database_port = Some(port);
        Ok(())
    }

    /// Add an entry to the container listing.
    pub fn list(&self, summary: ContainerSummary) -> Result<(), String> {
        self.lock()?.inventory.push(summary);
        Ok(())
    }

    /// Every create call so far.
    pub fn create_calls(&self) -> Result<Vec<CreateCall>, String> {
        Ok(self.lock()?.create_calls.clone())
    }

    /// Networks created through the engine.
    pub fn created_networks(&self) -> Result<Vec<String>, String> {
        Ok(self.lock()?.created_networks.clone())
    }

    /// Container identifiers that were started.
    pub fn started(&self) -> Result<Vec<String>, String> {
        Ok(self.lock()?.started.clone())
    }

    /// Total engine calls of any kind.
    pub fn total_calls(&self) -> Result<usize, String> {
        Ok(self.lock()?.total_calls)
    }

    /// Images pulled so far.
    pub fn pulled_images(&self) -> Result<Vec<String>, String> {
        Ok(self.lock()?.pulled_images.clone())
    }

    fn record<T: Send + 'static>(
        &self,
        action: impl FnOnce(&mut EngineLog) -> Result<T, BollardError> + Send + 'static,
    ) -> EngineFuture<'_, T> {
        let log = Arc::clone(&self.log);
        Box::pin(async move {
            let mut locked = log.lock().map_err(|_| poisoned())?;
            locked.total_calls += 1;
            action(&mut *locked)
        })
    }
}

impl NetworkClient for RecordingEngine {
    fn list_networks(&self) -> EngineFuture<'_, Vec<Network>> {
        self.record(|log| {
            Ok(log
                .networks
                .iter()
                .map(|name| Network {
                    name: Some(name.clone()),
                    ..Network::default()
                })
                .collect())
        })
    }

    fn create_network(&self, request: NetworkCreateRequest) -> EngineFuture<'_, ()> {
        self.record(move |log| {
            log.networks.push(request.name.clone());
            log.created_networks.push(request.name);
            Ok(())
        })
    }
}

impl ImageClient for RecordingEngine {
    fn pull_image(&self, options: CreateImageOptions) -> EngineStream<'_, CreateImageInfo> {
        let outcome = match self.log.lock() {
            Ok(mut log) => {
                log.total_calls += 1;
                log.pulled_images.extend(options.from_image);
                Ok(CreateImageInfo::default())
            }
            Err(_) => Err(poisoned()),
        };
        Box::pin(stream::iter(vec![outcome]))
    }
}

impl ContainerCreator for RecordingEngine {
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> EngineFuture<'_, ContainerCreateResponse> {
        let name = options.and_then(|opts| opts.name);
        self.record(move |log| {
            log.create_calls.push(CreateCall {
                name: name.clone(),
                body: config,
            });
            if log.conflicts_remaining > 0 {
                log.conflicts_remaining -= 1;
                return Err(BollardError::DockerResponseServerError {
                    status_code: 409,
                    message: format!(
                        "Conflict. The container name \"/{}\" is already in use",
                        name.unwrap_or_default()
                    ),
                });
            }
            Ok(ContainerCreateResponse {
                id: format!("container-{}", log.create_calls.len()),
                warnings: vec![],
            })
        })
    }
}

impl ContainerLifecycleClient for RecordingEngine {
    fn start_container(&self, container_id: &str) -> EngineFuture<'_, ()> {
        let id = String::from(container_id);
        self.record(move |log| {
            log.started.push(id);
            Ok(())
        })
    }

    fn stop_container(&self, _container_id: &str) -> EngineFuture<'_, ()> {
        self.record(|_| Ok(()))
    }

    fn restart_container(&self, _container_id: &str) -> EngineFuture<'_, ()> {
        self.record(|_| Ok(()))
    }

    fn remove_container(
        &self,
        _container_id: &str,
        _options: RemoveContainerOptions,
    ) -> EngineFuture<'_, ()> {
        self.record(|_| Ok(()))
    }

    fn inspect_container(&self, _container_id: &str) -> EngineFuture<'_, ContainerInspectResponse> {
        self.record(|log| {
            let ports = log.assigned_database_port.map(|port| {
                HashMap::from([(
                    String::from("5432/tcp"),
                    Some(vec![PortBinding {
                        host_ip: Some(String::from("0.0.0.0")),
                        host_port: Some(port.to_string()),
                    }]),
                )])
            });
            Ok(ContainerInspectResponse {
                network_settings: Some(NetworkSettings {
                    ports,
                    ..NetworkSettings::default()
                }),
                ..ContainerInspectResponse::default()
            })
        })
    }
}

impl ContainerInventoryClient for RecordingEngine {
    fn list_containers(
        &self,
        _options: ListContainersOptions,
    ) -> EngineFuture<'_, Vec<ContainerSummary>> {
        self.record(|log| Ok(log.inventory.clone()))
    }
}
