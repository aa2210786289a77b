//! Container creation with a single name-conflict retry.
//!
//! This module translates a workload description into `Bollard`
//! container-create payloads. Sites and databases share the payload shape:
//! one bind or environment set, at most one published port, attachment to
//! the shared network, and an `unless-stopped` restart policy.

use std::collections::HashMap;

use bollard::models::{
    ContainerCreateBody, HostConfig, PortBinding, RestartPolicy, RestartPolicyNameEnum,
};
use bollard::query_parameters::{CreateContainerOptions, CreateContainerOptionsBuilder};
use serde::Serialize;
use tracing::info;

use super::EngineConnector;
use super::client::{ContainerCreator, ContainerLifecycleClient};
use super::error_classification::is_name_conflict;
use crate::credentials::CredentialGenerator;
use crate::error::{DockliteError, EngineError};

/// Host side of a published port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPort {
    /// Let the engine pick a free ephemeral port.
    Ephemeral,
    /// Bind exactly this host port.
    Fixed(u16),
}

impl HostPort {
    /// Interpret a caller-supplied port where 0 means "engine chooses".
    #[must_use]
    pub const fn from_requested(port: u16) -> Self {
        if port == 0 {
            Self::Ephemeral
        } else {
            Self::Fixed(port)
        }
    }

    fn binding_value(self) -> String {
        match self {
            Self::Ephemeral => String::new(),
            Self::Fixed(port) => port.to_string(),
        }
    }
}

/// How to derive a second name after a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameDisambiguation {
    /// Append the current Unix time in seconds.
    Timestamp,
    /// Append a secure random integer below the retry-suffix bound.
    RandomSuffix,
}

impl NameDisambiguation {
    fn retry_name(self, base: &str) -> Result<String, DockliteError> {
        let suffix = match self {
            Self::Timestamp => chrono::Utc::now().timestamp().to_string(),
            Self::RandomSuffix => CredentialGenerator::from_os_rng()?
                .retry_suffix()
                .to_string(),
        };
        Ok(format!("{base}-{suffix}"))
    }
}

/// Container-creation request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContainerRequest {
    /// Image reference to create from.
    pub image: String,

    /// Preferred container name.
    pub name: String,

    /// Command override.
    pub cmd: Option<Vec<String>>,

    /// Environment in `KEY=value` form.
    pub env: Vec<String>,

    /// Working directory override.
    pub working_dir: Option<String>,

    /// Labels attached at creation.
    pub labels: HashMap<String, String>,

    /// Bind mounts in `source:target:mode` form.
    pub binds: Vec<String>,

    /// Container port to publish with its host side.
    pub published_port: Option<(u16, HostPort)>,

    /// Network to attach to.
    pub network: Option<String>,
}

impl CreateContainerRequest {
    /// Create a request with only image and name set.
    #[must_use]
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            cmd: None,
            env: Vec::new(),
            working_dir: None,
            labels: HashMap::new(),
            binds: Vec::new(),
            published_port: None,
            network: None,
        }
    }

    /// Override the command.
    #[must_use]
    pub fn with_cmd(mut self, cmd: Option<Vec<String>>) -> Self {
        self.cmd = cmd;
        self
    }

    /// Set the environment.
    #[must_use]
    pub fn with_env(mut self, env: Vec<String>) -> Self {
        self.env = env;
        self
    }

    /// Override the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, working_dir: Option<String>) -> Self {
        self.working_dir = working_dir;
        self
    }

    /// Attach labels.
    #[must_use]
    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Set bind mounts.
    #[must_use]
    pub fn with_binds(mut self, binds: Vec<String>) -> Self {
        self.binds = binds;
        self
    }

    /// Publish `container_port` on `host_port`.
    #[must_use]
    pub const fn with_published_port(mut self, container_port: u16, host_port: HostPort) -> Self {
        self.published_port = Some((container_port, host_port));
        self
    }

    /// Attach to a network.
    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }
}

/// A container the engine accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedContainer {
    /// Engine-assigned identifier.
    pub id: String,

    /// The name the container was created under.
    pub name: String,
}

impl EngineConnector {
    /// Create a container, retrying once under a new name on conflict.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Conflict` when the retried name also collides,
    /// `EngineError::CreateFailed` for any other engine rejection, and
    /// `CredentialError::RandomSourceUnavailable` when a random suffix is
    /// required but cannot be generated.
    pub async fn create_container_async<C: ContainerCreator>(
        creator: &C,
        request: &CreateContainerRequest,
        disambiguation: NameDisambiguation,
    ) -> Result<CreatedContainer, DockliteError> {
        match create_named(creator, request, &request.name).await {
            Ok(id) => Ok(CreatedContainer {
                id,
                name: request.name.clone(),
            }),
            Err(error) if is_name_conflict(&error) => {
                let retry_name = disambiguation.retry_name(&request.name)?;
                info!(
                    name = %request.name,
                    retry = %retry_name,
                    "container name in use; retrying once"
                );
                create_named(creator, request, &retry_name)
                    .await
                    .map(|id| CreatedContainer {
                        id,
                        name: retry_name.clone(),
                    })
                    .map_err(|retry_error| {
                        let engine_error = if is_name_conflict(&retry_error) {
                            EngineError::Conflict {
                                name: retry_name,
                                message: retry_error.to_string(),
                            }
                        } else {
                            EngineError::CreateFailed {
                                message: retry_error.to_string(),
                            }
                        };
                        DockliteError::from(engine_error)
                    })
            }
            Err(error) => Err(DockliteError::from(EngineError::CreateFailed {
                message: error.to_string(),
            })),
        }
    }

    /// Start a freshly created container.
    ///
    /// A failed start leaves the container in the created state.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StartFailed` if the engine refuses to start it.
    pub async fn start_created_async<C: ContainerLifecycleClient>(
        client: &C,
        container: &CreatedContainer,
    ) -> Result<(), DockliteError> {
        client
            .start_container(&container.id)
            .await
            .map_err(|error| {
                DockliteError::from(EngineError::StartFailed {
                    container_id: container.id.clone(),
                    message: error.to_string(),
                })
            })?;
        info!(name = %container.name, id = %container.id, "started container");
        Ok(())
    }
}

async fn create_named<C: ContainerCreator>(
    creator: &C,
    request: &CreateContainerRequest,
    name: &str,
) -> Result<String, bollard::errors::Error> {
    let response = creator
        .create_container(Some(build_create_options(name)), build_create_body(request))
        .await?;
    info!(name, id = %response.id, image = %request.image, "created container");
    Ok(response.id)
}

fn build_create_options(name: &str) -> CreateContainerOptions {
    CreateContainerOptionsBuilder::new().name(name).build()
}

fn build_create_body(request: &CreateContainerRequest) -> ContainerCreateBody {
    ContainerCreateBody {
        image: Some(request.image.clone()),
        cmd: request.cmd.clone(),
        env: (!request.env.is_empty()).then(|| request.env.clone()),
        working_dir: request.working_dir.clone(),
        labels: (!request.labels.is_empty()).then(|| request.labels.clone()),
        exposed_ports: request
            .published_port
            .map(|(container_port, _)| vec![port_key(container_port)]),
        host_config: Some(build_host_config(request)),
        ..ContainerCreateBody::default()
    }
}

fn build_host_config(request: &CreateContainerRequest) -> HostConfig {
    HostConfig {
        binds: (!request.binds.is_empty()).then(|| request.binds.clone()),
        port_bindings: request
            .published_port
            .map(|(container_port, host_port)| port_bindings(container_port, host_port)),
        network_mode: request.network.clone(),
        restart_policy: Some(RestartPolicy {
            name: Some(RestartPolicyNameEnum::UNLESS_STOPPED),
            maximum_retry_count: None,
        }),
        ..HostConfig::default()
    }
}

fn port_bindings(
    container_port: u16,
    host_port: HostPort,
) -> HashMap<String, Option<Vec<PortBinding>>> {
    HashMap::from([(
        port_key(container_port),
        Some(vec![PortBinding {
            host_ip: None,
            host_port: Some(host_port.binding_value()),
        }]),
    )])
}

/// The engine's key for a TCP container port (`5432/tcp`).
pub(super) fn port_key(container_port: u16) -> String {
    format!("{container_port}/tcp")
}
