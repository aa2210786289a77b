//! Start, stop, restart, remove, inspect, and logs for existing containers.

use bollard::models::ContainerInspectResponse;
use bollard::query_parameters::{LogsOptionsBuilder, RemoveContainerOptionsBuilder};
use tracing::info;

use super::EngineConnector;
use super::client::{ContainerLifecycleClient, ContainerLogsClient};
use crate::error::{DockliteError, EngineError};

/// A state transition applied to an existing container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    /// Start a created or stopped container.
    Start,
    /// Stop a running container.
    Stop,
    /// Restart a container.
    Restart,
    /// Force-remove a container, running or not.
    Remove,
}

impl ContainerAction {
    /// Operation name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Remove => "remove",
        }
    }
}

fn operation_failed(
    operation: &'static str,
    container_id: &str,
    error: &bollard::errors::Error,
) -> DockliteError {
    DockliteError::from(EngineError::OperationFailed {
        operation,
        container_id: String::from(container_id),
        message: error.to_string(),
    })
}

impl EngineConnector {
    /// Apply `action` to a container.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::OperationFailed` naming the action if the
    /// engine rejects it.
    pub async fn apply_action_async<C: ContainerLifecycleClient>(
        client: &C,
        container_id: &str,
        action: ContainerAction,
    ) -> Result<(), DockliteError> {
        let outcome = match action {
            ContainerAction::Start => client.start_container(container_id).await,
            ContainerAction::Stop => client.stop_container(container_id).await,
            ContainerAction::Restart => client.restart_container(container_id).await,
            ContainerAction::Remove => {
                let options = RemoveContainerOptionsBuilder::new().force(true).build();
                client.remove_container(container_id, options).await
            }
        };
        outcome.map_err(|error| operation_failed(action.as_str(), container_id, &error))?;
        info!(container_id, action = action.as_str(), "container action applied");
        Ok(())
    }

    /// Return the engine's raw view of a container.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::OperationFailed` if the container cannot be
    /// inspected.
    pub async fn inspect_async<C: ContainerLifecycleClient>(
        client: &C,
        container_id: &str,
    ) -> Result<ContainerInspectResponse, DockliteError> {
        client
            .inspect_container(container_id)
            .await
            .map_err(|error| operation_failed("inspect", container_id, &error))
    }

    /// Collect the last `tail` lines of stdout and stderr as one string.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::OperationFailed` if the engine rejects the
    /// request or the stream fails part-way.
    pub async fn logs_async<C: ContainerLogsClient>(
        client: &C,
        container_id: &str,
        tail: u32,
    ) -> Result<String, DockliteError> {
        let options = LogsOptionsBuilder::new()
            .stdout(true)
            .stderr(true)
            .tail(&tail.to_string())
            .build();
        let frames = client
            .logs(container_id, options)
            .await
            .map_err(|error| operation_failed("logs", container_id, &error))?;
        Ok(frames.iter().map(ToString::to_string).collect())
    }
}
