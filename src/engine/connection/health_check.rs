//! Engine liveness checks and runtime construction.

use std::time::Duration;

use bollard::Docker;
use tracing::debug;

use super::{EngineConnector, HEALTH_CHECK_TIMEOUT_SECS};
use crate::error::{DockliteError, EngineError};

impl EngineConnector {
    /// Verify the container engine is responsive.
    ///
    /// A successful ping confirms the engine is operational, not just that
    /// the socket is reachable.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::HealthCheckFailed` if the engine answers with an
    /// error and `EngineError::HealthCheckTimeout` if it does not answer
    /// within ten seconds.
    pub async fn health_check_async(docker: &Docker) -> Result<(), DockliteError> {
        let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

        tokio::time::timeout(timeout, docker.ping())
            .await
            .map_err(|_| EngineError::HealthCheckTimeout {
                seconds: HEALTH_CHECK_TIMEOUT_SECS,
            })?
            .map_err(|e| EngineError::HealthCheckFailed {
                message: e.to_string(),
            })?;
        debug!("container engine answered ping");
        Ok(())
    }

    /// Create a Tokio runtime for a synchronous caller.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::RuntimeCreationFailed` if the runtime cannot be
    /// built.
    pub fn create_runtime() -> Result<tokio::runtime::Runtime, DockliteError> {
        tokio::runtime::Runtime::new().map_err(|e| {
            DockliteError::from(EngineError::RuntimeCreationFailed {
                message: e.to_string(),
            })
        })
    }
}
