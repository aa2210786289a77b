//! Idempotent creation of the shared isolated network.

use std::collections::HashMap;

use bollard::models::NetworkCreateRequest;
use tracing::{debug, info};

use super::EngineConnector;
use super::client::NetworkClient;
use super::error_classification::is_already_exists;
use crate::error::{DockliteError, EngineError};
use crate::metadata::MANAGED_LABEL;

const BRIDGE_DRIVER: &str = "bridge";

impl EngineConnector {
    /// Ensure a network named exactly `name` exists.
    ///
    /// Safe to call concurrently: a create that loses the race to another
    /// caller is treated as success.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NetworkFailed` if listing fails or the engine
    /// rejects the create for any reason other than the network existing.
    pub async fn ensure_network_async<C: NetworkClient>(
        client: &C,
        name: &str,
    ) -> Result<(), DockliteError> {
        let network_failed = |message: String| {
            DockliteError::from(EngineError::NetworkFailed {
                network: String::from(name),
                message,
            })
        };

        let existing = client
            .list_networks()
            .await
            .map_err(|error| network_failed(error.to_string()))?;
        if existing
            .iter()
            .any(|network| network.name.as_deref() == Some(name))
        {
            debug!(network = name, "network already present");
            return Ok(());
        }

        match client.create_network(network_request(name)).await {
            Ok(()) => {
                info!(network = name, "created network");
                Ok(())
            }
            Err(error) if is_already_exists(&error) => {
                debug!(network = name, "network created concurrently");
                Ok(())
            }
            Err(error) => Err(network_failed(error.to_string())),
        }
    }
}

fn network_request(name: &str) -> NetworkCreateRequest {
    NetworkCreateRequest {
        name: String::from(name),
        driver: Some(String::from(BRIDGE_DRIVER)),
        labels: Some(HashMap::from([(
            String::from(MANAGED_LABEL),
            String::from("true"),
        )])),
        ..NetworkCreateRequest::default()
    }
}
