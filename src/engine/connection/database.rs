//! Database provisioning with generated credentials.

use bollard::models::ContainerInspectResponse;
use serde::Serialize;
use tracing::{info, warn};

use super::EngineConnector;
use super::client::{ContainerCreator, ContainerLifecycleClient, ImageClient, NetworkClient};
use super::create_container::{CreateContainerRequest, HostPort, NameDisambiguation, port_key};
use crate::credentials::resolve_credentials;
use crate::error::{DockliteError, ValidationError};
use crate::metadata::{DatabaseMetadata, ResourceMetadata};
use crate::naming::{database_container_name, sanitize_database_name};
use crate::template::{DATABASE_IMAGE, DATABASE_INTERNAL_PORT};

/// A validated database-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRequest {
    /// Sanitised logical database name.
    pub name: String,
    /// Requested user; blank selects the default.
    pub username: String,
    /// Requested password; blank generates one.
    pub password: String,
    /// Requested host port; 0 lets the engine choose.
    pub port: u16,
}

impl DatabaseRequest {
    /// Normalise and validate caller input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidDatabaseName` when nothing survives
    /// sanitisation and `ValidationError::InvalidPort` for a port above
    /// 65535.
    pub fn new(
        name: &str,
        username: &str,
        password: &str,
        port: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let sanitized = sanitize_database_name(name);
        if sanitized.is_empty() {
            return Err(ValidationError::InvalidDatabaseName {
                name: String::from(name.trim()),
            });
        }
        let port = match port {
            None => 0,
            Some(raw) => u16::try_from(raw).map_err(|_| ValidationError::InvalidPort { port: raw })?,
        };
        Ok(Self {
            name: sanitized,
            username: String::from(username.trim()),
            password: String::from(password),
            port,
        })
    }
}

/// Connection details of a freshly provisioned database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedDatabase {
    /// Engine-assigned identifier.
    pub id: String,
    /// Container name.
    pub name: String,
    /// Logical database name.
    pub database: String,
    /// Host port; 0 when the assigned port could not be determined.
    pub port: u16,
    /// Database user.
    pub username: String,
    /// Database password.
    pub password: String,
}

impl EngineConnector {
    /// Provision and start a Postgres container.
    ///
    /// Credentials are resolved before any engine call. When the engine
    /// picks the host port, the running container is inspected to learn
    /// it; an inspect failure is logged and reported as port 0.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::RandomSourceUnavailable` if a password must
    /// be generated and cannot be, otherwise the first engine failure among
    /// network ensure, image pull, create (after one conflict retry), and
    /// start.
    pub async fn create_database_async<C>(
        client: &C,
        request: &DatabaseRequest,
        network: &str,
    ) -> Result<ProvisionedDatabase, DockliteError>
    where
        C: NetworkClient + ImageClient + ContainerCreator + ContainerLifecycleClient,
    {
        let (username, password) = resolve_credentials(&request.username, &request.password)?;

        Self::ensure_network_async(client, network).await?;
        Self::ensure_image_async(client, DATABASE_IMAGE).await?;

        let metadata = DatabaseMetadata {
            database: Some(request.name.clone()),
            username: Some(username.clone()),
            password: Some(password.clone()),
            port: (request.port != 0).then_some(request.port),
        };
        let create_request =
            CreateContainerRequest::new(DATABASE_IMAGE, database_container_name(&request.name))
                .with_env(vec![
                    format!("POSTGRES_DB={}", request.name),
                    format!("POSTGRES_USER={username}"),
                    format!("POSTGRES_PASSWORD={password}"),
                ])
                .with_labels(ResourceMetadata::Database(metadata).to_labels())
                .with_published_port(
                    DATABASE_INTERNAL_PORT,
                    HostPort::from_requested(request.port),
                )
                .with_network(network);

        let container = Self::create_container_async(
            client,
            &create_request,
            NameDisambiguation::RandomSuffix,
        )
        .await?;
        Self::start_created_async(client, &container).await?;

        let port = if request.port == 0 {
            assigned_host_port(client, &container.id).await
        } else {
            request.port
        };
        info!(database = %request.name, id = %container.id, port, "database provisioned");

        Ok(ProvisionedDatabase {
            id: container.id,
            name: container.name,
            database: request.name.clone(),
            port,
            username,
            password,
        })
    }
}

async fn assigned_host_port<C: ContainerLifecycleClient>(client: &C, container_id: &str) -> u16 {
    match client.inspect_container(container_id).await {
        Ok(details) => published_port(&details).unwrap_or_else(|| {
            warn!(container_id, "engine reported no host port for database");
            0
        }),
        Err(error) => {
            warn!(container_id, error = %error, "could not inspect database for its host port");
            0
        }
    }
}

fn published_port(details: &ContainerInspectResponse) -> Option<u16> {
    details
        .network_settings
        .as_ref()?
        .ports
        .as_ref()?
        .get(&port_key(DATABASE_INTERNAL_PORT))?
        .as_ref()?
        .iter()
        .filter_map(|binding| binding.host_port.as_deref())
        .find_map(|port| port.parse::<u16>().ok().filter(|value| *value != 0))
}
