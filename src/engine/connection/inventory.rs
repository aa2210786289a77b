//! Container and database inventory read back from the engine.

use bollard::models::ContainerSummary;
use bollard::query_parameters::ListContainersOptionsBuilder;
use tracing::debug;

use super::EngineConnector;
use super::client::ContainerInventoryClient;
use crate::error::{DockliteError, EngineError};
use crate::inventory::{DatabaseRecord, ManagedResource, ResourceParts, is_postgres_image};
use crate::metadata::{DatabaseMetadata, ResourceMetadata};
use crate::template::DATABASE_INTERNAL_PORT;

impl EngineConnector {
    /// List containers, optionally including ones that are not running.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ListFailed` if the engine rejects the listing.
    pub async fn list_containers_async<C: ContainerInventoryClient>(
        client: &C,
        include_stopped: bool,
    ) -> Result<Vec<ManagedResource>, DockliteError> {
        let summaries = list_summaries(client, include_stopped).await?;
        debug!(count = summaries.len(), include_stopped, "listed containers");
        Ok(summaries.into_iter().map(to_managed_resource).collect())
    }

    /// List every database container, running or not.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ListFailed` if the engine rejects the listing.
    pub async fn list_databases_async<C: ContainerInventoryClient>(
        client: &C,
    ) -> Result<Vec<DatabaseRecord>, DockliteError> {
        let summaries = list_summaries(client, true).await?;
        let databases: Vec<DatabaseRecord> = summaries
            .into_iter()
            .filter(is_database_entry)
            .map(|summary| to_database_record(&to_managed_resource(summary.clone()), &summary))
            .collect();
        debug!(count = databases.len(), "listed databases");
        Ok(databases)
    }
}

async fn list_summaries<C: ContainerInventoryClient>(
    client: &C,
    include_stopped: bool,
) -> Result<Vec<ContainerSummary>, DockliteError> {
    let options = ListContainersOptionsBuilder::new()
        .all(include_stopped)
        .build();
    client.list_containers(options).await.map_err(|error| {
        DockliteError::from(EngineError::ListFailed {
            message: error.to_string(),
        })
    })
}

/// Whether a list entry is a database.
///
/// Labelled databases match on their type or database-name label.
/// Unlabelled entries match when they run the Postgres image, which covers
/// containers created before labelling existed.
#[must_use]
pub fn is_database_entry(summary: &ContainerSummary) -> bool {
    let labelled = summary
        .labels
        .as_ref()
        .and_then(ResourceMetadata::from_labels)
        .is_some_and(|metadata| matches!(metadata, ResourceMetadata::Database(_)));
    if labelled {
        return true;
    }
    let unlabelled = summary.labels.as_ref().is_none_or(|labels| labels.is_empty());
    unlabelled && summary.image.as_deref().is_some_and(is_postgres_image)
}

fn to_managed_resource(summary: ContainerSummary) -> ManagedResource {
    let parts = ResourceParts {
        id: summary.id.unwrap_or_default(),
        names: summary.names.unwrap_or_default(),
        image: summary.image.unwrap_or_default(),
        state: summary
            .state
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        status: summary.status.unwrap_or_default(),
        created: summary.created.unwrap_or_default(),
    };
    ManagedResource::new(parts, summary.labels.unwrap_or_default())
}

fn to_database_record(resource: &ManagedResource, summary: &ContainerSummary) -> DatabaseRecord {
    let metadata = match &resource.metadata {
        Some(ResourceMetadata::Database(database)) => database.clone(),
        _ => DatabaseMetadata::default(),
    };
    DatabaseRecord {
        id: resource.id.clone(),
        name: metadata.database.unwrap_or_else(|| resource.name.clone()),
        port: metadata
            .port
            .or_else(|| first_published_database_port(summary))
            .unwrap_or(0),
        username: metadata.username.unwrap_or_default(),
        password: metadata.password.unwrap_or_default(),
        status: resource.status.clone(),
    }
}

fn first_published_database_port(summary: &ContainerSummary) -> Option<u16> {
    summary
        .ports
        .as_ref()?
        .iter()
        .filter(|port| port.private_port == DATABASE_INTERNAL_PORT)
        .find_map(|port| port.public_port.filter(|public| *public != 0))
}
