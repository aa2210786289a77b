//! Records reconstructed from engine-reported container state.
//!
//! Nothing here is persisted. Every listing rebuilds these values from what
//! the engine reports at that moment.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metadata::{MANAGED_LABEL, ResourceMetadata};
use crate::template::WorkloadKind;

/// Coarse lifecycle state of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Created but never started.
    Created,
    /// Running or restarting.
    Running,
    /// Exited, paused, or otherwise not running.
    Stopped,
    /// Being removed or dead.
    Removed,
}

impl LifecycleState {
    /// Map an engine state string (`running`, `exited`...) to a state.
    #[must_use]
    pub fn from_engine(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "running" | "restarting" => Self::Running,
            "removing" | "dead" => Self::Removed,
            _ => Self::Stopped,
        }
    }
}

/// A container as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagedResource {
    /// Engine-assigned identifier.
    pub id: String,
    /// Display name without the leading `/`.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Workload kind from the `docklite.type` label.
    pub kind: Option<WorkloadKind>,
    /// Lifecycle state.
    pub state: LifecycleState,
    /// Human-readable engine status (`Up 3 minutes`).
    pub status: String,
    /// Whether docklite created this container.
    pub managed: bool,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Raw label set.
    pub labels: HashMap<String, String>,
    /// Labels decoded once into typed metadata.
    #[serde(skip)]
    pub metadata: Option<ResourceMetadata>,
}

impl ManagedResource {
    /// Assemble a record, decoding metadata from `labels`.
    #[must_use]
    pub fn new(parts: ResourceParts, labels: HashMap<String, String>) -> Self {
        let kind = labels
            .get(crate::metadata::TYPE_LABEL)
            .and_then(|value| WorkloadKind::from_label(value));
        let managed = labels.get(MANAGED_LABEL).is_some_and(|value| value == "true");
        let metadata = ResourceMetadata::from_labels(&labels);
        Self {
            id: parts.id,
            name: display_name(&parts.names),
            image: parts.image,
            kind,
            state: LifecycleState::from_engine(&parts.state),
            status: parts.status,
            managed,
            created: DateTime::from_timestamp(parts.created, 0),
            labels,
            metadata,
        }
    }
}

/// Unlabelled fields of an engine list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceParts {
    /// Engine-assigned identifier.
    pub id: String,
    /// Names as reported, usually with a leading `/`.
    pub names: Vec<String>,
    /// Image reference.
    pub image: String,
    /// Engine state string.
    pub state: String,
    /// Engine status string.
    pub status: String,
    /// Creation time as Unix seconds.
    pub created: i64,
}

/// A database instance as seen through inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseRecord {
    /// Engine-assigned identifier.
    pub id: String,
    /// Logical database name, or the container name for legacy entries.
    pub name: String,
    /// Host port; 0 when not published or not yet known.
    pub port: u16,
    /// Database user.
    pub username: String,
    /// Database password, in plaintext.
    pub password: String,
    /// Human-readable engine status.
    pub status: String,
}

/// Strip the leading name separator from the first reported name.
fn display_name(names: &[String]) -> String {
    names
        .first()
        .map(|name| String::from(name.strip_prefix('/').unwrap_or(name)))
        .unwrap_or_default()
}

/// Whether an image reference names the Postgres image, any registry or tag.
#[must_use]
pub fn is_postgres_image(image: &str) -> bool {
    let without_digest = image.split('@').next().unwrap_or(image);
    let repository = without_digest.rsplit('/').next().unwrap_or(without_digest);
    let name = repository.split(':').next().unwrap_or(repository);
    name == "postgres"
}
