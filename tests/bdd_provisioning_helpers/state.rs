//! Shared behavioural-test state for provisioning scenarios.

use std::sync::Arc;

use docklite::config::AppConfig;
use docklite::engine::{CreatedContainer, ProvisionedDatabase};
use docklite::error::{DockliteError, EngineError};
use docklite::inventory::DatabaseRecord;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

use super::engine::RecordingEngine;

/// Step result type for provisioning BDD tests.
pub type StepResult<T> = Result<T, String>;

/// What the most recent operation produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A site container was created and started.
    Site(CreatedContainer),
    /// A database container was created and started.
    Database(ProvisionedDatabase),
    /// Database inventory was listed.
    Databases(Vec<DatabaseRecord>),
    /// The operation failed.
    Failed {
        /// The failure category.
        kind: FailureKind,
        /// Human-readable error message.
        message: String,
    },
}

/// Categorised failure outcomes for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Input was rejected before any engine call.
    Validation,
    /// The container name was still taken after the retry.
    Conflict,
    /// Any other failure kind.
    Other,
}

impl Outcome {
    /// Classify a library error for assertions.
    pub fn failed(error: &DockliteError) -> Self {
        let kind = match error {
            DockliteError::Validation(_) => FailureKind::Validation,
            DockliteError::Engine(EngineError::Conflict { .. }) => FailureKind::Conflict,
            _ => FailureKind::Other,
        };
        Self::Failed {
            kind,
            message: error.to_string(),
        }
    }
}

/// Shared scenario state for provisioning behavioural tests.
#[derive(Default, ScenarioState)]
pub struct ProvisioningState {
    /// Engine double shared by every step in the scenario.
    pub(crate) engine: Slot<RecordingEngine>,

    /// Configuration passed to each operation.
    pub(crate) config: Slot<AppConfig>,

    /// Host directory holding site content, when seeding is enabled.
    pub(crate) sites_root: Slot<Arc<TempDir>>,

    /// Outcome of the most recent operation.
    pub(crate) outcome: Slot<Outcome>,
}

/// Fixture providing fresh state for each provisioning scenario.
#[fixture]
pub fn provisioning_state() -> ProvisioningState {
    let state = ProvisioningState::default();
    let mut config = AppConfig::default();
    config.sites.seed_default_content = false;
    state.config.set(config);
    state.engine.set(RecordingEngine::default());
    state
}

impl ProvisioningState {
    /// The scenario's engine double.
    pub fn engine(&self) -> StepResult<RecordingEngine> {
        self.engine
            .get()
            .ok_or_else(|| String::from("engine should be initialised"))
    }

    /// The scenario's configuration.
    pub fn config(&self) -> StepResult<AppConfig> {
        self.config
            .get()
            .ok_or_else(|| String::from("config should be initialised"))
    }

    /// The outcome recorded by the last `when` step.
    pub fn outcome(&self) -> StepResult<Outcome> {
        self.outcome
            .get()
            .ok_or_else(|| String::from("operation outcome should be set"))
    }
}
