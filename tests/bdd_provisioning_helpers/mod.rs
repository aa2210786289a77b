//! Behavioural step helpers for site and database provisioning scenarios.

mod engine;
mod state;
mod steps;

pub use state::{ProvisioningState, provisioning_state};
