//! Site and database provisioning on a single-host container engine.
//!
//! `docklite` drives a Docker-compatible engine to run hosted websites
//! (static, PHP or Node) and Postgres databases behind a label-routed reverse
//! proxy. Every workload joins one shared bridge network and carries labels
//! that the proxy reads for routing and that inventory reads back to tell
//! sites, databases and unrelated containers apart.
//!
//! # Architecture
//!
//! The crate holds the engine socket and nothing else does. Callers (the
//! bundled CLI, or a web panel embedding the library) go through [`api`],
//! which validates input, bounds each engine interaction with a deadline and
//! returns library-owned types. Engine calls sit behind narrow client traits
//! in [`engine`], so every flow can be exercised against a mock.
//!
//! # Modules
//!
//! - [`api`]: Caller-facing operations with deadlines
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`credentials`]: Random database passwords and retry suffixes
//! - [`engine`]: Container engine connection and provisioning flows
//! - [`error`]: Semantic error types for the application
//! - [`inventory`]: Normalised views of engine container records
//! - [`metadata`]: Typed resource labels and proxy routing rules
//! - [`metrics`]: CPU and memory utilization from accounting snapshots
//! - [`naming`]: Domain and database name sanitisation
//! - [`site_files`]: Starter content for freshly provisioned sites
//! - [`template`]: Site template registry

pub mod api;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod metadata;
pub mod metrics;
pub mod naming;
pub mod site_files;
pub mod template;
