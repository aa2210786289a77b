//! Semantic error types for the docklite agent.
//!
//! This module defines the error hierarchy for docklite, following the
//! principle of using semantic error enums (via `thiserror`) for conditions the
//! caller might inspect, retry, or map to an HTTP status, while reserving opaque
//! errors (`eyre::Report`) for the application boundary.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Request-shape errors. These are never retried and are reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The site domain was empty after trimming.
    #[error("domain is required")]
    EmptyDomain,

    /// The site domain is not a plain hostname.
    #[error("domain contains invalid characters: {domain}")]
    InvalidDomain {
        /// The rejected domain.
        domain: String,
    },

    /// The requested site template is not one of the supported kinds.
    #[error("unsupported template type: {template}")]
    UnsupportedTemplate {
        /// The rejected template name.
        template: String,
    },

    /// A port fell outside `[1, 65535]`.
    #[error("invalid port: {port}")]
    InvalidPort {
        /// The rejected port.
        port: u32,
    },

    /// The database name was empty once sanitized.
    #[error("invalid database name: '{name}'")]
    InvalidDatabaseName {
        /// The name as supplied by the caller.
        name: String,
    },
}

/// Errors raised by the container engine or while talking to it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to connect to the container engine socket.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// The container engine socket was not found.
    #[error("container engine socket not found: {path}")]
    SocketNotFound {
        /// The path where the socket was expected.
        path: PathBuf,
    },

    /// Permission denied when accessing the container engine socket.
    #[error("permission denied accessing container socket: {path}")]
    PermissionDenied {
        /// The path to the socket.
        path: PathBuf,
    },

    /// Health check failed - engine did not respond correctly.
    #[error("container engine health check failed: {message}")]
    HealthCheckFailed {
        /// A description of the health check failure.
        message: String,
    },

    /// Health check timed out.
    #[error("container engine health check timed out after {seconds} seconds")]
    HealthCheckTimeout {
        /// The timeout duration in seconds.
        seconds: u64,
    },

    /// A Tokio runtime could not be created for a blocking helper.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime failure.
        message: String,
    },

    /// Listing or creating the shared network failed.
    #[error("failed to ensure network '{network}': {message}")]
    NetworkFailed {
        /// The network name.
        network: String,
        /// The engine's message.
        message: String,
    },

    /// Pulling an image failed.
    #[error("failed to pull image '{image}': {message}")]
    ImagePullFailed {
        /// The image reference.
        image: String,
        /// The engine's message.
        message: String,
    },

    /// The chosen container name is already taken.
    #[error("container name '{name}' is already in use: {message}")]
    Conflict {
        /// The conflicting container name.
        name: String,
        /// The engine's message.
        message: String,
    },

    /// Failed to create a container.
    #[error("failed to create container: {message}")]
    CreateFailed {
        /// A description of the creation failure.
        message: String,
    },

    /// Failed to start a container.
    #[error("failed to start container '{container_id}': {message}")]
    StartFailed {
        /// The ID of the container that failed to start.
        container_id: String,
        /// A description of the start failure.
        message: String,
    },

    /// A lifecycle or read operation on an existing container failed.
    #[error("failed to {operation} container '{container_id}': {message}")]
    OperationFailed {
        /// The operation name (`stop`, `inspect`, `logs`...).
        operation: &'static str,
        /// The target container.
        container_id: String,
        /// The engine's message.
        message: String,
    },

    /// Listing containers failed.
    #[error("failed to list containers: {message}")]
    ListFailed {
        /// The engine's message.
        message: String,
    },

    /// The engine returned no resource-accounting snapshot.
    #[error("no stats reported for container '{container_id}'")]
    StatsUnavailable {
        /// The queried container.
        container_id: String,
    },

    /// An engine interaction exceeded its deadline.
    #[error("{operation} timed out after {seconds} seconds")]
    Timeout {
        /// The operation that was aborted.
        operation: &'static str,
        /// The deadline in seconds.
        seconds: u64,
    },
}

/// Errors raised while generating one-shot credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The operating system random source could not be read.
    #[error("secure random source unavailable: {message}")]
    RandomSourceUnavailable {
        /// A description of the failure.
        message: String,
    },
}

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// Permission denied when accessing a path.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

/// Top-level error type for the docklite agent.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the crate. At the application boundary (main.rs), these
/// errors are converted to `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum DockliteError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The container engine rejected or failed an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Credential generation failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

impl DockliteError {
    /// Returns `true` when the error reports a container-name conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Engine(EngineError::Conflict { .. }))
    }
}

/// A specialised `Result` type for docklite operations.
pub type Result<T> = std::result::Result<T, DockliteError>;
