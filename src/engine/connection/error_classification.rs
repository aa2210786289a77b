//! Classification of Bollard errors into semantic engine errors.
//!
//! Connection failures are narrowed to missing-socket and permission cases
//! where a socket path is known. Creation failures are split into name
//! conflicts, which callers may retry once, and everything else.

use std::path::Path;

use bollard::errors::Error as BollardError;

use crate::error::EngineError;

const HTTP_CONFLICT: u16 = 409;

/// Extract the filesystem path from a socket URI.
///
/// Returns `None` for HTTP endpoints and bare paths.
pub(super) fn extract_socket_path(socket_uri: &str) -> Option<&Path> {
    socket_uri
        .strip_prefix("unix://")
        .or_else(|| socket_uri.strip_prefix("npipe://"))
        .map(Path::new)
}

fn classify_io_error_kind(
    kind: std::io::ErrorKind,
    socket_path: Option<&Path>,
    error_msg: &str,
) -> EngineError {
    let connection_failed = || EngineError::ConnectionFailed {
        message: String::from(error_msg),
    };
    match kind {
        std::io::ErrorKind::PermissionDenied => {
            socket_path.map_or_else(connection_failed, |path| EngineError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        std::io::ErrorKind::NotFound => {
            socket_path.map_or_else(connection_failed, |path| EngineError::SocketNotFound {
                path: path.to_path_buf(),
            })
        }
        _ => connection_failed(),
    }
}

/// Classify a Bollard connection error.
///
/// Falls back to `ConnectionFailed` for unrecognised errors and for
/// endpoints without a filesystem path.
pub(super) fn classify_connection_error(
    bollard_error: &BollardError,
    socket_uri: &str,
) -> EngineError {
    let socket_path = extract_socket_path(socket_uri);
    let error_msg = bollard_error.to_string();

    match bollard_error {
        BollardError::SocketNotFoundError(_) => {
            if let Some(path) = socket_path {
                return EngineError::SocketNotFound {
                    path: path.to_path_buf(),
                };
            }
        }
        BollardError::IOError { err } => {
            let kind = io_error_kind_in_chain(err).unwrap_or_else(|| err.kind());
            return classify_io_error_kind(kind, socket_path, &error_msg);
        }
        _ => {}
    }

    if let Some(kind) = io_error_kind_in_chain(bollard_error) {
        return classify_io_error_kind(kind, socket_path, &error_msg);
    }

    EngineError::ConnectionFailed { message: error_msg }
}

/// Whether the engine rejected a create because the name is taken.
pub(super) fn is_name_conflict(error: &BollardError) -> bool {
    match error {
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => *status_code == HTTP_CONFLICT || message.contains("Conflict"),
        other => other.to_string().contains("Conflict"),
    }
}

/// Whether a network create failed only because the network exists.
pub(super) fn is_already_exists(error: &BollardError) -> bool {
    if is_name_conflict(error) {
        return true;
    }
    error.to_string().to_ascii_lowercase().contains("already exists")
}

/// Walk the error source chain looking for an `io::Error` kind.
fn io_error_kind_in_chain(error: &dyn std::error::Error) -> Option<std::io::ErrorKind> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = error.source();
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return Some(io_err.kind());
        }
        current = err.source();
    }
    None
}
