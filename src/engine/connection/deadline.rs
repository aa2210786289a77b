//! Deadlines around whole engine operations.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{DockliteError, EngineError};

/// Run `operation`, aborting it once `deadline` elapses.
///
/// The in-flight engine call is dropped on expiry. Anything it already
/// created on the engine is left in place.
///
/// # Errors
///
/// Returns `EngineError::Timeout` naming `operation_name` when the deadline
/// elapses, otherwise whatever `operation` returns.
pub async fn with_deadline<T, F>(
    operation_name: &'static str,
    deadline: Duration,
    operation: F,
) -> Result<T, DockliteError>
where
    F: Future<Output = Result<T, DockliteError>>,
{
    tokio::time::timeout(deadline, operation)
        .await
        .unwrap_or_else(|_| {
            warn!(
                operation = operation_name,
                seconds = deadline.as_secs(),
                "engine operation timed out"
            );
            Err(EngineError::Timeout {
                operation: operation_name,
                seconds: deadline.as_secs(),
            }
            .into())
        })
}
