//! Image pulls drained to completion.

use bollard::errors::Error as BollardError;
use bollard::query_parameters::CreateImageOptionsBuilder;
use futures_util::StreamExt;
use tracing::info;

use super::EngineConnector;
use super::client::ImageClient;
use crate::error::{DockliteError, EngineError};

impl EngineConnector {
    /// Pull `image`, consuming every progress record before returning.
    ///
    /// The stream is read to its end even after an error record so the
    /// connection is left idle; the first error is the one reported. Every
    /// call pulls; the engine's content-addressed store makes repeats cheap.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ImagePullFailed` if the engine reports an error
    /// at any point in the pull stream.
    pub async fn ensure_image_async<C: ImageClient>(
        client: &C,
        image: &str,
    ) -> Result<(), DockliteError> {
        let options = CreateImageOptionsBuilder::new().from_image(image).build();
        let (records, first_error) = client
            .pull_image(options)
            .fold(
                (0_usize, None::<BollardError>),
                |(count, first_error), item| async move {
                    (count.saturating_add(1), first_error.or(item.err()))
                },
            )
            .await;
        if let Some(error) = first_error {
            return Err(EngineError::ImagePullFailed {
                image: String::from(image),
                message: error.to_string(),
            }
            .into());
        }
        info!(image, records, "pulled image");
        Ok(())
    }
}
