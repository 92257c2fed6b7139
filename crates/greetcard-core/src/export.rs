//! PNG export of the composed card.
//!
//! [`CompositeExporter`] is the command side of the download button: the
//! caller hands it the card's [`CompositeRegion`] capability and it
//! rasterizes, saves, and reports failures to the user. Nothing escapes
//! as an error the caller has to surface again.

use std::future::Future;
use std::time::Duration;

use image::ImageEncoder;
use tracing::{debug, info, warn};

use crate::notify::{NotificationKind, Notifier};

/// Name of the downloaded file.
pub const EXPORT_FILENAME: &str = "greeting-card.png";

/// Wait before the single readiness re-check in
/// [`CompositeExporter::request_export`].
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Shown when rasterizing or saving fails.
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download image.";

/// Shown when the card still isn't ready after the retry.
pub const NOT_READY_MESSAGE: &str =
    "Please wait a moment after uploading the image, then try again.";

/// Errors from exporting the card.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The region couldn't be turned into PNG bytes.
    #[error("failed to serialize card: {0}")]
    SerializationFailure(String),

    /// The region isn't mounted or its image hasn't loaded.
    #[error("card is not ready for export")]
    NotReady,

    /// The bytes couldn't be handed to the user.
    #[error("failed to save {filename}: {reason}")]
    SaveFailure {
        /// Target file name.
        filename: String,
        /// What went wrong.
        reason: String,
    },
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        Self::SerializationFailure(err.to_string())
    }
}

/// The visual area holding the image and overlaid text.
#[allow(async_fn_in_trait)]
pub trait CompositeRegion {
    /// Whether the region is mounted and can be rasterized.
    fn is_ready(&self) -> bool;

    /// Render the region to PNG bytes.
    async fn rasterize(&self) -> Result<Vec<u8>, ExportError>;
}

/// Hands finished bytes to the user (a browser download).
pub trait Saver {
    /// Save `bytes` as `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::SaveFailure`] if the save can't be started.
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), ExportError>;
}

impl<S: Saver + ?Sized> Saver for &S {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), ExportError> {
        (**self).save(bytes, filename)
    }
}

/// Rasterizes a [`CompositeRegion`] and saves it as [`EXPORT_FILENAME`].
#[derive(Debug, Clone)]
pub struct CompositeExporter<S, N> {
    saver: S,
    notifier: N,
    retry_delay: Duration,
}

impl<S: Saver, N: Notifier> CompositeExporter<S, N> {
    /// Create an exporter with the default [`RETRY_DELAY`].
    pub const fn new(saver: S, notifier: N) -> Self {
        Self {
            saver,
            notifier,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Override the readiness retry delay.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Export `region`, waiting once for it to become ready.
    ///
    /// If the region isn't ready, `delay(retry_delay)` is awaited and
    /// readiness is checked one more time. If it still isn't ready the
    /// user is asked to retry manually.
    ///
    /// Returns the number of PNG bytes saved. Any error has already been
    /// reported to the notifier.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotReady`] after the failed retry, or the
    /// error from [`download`](Self::download).
    #[allow(clippy::future_not_send)]
    pub async fn request_export<R, D, F>(&self, region: &R, delay: D) -> Result<usize, ExportError>
    where
        R: CompositeRegion,
        D: FnOnce(Duration) -> F,
        F: Future<Output = ()>,
    {
        if !region.is_ready() {
            debug!(delay = ?self.retry_delay, "card not ready; retrying once");
            delay(self.retry_delay).await;
            if !region.is_ready() {
                warn!("card still not ready; asking user to retry");
                self.notifier
                    .notify(NotificationKind::Error, NOT_READY_MESSAGE);
                return Err(ExportError::NotReady);
            }
        }
        self.download(region).await
    }

    /// Rasterize `region` and save it. One attempt, no retry.
    ///
    /// Returns the number of PNG bytes saved. Any error has already been
    /// reported to the notifier.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotReady`] if the region isn't ready, or the
    /// rasterization or save error.
    #[allow(clippy::future_not_send)]
    pub async fn download<R: CompositeRegion>(&self, region: &R) -> Result<usize, ExportError> {
        match self.try_download(region).await {
            Ok(len) => {
                info!(bytes = len, filename = EXPORT_FILENAME, "card exported");
                Ok(len)
            }
            Err(e) => {
                warn!("export failed: {e}");
                let message = if e == ExportError::NotReady {
                    NOT_READY_MESSAGE
                } else {
                    DOWNLOAD_FAILED_MESSAGE
                };
                self.notifier.notify(NotificationKind::Error, message);
                Err(e)
            }
        }
    }

    #[allow(clippy::future_not_send)]
    async fn try_download<R: CompositeRegion>(&self, region: &R) -> Result<usize, ExportError> {
        if !region.is_ready() {
            return Err(ExportError::NotReady);
        }
        let png = region.rasterize().await?;
        self.saver.save(&png, EXPORT_FILENAME)?;
        Ok(png.len())
    }
}

/// Encode RGBA8 pixels (e.g. canvas `ImageData`) as PNG.
///
/// # Errors
///
/// Returns [`ExportError::SerializationFailure`] if `rgba` is not exactly
/// `width * height * 4` bytes or encoding fails.
pub fn encode_rgba_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let expected = u64::from(width) * u64::from(height) * 4;
    if u64::try_from(rgba.len()).ok() != Some(expected) {
        return Err(ExportError::SerializationFailure(format!(
            "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
            rgba.len()
        )));
    }

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(rgba, width, height, image::ExtendedColorType::Rgba8)?;
    Ok(png_bytes)
}
