//! Upload validation: size, declared type, and aspect ratio.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. byte length against [`UploadConfig::max_size_bytes`]
//! 2. declared MIME type against [`UploadConfig::allowed_mime_types`]
//! 3. intrinsic aspect ratio against
//!    [`UploadConfig::required_aspect_ratio`] (image types only)
//!
//! Every rejection is reported through the validator's [`Notifier`] and
//! returned to the caller.

use std::io::Cursor;

use image::ImageDecoder;
use image::metadata::Orientation;
use tracing::{debug, warn};

use crate::notify::{NotificationKind, Notifier};
use crate::types::{AspectRatio, CandidateFile, Dimensions, FileSize, UploadConfig};

/// Failure to read an image's intrinsic dimensions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to decode image: {0}")]
pub struct DecodeError(pub String);

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        Self(err.to_string())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

/// Why a file was rejected.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    /// The file is larger than the configured limit.
    #[error("File size exceeds {limit}")]
    SizeExceeded {
        /// Actual file size.
        size: FileSize,
        /// Configured limit.
        limit: FileSize,
    },

    /// The declared type is not in the allowed set.
    #[error("File type {mime_type} is not allowed. Allowed types: {}", .allowed.join(", "))]
    TypeNotAllowed {
        /// Declared MIME type of the file.
        mime_type: String,
        /// The configured allowed set.
        allowed: Vec<String>,
    },

    /// The image shape is too far from the required ratio.
    #[error(
        "Image aspect ratio ({actual:.2}) doesn't match required ratio ({target:.2}). Please use a {ratio} image."
    )]
    AspectRatioMismatch {
        /// Measured width/height.
        actual: f64,
        /// Required width/height.
        target: f64,
        /// Required shape.
        ratio: AspectRatio,
    },

    /// The image could not be decoded to measure it.
    #[error("Failed to load image for validation")]
    DecodeFailure(#[source] DecodeError),
}

/// Coarse classification of a [`RejectReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectKind {
    SizeExceeded,
    TypeNotAllowed,
    AspectRatioMismatch,
    DecodeFailure,
}

impl RejectKind {
    /// Short label, e.g. for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SizeExceeded => "size exceeds limit",
            Self::TypeNotAllowed => "type not allowed",
            Self::AspectRatioMismatch => "ratio mismatch",
            Self::DecodeFailure => "decode failed",
        }
    }
}

impl RejectReason {
    /// Classification of this rejection.
    #[must_use]
    pub const fn kind(&self) -> RejectKind {
        match self {
            Self::SizeExceeded { .. } => RejectKind::SizeExceeded,
            Self::TypeNotAllowed { .. } => RejectKind::TypeNotAllowed,
            Self::AspectRatioMismatch { .. } => RejectKind::AspectRatioMismatch,
            Self::DecodeFailure(_) => RejectKind::DecodeFailure,
        }
    }
}

/// Outcome of validating one file.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Accepted,
    Rejected(RejectReason),
}

impl ValidationResult {
    /// Whether the file was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The rejection reason, if rejected.
    #[must_use]
    pub const fn reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

/// Reads the intrinsic dimensions of encoded image bytes.
#[allow(async_fn_in_trait)]
pub trait ImageProbe {
    /// Decode enough of `bytes` to report width and height.
    async fn probe(&self, bytes: &[u8]) -> Result<Dimensions, DecodeError>;
}

/// [`ImageProbe`] backed by the `image` crate.
///
/// Only parses the header, so probing is cheap even for large files.
/// Supports PNG, JPEG, BMP, and WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateProbe;

impl ImageProbe for ImageCrateProbe {
    async fn probe(&self, bytes: &[u8]) -> Result<Dimensions, DecodeError> {
        probe_dimensions(bytes)
    }
}

/// Read image dimensions, as displayed, from the header of `bytes`.
///
/// An EXIF orientation that turns the image a quarter turn swaps width
/// and height, matching what a browser renders. Missing or unreadable
/// orientation metadata counts as upright.
///
/// # Errors
///
/// Returns [`DecodeError`] if the format is unrecognized, the header is
/// malformed, or either dimension is zero.
pub fn probe_dimensions(bytes: &[u8]) -> Result<Dimensions, DecodeError> {
    let mut decoder = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError(format!("degenerate image size {width}x{height}")));
    }
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    if turns_quarter(orientation) {
        debug!(?orientation, width, height, "applying EXIF orientation");
        Ok(Dimensions::new(height, width))
    } else {
        Ok(Dimensions::new(width, height))
    }
}

/// Whether `orientation` swaps the displayed axes.
const fn turns_quarter(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Accepted files and rejection reasons from [`UploadValidator::validate_batch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Files that passed every check, in input order.
    pub accepted: Vec<CandidateFile>,
    /// One reason per rejected file, in input order.
    pub rejected: Vec<RejectReason>,
}

/// Validates candidate files against an [`UploadConfig`].
#[derive(Debug, Clone)]
pub struct UploadValidator<P, N> {
    probe: P,
    notifier: N,
}

impl<P: ImageProbe, N: Notifier> UploadValidator<P, N> {
    /// Create a validator from a decode capability and a notifier.
    pub const fn new(probe: P, notifier: N) -> Self {
        Self { probe, notifier }
    }

    /// The notifier rejections are reported to.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Validate one file.
    ///
    /// On rejection the reason is also sent to the notifier.
    #[allow(clippy::future_not_send)]
    pub async fn validate(&self, file: &CandidateFile, config: &UploadConfig) -> ValidationResult {
        match self.check(file, config).await {
            Ok(()) => {
                debug!(name = %file.name, mime = %file.mime_type, "upload accepted");
                ValidationResult::Accepted
            }
            Err(reason) => {
                warn!(
                    name = %file.name,
                    kind = reason.kind().label(),
                    "upload rejected: {reason}"
                );
                self.notifier
                    .notify(NotificationKind::Error, &reason.to_string());
                ValidationResult::Rejected(reason)
            }
        }
    }

    /// Validate every file independently.
    ///
    /// A rejected file never aborts the batch.
    #[allow(clippy::future_not_send)]
    pub async fn validate_batch(
        &self,
        files: impl IntoIterator<Item = CandidateFile>,
        config: &UploadConfig,
    ) -> Batch {
        let mut batch = Batch::default();
        for file in files {
            match self.validate(&file, config).await {
                ValidationResult::Accepted => batch.accepted.push(file),
                ValidationResult::Rejected(reason) => batch.rejected.push(reason),
            }
        }
        batch
    }

    #[allow(clippy::future_not_send)]
    async fn check(&self, file: &CandidateFile, config: &UploadConfig) -> Result<(), RejectReason> {
        if file.size() > config.max_size_bytes {
            return Err(RejectReason::SizeExceeded {
                size: FileSize(file.size()),
                limit: FileSize(config.max_size_bytes),
            });
        }

        if !config.allows(&file.mime_type) {
            return Err(RejectReason::TypeNotAllowed {
                mime_type: file.mime_type.clone(),
                allowed: config.allowed_mime_types.clone(),
            });
        }

        let Some(target) = config.required_aspect_ratio.target() else {
            return Ok(());
        };
        if !file.is_image() {
            return Ok(());
        }

        let dimensions = self
            .probe
            .probe(&file.bytes)
            .await
            .map_err(RejectReason::DecodeFailure)?;
        let actual = dimensions
            .ratio()
            .ok_or_else(|| RejectReason::DecodeFailure(DecodeError("zero height".into())))?;

        if (actual - target).abs() > config.aspect_tolerance {
            return Err(RejectReason::AspectRatioMismatch {
                actual,
                target,
                ratio: config.required_aspect_ratio,
            });
        }
        Ok(())
    }
}

/// Caption describing what the upload zone accepts.
///
/// e.g. `"Allowed types: image/png, image/jpeg • Max size: 5 MB • Ratio: 1:1"`.
#[must_use]
pub fn upload_hint(config: &UploadConfig) -> String {
    let mut parts = Vec::with_capacity(3);
    if !config.allowed_mime_types.is_empty() {
        parts.push(format!(
            "Allowed types: {}",
            config.allowed_mime_types.join(", ")
        ));
    }
    parts.push(format!("Max size: {}", FileSize(config.max_size_bytes)));
    if config.required_aspect_ratio != AspectRatio::None {
        parts.push(format!("Ratio: {}", config.required_aspect_ratio));
    }
    parts.join(" • ")
}
