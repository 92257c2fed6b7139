//! Shared types for greeting card uploads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default upper bound on upload size (5 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Default allowed deviation between an image's ratio and the target.
pub const DEFAULT_ASPECT_TOLERANCE: f64 = 0.1;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new set of dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    ///
    /// Returns `None` for a zero height.
    #[must_use]
    pub fn ratio(self) -> Option<f64> {
        (self.height != 0).then(|| f64::from(self.width) / f64::from(self.height))
    }
}

/// Card shape an uploaded image must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 1:1.
    Square,
    /// 5:7 portrait.
    Tall,
    /// Any shape is accepted.
    #[default]
    None,
}

impl AspectRatio {
    /// Width/height ratio the image must approximate, if any.
    #[must_use]
    pub const fn target(self) -> Option<f64> {
        match self {
            Self::Square => Some(1.0),
            Self::Tall => Some(5.0 / 7.0),
            Self::None => None,
        }
    }

    /// Ratio notation shown to users (`"1:1"`, `"5:7"`, or empty).
    #[must_use]
    pub const fn notation(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Tall => "5:7",
            Self::None => "",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

impl FromStr for AspectRatio {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" | "square" => Ok(Self::Square),
            "5:7" | "tall" => Ok(Self::Tall),
            "" | "none" => Ok(Self::None),
            other => Err(ConfigError::UnknownAspectRatio(other.to_owned())),
        }
    }
}

/// Errors from building an [`UploadConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `max_size_bytes` was zero.
    #[error("maximum upload size must be positive")]
    ZeroMaxSize,

    /// The aspect tolerance was negative, NaN, or infinite.
    #[error("aspect tolerance must be a finite non-negative number, got {0}")]
    InvalidTolerance(f64),

    /// An aspect ratio string was not recognized.
    #[error("unknown aspect ratio: {0:?} (expected \"1:1\", \"5:7\", or empty)")]
    UnknownAspectRatio(String),
}

/// Upload validation settings.
///
/// `allowed_mime_types` is treated as a set; an empty list allows every
/// type. Order is preserved only so error messages list types the way
/// they were configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Files larger than this are rejected.
    pub max_size_bytes: u64,

    /// Declared MIME types that may be uploaded. Empty allows all.
    pub allowed_mime_types: Vec<String>,

    /// Shape the image must match.
    pub required_aspect_ratio: AspectRatio,

    /// Maximum `|ratio - target|` before an image is rejected.
    pub aspect_tolerance: f64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            allowed_mime_types: Vec::new(),
            required_aspect_ratio: AspectRatio::None,
            aspect_tolerance: DEFAULT_ASPECT_TOLERANCE,
        }
    }
}

impl UploadConfig {
    /// Build a validated configuration with the default tolerance.
    ///
    /// Duplicate MIME types are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMaxSize`] if `max_size_bytes` is zero.
    pub fn new<I, S>(
        max_size_bytes: u64,
        allowed_mime_types: I,
        required_aspect_ratio: AspectRatio,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowed: Vec<String> = Vec::new();
        for mime in allowed_mime_types {
            let mime = mime.into();
            if !allowed.iter().any(|m| m.eq_ignore_ascii_case(&mime)) {
                allowed.push(mime);
            }
        }
        let config = Self {
            max_size_bytes,
            allowed_mime_types: allowed,
            required_aspect_ratio,
            aspect_tolerance: DEFAULT_ASPECT_TOLERANCE,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the aspect tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTolerance`] for negative or
    /// non-finite values.
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        self.aspect_tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size_bytes == 0 {
            return Err(ConfigError::ZeroMaxSize);
        }
        if !self.aspect_tolerance.is_finite() || self.aspect_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.aspect_tolerance));
        }
        Ok(())
    }

    /// Whether `mime_type` passes the type check.
    #[must_use]
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.is_empty()
            || self
                .allowed_mime_types
                .iter()
                .any(|m| m.eq_ignore_ascii_case(mime_type))
    }
}

/// A file the user picked or dropped, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// File name as reported by the browser.
    pub name: String,
    /// Declared MIME type (may be empty when the browser doesn't know).
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    /// Create a new candidate file.
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Byte length of the file.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }

    /// Whether the declared type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// A byte count that displays in human units (`"5 MB"`, `"1.5 KB"`).
///
/// Units are 1024-based and capped at GB; values keep at most two
/// decimals with trailing zeros removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileSize(pub u64);

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

        if self.0 == 0 {
            return f.write_str("0 Bytes");
        }

        #[expect(clippy::cast_precision_loss)]
        let mut value = self.0 as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        let rounded = format!("{value:.2}");
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{trimmed} {}", UNITS[unit])
    }
}

/// Render `bytes` the way messages and hints show sizes.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    FileSize(bytes).to_string()
}
