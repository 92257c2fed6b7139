//! greetcard-core: Greeting card composition logic (sans-IO).
//!
//! Validates uploaded images, tracks the selected files and their
//! preview handles, holds the greeting text, lays the text out over the
//! card, and orchestrates PNG export.
//!
//! This crate has **no browser dependencies** -- every capability that
//! needs the outside world (decoding, preview URLs, rasterization,
//! saving, notifications) is a trait implemented by `greetcard-io`.

pub mod export;
pub mod form;
pub mod layout;
pub mod notify;
pub mod preview;
pub mod state;
pub mod types;
pub mod validate;

pub use export::{
    CompositeExporter, CompositeRegion, EXPORT_FILENAME, ExportError, RETRY_DELAY, Saver,
    encode_rgba_png,
};
pub use form::{Field, FieldUpdate, FormState, GreetingFields, UnknownField};
pub use layout::{
    CardLayout, FONT_FAMILY, SourceRect, TEXT_COLOR, TextLine, TextStyle, cover_crop,
};
pub use notify::{Notification, NotificationKind, Notifier};
pub use preview::{PreviewError, PreviewStateManager, PreviewStore, SelectedImage};
pub use state::CardState;
pub use types::{
    AspectRatio, CandidateFile, ConfigError, Dimensions, FileSize, UploadConfig, format_file_size,
};
pub use validate::{
    Batch, DecodeError, ImageCrateProbe, ImageProbe, RejectKind, RejectReason, UploadValidator,
    ValidationResult, upload_hint,
};
