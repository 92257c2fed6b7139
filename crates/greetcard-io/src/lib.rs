//! greetcard-io: Browser I/O and Dioxus component library.
//!
//! Implements the `greetcard-core` capabilities for the browser (Blob
//! URL previews, canvas rasterization, Blob downloads, toast
//! notifications) and provides the UI components of the greetcard web
//! application.

pub mod blob_url;
pub mod components;
pub mod download;
pub mod raster;
pub mod toast;

pub use blob_url::{BlobUrl, BlobUrlStore};
pub use components::{DownloadButton, FileUpload, GreetingCard, GreetingForm, Toaster};
pub use download::BrowserDownload;
pub use raster::CanvasRegion;
pub use toast::{ToastNotifier, ToastQueue};

/// Application state with browser preview handles.
pub type AppState = greetcard_core::CardState<BlobUrlStore>;
