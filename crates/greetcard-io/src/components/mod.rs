//! Dioxus UI components for greetcard.
//!
//! Provides the upload zone, card preview, greeting form, download
//! button, and toast stack.

mod card;
mod export;
mod form;
mod toaster;
mod upload;

pub use card::GreetingCard;
pub use export::DownloadButton;
pub use form::GreetingForm;
pub use toaster::Toaster;
pub use upload::FileUpload;
