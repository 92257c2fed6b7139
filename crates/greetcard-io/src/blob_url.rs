//! Blob URL preview handles.
//!
//! Uploaded images are displayed through object URLs created from their
//! bytes.  [`BlobUrlStore`] is the browser [`PreviewStore`]: each
//! [`BlobUrl`] it hands out is revoked when the preview manager releases
//! it.

use greetcard_core::{CandidateFile, PreviewError, PreviewStore};
use wasm_bindgen::JsValue;

use crate::download::bytes_to_blob;

/// Errors that can occur during Blob URL creation.
#[derive(Debug, thiserror::Error)]
pub enum BlobUrlError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for BlobUrlError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// A live object URL.
///
/// Not `Clone`: the only way to end its life is handing it back to
/// [`PreviewStore::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// The URL, for use as an `<img src>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Create an object URL for `bytes` typed as `mime_type`.
///
/// The returned URL must be revoked via [`revoke_blob_url`] when no
/// longer needed to avoid memory leaks.
///
/// # Errors
///
/// Returns [`BlobUrlError::JsError`] if Blob or URL creation fails.
pub fn bytes_to_blob_url(bytes: &[u8], mime_type: &str) -> Result<String, BlobUrlError> {
    let blob = bytes_to_blob(bytes, mime_type)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;
    Ok(url)
}

/// Revoke a Blob URL previously created by [`bytes_to_blob_url`].
///
/// Best-effort: failures are silently ignored since the URL may have
/// already been revoked or garbage collected.
pub fn revoke_blob_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}

/// [`PreviewStore`] backed by `URL.createObjectURL`.
#[derive(Debug, Default)]
pub struct BlobUrlStore;

impl PreviewStore for BlobUrlStore {
    type Handle = BlobUrl;

    fn create(&mut self, file: &CandidateFile) -> Result<BlobUrl, PreviewError> {
        let url = bytes_to_blob_url(&file.bytes, &file.mime_type).map_err(|e| PreviewError {
            name: file.name.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(name = %file.name, %url, "preview url created");
        Ok(BlobUrl(url))
    }

    fn release(&mut self, handle: BlobUrl) {
        tracing::debug!(url = %handle.0, "preview url revoked");
        revoke_blob_url(&handle.0);
    }
}
