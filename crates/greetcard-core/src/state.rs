//! Application state owned by the root of the UI.
//!
//! Views read from [`CardState`] and mutate it only through its
//! methods; the upload config is fixed for the state's lifetime.

use crate::form::{Field, FieldUpdate, FormState, GreetingFields};
use crate::notify::Notifier;
use crate::preview::{PreviewStateManager, PreviewStore};
use crate::types::{CandidateFile, UploadConfig};
use crate::validate::Batch;

/// Everything the card editor knows.
pub struct CardState<S: PreviewStore> {
    config: UploadConfig,
    previews: PreviewStateManager<S>,
    form: FormState,
}

impl<S: PreviewStore> CardState<S> {
    /// Create state with an empty form.
    #[must_use]
    pub fn new(config: UploadConfig, previews: PreviewStateManager<S>) -> Self {
        Self {
            config,
            previews,
            form: FormState::new(),
        }
    }

    /// Upload validation settings.
    #[must_use]
    pub const fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Current selection.
    #[must_use]
    pub const fn previews(&self) -> &PreviewStateManager<S> {
        &self.previews
    }

    /// Current greeting text.
    #[must_use]
    pub const fn fields(&self) -> &GreetingFields {
        self.form.fields()
    }

    /// Character count of `field`.
    #[must_use]
    pub fn char_count(&self, field: Field) -> usize {
        self.form.char_count(field)
    }

    /// Change one greeting field.
    pub fn set_field(&mut self, field: Field, value: &str) -> FieldUpdate {
        self.form.set_field(field, value)
    }

    /// Log and reset the greeting text.
    pub fn submit(&mut self) -> GreetingFields {
        self.form.submit()
    }

    /// Commit a validated batch to the selection.
    pub fn commit(&mut self, batch: Batch, notifier: &impl Notifier) -> usize {
        self.previews.commit(batch.accepted, notifier)
    }

    /// Remove a selected file.
    pub fn remove(&mut self, index: usize) -> Option<CandidateFile> {
        self.previews.remove(index)
    }

    /// Preview handle of the image shown on the card.
    #[must_use]
    pub fn card_image(&self) -> Option<&S::Handle> {
        self.previews.primary().and_then(|entry| entry.preview.as_ref())
    }

    /// Whether there's an image to export.
    #[must_use]
    pub fn can_download(&self) -> bool {
        self.card_image().is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::preview::PreviewError;

    #[derive(Default)]
    struct NameStore;

    impl PreviewStore for NameStore {
        type Handle = String;

        fn create(&mut self, file: &CandidateFile) -> Result<String, PreviewError> {
            Ok(format!("preview:{}", file.name))
        }

        fn release(&mut self, _handle: String) {}
    }

    fn state() -> CardState<NameStore> {
        CardState::new(
            UploadConfig::default(),
            PreviewStateManager::new(NameStore, false),
        )
    }

    #[test]
    fn download_needs_an_image() {
        let mut state = state();
        assert!(!state.can_download());

        let notes = RefCell::new(Vec::new());
        let batch = Batch {
            accepted: vec![CandidateFile::new("a.png", "image/png", vec![1])],
            rejected: Vec::new(),
        };
        state.commit(batch, &notes);
        assert_eq!(state.card_image().map(String::as_str), Some("preview:a.png"));
        assert!(state.can_download());

        state.remove(0);
        assert!(!state.can_download());
    }

    #[test]
    fn non_image_selection_cannot_be_downloaded() {
        let mut state = state();
        let notes = RefCell::new(Vec::new());
        let batch = Batch {
            accepted: vec![CandidateFile::new("a.txt", "text/plain", vec![1])],
            rejected: Vec::new(),
        };
        state.commit(batch, &notes);
        assert_eq!(state.previews().len(), 1);
        assert!(!state.can_download());
    }

    #[test]
    fn fields_flow_through_form() {
        let mut state = state();
        state.set_field(Field::Message, "Congrats");
        assert_eq!(state.fields().message(), "Congrats");
        assert_eq!(state.char_count(Field::Message), 8);
        state.submit();
        assert_eq!(state.fields().message(), "");
    }
}
