//! Selected files and their preview handles.
//!
//! A preview handle is a revocable reference to decoded image data
//! (a Blob object URL in the browser). [`PreviewStateManager`] owns every
//! handle it creates and hands each one back to its [`PreviewStore`]
//! exactly once: on removal, on replacement by a new selection, or when
//! the manager is dropped. [`PreviewStore::release`] takes the handle by
//! value, so a released handle cannot be used again.

use tracing::{debug, info, warn};

use crate::notify::{NotificationKind, Notifier};
use crate::types::{CandidateFile, UploadConfig};
use crate::validate::{ImageProbe, UploadValidator};

/// Failure to create a preview handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to create preview for {name}: {reason}")]
pub struct PreviewError {
    /// Name of the file the preview was for.
    pub name: String,
    /// What went wrong.
    pub reason: String,
}

/// Creates and releases preview handles.
pub trait PreviewStore {
    /// Opaque displayable reference.
    type Handle;

    /// Create a handle for `file`.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError`] if the backing resource can't be created.
    fn create(&mut self, file: &CandidateFile) -> Result<Self::Handle, PreviewError>;

    /// Release a handle created by [`create`](Self::create).
    fn release(&mut self, handle: Self::Handle);
}

/// One selected file and its preview, if it is an image.
#[derive(Debug)]
pub struct SelectedImage<H> {
    /// The accepted file.
    pub file: CandidateFile,
    /// Live preview handle. `None` for non-image files.
    pub preview: Option<H>,
}

/// Holds the current selection and guarantees preview cleanup.
///
/// In single-selection mode at most one entry is held and a new
/// accepted selection replaces it. In multi-selection mode accepted
/// files are appended.
pub struct PreviewStateManager<S: PreviewStore> {
    store: S,
    entries: Vec<SelectedImage<S::Handle>>,
    multiple: bool,
    input_generation: u64,
    on_ready: Option<Box<dyn FnMut(bool)>>,
}

impl<S: PreviewStore> PreviewStateManager<S> {
    /// Create an empty manager.
    pub const fn new(store: S, multiple: bool) -> Self {
        Self {
            store,
            entries: Vec::new(),
            multiple,
            input_generation: 0,
            on_ready: None,
        }
    }

    /// Register the "preview ready" observer.
    ///
    /// Called with `true` after a selection commits at least one file
    /// and with `false` after a removal.
    #[must_use]
    pub fn with_ready_observer(mut self, observer: impl FnMut(bool) + 'static) -> Self {
        self.on_ready = Some(Box::new(observer));
        self
    }

    /// Validate `files` and commit the accepted ones.
    ///
    /// Returns the number of entries added.
    #[allow(clippy::future_not_send)]
    pub async fn select<P, N>(
        &mut self,
        files: impl IntoIterator<Item = CandidateFile>,
        validator: &UploadValidator<P, N>,
        config: &UploadConfig,
    ) -> usize
    where
        P: ImageProbe,
        N: Notifier,
    {
        let batch = validator.validate_batch(files, config).await;
        self.commit(batch.accepted, validator.notifier())
    }

    /// Commit already-validated files.
    ///
    /// Creates one preview handle per image file. Files whose handle
    /// can't be created are reported through `notifier` and skipped. In
    /// single-selection mode only the first file is kept and the
    /// previous entry is released, but only once something new has
    /// actually been committed; an empty commit leaves state untouched.
    ///
    /// Returns the number of entries added.
    pub fn commit(&mut self, accepted: Vec<CandidateFile>, notifier: &impl Notifier) -> usize {
        let limit = if self.multiple { accepted.len() } else { 1 };

        let mut fresh = Vec::with_capacity(limit.min(accepted.len()));
        for file in accepted {
            if fresh.len() == limit {
                debug!(name = %file.name, "single selection; ignoring extra file");
                continue;
            }
            let preview = if file.is_image() {
                match self.store.create(&file) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!("{e}");
                        notifier.notify(NotificationKind::Error, &e.to_string());
                        continue;
                    }
                }
            } else {
                None
            };
            fresh.push(SelectedImage { file, preview });
        }

        if fresh.is_empty() {
            return 0;
        }
        if !self.multiple {
            self.release_all();
        }

        let added = fresh.len();
        self.entries.extend(fresh);
        info!(added, held = self.entries.len(), "selection committed");
        self.notify_ready(true);
        added
    }

    /// Remove the entry at `index`, releasing its preview.
    ///
    /// Returns the removed file, or `None` if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<CandidateFile> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        if let Some(handle) = entry.preview {
            self.store.release(handle);
        }
        self.input_generation = self.input_generation.wrapping_add(1);
        info!(index, held = self.entries.len(), "selection removed");
        self.notify_ready(false);
        Some(entry.file)
    }

    /// Release every preview and drop every entry.
    pub fn clear(&mut self) {
        self.release_all();
    }

    /// Entries in selection order.
    #[must_use]
    pub fn entries(&self) -> &[SelectedImage<S::Handle>] {
        &self.entries
    }

    /// The entry shown on the card.
    #[must_use]
    pub fn primary(&self) -> Option<&SelectedImage<S::Handle>> {
        self.entries.first()
    }

    /// Number of held entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether selections append instead of replace.
    #[must_use]
    pub const fn multiple(&self) -> bool {
        self.multiple
    }

    /// Bumped on every removal.
    ///
    /// Views key their file input on this so the input is recreated
    /// and the same file can be picked again.
    #[must_use]
    pub const fn input_generation(&self) -> u64 {
        self.input_generation
    }

    /// The backing preview store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn release_all(&mut self) {
        for entry in self.entries.drain(..) {
            if let Some(handle) = entry.preview {
                self.store.release(handle);
            }
        }
    }

    fn notify_ready(&mut self, ready: bool) {
        if let Some(observer) = self.on_ready.as_mut() {
            observer(ready);
        }
    }
}

impl<S: PreviewStore> Drop for PreviewStateManager<S> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use futures::executor::block_on;
    use proptest::prelude::*;

    use super::*;
    use crate::types::{AspectRatio, Dimensions};
    use crate::validate::DecodeError;

    /// Shared bookkeeping so tests can inspect the store after the
    /// manager has been dropped.
    #[derive(Debug, Default)]
    struct Ledger {
        next: u64,
        live: BTreeSet<u64>,
        released: Vec<u64>,
        double_releases: usize,
    }

    #[derive(Debug, Clone, Default)]
    struct CountingStore {
        ledger: Rc<RefCell<Ledger>>,
        fail_names: Vec<String>,
    }

    impl PreviewStore for CountingStore {
        type Handle = u64;

        fn create(&mut self, file: &CandidateFile) -> Result<u64, PreviewError> {
            if self.fail_names.contains(&file.name) {
                return Err(PreviewError {
                    name: file.name.clone(),
                    reason: "out of memory".into(),
                });
            }
            let mut ledger = self.ledger.borrow_mut();
            ledger.next += 1;
            let id = ledger.next;
            ledger.live.insert(id);
            Ok(id)
        }

        fn release(&mut self, handle: u64) {
            let mut ledger = self.ledger.borrow_mut();
            if !ledger.live.remove(&handle) {
                ledger.double_releases += 1;
            }
            ledger.released.push(handle);
        }
    }

    struct SquareProbe;

    impl ImageProbe for SquareProbe {
        async fn probe(&self, bytes: &[u8]) -> Result<Dimensions, DecodeError> {
            // First byte encodes the shape: 0 = square, 1 = tall, else garbage.
            match bytes.first() {
                Some(0) => Ok(Dimensions::new(100, 100)),
                Some(1) => Ok(Dimensions::new(100, 200)),
                _ => Err(DecodeError("garbage".into())),
            }
        }
    }

    fn good(name: &str) -> CandidateFile {
        CandidateFile::new(name, "image/png", vec![0])
    }

    fn bad(name: &str) -> CandidateFile {
        CandidateFile::new(name, "image/png", vec![1])
    }

    fn config() -> UploadConfig {
        UploadConfig::new(1024, ["image/png", "text/plain"], AspectRatio::Square).unwrap()
    }

    fn handles<S: PreviewStore<Handle = u64>>(manager: &PreviewStateManager<S>) -> Vec<u64> {
        manager.entries().iter().filter_map(|e| e.preview).collect()
    }

    #[test]
    fn select_counts_only_accepted_files() {
        let ready = Rc::new(RefCell::new(Vec::new()));
        let ready_log = Rc::clone(&ready);
        let mut manager = PreviewStateManager::new(CountingStore::default(), true)
            .with_ready_observer(move |r| ready_log.borrow_mut().push(r));
        let notes = RefCell::new(Vec::new());
        let validator = UploadValidator::new(SquareProbe, &notes);

        let added = block_on(manager.select(
            vec![good("a"), bad("b"), good("c"), bad("d")],
            &validator,
            &config(),
        ));

        assert_eq!(added, 2);
        assert_eq!(manager.len(), 2);
        assert_eq!(*ready.borrow(), [true]);
        assert_eq!(notes.borrow().len(), 2);
    }

    #[test]
    fn all_rejected_batch_does_not_signal_ready() {
        let ready = Rc::new(RefCell::new(Vec::new()));
        let ready_log = Rc::clone(&ready);
        let mut manager = PreviewStateManager::new(CountingStore::default(), false)
            .with_ready_observer(move |r| ready_log.borrow_mut().push(r));
        let notes = RefCell::new(Vec::new());
        let validator = UploadValidator::new(SquareProbe, &notes);

        let added = block_on(manager.select(vec![bad("x")], &validator, &config()));

        assert_eq!(added, 0);
        assert!(manager.is_empty());
        assert!(ready.borrow().is_empty());
    }

    #[test]
    fn rejected_batch_keeps_previous_selection_live() {
        let store = CountingStore::default();
        let ledger = Rc::clone(&store.ledger);
        let mut manager = PreviewStateManager::new(store, false);
        let notes = RefCell::new(Vec::new());
        let validator = UploadValidator::new(SquareProbe, &notes);

        block_on(manager.select(vec![good("a")], &validator, &config()));
        block_on(manager.select(vec![bad("b")], &validator, &config()));

        assert_eq!(manager.primary().unwrap().file.name, "a");
        assert_eq!(ledger.borrow().live.len(), 1);
    }

    #[test]
    fn single_mode_replaces_and_releases() {
        let store = CountingStore::default();
        let ledger = Rc::clone(&store.ledger);
        let mut manager = PreviewStateManager::new(store, false);
        let notes = RefCell::new(Vec::new());

        manager.commit(vec![good("a")], &notes);
        let first = handles(&manager);
        manager.commit(vec![good("b"), good("c")], &notes);

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.primary().unwrap().file.name, "b");
        assert_eq!(ledger.borrow().released, first);
        assert_eq!(ledger.borrow().live.len(), 1);
    }

    #[test]
    fn multi_mode_appends() {
        let store = CountingStore::default();
        let ledger = Rc::clone(&store.ledger);
        let mut manager = PreviewStateManager::new(store, true);
        let notes = RefCell::new(Vec::new());

        manager.commit(vec![good("a")], &notes);
        manager.commit(vec![good("b"), good("c")], &notes);

        let names: Vec<_> = manager.entries().iter().map(|e| e.file.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(ledger.borrow().released.is_empty());
        assert_eq!(ledger.borrow().live.len(), 3);
    }

    #[test]
    fn non_image_files_get_no_preview() {
        let mut manager = PreviewStateManager::new(CountingStore::default(), true);
        let notes = RefCell::new(Vec::new());
        manager.commit(
            vec![CandidateFile::new("note.txt", "text/plain", b"hi".to_vec())],
            &notes,
        );
        assert_eq!(manager.len(), 1);
        assert!(manager.primary().unwrap().preview.is_none());
    }

    #[test]
    fn preview_creation_failure_is_reported_and_skipped() {
        let store = CountingStore {
            fail_names: vec!["broken".into()],
            ..CountingStore::default()
        };
        let mut manager = PreviewStateManager::new(store, true);
        let notes = RefCell::new(Vec::new());

        let added = manager.commit(vec![good("broken"), good("fine")], &notes);

        assert_eq!(added, 1);
        assert_eq!(manager.primary().unwrap().file.name, "fine");
        assert_eq!(
            notes.borrow()[0].message,
            "failed to create preview for broken: out of memory"
        );
    }

    #[test]
    fn remove_releases_and_signals_not_ready() {
        let store = CountingStore::default();
        let ledger = Rc::clone(&store.ledger);
        let ready = Rc::new(RefCell::new(Vec::new()));
        let ready_log = Rc::clone(&ready);
        let mut manager =
            PreviewStateManager::new(store, true).with_ready_observer(move |r| {
                ready_log.borrow_mut().push(r);
            });
        let notes = RefCell::new(Vec::new());
        manager.commit(vec![good("a"), good("b")], &notes);
        let before = handles(&manager);
        let generation = manager.input_generation();

        let removed = manager.remove(0).unwrap();

        assert_eq!(removed.name, "a");
        assert_eq!(manager.len(), 1);
        assert_eq!(ledger.borrow().released, [before[0]]);
        assert!(!handles(&manager).contains(&before[0]));
        assert_eq!(manager.input_generation(), generation + 1);
        assert_eq!(*ready.borrow(), [true, false]);
    }

    #[test]
    fn remove_out_of_range_is_a_no_op() {
        let mut manager = PreviewStateManager::new(CountingStore::default(), false);
        assert!(manager.remove(3).is_none());
        assert_eq!(manager.input_generation(), 0);
    }

    #[test]
    fn drop_releases_everything() {
        let store = CountingStore::default();
        let ledger = Rc::clone(&store.ledger);
        {
            let mut manager = PreviewStateManager::new(store, true);
            let notes = RefCell::new(Vec::new());
            manager.commit(vec![good("a"), good("b"), good("c")], &notes);
        }
        let ledger = ledger.borrow();
        assert!(ledger.live.is_empty());
        assert_eq!(ledger.released.len(), 3);
        assert_eq!(ledger.double_releases, 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Commit(Vec<bool>),
        Remove(usize),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::collection::vec(any::<bool>(), 0..4).prop_map(Op::Commit),
            (0usize..5).prop_map(Op::Remove),
            Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn every_handle_is_released_exactly_once(
            multiple in any::<bool>(),
            ops in prop::collection::vec(op(), 0..24),
        ) {
            let store = CountingStore::default();
            let ledger = Rc::clone(&store.ledger);
            {
                let mut manager = PreviewStateManager::new(store, multiple);
                let notes = RefCell::new(Vec::new());
                for op in ops {
                    match op {
                        Op::Commit(kinds) => {
                            let files = kinds
                                .into_iter()
                                .enumerate()
                                .map(|(i, image)| {
                                    if image {
                                        good(&format!("f{i}"))
                                    } else {
                                        CandidateFile::new("t.txt", "text/plain", vec![])
                                    }
                                })
                                .collect();
                            manager.commit(files, &notes);
                        }
                        Op::Remove(i) => {
                            manager.remove(i);
                        }
                        Op::Clear => manager.clear(),
                    }

                    let held = handles(&manager);
                    let unique: BTreeSet<u64> = held.iter().copied().collect();
                    prop_assert_eq!(unique.len(), held.len());
                    prop_assert_eq!(&unique, &ledger.borrow().live);
                    if !multiple {
                        prop_assert!(manager.len() <= 1);
                    }
                }
            }
            let ledger = ledger.borrow();
            prop_assert!(ledger.live.is_empty());
            prop_assert_eq!(ledger.double_releases, 0);
            prop_assert_eq!(ledger.released.len() as u64, ledger.next);
        }
    }
}
