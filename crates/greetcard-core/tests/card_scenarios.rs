//! Integration test: real PNG uploads through validation, selection,
//! text entry, and export.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::{Cell, RefCell};

use futures::executor::block_on;
use greetcard_core::{
    AspectRatio, CandidateFile, CardState, CompositeExporter, CompositeRegion, EXPORT_FILENAME,
    ExportError, Field, ImageCrateProbe, Notification, PreviewError, PreviewStateManager,
    PreviewStore, RejectKind, Saver, UploadConfig, UploadValidator, ValidationResult,
    encode_rgba_png,
};

const MB: usize = 1024 * 1024;

/// Encode a `width` x `height` PNG and pad it with trailing bytes to
/// `total_len`. Decoders stop at the header, so padding only changes
/// the file size.
fn padded_png(width: u32, height: u32, total_len: usize) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )
    .unwrap();
    assert!(buf.len() <= total_len, "encoded PNG larger than requested size");
    buf.resize(total_len, 0);
    buf
}

fn config() -> UploadConfig {
    UploadConfig::new(5 * MB as u64, ["image/png"], AspectRatio::Square).unwrap()
}

fn validate(file: &CandidateFile) -> (ValidationResult, Vec<Notification>) {
    let notes = RefCell::new(Vec::new());
    let result = {
        let validator = UploadValidator::new(ImageCrateProbe, &notes);
        block_on(validator.validate(file, &config()))
    };
    (result, notes.into_inner())
}

fn kind(result: &ValidationResult) -> Option<RejectKind> {
    result.reason().map(greetcard_core::RejectReason::kind)
}

#[test]
fn two_megabyte_square_png_is_accepted() {
    let file = CandidateFile::new("card.png", "image/png", padded_png(500, 500, 2 * MB));
    let (result, notes) = validate(&file);
    assert!(result.is_accepted(), "got {result:?}");
    assert!(notes.is_empty());
}

#[test]
fn portrait_png_is_a_ratio_mismatch() {
    let file = CandidateFile::new("card.png", "image/png", padded_png(400, 600, 2 * MB));
    let (result, notes) = validate(&file);
    assert_eq!(kind(&result), Some(RejectKind::AspectRatioMismatch));
    assert_eq!(RejectKind::AspectRatioMismatch.label(), "ratio mismatch");
    assert_eq!(notes.len(), 1);
}

#[test]
fn gif_type_is_not_allowed() {
    let file = CandidateFile::new("card.gif", "image/gif", padded_png(500, 500, 2 * MB));
    let (result, _) = validate(&file);
    assert_eq!(kind(&result), Some(RejectKind::TypeNotAllowed));
}

#[test]
fn six_megabyte_png_exceeds_size() {
    let file = CandidateFile::new("card.png", "image/png", padded_png(500, 500, 6 * MB));
    let (result, notes) = validate(&file);
    assert_eq!(kind(&result), Some(RejectKind::SizeExceeded));
    assert_eq!(notes[0].message, "File size exceeds 5 MB");
}

#[test]
fn corrupt_png_fails_to_decode() {
    let file = CandidateFile::new("card.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    let (result, _) = validate(&file);
    assert_eq!(kind(&result), Some(RejectKind::DecodeFailure));
}

/// Preview store whose handles are sequence numbers.
#[derive(Default)]
struct SeqStore {
    next: u32,
    live: usize,
}

impl PreviewStore for SeqStore {
    type Handle = u32;

    fn create(&mut self, _file: &CandidateFile) -> Result<u32, PreviewError> {
        self.next += 1;
        self.live += 1;
        Ok(self.next)
    }

    fn release(&mut self, _handle: u32) {
        self.live -= 1;
    }
}

/// Region that renders a solid square once "mounted".
struct SolidRegion {
    mounted: Cell<bool>,
}

impl CompositeRegion for SolidRegion {
    fn is_ready(&self) -> bool {
        self.mounted.get()
    }

    async fn rasterize(&self) -> Result<Vec<u8>, ExportError> {
        encode_rgba_png(&[255; 4 * 4 * 4], 4, 4)
    }
}

#[derive(Default)]
struct Downloads(RefCell<Vec<(usize, String)>>);

impl Saver for Downloads {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), ExportError> {
        self.0.borrow_mut().push((bytes.len(), filename.to_owned()));
        Ok(())
    }
}

#[test]
fn upload_edit_and_export() {
    let notes = RefCell::new(Vec::new());
    let ready = std::rc::Rc::new(Cell::new(false));
    let ready_flag = std::rc::Rc::clone(&ready);
    let previews =
        PreviewStateManager::new(SeqStore::default(), false).with_ready_observer(move |r| {
            ready_flag.set(r);
        });
    let mut state = CardState::new(config(), previews);

    // Mixed batch: one good square, one portrait.
    let validator = UploadValidator::new(ImageCrateProbe, &notes);
    let batch = block_on(validator.validate_batch(
        vec![
            CandidateFile::new("portrait.png", "image/png", padded_png(40, 60, 1024)),
            CandidateFile::new("square.png", "image/png", padded_png(50, 50, 1024)),
        ],
        state.config(),
    ));
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(state.commit(batch, &notes), 1);
    assert!(ready.get());
    assert!(state.can_download());
    assert_eq!(state.previews().primary().unwrap().file.name, "square.png");

    // Over-long recipient is cut to 20 characters.
    state.set_field(Field::Dear, "Abcdefghijklmnopqrstuvwxy");
    assert_eq!(state.fields().dear().chars().count(), 20);

    // The card mounts while the exporter waits.
    let downloads = Downloads::default();
    let exporter = CompositeExporter::new(&downloads, &notes);
    let region = SolidRegion {
        mounted: Cell::new(false),
    };
    let saved = block_on(exporter.request_export(&region, |_| {
        region.mounted.set(true);
        async {}
    }))
    .expect("export should succeed after the retry");
    assert!(saved > 0);
    assert_eq!(downloads.0.borrow()[0].1, EXPORT_FILENAME);

    // Removing the image leaves nothing to export.
    state.remove(0);
    assert!(!ready.get());
    assert!(!state.can_download());
    assert_eq!(state.previews().store().live, 0);
}
