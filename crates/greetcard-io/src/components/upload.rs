//! File upload zone with drag-and-drop and file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use greetcard_core::CandidateFile;

/// MIME types for extensions browsers sometimes leave untyped.
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

/// Guess a MIME type from a filename's extension.
fn mime_from_extension(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    EXTENSION_TYPES
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Caption listing accepted types, size, and ratio.
    hint: String,
    /// Value for the file input's `accept` attribute.
    accept: String,
    /// Allow picking several files at once.
    #[props(default)]
    multiple: bool,
    /// Whether something is selected; the picker is hidden while it is.
    has_selection: bool,
    /// Bumped when a selection is removed so the input is recreated.
    input_generation: u64,
    /// Called with every file read from a pick or drop.
    on_select: EventHandler<Vec<CandidateFile>>,
    /// Shown instead of the prompt while something is selected.
    children: Element,
}

/// A drag-and-drop zone with a file picker.
///
/// Reads every picked or dropped file into memory and fires
/// `on_select`. Validation is left to the caller. While a selection is
/// shown the zone still accepts drops, which replace it.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);

    // Read and forward a list of files.
    //
    // Shared by the file-picker (`handle_files`) and drag-and-drop
    // (`handle_drop`) paths.
    let process_files = move |files: Vec<FileData>| async move {
        let mut candidates = Vec::with_capacity(files.len());
        for file in files {
            let name = file.name();
            let mime_type = file
                .content_type()
                .filter(|t| !t.is_empty())
                .or_else(|| mime_from_extension(&name).map(str::to_owned))
                .unwrap_or_default();
            match file.read_bytes().await {
                Ok(bytes) => candidates.push(CandidateFile::new(name, mime_type, bytes.to_vec())),
                Err(e) => {
                    error.set(Some(format!("Failed to read {name}: {e}")));
                }
            }
        }
        if !candidates.is_empty() {
            error.set(None);
            props.on_select.call(candidates);
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "upload-zone upload-zone-active"
    } else {
        "upload-zone"
    };
    let generation = props.input_generation;

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if props.has_selection {
                {props.children}
            } else {
                label { class: "upload-prompt",
                    input {
                        // Keyed on the removal generation so a removed
                        // file can be picked again.
                        key: "{generation}",
                        r#type: "file",
                        accept: "{props.accept}",
                        multiple: props.multiple,
                        class: "hidden",
                        onchange: handle_files,
                    }
                    Icon { width: 48, height: 48, icon: LdUpload }
                    p {
                        span { class: "upload-link", "Click to upload" }
                        " or drag and drop"
                    }
                    p { class: "upload-hint", "{props.hint}" }
                }
            }

            if let Some(ref err) = error() {
                p { class: "text-error", "{err}" }
            }
        }
    }
}
