use dioxus::prelude::*;
use greetcard_core::{
    AspectRatio, CandidateFile, Field, FieldUpdate, ImageCrateProbe, PreviewStateManager,
    UploadConfig, UploadValidator, upload_hint,
};
use greetcard_io::{
    AppState, BlobUrlStore, DownloadButton, FileUpload, GreetingCard, GreetingForm, ToastNotifier,
    ToastQueue, Toaster,
};

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Formats the card accepts.
const ALLOWED_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// App stylesheet. The `.card-text` rules must agree with the export
/// layout's font and color.
const STYLESHEET: &str = include_str!("../assets/greetcard.css");

fn main() {
    dioxus::logger::initialize_default();
    dioxus::launch(app);
}

/// Upload rules for the card photo: 5 MB, PNG or JPEG, square.
fn upload_config() -> UploadConfig {
    UploadConfig::new(MAX_UPLOAD_BYTES, ALLOWED_TYPES, AspectRatio::Square).unwrap_or_else(|e| {
        tracing::warn!("invalid upload config, using defaults: {e}");
        UploadConfig::default()
    })
}

/// Root application component.
///
/// Owns the [`AppState`] and the toast queue and wires the upload zone,
/// card preview, greeting form, and download button to them.
fn app() -> Element {
    // --- Application state ---
    let toasts = use_context_provider(|| Signal::new(ToastQueue::default()));
    let notifier = ToastNotifier::new(toasts);
    let mut preview_ready = use_signal(|| false);
    let mut state = use_signal(|| {
        let previews = PreviewStateManager::new(BlobUrlStore, false)
            .with_ready_observer(move |ready| preview_ready.set(ready));
        AppState::new(upload_config(), previews)
    });

    // --- File upload handler ---
    // Validation probes image headers asynchronously, so the selection
    // is committed from a spawned task.
    let on_select = move |files: Vec<CandidateFile>| {
        spawn(async move {
            let config = state.peek().config().clone();
            let validator = UploadValidator::new(ImageCrateProbe, notifier);
            let batch = validator.validate_batch(files, &config).await;
            let rejected = batch.rejected.len();
            let added = state.write().commit(batch, &notifier);
            tracing::debug!(added, rejected, "selection processed");
        });
    };

    let on_remove = move |()| {
        if let Some(file) = state.write().remove(0) {
            tracing::debug!(name = %file.name, "image removed");
        }
    };

    // --- Form handlers ---
    let on_change = move |(field, value): (Field, String)| {
        if let FieldUpdate::Truncated { dropped } = state.write().set_field(field, &value) {
            tracing::debug!(%field, dropped, "input truncated");
        }
    };

    let on_submit = move |()| {
        let submitted = state.write().submit();
        tracing::debug!(dear = submitted.dear(), "form reset");
    };

    // --- Derived view data ---
    let (hint, accept, image_url, fields, generation, can_download) = {
        let current = state.read();
        let config = current.config();
        let accept = if config.allowed_mime_types.is_empty() {
            "image/*".to_owned()
        } else {
            config.allowed_mime_types.join(",")
        };
        (
            upload_hint(config),
            accept,
            current.card_image().map(|url| url.as_str().to_owned()),
            current.fields().clone(),
            current.previews().input_generation(),
            current.can_download(),
        )
    };
    let has_selection = image_url.is_some();
    let card_fields = fields.clone();
    let export_fields = fields.clone();

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: STYLESHEET }

        main { class: "app",
            header { class: "app-header",
                h1 { "Greeting Card Creator" }
                p { class: "text-secondary",
                    "Upload a square photo, write your greeting, and download the card."
                }
            }

            div { class: "app-body",
                FileUpload {
                    hint: hint,
                    accept: accept,
                    multiple: false,
                    has_selection: has_selection,
                    input_generation: generation,
                    on_select: on_select,

                    if let Some(url) = image_url {
                        GreetingCard {
                            image_url: url,
                            fields: card_fields,
                            on_remove: on_remove,
                        }
                    }
                }

                GreetingForm {
                    fields: fields,
                    on_change: on_change,
                    on_submit: on_submit,

                    DownloadButton {
                        fields: export_fields,
                        disabled: !(preview_ready() && can_download),
                    }
                }
            }
        }

        Toaster {}
    }
}
