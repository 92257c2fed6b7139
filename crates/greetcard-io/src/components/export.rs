//! Download button that exports the card as PNG.

use std::time::Duration;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdDownload;
use greetcard_core::{CompositeExporter, GreetingFields};

use crate::download::BrowserDownload;
use crate::raster::CanvasRegion;
use crate::toast::{ToastNotifier, ToastQueue};

/// Props for the [`DownloadButton`] component.
#[derive(Props, Clone, PartialEq)]
pub struct DownloadButtonProps {
    /// Text to draw on the exported card.
    fields: GreetingFields,
    /// Disable the button (nothing to export yet).
    disabled: bool,
}

/// Exports the mounted card to `greeting-card.png`.
///
/// If the card isn't mounted yet the export waits once for
/// [`greetcard_core::RETRY_DELAY`] before giving up with a toast. The
/// button is disabled while an export is running.
#[component]
pub fn DownloadButton(props: DownloadButtonProps) -> Element {
    let toasts: Signal<ToastQueue> = use_context();
    let mut exporting = use_signal(|| false);

    let click = {
        let fields = props.fields;
        move |_| {
            let region = CanvasRegion::new(fields.clone());
            exporting.set(true);
            spawn(async move {
                let exporter = CompositeExporter::new(BrowserDownload, ToastNotifier::new(toasts));
                // Failures were already shown to the user as toasts.
                match exporter.request_export(&region, sleep).await {
                    Ok(bytes) => tracing::debug!(bytes, "download started"),
                    Err(e) => tracing::debug!("download not started: {e}"),
                }
                exporting.set(false);
            });
        }
    };

    let disabled = props.disabled || exporting();
    let class = if disabled {
        "btn btn-disabled"
    } else {
        "btn btn-primary"
    };

    rsx! {
        button {
            r#type: "button",
            class: "{class}",
            disabled: disabled,
            onclick: click,
            Icon { width: 18, height: 18, icon: LdDownload }
            if exporting() { "Download..." } else { "Download Card" }
        }
    }
}

/// Wait `delay` on the browser event loop.
async fn sleep(delay: Duration) {
    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}
