//! Stack of toast notifications in the top-right corner.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;
use greetcard_core::NotificationKind;

use crate::toast::ToastQueue;

/// Renders the [`ToastQueue`] provided as context by the app root.
#[component]
pub fn Toaster() -> Element {
    let mut queue: Signal<ToastQueue> = use_context();

    rsx! {
        div { class: "toaster", role: "status", aria_live: "polite",
            for toast in queue.read().toasts().iter().cloned() {
                div {
                    key: "{toast.id}",
                    class: if toast.kind == NotificationKind::Error { "toast toast-error" } else { "toast" },
                    div { class: "toast-body",
                        p { class: "toast-title",
                            if toast.kind == NotificationKind::Error { "Error" } else { "Notice" }
                        }
                        p { class: "toast-message", "{toast.message}" }
                    }
                    button {
                        r#type: "button",
                        class: "toast-close",
                        aria_label: "Dismiss",
                        onclick: move |_| queue.write().dismiss(toast.id),
                        Icon { width: 14, height: 14, icon: LdX }
                    }
                }
            }
        }
    }
}
