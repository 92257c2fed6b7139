//! The composed greeting card: image with the greeting text on top.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;
use greetcard_core::GreetingFields;

use crate::raster::{CARD_ELEMENT_ID, CARD_IMAGE_ID};

/// Props for the [`GreetingCard`] component.
#[derive(Props, Clone, PartialEq)]
pub struct GreetingCardProps {
    /// Blob URL of the background image.
    image_url: String,
    /// Text to overlay.
    fields: GreetingFields,
    /// Called when the remove button is clicked.
    on_remove: EventHandler<()>,
}

/// Live preview of the card.
///
/// The framing element and image carry the ids the canvas exporter
/// looks up, so this component is the export region while mounted.
#[component]
pub fn GreetingCard(props: GreetingCardProps) -> Element {
    let dear = props.fields.dear();
    let message = props.fields.message();
    let from = props.fields.from();
    let on_remove = props.on_remove;

    rsx! {
        div { class: "card",
            div { id: CARD_ELEMENT_ID, class: "card-frame",
                img {
                    id: CARD_IMAGE_ID,
                    src: "{props.image_url}",
                    alt: "Greeting Card",
                    class: "card-image",
                }
                div { class: "card-text",
                    span { class: "card-dear", "{dear}," }
                    p { class: "card-message", title: "{message}", "{message}" }
                    span { class: "card-from", "{from}," }
                }
            }
            button {
                r#type: "button",
                class: "card-remove",
                aria_label: "Remove image",
                onclick: move |_| on_remove.call(()),
                Icon { width: 16, height: 16, icon: LdX }
            }
        }
    }
}
