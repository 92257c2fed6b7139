//! Greeting text form.

use dioxus::prelude::*;
use greetcard_core::{Field, GreetingFields};

/// Props for the [`GreetingForm`] component.
#[derive(Props, Clone, PartialEq)]
pub struct GreetingFormProps {
    /// Current values.
    fields: GreetingFields,
    /// Called with the field and its new raw value on every edit.
    on_change: EventHandler<(Field, String)>,
    /// Called when the form is submitted (Enter in a single-line input).
    on_submit: EventHandler<()>,
    /// Action row rendered under the inputs.
    children: Element,
}

/// Inputs for recipient, message, and sender.
///
/// Inputs carry `maxlength`, and the owner truncates anything that gets
/// past it (e.g. a paste in an old browser).
#[component]
pub fn GreetingForm(props: GreetingFormProps) -> Element {
    let on_submit = props.on_submit;

    rsx! {
        div { class: "panel",
            div { class: "panel-header",
                h3 { "Greeting Card" }
                p { class: "text-secondary", "Fill in the details below" }
            }
            form {
                autocomplete: "off",
                onsubmit: move |evt| {
                    evt.prevent_default();
                    on_submit.call(());
                },

                for field in Field::ALL {
                    {render_field(field, props.fields.get(field), props.on_change)}
                }

                // Browsers only submit on Enter when the form has a
                // submit button.
                button {
                    r#type: "submit",
                    class: "visually-hidden",
                    tabindex: "-1",
                    aria_hidden: "true",
                    "Save"
                }

                div { class: "form-actions", {props.children} }
            }
        }
    }
}

/// Render one labeled input; single-line inputs get a character counter.
fn render_field(field: Field, value: &str, on_change: EventHandler<(Field, String)>) -> Element {
    let id = format!("field-{}", field.name());
    let max = field.max_len();
    let count = value.chars().count();
    let value = value.to_owned();

    rsx! {
        div { class: "form-item",
            label { r#for: "{id}", class: "form-label", "{field.label()}" }
            if field.is_multiline() {
                textarea {
                    id: "{id}",
                    name: field.name(),
                    rows: "2",
                    maxlength: "{max}",
                    placeholder: field.placeholder(),
                    class: "form-input form-textarea",
                    value: "{value}",
                    oninput: move |e| on_change.call((field, e.value())),
                }
            } else {
                input {
                    id: "{id}",
                    name: field.name(),
                    r#type: "text",
                    maxlength: "{max}",
                    placeholder: field.placeholder(),
                    class: "form-input",
                    value: "{value}",
                    oninput: move |e| on_change.call((field, e.value())),
                }
                span { class: "form-count", "{count} / {max}" }
            }
        }
    }
}
