//! The three greeting text fields and their length limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One of the greeting text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Recipient name.
    Dear,
    /// Body text.
    Message,
    /// Sender name.
    From,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Self; 3] = [Self::Dear, Self::Message, Self::From];

    /// Maximum length in characters.
    #[must_use]
    pub const fn max_len(self) -> usize {
        match self {
            Self::Dear | Self::From => 20,
            Self::Message => 100,
        }
    }

    /// Machine name used by form controls.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dear => "dear",
            Self::Message => "message",
            Self::From => "from",
        }
    }

    /// Form label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dear => "Dear",
            Self::Message => "Message",
            Self::From => "From",
        }
    }

    /// Input placeholder.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Dear => "Enter recipient name",
            Self::Message => "Write your heartfelt message here...",
            Self::From => "Enter your name",
        }
    }

    /// Whether the field is edited in a multi-line text area.
    #[must_use]
    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::Message)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field name that isn't `dear`, `message`, or `from`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown greeting field: {0:?}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dear" => Ok(Self::Dear),
            "message" => Ok(Self::Message),
            "from" => Ok(Self::From),
            other => Err(UnknownField(other.to_owned())),
        }
    }
}

/// The greeting text.
///
/// Only [`FormState`] writes these; everything else reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingFields {
    dear: String,
    message: String,
    from: String,
}

impl GreetingFields {
    /// Recipient name.
    #[must_use]
    pub fn dear(&self) -> &str {
        &self.dear
    }

    /// Body text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sender name.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Value of `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Dear => &self.dear,
            Field::Message => &self.message,
            Field::From => &self.from,
        }
    }

    const fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Dear => &mut self.dear,
            Field::Message => &mut self.message,
            Field::From => &mut self.from,
        }
    }
}

/// What [`FormState::set_field`] did with the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Stored as given.
    Stored,
    /// Cut to the field's maximum length.
    Truncated {
        /// Number of characters dropped.
        dropped: usize,
    },
}

/// Owner of [`GreetingFields`].
///
/// Over-long values are truncated, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: GreetingFields,
}

impl FormState {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current values.
    #[must_use]
    pub const fn fields(&self) -> &GreetingFields {
        &self.fields
    }

    /// Store `value` in `field`, truncated to [`Field::max_len`] characters.
    pub fn set_field(&mut self, field: Field, value: &str) -> FieldUpdate {
        let max = field.max_len();
        let total = value.chars().count();
        let update = if total > max {
            *self.fields.slot(field) = value.chars().take(max).collect();
            FieldUpdate::Truncated {
                dropped: total - max,
            }
        } else {
            value.clone_into(self.fields.slot(field));
            FieldUpdate::Stored
        };
        debug!(field = field.name(), ?update, "field changed");
        update
    }

    /// [`set_field`](Self::set_field) by field name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownField`] if `name` is not a greeting field.
    pub fn set_named(&mut self, name: &str, value: &str) -> Result<FieldUpdate, UnknownField> {
        let field: Field = name.parse()?;
        Ok(self.set_field(field, value))
    }

    /// Characters used in `field`, for the `n / max` counter.
    #[must_use]
    pub fn char_count(&self, field: Field) -> usize {
        self.fields.get(field).chars().count()
    }

    /// Log the values and reset the form.
    ///
    /// Nothing is persisted; the submitted values are returned for a
    /// caller that wants to.
    pub fn submit(&mut self) -> GreetingFields {
        let submitted = std::mem::take(&mut self.fields);
        info!(
            dear = submitted.dear(),
            message = submitted.message(),
            from = submitted.from(),
            "greeting submitted"
        );
        submitted
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dear_is_truncated_to_twenty_chars() {
        let mut form = FormState::new();
        let update = form.set_field(Field::Dear, "abcdefghijklmnopqrstuvwxy");
        assert_eq!(update, FieldUpdate::Truncated { dropped: 5 });
        assert_eq!(form.fields().dear(), "abcdefghijklmnopqrst");
        assert_eq!(form.char_count(Field::Dear), 20);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let mut form = FormState::new();
        let hearts = "♥".repeat(25);
        form.set_field(Field::From, &hearts);
        assert_eq!(form.fields().from(), "♥".repeat(20));
    }

    #[test]
    fn message_allows_one_hundred() {
        let mut form = FormState::new();
        let text = "x".repeat(100);
        assert_eq!(form.set_field(Field::Message, &text), FieldUpdate::Stored);
        assert_eq!(form.fields().message(), text);
    }

    #[test]
    fn set_named_routes_by_name() {
        let mut form = FormState::new();
        form.set_named("from", "Ann").unwrap();
        assert_eq!(form.fields().get(Field::From), "Ann");
        assert_eq!(
            form.set_named("subject", "hi"),
            Err(UnknownField("subject".into()))
        );
    }

    #[test]
    fn submit_resets() {
        let mut form = FormState::new();
        form.set_field(Field::Dear, "Bo");
        form.set_field(Field::Message, "Happy birthday");
        let submitted = form.submit();
        assert_eq!(submitted.dear(), "Bo");
        assert_eq!(submitted.message(), "Happy birthday");
        assert_eq!(form.fields(), &GreetingFields::default());
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
    }
}
