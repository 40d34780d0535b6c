//! Live input control state created from rendered markup

use tracing::warn;

use crate::form::markup::{Attribute, InputMarkup};
use crate::form::validity::{self, Constraints, ControlState, ValidityState};
use crate::models::FieldKind;

/// A materialized input control: value, checked state, constraints and
/// custom validity.
#[derive(Debug, Clone)]
pub struct InputElement {
    pub id: Option<String>,
    pub name: Option<String>,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    pub title: String,
    value: String,
    checked: bool,
    /// Another radio in this element's group is checked
    group_checked: bool,
    dirty: bool,
    /// Cursor position in characters
    cursor: usize,
    constraints: Constraints,
    custom_validity: String,
}

impl InputElement {
    pub fn from_markup(markup: &InputMarkup) -> Self {
        let mut element = Self {
            id: None,
            name: None,
            kind: markup.kind(),
            placeholder: None,
            title: String::new(),
            value: String::new(),
            checked: false,
            group_checked: false,
            dirty: false,
            cursor: 0,
            constraints: Constraints::default(),
            custom_validity: String::new(),
        };

        for attr in &markup.attributes {
            match attr {
                Attribute::Id(id) => element.id = Some(id.clone()),
                Attribute::Name(name) => element.name = Some(name.clone()),
                Attribute::Placeholder(text) => element.placeholder = Some(text.clone()),
                Attribute::Value(value) => element.value = value.clone(),
                Attribute::Checked => element.checked = true,
                Attribute::Required => element.constraints.required = true,
                Attribute::Readonly => element.constraints.readonly = true,
                Attribute::MinLength(n) => element.constraints.min_length = Some(*n),
                Attribute::MaxLength(n) => element.constraints.max_length = Some(*n),
                Attribute::Min(n) => element.constraints.min = Some(*n),
                Attribute::Max(n) => element.constraints.max = Some(*n),
                Attribute::Pattern(pattern) => match validity::compile_pattern(pattern) {
                    Ok(regex) => element.constraints.pattern = Some(regex),
                    Err(e) => warn!("Ignoring invalid pattern '{}': {}", pattern, e),
                },
                Attribute::Class(_)
                | Attribute::Type(_)
                | Attribute::Spellcheck(_)
                | Attribute::ValidationMessage(_) => {}
            }
        }

        // Checkable controls submit "on" when no value was given.
        if element.kind.is_checkable() && element.value.is_empty() {
            element.value = "on".to_string();
        }

        element.cursor = element.value.chars().count();
        element
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn is_readonly(&self) -> bool {
        self.constraints.readonly
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    /// Replace the value as a user edit would.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.chars().count();
        self.dirty = true;
    }

    /// Record whether a different radio with the same name is checked.
    pub fn set_group_checked(&mut self, checked: bool) {
        self.group_checked = checked;
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
        self.dirty = true;
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
        self.dirty = true;
    }

    pub fn delete_char(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        self.dirty = true;
        true
    }

    pub fn delete_char_forward(&mut self) -> bool {
        if self.cursor >= self.value.chars().count() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        self.dirty = true;
        true
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Whether the element takes part in constraint validation.
    pub fn will_validate(&self) -> bool {
        !self.kind.is_barred() && !self.constraints.readonly
    }

    pub fn validity(&self) -> ValidityState {
        let mut state = validity::evaluate(
            &self.constraints,
            ControlState {
                kind: self.kind,
                value: &self.value,
                checked: self.checked,
                group_checked: self.group_checked,
                dirty: self.dirty,
            },
        );
        state.custom_error = self.will_validate() && !self.custom_validity.is_empty();
        state
    }

    pub fn check_validity(&self) -> bool {
        self.validity().valid()
    }

    /// Mark the element invalid with `message`, or clear with an empty one.
    pub fn set_custom_validity(&mut self, message: &str) {
        self.custom_validity = message.to_string();
    }

    pub fn custom_validity(&self) -> &str {
        &self.custom_validity
    }

    /// Message the user sees when the element is reported invalid.
    pub fn validation_message(&self) -> String {
        if !self.will_validate() {
            return String::new();
        }
        if !self.custom_validity.is_empty() {
            return self.custom_validity.clone();
        }
        self.validity()
            .failures()
            .first()
            .map(|constraint| {
                validity::default_message(*constraint, self.kind, &self.constraints, &self.value)
            })
            .unwrap_or_default()
    }
}
