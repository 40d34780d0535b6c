use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::form::element::InputElement;

/// Kind of native input control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Hidden,
    #[default]
    Text,
    Search,
    Tel,
    Url,
    Email,
    Password,
    Datetime,
    Date,
    Month,
    Week,
    Time,
    DatetimeLocal,
    Number,
    Range,
    Color,
    Checkbox,
    Radio,
    File,
    Submit,
    Image,
    Reset,
    Button,
}

/// Whether the input control or its label comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOrder {
    LabelFirst,
    InputFirst,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Hidden => "hidden",
            FieldKind::Text => "text",
            FieldKind::Search => "search",
            FieldKind::Tel => "tel",
            FieldKind::Url => "url",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Datetime => "datetime",
            FieldKind::Date => "date",
            FieldKind::Month => "month",
            FieldKind::Week => "week",
            FieldKind::Time => "time",
            FieldKind::DatetimeLocal => "datetime-local",
            FieldKind::Number => "number",
            FieldKind::Range => "range",
            FieldKind::Color => "color",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::File => "file",
            FieldKind::Submit => "submit",
            FieldKind::Image => "image",
            FieldKind::Reset => "reset",
            FieldKind::Button => "button",
        }
    }

    /// Checkboxes and radios put the control before the label.
    pub fn render_order(&self) -> RenderOrder {
        match self {
            FieldKind::Checkbox | FieldKind::Radio => RenderOrder::InputFirst,
            _ => RenderOrder::LabelFirst,
        }
    }

    pub fn is_checkable(&self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Range)
    }

    /// Controls that never take part in constraint validation.
    pub fn is_barred(&self) -> bool {
        matches!(
            self,
            FieldKind::Hidden
                | FieldKind::Submit
                | FieldKind::Reset
                | FieldKind::Button
                | FieldKind::Image
        )
    }

    /// Kinds where `minlength`, `maxlength` and `pattern` apply.
    pub fn accepts_text_constraints(&self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Search
                | FieldKind::Tel
                | FieldKind::Url
                | FieldKind::Email
                | FieldKind::Password
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initial value of a field, either a scalar or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Attribute form of the value. Lists join with commas.
    pub fn to_attribute(&self) -> String {
        match self {
            FieldValue::Single(value) => value.clone(),
            FieldValue::Multiple(values) => values.join(","),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

/// Callback fired on every input event with the live value, the checked
/// state and the element itself.
#[derive(Clone)]
pub struct InputHandler(Rc<dyn Fn(&str, bool, &InputElement)>);

impl InputHandler {
    pub fn new(handler: impl Fn(&str, bool, &InputElement) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, value: &str, checked: bool, element: &InputElement) {
        (self.0)(value, checked, element)
    }
}

impl fmt::Debug for InputHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InputHandler")
    }
}

/// Declarative description of one form field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub label: String,
    #[serde(default)]
    pub tooltip: Option<String>,
    #[serde(default)]
    pub tooltip_link: Option<String>,
    #[serde(default, rename = "inputId", alias = "fieldId")]
    pub field_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub value: Option<FieldValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub spellcheck: Option<bool>,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub validation_error_message: Option<String>,
    #[serde(skip)]
    pub on_change: Option<InputHandler>,
}

impl FieldDescriptor {
    pub fn new(label: &str, kind: FieldKind) -> Self {
        Self {
            label: label.to_string(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.field_id = Some(id.to_string());
        self
    }

    pub fn with_tooltip(mut self, tooltip: &str, link: Option<&str>) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self.tooltip_link = link.map(str::to_string);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_length(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn with_spellcheck(mut self, spellcheck: bool) -> Self {
        self.spellcheck = Some(spellcheck);
        self
    }

    pub fn with_validation_message(mut self, message: &str) -> Self {
        self.validation_error_message = Some(message.to_string());
        self
    }

    pub fn on_change(mut self, handler: impl Fn(&str, bool, &InputElement) + 'static) -> Self {
        self.on_change = Some(InputHandler::new(handler));
        self
    }
}
