//! Renderable description of a field: a label node and an input node

use std::fmt;

use crate::models::{FieldKind, RenderOrder};

/// One attribute of a rendered input control.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Id(String),
    Class(&'static str),
    Type(FieldKind),
    Name(String),
    Placeholder(String),
    Value(String),
    Required,
    MinLength(u32),
    MaxLength(u32),
    Min(f64),
    Max(f64),
    Pattern(String),
    Spellcheck(bool),
    Checked,
    Readonly,
    ValidationMessage(String),
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Id(_) => "id",
            Attribute::Class(_) => "class",
            Attribute::Type(_) => "type",
            Attribute::Name(_) => "name",
            Attribute::Placeholder(_) => "placeholder",
            Attribute::Value(_) => "value",
            Attribute::Required => "required",
            Attribute::MinLength(_) => "minlength",
            Attribute::MaxLength(_) => "maxlength",
            Attribute::Min(_) => "min",
            Attribute::Max(_) => "max",
            Attribute::Pattern(_) => "pattern",
            Attribute::Spellcheck(_) => "spellcheck",
            Attribute::Checked => "checked",
            Attribute::Readonly => "readonly",
            Attribute::ValidationMessage(_) => "custom-validation-error-message",
        }
    }

    /// Attribute value as text; `None` for boolean attributes.
    pub fn value(&self) -> Option<String> {
        match self {
            Attribute::Id(v)
            | Attribute::Name(v)
            | Attribute::Placeholder(v)
            | Attribute::Value(v)
            | Attribute::Pattern(v)
            | Attribute::ValidationMessage(v) => Some(v.clone()),
            Attribute::Class(v) => Some(v.to_string()),
            Attribute::Type(kind) => Some(kind.as_str().to_string()),
            Attribute::MinLength(n) | Attribute::MaxLength(n) => Some(n.to_string()),
            Attribute::Min(n) | Attribute::Max(n) => Some(n.to_string()),
            Attribute::Spellcheck(b) => Some(b.to_string()),
            Attribute::Required | Attribute::Checked | Attribute::Readonly => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}=\"{}\"", self.name(), escape(&value)),
            None => f.write_str(self.name()),
        }
    }
}

/// Help affordance attached to a label.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipMarkup {
    pub text: String,
    pub link: Option<String>,
    /// Id of the field the tooltip describes
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelMarkup {
    pub text: String,
    pub for_id: Option<String>,
    pub tooltip: Option<TooltipMarkup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputMarkup {
    pub attributes: Vec<Attribute>,
}

impl InputMarkup {
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn value_of(&self, name: &str) -> Option<String> {
        self.get(name).and_then(Attribute::value)
    }

    pub fn kind(&self) -> FieldKind {
        self.attributes
            .iter()
            .find_map(|attr| match attr {
                Attribute::Type(kind) => Some(*kind),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Label(LabelMarkup),
    Input(InputMarkup),
}

/// Rendered field: label and input nodes in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMarkup {
    pub order: RenderOrder,
    pub nodes: Vec<MarkupNode>,
}

impl FieldMarkup {
    pub fn label(&self) -> Option<&LabelMarkup> {
        self.nodes.iter().find_map(|node| match node {
            MarkupNode::Label(label) => Some(label),
            _ => None,
        })
    }

    pub fn input(&self) -> Option<&InputMarkup> {
        self.nodes.iter().find_map(|node| match node {
            MarkupNode::Input(input) => Some(input),
            _ => None,
        })
    }

    pub fn tooltip(&self) -> Option<&TooltipMarkup> {
        self.label().and_then(|label| label.tooltip.as_ref())
    }
}

impl fmt::Display for LabelMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.for_id {
            Some(id) => write!(f, "<label for=\"{}\">", escape(id))?,
            None => f.write_str("<label>")?,
        }
        f.write_str(&escape(&self.text))?;
        if let Some(tooltip) = &self.tooltip {
            write!(f, "<info-circle-tooltip text=\"{}\"", escape(&tooltip.text))?;
            if let Some(link) = &tooltip.link {
                write!(f, " link=\"{}\"", escape(link))?;
            }
            f.write_str("></info-circle-tooltip>")?;
        }
        f.write_str("</label>")
    }
}

impl fmt::Display for InputMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<input")?;
        for attr in &self.attributes {
            write!(f, " {}", attr)?;
        }
        f.write_str(" />")
    }
}

impl fmt::Display for FieldMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            match node {
                MarkupNode::Label(label) => write!(f, "{}", label)?,
                MarkupNode::Input(input) => write!(f, "{}", input)?,
            }
        }
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
