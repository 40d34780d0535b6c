//! Field rendering and the input/invalid handlers attached to every field
//!
//! Rendering is two-phase. [`FieldRenderer::prepare`] assigns a generated id
//! to descriptors that need one and hands back a [`PreparedField`], which the
//! caller keeps. [`FieldRenderer::render`] is then a pure function of the
//! prepared field, so re-rendering never changes the label/input pairing.

use tracing::{debug, trace};

use crate::config::Config;
use crate::form::deferred::{Deferred, DeferredQueue};
use crate::form::element::InputElement;
use crate::form::ids::IdGenerator;
use crate::form::markup::{
    Attribute, FieldMarkup, InputMarkup, LabelMarkup, MarkupNode, TooltipMarkup,
};
use crate::form::traits::Disclosures;
use crate::form::tree::NodeId;
use crate::form::validity::ValidityState;
use crate::models::{FieldDescriptor, FieldKind, RenderOrder};

/// A descriptor whose id requirements have been settled.
#[derive(Debug, Clone)]
pub struct PreparedField(FieldDescriptor);

impl PreparedField {
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.0
    }

    pub fn id(&self) -> Option<&str> {
        self.0.field_id.as_deref()
    }

    pub fn into_inner(self) -> FieldDescriptor {
        self.0
    }
}

/// Fired when a field fails validation during submission.
#[derive(Debug, Clone, Copy)]
pub struct InvalidEvent {
    pub target: NodeId,
    /// Validity of the target when the event fired
    pub validity: ValidityState,
}

#[derive(Debug, Default)]
pub struct FieldRenderer {
    ids: IdGenerator,
}

impl FieldRenderer {
    pub fn new(ids: IdGenerator) -> Self {
        Self { ids }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(IdGenerator::new(&config.id_prefix, config.id_strategy))
    }

    /// Give the descriptor an id when its tooltip needs one to anchor to.
    pub fn prepare(&self, mut descriptor: FieldDescriptor) -> PreparedField {
        if descriptor.field_id.as_deref() == Some("") {
            descriptor.field_id = None;
        }
        if descriptor.tooltip.is_some() && descriptor.field_id.is_none() {
            let id = self.ids.next_id();
            trace!(label = %descriptor.label, id = %id, "generated field id");
            descriptor.field_id = Some(id);
        }
        PreparedField(descriptor)
    }

    /// Re-prepare a field, e.g. after the caller edited its descriptor.
    pub fn reprepare(&self, field: PreparedField) -> PreparedField {
        self.prepare(field.into_inner())
    }

    pub fn render(&self, field: &PreparedField) -> FieldMarkup {
        let descriptor = field.descriptor();
        let order = descriptor.kind.render_order();
        let label = MarkupNode::Label(render_label(descriptor));
        let input = MarkupNode::Input(render_input(descriptor));

        let nodes = match order {
            RenderOrder::InputFirst => vec![input, label],
            RenderOrder::LabelFirst => vec![label, input],
        };

        FieldMarkup { order, nodes }
    }

    /// Materialize the live input control for a prepared field.
    pub fn render_element(&self, field: &PreparedField) -> InputElement {
        InputElement::from_markup(&render_input(field.descriptor()))
    }

    /// Input event handler: notify the descriptor's callback, then refresh
    /// the custom validity message if the descriptor defines one.
    pub fn on_input_changed(&self, element: &mut InputElement, descriptor: &FieldDescriptor) {
        if let Some(handler) = &descriptor.on_change {
            let live: &InputElement = element;
            handler.call(live.value(), live.checked(), live);
        }

        if let Some(message) = &descriptor.validation_error_message {
            let message = if element.validity().has_constraint_failure() {
                message.as_str()
            } else {
                ""
            };
            element.set_custom_validity(message);
            element.title = message.to_string();
        }
    }

    /// Invalid event handler: expand the collapsed section hiding the field
    /// and defer scrolling to it and reporting its validity to the next
    /// tick, once the section has been laid out.
    ///
    /// Returns whether a section was expanded.
    pub fn on_input_invalid<D: Disclosures + ?Sized>(
        &self,
        event: &InvalidEvent,
        disclosures: &mut D,
        deferred: &mut DeferredQueue,
    ) -> bool {
        if event.validity.valid() {
            return false;
        }

        let Some(section) = disclosures.closest_disclosure(event.target) else {
            trace!(node = event.target.index(), "invalid field is not inside a section");
            return false;
        };

        if disclosures.is_expanded(section) {
            return false;
        }

        debug!(
            node = event.target.index(),
            section = section.index(),
            "expanding collapsed section hiding an invalid field"
        );
        disclosures.toggle(section);
        deferred.schedule(Deferred::RevealAndReport(event.target));
        true
    }
}

fn render_label(descriptor: &FieldDescriptor) -> LabelMarkup {
    LabelMarkup {
        text: descriptor.label.clone(),
        for_id: descriptor.field_id.clone(),
        tooltip: render_tooltip(descriptor),
    }
}

fn render_tooltip(descriptor: &FieldDescriptor) -> Option<TooltipMarkup> {
    let text = descriptor.tooltip.as_ref()?;
    Some(TooltipMarkup {
        text: text.clone(),
        link: descriptor.tooltip_link.clone(),
        anchor: descriptor.field_id.clone().unwrap_or_default(),
    })
}

fn render_input(descriptor: &FieldDescriptor) -> InputMarkup {
    let mut attributes = Vec::new();

    if let Some(id) = &descriptor.field_id {
        attributes.push(Attribute::Id(id.clone()));
    }
    attributes.push(Attribute::Class(if descriptor.kind == FieldKind::Radio {
        "form-check-input"
    } else {
        "form-control"
    }));
    if let Some(placeholder) = &descriptor.placeholder {
        attributes.push(Attribute::Placeholder(placeholder.clone()));
    }
    if let Some(value) = &descriptor.value {
        attributes.push(Attribute::Value(value.to_attribute()));
    }
    attributes.push(Attribute::Type(descriptor.kind));
    if descriptor.required {
        attributes.push(Attribute::Required);
    }
    if let Some(name) = &descriptor.name {
        attributes.push(Attribute::Name(name.clone()));
    }
    if let Some(n) = descriptor.min_length {
        attributes.push(Attribute::MinLength(n));
    }
    if let Some(n) = descriptor.max_length {
        attributes.push(Attribute::MaxLength(n));
    }
    if let Some(n) = descriptor.min_value {
        attributes.push(Attribute::Min(n));
    }
    if let Some(n) = descriptor.max_value {
        attributes.push(Attribute::Max(n));
    }
    if let Some(pattern) = &descriptor.pattern {
        attributes.push(Attribute::Pattern(pattern.clone()));
    }
    if let Some(spellcheck) = descriptor.spellcheck {
        attributes.push(Attribute::Spellcheck(spellcheck));
    }
    if descriptor.checked {
        attributes.push(Attribute::Checked);
    }
    if descriptor.readonly {
        attributes.push(Attribute::Readonly);
    }
    if let Some(message) = &descriptor.validation_error_message {
        attributes.push(Attribute::ValidationMessage(message.clone()));
    }

    InputMarkup { attributes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdStrategy;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn renderer() -> FieldRenderer {
        FieldRenderer::new(IdGenerator::new("form-input-", IdStrategy::Sequential))
    }

    fn node_kinds(markup: &FieldMarkup) -> Vec<&'static str> {
        markup
            .nodes
            .iter()
            .map(|node| match node {
                MarkupNode::Label(_) => "label",
                MarkupNode::Input(_) => "input",
            })
            .collect()
    }

    #[test]
    fn test_checkable_kinds_render_input_first() {
        let renderer = renderer();
        for kind in [FieldKind::Checkbox, FieldKind::Radio] {
            let field = renderer.prepare(FieldDescriptor::new("Enable", kind));
            assert_eq!(node_kinds(&renderer.render(&field)), vec!["input", "label"]);
        }
        for kind in [FieldKind::Text, FieldKind::Number, FieldKind::Url, FieldKind::File] {
            let field = renderer.prepare(FieldDescriptor::new("Name", kind));
            assert_eq!(node_kinds(&renderer.render(&field)), vec!["label", "input"]);
        }
    }

    #[test]
    fn test_no_tooltip_means_no_tooltip_node_and_no_id() {
        let renderer = renderer();
        let field = renderer.prepare(FieldDescriptor::new("App name", FieldKind::Text));
        let markup = renderer.render(&field);
        assert!(markup.tooltip().is_none());
        assert!(field.id().is_none());
        assert!(!markup.to_string().contains("info-circle-tooltip"));
    }

    #[test]
    fn test_tooltip_generates_and_associates_id() {
        let renderer = renderer();
        let field = renderer.prepare(
            FieldDescriptor::new("Publisher ID", FieldKind::Text)
                .with_tooltip("Found in Partner Center", Some("https://example.com/help")),
        );
        let id = field.id().unwrap().to_string();
        assert!(!id.is_empty());

        let markup = renderer.render(&field);
        let tooltip = markup.tooltip().unwrap();
        assert_eq!(tooltip.anchor, id);
        assert_eq!(tooltip.link.as_deref(), Some("https://example.com/help"));
        assert_eq!(markup.label().unwrap().for_id.as_deref(), Some(id.as_str()));
        assert_eq!(markup.input().unwrap().value_of("id"), Some(id));
    }

    #[test]
    fn test_existing_id_is_never_regenerated() {
        let renderer = renderer();
        let field = renderer.prepare(
            FieldDescriptor::new("Version", FieldKind::Text).with_tooltip("Semver", None),
        );
        let id = field.id().unwrap().to_string();

        let field = renderer.reprepare(field);
        let field = renderer.reprepare(field);
        assert_eq!(field.id(), Some(id.as_str()));
        for _ in 0..3 {
            assert_eq!(renderer.render(&field).tooltip().unwrap().anchor, id);
        }

        let declared = renderer.prepare(
            FieldDescriptor::new("Version", FieldKind::Text)
                .with_id("version")
                .with_tooltip("Semver", None),
        );
        assert_eq!(declared.id(), Some("version"));
    }

    #[test]
    fn test_empty_id_is_treated_as_absent() {
        let renderer = renderer();
        let field = renderer.prepare(FieldDescriptor::new("Name", FieldKind::Text).with_id(""));
        assert!(field.id().is_none());
        let markup = renderer.render(&field);
        assert!(!markup.input().unwrap().has("id"));
        assert!(markup.label().unwrap().for_id.is_none());
        assert!(!markup.to_string().contains("id=\"\""));

        let with_tooltip = renderer.prepare(
            FieldDescriptor::new("Name", FieldKind::Text)
                .with_id("")
                .with_tooltip("Shown in the Store", None),
        );
        assert_eq!(with_tooltip.id(), Some("form-input-1"));
    }

    #[test]
    fn test_unset_attributes_are_omitted() {
        let renderer = renderer();
        let field = renderer.prepare(FieldDescriptor::new("Name", FieldKind::Text));
        let input = renderer.render(&field).input().unwrap().clone();
        for name in [
            "id",
            "placeholder",
            "value",
            "required",
            "name",
            "minlength",
            "maxlength",
            "min",
            "max",
            "pattern",
            "spellcheck",
            "checked",
            "readonly",
            "custom-validation-error-message",
        ] {
            assert!(!input.has(name), "unexpected attribute {}", name);
        }
        assert_eq!(input.value_of("type").as_deref(), Some("text"));
        assert_eq!(input.value_of("class").as_deref(), Some("form-control"));
    }

    #[test]
    fn test_attributes_map_one_to_one() {
        let renderer = renderer();
        let field = renderer.prepare(
            FieldDescriptor::new("Version", FieldKind::Number)
                .with_name("version")
                .with_placeholder("1")
                .with_value("2")
                .required()
                .with_range(Some(1.0), Some(99.0))
                .with_spellcheck(false)
                .with_validation_message("Pick 1-99"),
        );
        let markup = renderer.render(&field);
        assert_eq!(
            markup.input().unwrap().to_string(),
            "<input class=\"form-control\" placeholder=\"1\" value=\"2\" type=\"number\" required name=\"version\" min=\"1\" max=\"99\" spellcheck=\"false\" custom-validation-error-message=\"Pick 1-99\" />"
        );
    }

    #[test]
    fn test_change_sets_and_clears_custom_validity() {
        let renderer = renderer();
        let field = renderer.prepare(
            FieldDescriptor::new("Package ID", FieldKind::Text)
                .required()
                .with_validation_message("X"),
        );
        let markup = renderer.render(&field);
        let mut element = InputElement::from_markup(markup.input().unwrap());

        renderer.on_input_changed(&mut element, field.descriptor());
        assert_eq!(element.custom_validity(), "X");
        assert_eq!(element.title, "X");
        assert!(!element.check_validity());

        element.set_value("com.contoso.app");
        renderer.on_input_changed(&mut element, field.descriptor());
        assert_eq!(element.custom_validity(), "");
        assert!(element.check_validity());
    }

    #[test]
    fn test_change_without_message_leaves_validity_alone() {
        let renderer = renderer();
        let field = renderer.prepare(FieldDescriptor::new("Name", FieldKind::Text).required());
        let mut element = InputElement::from_markup(renderer.render(&field).input().unwrap());
        renderer.on_input_changed(&mut element, field.descriptor());
        assert_eq!(element.custom_validity(), "");
        assert!(element.validity().value_missing);
    }

    #[test]
    fn test_change_invokes_handler_with_live_state() {
        let seen: Rc<RefCell<Vec<(String, bool)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let renderer = renderer();
        let field = renderer.prepare(
            FieldDescriptor::new("Dark mode", FieldKind::Checkbox).on_change(
                move |value, checked, element| {
                    assert_eq!(element.kind, FieldKind::Checkbox);
                    sink.borrow_mut().push((value.to_string(), checked));
                },
            ),
        );
        let mut element = InputElement::from_markup(renderer.render(&field).input().unwrap());
        element.set_checked(true);
        renderer.on_input_changed(&mut element, field.descriptor());
        element.set_checked(false);
        renderer.on_input_changed(&mut element, field.descriptor());

        assert_eq!(
            *seen.borrow(),
            vec![("on".to_string(), true), ("on".to_string(), false)]
        );
    }

    #[derive(Default)]
    struct FakeSections {
        parent: Option<NodeId>,
        expanded: bool,
        toggles: usize,
    }

    impl Disclosures for FakeSections {
        fn closest_disclosure(&self, _node: NodeId) -> Option<NodeId> {
            self.parent
        }

        fn is_expanded(&self, _disclosure: NodeId) -> bool {
            self.expanded
        }

        fn toggle(&mut self, _disclosure: NodeId) {
            self.expanded = !self.expanded;
            self.toggles += 1;
        }
    }

    fn invalid_event(target: usize) -> InvalidEvent {
        InvalidEvent {
            target: NodeId::new(target),
            validity: ValidityState {
                value_missing: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_invalid_in_collapsed_section_expands_once() {
        let renderer = renderer();
        let mut sections = FakeSections {
            parent: Some(NodeId::new(0)),
            ..Default::default()
        };
        let mut deferred = DeferredQueue::new();

        assert!(renderer.on_input_invalid(&invalid_event(1), &mut sections, &mut deferred));
        assert_eq!(sections.toggles, 1);
        assert_eq!(deferred.drain(), vec![Deferred::RevealAndReport(NodeId::new(1))]);

        // Already expanded now: nothing more happens.
        assert!(!renderer.on_input_invalid(&invalid_event(1), &mut sections, &mut deferred));
        assert_eq!(sections.toggles, 1);
        assert!(deferred.is_empty());
    }

    #[test]
    fn test_invalid_noops() {
        let renderer = renderer();
        let mut deferred = DeferredQueue::new();

        let mut expanded = FakeSections {
            parent: Some(NodeId::new(0)),
            expanded: true,
            ..Default::default()
        };
        assert!(!renderer.on_input_invalid(&invalid_event(1), &mut expanded, &mut deferred));
        assert_eq!(expanded.toggles, 0);

        let mut top_level = FakeSections::default();
        assert!(!renderer.on_input_invalid(&invalid_event(1), &mut top_level, &mut deferred));

        let mut collapsed = FakeSections {
            parent: Some(NodeId::new(0)),
            ..Default::default()
        };
        let valid = InvalidEvent {
            target: NodeId::new(1),
            validity: ValidityState::default(),
        };
        assert!(!renderer.on_input_invalid(&valid, &mut collapsed, &mut deferred));
        assert_eq!(collapsed.toggles, 0);
        assert!(deferred.is_empty());
    }
}
