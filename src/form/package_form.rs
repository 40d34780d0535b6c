//! Base screen shared by every package options form
//!
//! Owns the field tree, dispatches input and invalid events to the
//! [`FieldRenderer`], and provides the scroll/report surface the deferred
//! reveal runs against.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::form::deferred::DeferredQueue;
use crate::form::element::InputElement;
use crate::form::renderer::{FieldRenderer, InvalidEvent};
use crate::form::traits::{Disclosures, FieldSurface};
use crate::form::tree::{FormTree, Node, NodeId};
use crate::form::ui;
use crate::form::validity;
use crate::layout::LayoutSpec;
use crate::models::{FieldKind, FieldValue};

/// Collected values of a successfully submitted form.
pub type PackageOptions = Map<String, Value>;

/// Validation message currently shown under a field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationBubble {
    pub field: NodeId,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub message: String,
}

/// Result of submitting the form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(PackageOptions),
    Rejected { invalid: Vec<NodeId> },
}

/// Action requested by key handling
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    None,
    Quit,
    Submitted(PackageOptions),
}

/// Vertical extent of one visible item in the scrollable field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub node: NodeId,
    pub start: u16,
    pub height: u16,
}

pub struct PackageForm {
    pub title: String,
    pub description: Option<String>,
    tree: FormTree,
    renderer: FieldRenderer,
    deferred: DeferredQueue,
    focus: Option<NodeId>,
    scroll: u16,
    viewport: u16,
    bubble: Option<ValidationBubble>,
    status: Option<StatusLine>,
}

impl PackageForm {
    pub fn new(layout: &LayoutSpec, renderer: FieldRenderer) -> Self {
        let tree = FormTree::from_layout(layout, &renderer);
        let mut form = Self {
            title: layout.title.clone(),
            description: layout.description.clone(),
            tree,
            renderer,
            deferred: DeferredQueue::new(),
            focus: None,
            scroll: 0,
            viewport: 0,
            bubble: None,
            status: None,
        };
        form.focus = form.focusable().first().copied();
        form
    }

    pub fn tree(&self) -> &FormTree {
        &self.tree
    }

    pub fn renderer(&self) -> &FieldRenderer {
        &self.renderer
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn bubble(&self) -> Option<&ValidationBubble> {
        self.bubble.as_ref()
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(StatusLine {
            kind,
            message: message.into(),
        });
    }

    /// Visible nodes that can take focus, in document order.
    pub fn focusable(&self) -> Vec<NodeId> {
        self.tree
            .visible_nodes()
            .into_iter()
            .filter(|id| {
                self.tree
                    .field(*id)
                    .map_or(true, |slot| slot.element.kind != FieldKind::Hidden)
            })
            .collect()
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.focusable().contains(&node) {
            self.focus = Some(node);
        }
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, step: isize) {
        let focusable = self.focusable();
        if focusable.is_empty() {
            self.focus = None;
            return;
        }
        let len = focusable.len() as isize;
        let next = match self.focus.and_then(|f| focusable.iter().position(|n| *n == f)) {
            Some(i) => (i as isize + step).rem_euclid(len),
            None => 0,
        };
        self.focus = Some(focusable[next as usize]);
        if let Some(node) = self.focus {
            self.scroll_into_view(node);
        }
    }

    /// Expand or collapse a section on behalf of the user.
    pub fn toggle_section(&mut self, section: NodeId) {
        if self.tree.disclosure(section).is_none() {
            return;
        }
        self.tree.toggle(section);
        if let Some(focus) = self.focus {
            if !self.tree.is_visible(focus) {
                self.focus = Some(section);
            }
        }
        if let Some(bubble) = &self.bubble {
            if !self.tree.is_visible(bubble.field) {
                self.bubble = None;
            }
        }
    }

    /// Apply a user edit to a field and fire its input event when the edit
    /// changed anything. Readonly and unknown fields are left untouched.
    pub fn edit<F>(&mut self, node: NodeId, edit: F) -> bool
    where
        F: FnOnce(&mut InputElement) -> bool,
    {
        let Some(slot) = self.tree.field_mut(node) else {
            return false;
        };
        if slot.element.is_readonly() {
            return false;
        }
        if !edit(&mut slot.element) {
            return false;
        }
        self.dispatch_input(node);
        true
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) -> bool {
        self.edit(node, |element| {
            element.set_value(value);
            true
        })
    }

    /// Check or uncheck a checkbox/radio. Checking a radio unchecks the
    /// rest of its group.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> bool {
        let Some(kind) = self.tree.field(node).map(|slot| slot.element.kind) else {
            return false;
        };
        if !kind.is_checkable() {
            return false;
        }
        let changed = self.edit(node, |element| {
            element.set_checked(checked);
            true
        });
        if changed && kind == FieldKind::Radio {
            if checked {
                for other in self.tree.radio_group(node) {
                    if let Some(slot) = self.tree.field_mut(other) {
                        slot.element.set_checked(false);
                    }
                }
            }
            self.tree.sync_radio_group(node);
        }
        changed
    }

    /// Fill fields from named values, as if the user had typed them.
    /// Returns the names that matched no field.
    pub fn apply_values(&mut self, values: &PackageOptions) -> Vec<String> {
        let mut unknown = Vec::new();
        for (name, value) in values {
            let Some(node) = self.tree.find_field(name) else {
                unknown.push(name.clone());
                continue;
            };
            let kind = self.tree.field(node).map(|slot| slot.element.kind);
            match (kind, value) {
                (Some(FieldKind::Checkbox), Value::Bool(checked)) => {
                    self.set_checked(node, *checked);
                }
                (Some(FieldKind::Radio), Value::String(choice)) => {
                    let group = std::iter::once(node).chain(self.tree.radio_group(node));
                    let chosen = group.into_iter().find(|id| {
                        self.tree
                            .field(*id)
                            .map_or(false, |slot| slot.element.value() == choice)
                    });
                    match chosen {
                        Some(id) => {
                            self.set_checked(id, true);
                        }
                        None => unknown.push(format!("{}={}", name, choice)),
                    }
                }
                (Some(FieldKind::Checkbox | FieldKind::Radio), _) => {
                    unknown.push(name.clone());
                }
                (_, Value::String(text)) => {
                    self.set_value(node, text);
                }
                (_, Value::Array(items)) => {
                    let joined = items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(",");
                    self.set_value(node, &joined);
                }
                (_, other) => {
                    self.set_value(node, &other.to_string());
                }
            }
        }
        unknown
    }

    fn dispatch_input(&mut self, node: NodeId) {
        let Some(slot) = self.tree.field_mut(node) else {
            return;
        };
        self.renderer
            .on_input_changed(&mut slot.element, slot.field.descriptor());
        if self.bubble.as_ref().map_or(false, |b| b.field == node) {
            self.bubble = None;
        }
    }

    /// Validate every field. Invalid fields receive the invalid event in
    /// document order; the first one is reported right away when it was
    /// already on screen.
    pub fn submit(&mut self) -> SubmitOutcome {
        let invalid: Vec<(NodeId, InvalidEvent)> = self
            .tree
            .fields()
            .filter(|(_, slot)| slot.element.will_validate())
            .filter_map(|(id, slot)| {
                let validity = slot.element.validity();
                (!validity.valid()).then_some((id, InvalidEvent { target: id, validity }))
            })
            .collect();

        if invalid.is_empty() {
            let options = self.package_options();
            info!("Form '{}' submitted with {} options", self.title, options.len());
            self.bubble = None;
            self.set_status(StatusKind::Success, "Package options are valid");
            return SubmitOutcome::Accepted(options);
        }

        let first = invalid[0].0;
        let first_was_visible = self.tree.is_visible(first);

        for (_, event) in &invalid {
            self.renderer
                .on_input_invalid(event, &mut self.tree, &mut self.deferred);
        }

        if first_was_visible {
            self.scroll_into_view(first);
            self.report_validity(first);
        }

        debug!(count = invalid.len(), "form submission blocked by invalid fields");
        self.set_status(
            StatusKind::Error,
            format!("{} field(s) need attention", invalid.len()),
        );
        SubmitOutcome::Rejected {
            invalid: invalid.into_iter().map(|(id, _)| id).collect(),
        }
    }

    /// Run continuations deferred during the last update cycle.
    pub fn tick(&mut self) -> usize {
        let tasks = self.deferred.drain();
        let count = tasks.len();
        for task in tasks {
            task.run(self);
        }
        count
    }

    /// Named field values, as the packaging service expects them.
    pub fn package_options(&self) -> PackageOptions {
        let mut options = Map::new();
        for (_, slot) in self.tree.fields() {
            let Some(name) = slot.descriptor().name.clone() else {
                continue;
            };
            let element = &slot.element;
            let value = match element.kind {
                FieldKind::Submit | FieldKind::Reset | FieldKind::Button | FieldKind::Image => {
                    continue
                }
                FieldKind::Checkbox => Value::Bool(element.checked()),
                FieldKind::Radio if !element.checked() => continue,
                FieldKind::Number | FieldKind::Range => number_value(element.value()),
                _ => match slot.descriptor().value {
                    Some(FieldValue::Multiple(_)) => Value::Array(
                        element
                            .value()
                            .split(',')
                            .map(str::trim)
                            .filter(|v| !v.is_empty())
                            .map(|v| Value::String(v.to_string()))
                            .collect(),
                    ),
                    _ => Value::String(element.value().to_string()),
                },
            };
            options.insert(name, value);
        }
        options
    }

    /// Layout of visible items in the scrollable list.
    pub fn rows(&self) -> Vec<Row> {
        let mut start = 0u16;
        self.focusable()
            .into_iter()
            .map(|node| {
                let height = ui::item_height(self, node);
                let row = Row { node, start, height };
                start = start.saturating_add(height);
                row
            })
            .collect()
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> FormAction {
        let submit = matches!(key.code, KeyCode::F(2))
            || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL));
        if submit {
            return self.submit_action();
        }

        let focus = self.focus;
        let on_section = focus.map_or(false, |f| self.tree.disclosure(f).is_some());
        let focused_kind = focus
            .and_then(|f| self.tree.field(f))
            .map(|slot| slot.element.kind);

        match key.code {
            KeyCode::Esc => return FormAction::Quit,
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_previous(),
            KeyCode::Enter if on_section => {
                if let Some(section) = focus {
                    self.toggle_section(section);
                }
            }
            // Implicit submission, as pressing Enter in a form field does.
            KeyCode::Enter => return self.submit_action(),
            KeyCode::Char(' ') if on_section => {
                if let Some(section) = focus {
                    self.toggle_section(section);
                }
            }
            KeyCode::Char(' ') if focused_kind.map_or(false, |k| k.is_checkable()) => {
                if let Some(node) = focus {
                    let checked = self
                        .tree
                        .field(node)
                        .map_or(false, |slot| slot.element.checked());
                    let kind = focused_kind.unwrap_or_default();
                    // Radios can only be checked by the user.
                    if kind == FieldKind::Checkbox || !checked {
                        self.set_checked(node, !checked);
                    }
                }
            }
            KeyCode::Char(c) => self.edit_focused_text(|element| {
                element.insert_char(c);
                true
            }),
            KeyCode::Backspace => self.edit_focused_text(InputElement::delete_char),
            KeyCode::Delete => self.edit_focused_text(InputElement::delete_char_forward),
            KeyCode::Left => self.move_focused_cursor(InputElement::move_cursor_left),
            KeyCode::Right => self.move_focused_cursor(InputElement::move_cursor_right),
            KeyCode::Home => self.move_focused_cursor(InputElement::move_cursor_to_start),
            KeyCode::End => self.move_focused_cursor(InputElement::move_cursor_to_end),
            _ => {}
        }
        FormAction::None
    }

    fn submit_action(&mut self) -> FormAction {
        match self.submit() {
            SubmitOutcome::Accepted(options) => FormAction::Submitted(options),
            SubmitOutcome::Rejected { .. } => FormAction::None,
        }
    }

    fn edit_focused_text<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut InputElement) -> bool,
    {
        let Some(node) = self.focus else {
            return;
        };
        let editable = self
            .tree
            .field(node)
            .map_or(false, |slot| !slot.element.kind.is_checkable());
        if editable {
            self.edit(node, edit);
        }
    }

    fn move_focused_cursor(&mut self, movement: fn(&mut InputElement)) {
        if let Some(slot) = self.focus.and_then(|node| self.tree.field_mut(node)) {
            movement(&mut slot.element);
        }
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        self.viewport = ui::list_viewport_height(area);
        if let Some(node) = self.focus {
            self.keep_in_view(node);
        }
        ui::render_form(f, area, self);
    }

    fn keep_in_view(&mut self, node: NodeId) {
        if self.viewport == 0 {
            return;
        }
        let Some(row) = self.rows().into_iter().find(|row| row.node == node) else {
            return;
        };
        let end = row.start.saturating_add(row.height);
        if row.start < self.scroll {
            self.scroll = row.start;
        } else if end > self.scroll.saturating_add(self.viewport) {
            self.scroll = end.saturating_sub(self.viewport);
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.node(id)
    }
}

impl FieldSurface for PackageForm {
    fn scroll_into_view(&mut self, field: NodeId) {
        if !self.tree.is_visible(field) {
            return;
        }
        self.focus(field);
        self.keep_in_view(field);
    }

    fn report_validity(&mut self, field: NodeId) -> bool {
        let Some(slot) = self.tree.field(field) else {
            return true;
        };
        if slot.element.check_validity() {
            if self.bubble.as_ref().map_or(false, |b| b.field == field) {
                self.bubble = None;
            }
            return true;
        }
        let message = slot.element.validation_message();
        debug!(node = field.index(), message = %message, "reporting invalid field");
        self.bubble = Some(ValidationBubble { field, message });
        self.focus(field);
        false
    }
}

fn number_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    validity::parse_number(raw)
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
