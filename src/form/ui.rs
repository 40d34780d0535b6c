//! Drawing for package forms

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::form::element::InputElement;
use crate::form::markup::{FieldMarkup, LabelMarkup, MarkupNode};
use crate::form::package_form::{PackageForm, StatusKind};
use crate::form::tree::{Disclosure, FieldSlot, Node, NodeId};
use crate::models::{FieldKind, RenderOrder};

const HELP_TEXT: &str = "Tab/Shift+Tab move · Space toggle · Enter/Ctrl+S submit · Esc quit";
const TOOLTIP_MARKER: &str = " (?)";

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default()
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default()
            .fg(Color::Green)
    }

    pub fn info() -> Style {
        Style::default()
            .fg(Color::Cyan)
    }

    pub fn inactive() -> Style {
        Style::default()
            .fg(Color::Gray)
    }

    pub fn active_border() -> Style {
        Style::default()
            .fg(Color::Yellow)
    }
}

/// Header, field list, help and status areas.
fn split(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

/// Rows available to the field list inside its border.
pub fn list_viewport_height(area: Rect) -> u16 {
    split(area)[1].height.saturating_sub(2)
}

pub fn item_height(form: &PackageForm, node: NodeId) -> u16 {
    item_lines(form, node).len() as u16
}

fn indent(form: &PackageForm, node: NodeId) -> String {
    "  ".repeat(form.tree().depth(node))
}

/// Lines one visible item occupies in the field list.
pub fn item_lines(form: &PackageForm, node: NodeId) -> Vec<Line<'static>> {
    let focused = form.focused() == Some(node);
    match form.node(node) {
        Some(Node::Disclosure(disclosure)) => {
            vec![section_line(disclosure, indent(form, node), focused)]
        }
        Some(Node::Field(slot)) => field_lines(form, node, slot, focused),
        None => Vec::new(),
    }
}

fn section_line(disclosure: &Disclosure, indent: String, focused: bool) -> Line<'static> {
    let marker = if disclosure.expanded { "▾" } else { "▸" };
    let style = if focused { Styles::selected() } else { Styles::title() };
    Line::from(vec![
        Span::raw(indent),
        Span::styled(format!("{} {}", marker, disclosure.title), style),
    ])
}

fn field_lines(form: &PackageForm, node: NodeId, slot: &FieldSlot, focused: bool) -> Vec<Line<'static>> {
    let indent = indent(form, node);
    let markup = form.renderer().render(&slot.field);
    let required = slot.descriptor().required;
    let mut lines = Vec::new();

    match markup.order {
        RenderOrder::InputFirst => {
            let mut spans = vec![Span::raw(indent.clone())];
            for part in &markup.nodes {
                match part {
                    MarkupNode::Input(_) => spans.push(check_span(&slot.element, focused)),
                    MarkupNode::Label(label) => {
                        spans.push(Span::raw(" "));
                        spans.extend(label_spans(label, required));
                    }
                }
            }
            lines.push(Line::from(spans));
        }
        RenderOrder::LabelFirst => {
            for part in &markup.nodes {
                let mut spans = vec![Span::raw(indent.clone())];
                match part {
                    MarkupNode::Label(label) => spans.extend(label_spans(label, required)),
                    MarkupNode::Input(_) => spans.extend(value_spans(&slot.element, focused)),
                }
                lines.push(Line::from(spans));
            }
        }
    }

    if let Some(bubble) = form.bubble().filter(|b| b.field == node) {
        lines.push(Line::from(vec![
            Span::raw(indent),
            Span::styled(format!("⚠ {}", bubble.message), Styles::error()),
        ]));
    }

    lines
}

fn label_spans(label: &LabelMarkup, required: bool) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(label.text.clone(), Styles::label())];
    if required {
        spans.push(Span::styled(" *", Styles::error()));
    }
    if label.tooltip.is_some() {
        spans.push(Span::styled(TOOLTIP_MARKER, Styles::info()));
    }
    spans
}

fn check_span(element: &InputElement, focused: bool) -> Span<'static> {
    let text = match (element.kind, element.checked()) {
        (FieldKind::Radio, true) => "(•)",
        (FieldKind::Radio, false) => "( )",
        (_, true) => "[x]",
        (_, false) => "[ ]",
    };
    let style = if focused { Styles::selected() } else { Styles::default() };
    Span::styled(text, style)
}

fn display_value(element: &InputElement) -> String {
    if element.kind == FieldKind::Password {
        "•".repeat(element.value().chars().count())
    } else {
        element.value().to_string()
    }
}

fn value_spans(element: &InputElement, focused: bool) -> Vec<Span<'static>> {
    let prompt = if focused {
        Span::styled("> ", Styles::active_border())
    } else {
        Span::styled("> ", Styles::inactive())
    };

    let value = display_value(element);
    let body = if value.is_empty() {
        Span::styled(element.placeholder.clone().unwrap_or_default(), Styles::inactive())
    } else if element.is_readonly() {
        Span::styled(value, Styles::inactive())
    } else if !element.check_validity() {
        Span::styled(value, Styles::error())
    } else {
        Span::raw(value)
    };

    vec![prompt, body]
}

/// Tooltip text and link of the focused field, if it has one.
fn focused_tooltip(form: &PackageForm) -> Option<(String, Option<String>)> {
    let slot = form.focused().and_then(|node| form.tree().field(node))?;
    let markup: FieldMarkup = form.renderer().render(&slot.field);
    markup
        .tooltip()
        .map(|tooltip| (tooltip.text.clone(), tooltip.link.clone()))
}

pub fn render_form(f: &mut Frame, area: Rect, form: &PackageForm) {
    let [header, body, help, status] = split(area);

    let mut header_lines = vec![Line::from(Span::styled(form.title.clone(), Styles::title()))];
    if let Some(description) = &form.description {
        header_lines.push(Line::from(Span::styled(description.clone(), Styles::inactive())));
    }
    f.render_widget(Paragraph::new(header_lines), header);

    let rows = form.rows();
    let lines: Vec<Line> = rows
        .iter()
        .flat_map(|row| item_lines(form, row.node))
        .collect();
    let list = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Options"))
        .scroll((form.scroll_offset(), 0));
    f.render_widget(list, body);

    let help_lines = match focused_tooltip(form) {
        Some((text, link)) => {
            let mut lines = vec![Line::from(Span::styled(text, Styles::info()))];
            if let Some(link) = link {
                lines.push(Line::from(Span::styled(link, Styles::inactive())));
            }
            lines
        }
        None => vec![Line::from(Span::styled(HELP_TEXT, Styles::inactive()))],
    };
    let help_widget = Paragraph::new(help_lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_widget, help);

    if let Some(line) = form.status() {
        let style = match line.kind {
            StatusKind::Success => Styles::success(),
            StatusKind::Error => Styles::error(),
        };
        f.render_widget(Paragraph::new(line.message.clone()).style(style), status);
    }

    place_cursor(f, body, form, &rows);
}

/// Put the terminal cursor in the focused text field.
fn place_cursor(f: &mut Frame, body: Rect, form: &PackageForm, rows: &[crate::form::package_form::Row]) {
    let Some(node) = form.focused() else {
        return;
    };
    let Some(slot) = form.tree().field(node) else {
        return;
    };
    if slot.element.kind.render_order() != RenderOrder::LabelFirst || slot.element.is_readonly() {
        return;
    }
    let Some(row) = rows.iter().find(|row| row.node == node) else {
        return;
    };

    let line = row.start + 1;
    if line < form.scroll_offset() {
        return;
    }
    let y = body.y + 1 + (line - form.scroll_offset());

    let before_cursor: String = display_value(&slot.element)
        .chars()
        .take(slot.element.cursor_position())
        .collect();
    let x = body.x
        + 1
        + (form.tree().depth(node) * 2) as u16
        + 2
        + before_cursor.width() as u16;

    if y < body.y + body.height.saturating_sub(1) && x < body.x + body.width.saturating_sub(1) {
        f.set_cursor(x, y);
    }
}
