//! Form structure: fields and the collapsible sections that contain them
//!
//! Nodes live in one arena in document order. Every node records its
//! parent, so looking up the nearest enclosing section walks up from a
//! field without any back-references.

use crate::form::element::InputElement;
use crate::form::renderer::{FieldRenderer, PreparedField};
use crate::form::traits::Disclosures;
use crate::layout::{LayoutItem, LayoutSpec};
use crate::models::{FieldDescriptor, FieldKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// A prepared field and its live input element.
#[derive(Debug, Clone)]
pub struct FieldSlot {
    pub field: PreparedField,
    pub element: InputElement,
}

impl FieldSlot {
    pub fn new(renderer: &FieldRenderer, descriptor: FieldDescriptor) -> Self {
        let field = renderer.prepare(descriptor);
        let element = renderer.render_element(&field);
        Self { field, element }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        self.field.descriptor()
    }
}

/// A collapsible section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub title: String,
    pub expanded: bool,
}

#[derive(Debug, Clone)]
pub enum Node {
    Field(FieldSlot),
    Disclosure(Disclosure),
}

#[derive(Debug, Clone)]
struct Entry {
    parent: Option<NodeId>,
    depth: usize,
    node: Node,
}

#[derive(Debug, Clone, Default)]
pub struct FormTree {
    entries: Vec<Entry>,
}

impl FormTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layout(layout: &LayoutSpec, renderer: &FieldRenderer) -> Self {
        let mut tree = Self::new();
        tree.push_items(None, &layout.items, renderer);
        tree
    }

    fn push_items(&mut self, parent: Option<NodeId>, items: &[LayoutItem], renderer: &FieldRenderer) {
        for item in items {
            match item {
                LayoutItem::Field(descriptor) => {
                    self.push_field(parent, FieldSlot::new(renderer, descriptor.clone()));
                }
                LayoutItem::Section(section) => {
                    let id = self.push_disclosure(parent, &section.title, section.expanded);
                    self.push_items(Some(id), &section.items, renderer);
                }
            }
        }
    }

    fn push(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        let depth = parent.map_or(0, |p| self.depth(p) + 1);
        self.entries.push(Entry { parent, depth, node });
        NodeId(self.entries.len() - 1)
    }

    pub fn push_field(&mut self, parent: Option<NodeId>, slot: FieldSlot) -> NodeId {
        let is_radio = slot.element.kind == FieldKind::Radio;
        let id = self.push(parent, Node::Field(slot));
        if is_radio {
            self.sync_radio_group(id);
        }
        id
    }

    pub fn push_disclosure(&mut self, parent: Option<NodeId>, title: &str, expanded: bool) -> NodeId {
        self.push(
            parent,
            Node::Disclosure(Disclosure {
                title: title.to_string(),
                expanded,
            }),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every node in document order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.entries.len()).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entries.get(id.0).map(|entry| &entry.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(id.0).and_then(|entry| entry.parent)
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.entries.get(id.0).map_or(0, |entry| entry.depth)
    }

    pub fn field(&self, id: NodeId) -> Option<&FieldSlot> {
        match self.node(id)? {
            Node::Field(slot) => Some(slot),
            Node::Disclosure(_) => None,
        }
    }

    pub fn field_mut(&mut self, id: NodeId) -> Option<&mut FieldSlot> {
        match &mut self.entries.get_mut(id.0)?.node {
            Node::Field(slot) => Some(slot),
            Node::Disclosure(_) => None,
        }
    }

    pub fn disclosure(&self, id: NodeId) -> Option<&Disclosure> {
        match self.node(id)? {
            Node::Disclosure(disclosure) => Some(disclosure),
            Node::Field(_) => None,
        }
    }

    /// Fields in document order.
    pub fn fields(&self) -> impl Iterator<Item = (NodeId, &FieldSlot)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match &entry.node {
                Node::Field(slot) => Some((NodeId(i), slot)),
                Node::Disclosure(_) => None,
            })
    }

    /// Find a field by its id, falling back to its name.
    pub fn find_field(&self, key: &str) -> Option<NodeId> {
        self.fields()
            .find(|(_, slot)| slot.field.id() == Some(key))
            .or_else(|| {
                self.fields()
                    .find(|(_, slot)| slot.descriptor().name.as_deref() == Some(key))
            })
            .map(|(id, _)| id)
    }

    /// A node is visible when every section above it is expanded.
    pub fn is_visible(&self, id: NodeId) -> bool {
        if id.0 >= self.entries.len() {
            return false;
        }
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if let Some(disclosure) = self.disclosure(ancestor) {
                if !disclosure.expanded {
                    return false;
                }
            }
            current = self.parent(ancestor);
        }
        true
    }

    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.node_ids().filter(|id| self.is_visible(*id)).collect()
    }

    /// Other radios sharing `field`'s name.
    pub fn radio_group(&self, field: NodeId) -> Vec<NodeId> {
        let Some(slot) = self.field(field) else {
            return Vec::new();
        };
        let Some(name) = slot.descriptor().name.as_deref() else {
            return Vec::new();
        };
        self.fields()
            .filter(|(id, other)| {
                *id != field
                    && other.element.kind == slot.element.kind
                    && other.descriptor().name.as_deref() == Some(name)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Tell every radio named like `field` whether another one in the
    /// group is checked. A required group is satisfied by any checked member.
    pub fn sync_radio_group(&mut self, field: NodeId) {
        if self.field(field).map(|slot| slot.element.kind) != Some(FieldKind::Radio) {
            return;
        }
        let mut members = self.radio_group(field);
        members.push(field);
        let checked: Vec<NodeId> = members
            .iter()
            .copied()
            .filter(|id| self.field(*id).map_or(false, |slot| slot.element.checked()))
            .collect();
        for id in members {
            let others_checked = checked.iter().any(|other| *other != id);
            if let Some(slot) = self.field_mut(id) {
                slot.element.set_group_checked(others_checked);
            }
        }
    }
}

impl Disclosures for FormTree {
    fn closest_disclosure(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            if self.disclosure(ancestor).is_some() {
                return Some(ancestor);
            }
            current = self.parent(ancestor);
        }
        None
    }

    fn is_expanded(&self, disclosure: NodeId) -> bool {
        self.disclosure(disclosure).map_or(false, |d| d.expanded)
    }

    fn toggle(&mut self, disclosure: NodeId) {
        if let Some(Entry {
            node: Node::Disclosure(d),
            ..
        }) = self.entries.get_mut(disclosure.0)
        {
            d.expanded = !d.expanded;
        }
    }
}
