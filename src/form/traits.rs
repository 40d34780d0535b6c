//! Seams between field handlers and the widgets around them

use crate::form::tree::NodeId;

/// Collapsible sections containing fields.
pub trait Disclosures {
    /// Nearest enclosing disclosure of `node`, if any
    fn closest_disclosure(&self, node: NodeId) -> Option<NodeId>;

    /// Whether the disclosure currently shows its contents
    fn is_expanded(&self, disclosure: NodeId) -> bool;

    /// Flip the disclosure between collapsed and expanded
    fn toggle(&mut self, disclosure: NodeId);
}

/// The surface fields are displayed on.
pub trait FieldSurface {
    /// Bring the field into the visible viewport
    fn scroll_into_view(&mut self, field: NodeId);

    /// Show the field's validation message if it is invalid.
    /// Returns whether the field is valid.
    fn report_validity(&mut self, field: NodeId) -> bool;
}
