//! Continuations that run after the current UI update cycle
//!
//! A pending task is never cancelled. Scheduling a second task for the same
//! field replaces the first so repeated invalid events do not stack scrolls.

use tracing::debug;

use crate::form::traits::FieldSurface;
use crate::form::tree::NodeId;

/// Work deferred to the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Scroll the field into view, then report its validity
    RevealAndReport(NodeId),
}

impl Deferred {
    pub fn target(&self) -> NodeId {
        match self {
            Deferred::RevealAndReport(node) => *node,
        }
    }

    pub fn run<S: FieldSurface + ?Sized>(self, surface: &mut S) {
        match self {
            Deferred::RevealAndReport(node) => {
                surface.scroll_into_view(node);
                surface.report_validity(node);
            }
        }
    }
}

/// At most one pending task per field, kept in scheduling order.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    pending: Vec<Deferred>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: Deferred) {
        let target = task.target();
        if let Some(existing) = self.pending.iter().position(|t| t.target() == target) {
            debug!(node = target.index(), "superseding pending deferred task");
            self.pending.remove(existing);
        }
        self.pending.push(task);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending task, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Deferred> {
        std::mem::take(&mut self.pending)
    }
}
