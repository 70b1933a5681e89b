//! Interaction decisions reported to the host.

use crate::hit_test::Hit;
use crate::model::NodeId;

/// Pointer button of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// A state change the widget made in response to input.
///
/// Dispatching these to listeners is the host's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    Expanded(NodeId),
    Collapsed(NodeId),
    SelectionChanged {
        previous: Option<NodeId>,
        current: Option<NodeId>,
    },
    CheckChanged {
        node: NodeId,
        checked: bool,
    },
}

/// What a pointer event did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerOutcome {
    pub events: Vec<TreeEvent>,
    /// The widget needs repainting.
    pub redraw: bool,
    pub hit: Option<Hit>,
}

impl PointerOutcome {
    pub(crate) fn ignored(hit: Option<Hit>) -> Self {
        Self {
            hit,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, event: TreeEvent) {
        self.events.push(event);
        self.redraw = true;
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && !self.redraw
    }
}
