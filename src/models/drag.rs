//! Drag-reorder state machine types
//!
//! A drop means different things depending on where the drag started: a
//! palette drag inserts a fresh block (copy semantics, canvas end), a
//! canvas drag moves the existing block (move semantics, tie-break in
//! `Canvas::reorder`). The state is a proper enum rather than a nullable
//! "currently dragged element" reference; transitions live on
//! `EditorSession`, which guarantees the return to `Idle` on drag end no
//! matter how the drop went.

use serde::{Deserialize, Serialize};

use super::block::BlockKind;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging a palette entry; a drop creates a new block.
    DraggingNew(BlockKind),
    /// Dragging an existing canvas block, identified by id.
    DraggingExisting(String),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    /// Id of the block being reordered, if any (drives the visual
    /// drag affordance).
    pub fn dragged_block(&self) -> Option<&str> {
        match self {
            DragState::DraggingExisting(id) => Some(id),
            _ => None,
        }
    }
}

/// Cursor feedback while hovering a drop target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropEffect {
    Copy,
    Move,
}

impl DropEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropEffect::Copy => "copy",
            DropEffect::Move => "move",
        }
    }
}

/// What a drop actually did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DropOutcome {
    /// A palette drop created this block at the canvas end.
    Inserted { id: String },
    /// An existing block was moved.
    Reordered,
    /// Nothing to do (no active drag, or dropped on itself).
    Ignored,
}
