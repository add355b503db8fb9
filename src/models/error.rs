//! Error types for model mutations
//!
//! Structural failures (bad id, wrong block kind, out-of-range index) are
//! reported here; network/protocol failures live in `crate::net`.

use thiserror::Error;

/// Errors raised by editing operations on the canvas model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// The canvas holds no block with this id
    #[error("no block with id {0}")]
    UnknownBlock(String),

    /// An operation was applied to a block of the wrong type
    #[error("block {id} is not a {expected} block")]
    KindMismatch { id: String, expected: &'static str },

    /// A row/column/item index is outside the current bounds
    #[error("{context} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        context: &'static str,
        index: usize,
        len: usize,
    },

    /// Reorder drags are disabled in the touch layout (tap-to-insert instead)
    #[error("drag-and-drop is disabled in the touch layout")]
    DragDisabled,

    /// A block cannot start a drag while one of its editable regions has focus
    #[error("block {0} is being edited and cannot start a drag")]
    EditingInProgress(String),

    /// Recorder transitions are a strict idle <-> recording toggle
    #[error("recorder is {0}, transition refused")]
    RecorderState(&'static str),
}

/// Index past the end of an item/row/column list. Sub-models report this
/// bare; the session wraps it with context into `EditError`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfRange {
    pub index: usize,
    pub len: usize,
}
