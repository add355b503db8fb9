//! Models module for the note editor
//!
//! This module contains the in-memory document model: the canvas of typed
//! blocks, the drag-reorder state machine, media staging, and the editor
//! session that owns all of it. The model is the single source of truth;
//! the DOM is a projection (see `crate::render`).

pub mod block;
pub mod canvas;
pub mod checklist;
pub mod drag;
pub mod error;
pub mod media;
pub mod session;
pub mod staging;
pub mod table;

// Re-export commonly used types
pub use block::{new_block_id, Block, BlockBody, BlockKind};
pub use canvas::Canvas;
pub use checklist::{Checklist, ChecklistItem};
pub use drag::{DragState, DropEffect, DropOutcome};
pub use error::EditError;
pub use media::{is_local_url, MediaData, MediaState, RecorderState};
pub use session::{Category, EditorSession};
pub use staging::{MediaStaging, StagedKind, StagedMedia};
pub use table::TableGrid;
