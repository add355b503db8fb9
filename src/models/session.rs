//! Editor session state
//!
//! `EditorSession` owns everything the source kept in `window.*` globals:
//! the canvas, the note's title and identity, the category cache, the
//! staged-media map, and the drag/edit/recorder state. It is the
//! WASM-owned source of truth; every mutation goes through a method here
//! and leaves the model consistent before returning.

use serde::{Deserialize, Serialize};

use super::block::{Block, BlockBody, BlockKind};
use super::canvas::Canvas;
use super::drag::{DragState, DropEffect, DropOutcome};
use super::error::{EditError, OutOfRange};
use super::media::RecorderState;
use super::staging::{MediaStaging, StagedKind, StagedMedia};

/// Default note title, also restored by `new_note`.
pub const DEFAULT_TITLE: &str = "Untitled Note";

/// A note category as served by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorSession {
    canvas: Canvas,
    title: String,
    note_id: Option<u64>,
    categories: Vec<Category>,
    selected_category: Option<u64>,
    /// Category name carried by a loaded note when the id is not in the
    /// cached category list.
    category_label: Option<String>,
    staging: MediaStaging,
    drag: DragState,
    /// Block whose editable region currently has focus; that block is not
    /// draggable until the focus leaves.
    editing: Option<String>,
    recorder: RecorderState,
    touch_layout: bool,
    save_in_flight: bool,
}

impl EditorSession {
    pub fn new() -> EditorSession {
        EditorSession {
            title: DEFAULT_TITLE.to_string(),
            recorder: RecorderState::Idle,
            ..EditorSession::default()
        }
    }

    // ------------------------------------------------------------------
    // Note lifecycle
    // ------------------------------------------------------------------

    /// Reset to a blank note: canvas, staging, title, category selection
    /// and note identity all reset together, never partially. The shell
    /// confirms with the user before calling this.
    pub fn new_note(&mut self) {
        self.canvas.clear();
        self.staging.clear();
        self.title = DEFAULT_TITLE.to_string();
        self.note_id = None;
        self.selected_category = None;
        self.category_label = None;
        self.editing = None;
        self.recorder = RecorderState::Idle;
        self.drag = DragState::Idle;
    }

    /// Wholesale replacement from server data (load path). The old canvas
    /// is discarded, not merged; the category is resolved against the
    /// cache by name, falling back to a bare label for names the cache
    /// does not know.
    pub fn replace_document(
        &mut self,
        note_id: u64,
        title: String,
        category_name: Option<String>,
        blocks: Vec<Block>,
    ) {
        self.new_note();
        self.note_id = Some(note_id);
        self.title = if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        };
        match category_name {
            Some(name) => match self.categories.iter().find(|c| c.name == name) {
                Some(cat) => self.selected_category = Some(cat.id),
                None => self.category_label = Some(name),
            },
            None => {}
        }
        for block in blocks {
            self.canvas.push(block);
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn note_id(&self) -> Option<u64> {
        self.note_id
    }

    pub(crate) fn set_note_id(&mut self, id: Option<u64>) {
        self.note_id = id;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn selected_category(&self) -> Option<u64> {
        self.selected_category
    }

    pub fn select_category(&mut self, id: Option<u64>) {
        self.selected_category = id;
        self.category_label = None;
    }

    pub fn category_label(&self) -> Option<&str> {
        self.category_label.as_deref()
    }

    pub fn save_in_flight(&self) -> bool {
        self.save_in_flight
    }

    pub(crate) fn set_save_in_flight(&mut self, value: bool) {
        self.save_in_flight = value;
    }

    // ------------------------------------------------------------------
    // Canvas & blocks
    // ------------------------------------------------------------------

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn staging(&self) -> &MediaStaging {
        &self.staging
    }

    pub(crate) fn staging_mut(&mut self) -> &mut MediaStaging {
        &mut self.staging
    }

    /// Create a block with factory defaults and append it to the canvas.
    /// Returns the new block; the shell focuses it and scrolls it into
    /// view using the id.
    pub fn insert_block(&mut self, kind: BlockKind) -> &Block {
        self.canvas.push(Block::new(kind));
        self.canvas.blocks().last().expect("just pushed")
    }

    /// Append a block by wire tag; unknown tags become inert shells.
    pub fn insert_from_tag(&mut self, tag: &str) -> &Block {
        self.canvas.push(Block::from_tag(tag));
        self.canvas.blocks().last().expect("just pushed")
    }

    /// Remove one block. No confirmation: block removal is cheap, unlike
    /// the whole-document resets above. Any staged media tied to the
    /// block is discarded with it.
    pub fn remove_block(&mut self, id: &str) -> Result<(), EditError> {
        self.canvas.remove(id)?;
        self.staging.discard(id);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        if self.recorder.is_recording_block(id) {
            self.recorder = RecorderState::Idle;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Editable regions
    // ------------------------------------------------------------------

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// An editable region inside this block took focus; the block stops
    /// being draggable so drag cannot fight text selection.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), EditError> {
        self.canvas.index_of(id)?;
        self.editing = Some(id.to_string());
        Ok(())
    }

    /// Focus left the block; draggability returns. Text-like blocks left
    /// empty get their factory default text back, as on blur in the view.
    pub fn end_edit(&mut self, id: &str) -> Result<(), EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        match &mut block.body {
            BlockBody::Heading { text } if text.trim().is_empty() => {
                *text = BlockKind::Heading.default_text().unwrap().to_string();
            }
            BlockBody::Text { text } if text.trim().is_empty() => {
                *text = BlockKind::Text.default_text().unwrap().to_string();
            }
            BlockBody::Code { text } if text.trim().is_empty() => {
                *text = BlockKind::Code.default_text().unwrap().to_string();
            }
            _ => {}
        }
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        Ok(())
    }

    /// Set the plain-text content of a heading/text/code block.
    pub fn set_block_text(&mut self, id: &str, new_text: impl Into<String>) -> Result<(), EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        match &mut block.body {
            BlockBody::Heading { text } | BlockBody::Text { text } | BlockBody::Code { text } => {
                *text = new_text.into();
                Ok(())
            }
            _ => Err(EditError::KindMismatch {
                id: id.to_string(),
                expected: "text-like",
            }),
        }
    }

    // ------------------------------------------------------------------
    // Checklist operations
    // ------------------------------------------------------------------

    fn checklist_mut(
        &mut self,
        id: &str,
    ) -> Result<&mut super::checklist::Checklist, EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        match &mut block.body {
            BlockBody::Checklist(list) => Ok(list),
            _ => Err(EditError::KindMismatch {
                id: id.to_string(),
                expected: "checklist",
            }),
        }
    }

    pub fn add_checklist_item(&mut self, id: &str) -> Result<usize, EditError> {
        Ok(self.checklist_mut(id)?.add_item())
    }

    pub fn remove_checklist_item(&mut self, id: &str, index: usize) -> Result<(), EditError> {
        self.checklist_mut(id)?
            .remove_item(index)
            .map_err(|e| bounds("checklist item", e))
    }

    pub fn set_checklist_text(
        &mut self,
        id: &str,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        self.checklist_mut(id)?
            .set_text(index, text)
            .map_err(|e| bounds("checklist item", e))
    }

    pub fn set_checklist_checked(
        &mut self,
        id: &str,
        index: usize,
        checked: bool,
    ) -> Result<(), EditError> {
        self.checklist_mut(id)?
            .set_checked(index, checked)
            .map_err(|e| bounds("checklist item", e))
    }

    // ------------------------------------------------------------------
    // Table operations
    // ------------------------------------------------------------------

    fn table_mut(&mut self, id: &str) -> Result<&mut super::table::TableGrid, EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        match &mut block.body {
            BlockBody::Table(grid) => Ok(grid),
            _ => Err(EditError::KindMismatch {
                id: id.to_string(),
                expected: "table",
            }),
        }
    }

    pub fn add_table_column(&mut self, id: &str) -> Result<(), EditError> {
        self.table_mut(id)?.add_column();
        Ok(())
    }

    pub fn remove_table_column(&mut self, id: &str) -> Result<(), EditError> {
        self.table_mut(id)?.remove_column();
        Ok(())
    }

    pub fn add_table_row(&mut self, id: &str) -> Result<(), EditError> {
        self.table_mut(id)?.add_row();
        Ok(())
    }

    pub fn remove_table_row(&mut self, id: &str) -> Result<(), EditError> {
        self.table_mut(id)?.remove_row();
        Ok(())
    }

    pub fn set_table_header(
        &mut self,
        id: &str,
        col: usize,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        self.table_mut(id)?
            .set_header(col, text)
            .map_err(|e| bounds("table header", e))
    }

    pub fn set_table_cell(
        &mut self,
        id: &str,
        row: usize,
        col: usize,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        self.table_mut(id)?
            .set_cell(row, col, text)
            .map_err(|e| bounds("table cell", e))
    }

    // ------------------------------------------------------------------
    // Img-text operations
    // ------------------------------------------------------------------

    pub fn set_media_title(&mut self, id: &str, text: impl Into<String>) -> Result<(), EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        match &mut block.body {
            BlockBody::ImgText { title, .. } => {
                *title = text.into();
                Ok(())
            }
            _ => Err(EditError::KindMismatch {
                id: id.to_string(),
                expected: "img-text",
            }),
        }
    }

    pub fn set_media_description(
        &mut self,
        id: &str,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        match &mut block.body {
            BlockBody::ImgText { description, .. } => {
                *description = text.into();
                Ok(())
            }
            _ => Err(EditError::KindMismatch {
                id: id.to_string(),
                expected: "img-text",
            }),
        }
    }

    // ------------------------------------------------------------------
    // Media staging
    // ------------------------------------------------------------------

    /// A file was picked (or a recording finished) for a media block:
    /// record the local URL on the block and stage the raw bytes under the
    /// block id in the same step, so url and staging entry cannot drift
    /// apart.
    pub fn attach_media(
        &mut self,
        id: &str,
        bytes: Vec<u8>,
        mime: impl Into<String>,
        local_url: impl Into<String>,
    ) -> Result<(), EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        let kind = match block.kind() {
            Some(BlockKind::Voice) => StagedKind::Audio,
            Some(k) if k.is_media() => StagedKind::Image,
            _ => {
                return Err(EditError::KindMismatch {
                    id: id.to_string(),
                    expected: "media",
                })
            }
        };
        block.media_mut().expect("media kind").url = Some(local_url.into());
        self.staging.stage(
            id,
            StagedMedia {
                kind,
                mime: mime.into(),
                bytes,
            },
        );
        Ok(())
    }

    /// Return a media block to its empty/placeholder state, dropping any
    /// staged payload with it.
    pub fn remove_media(&mut self, id: &str) -> Result<(), EditError> {
        let block = self
            .canvas
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        match block.media_mut() {
            Some(media) => {
                media.url = None;
                self.staging.discard(id);
                Ok(())
            }
            None => Err(EditError::KindMismatch {
                id: id.to_string(),
                expected: "media",
            }),
        }
    }

    // ------------------------------------------------------------------
    // Voice recording
    // ------------------------------------------------------------------

    pub fn recorder(&self) -> &RecorderState {
        &self.recorder
    }

    pub fn start_recording(&mut self, id: &str, now_ms: f64) -> Result<(), EditError> {
        let block = self
            .canvas
            .get(id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))?;
        if block.kind() != Some(BlockKind::Voice) {
            return Err(EditError::KindMismatch {
                id: id.to_string(),
                expected: "voice",
            });
        }
        if !matches!(self.recorder, RecorderState::Idle) {
            return Err(EditError::RecorderState("recording"));
        }
        self.recorder = RecorderState::Recording {
            block_id: id.to_string(),
            started_ms: now_ms,
        };
        Ok(())
    }

    /// Stop the toggle and stage the captured blob. Returns the final
    /// elapsed label for the shell to show.
    pub fn stop_recording(
        &mut self,
        id: &str,
        bytes: Vec<u8>,
        mime: impl Into<String>,
        local_url: impl Into<String>,
        now_ms: f64,
    ) -> Result<String, EditError> {
        if !self.recorder.is_recording_block(id) {
            return Err(EditError::RecorderState("idle"));
        }
        let label = self
            .recorder
            .elapsed_label(now_ms)
            .expect("recording state");
        self.attach_media(id, bytes, mime, local_url)?;
        self.recorder = RecorderState::Idle;
        Ok(label)
    }

    pub fn recording_elapsed(&self, now_ms: f64) -> Option<String> {
        self.recorder.elapsed_label(now_ms)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn touch_layout(&self) -> bool {
        self.touch_layout
    }

    /// Small-viewport layouts replace drag-and-drop with tap-to-insert.
    /// Any in-progress drag is cancelled on the switch.
    pub fn set_touch_layout(&mut self, touch: bool) {
        self.touch_layout = touch;
        if touch {
            self.drag = DragState::Idle;
        }
    }

    pub fn palette_drag_start(&mut self, kind: BlockKind) -> Result<(), EditError> {
        if self.touch_layout {
            return Err(EditError::DragDisabled);
        }
        self.drag = DragState::DraggingNew(kind);
        Ok(())
    }

    pub fn block_drag_start(&mut self, id: &str) -> Result<(), EditError> {
        if self.touch_layout {
            return Err(EditError::DragDisabled);
        }
        self.canvas.index_of(id)?;
        if self.editing.as_deref() == Some(id) {
            return Err(EditError::EditingInProgress(id.to_string()));
        }
        self.drag = DragState::DraggingExisting(id.to_string());
        Ok(())
    }

    pub fn drag_over_effect(&self) -> DropEffect {
        match self.drag {
            DragState::DraggingExisting(_) => DropEffect::Move,
            _ => DropEffect::Copy,
        }
    }

    /// Drop on an existing block: reorder for an existing-block drag,
    /// insert-at-end for a palette drag (mirroring the bubble-up to the
    /// canvas handler), nothing when no drag is active. The drag state is
    /// only cleared by `drag_end`, which the shell fires in all cases.
    pub fn drop_on_block(&mut self, target_id: &str) -> Result<DropOutcome, EditError> {
        match self.drag.clone() {
            DragState::Idle => Ok(DropOutcome::Ignored),
            DragState::DraggingNew(kind) => {
                let id = self.insert_block(kind).id.clone();
                Ok(DropOutcome::Inserted { id })
            }
            DragState::DraggingExisting(dragged) => {
                if dragged == target_id {
                    return Ok(DropOutcome::Ignored);
                }
                self.canvas.reorder(&dragged, target_id)?;
                Ok(DropOutcome::Reordered)
            }
        }
    }

    /// Drop on empty canvas space: inserts for palette drags; existing
    /// block drops are handled at the block level and ignored here.
    pub fn drop_on_canvas(&mut self) -> Result<DropOutcome, EditError> {
        match self.drag.clone() {
            DragState::DraggingNew(kind) => {
                let id = self.insert_block(kind).id.clone();
                Ok(DropOutcome::Inserted { id })
            }
            _ => Ok(DropOutcome::Ignored),
        }
    }

    /// Unconditional cleanup at the end of every drag, successful or not.
    /// Returns the id whose visual drag affordance should be removed.
    pub fn drag_end(&mut self) -> Option<String> {
        let dragged = self.drag.dragged_block().map(str::to_string);
        self.drag = DragState::Idle;
        dragged
    }

    /// Touch-layout insert affordance: append and report the id so the
    /// shell can reveal the new block.
    pub fn tap_insert(&mut self, tag: &str) -> String {
        self.insert_from_tag(tag).id.clone()
    }
}

fn bounds(context: &'static str, e: OutOfRange) -> EditError {
    EditError::IndexOutOfBounds {
        context,
        index: e.index,
        len: e.len,
    }
}
