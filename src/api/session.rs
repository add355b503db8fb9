//! Synchronous editing API
//!
//! The `NoteEditor` handle owns the editor session behind `Rc<RefCell>`
//! so the async persistence methods (see `super::notes`) can share it
//! without holding a borrow across an await. Every method here borrows
//! briefly, mutates the model, and returns; the shell re-renders from
//! `renderDisplayList` afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::models::block::BlockKind;
use crate::models::session::EditorSession;
use crate::net::{self, NoteSummary};
use crate::persist::serialize_canvas;
use crate::render::display_list::project;
use crate::{wasm_info, wasm_log};

use super::helpers::{self, edit_error};

#[wasm_bindgen]
pub struct NoteEditor {
    pub(crate) session: Rc<RefCell<EditorSession>>,
    /// Cached history list backing the client-side drawer search.
    pub(crate) history: Rc<RefCell<Vec<NoteSummary>>>,
}

impl Default for NoteEditor {
    fn default() -> Self {
        NoteEditor::new()
    }
}

#[wasm_bindgen]
impl NoteEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> NoteEditor {
        NoteEditor {
            session: Rc::new(RefCell::new(EditorSession::new())),
            history: Rc::new(RefCell::new(Vec::new())),
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Project the model into the display list the shell renders from.
    /// `now_ms` feeds the recorder's elapsed-time label.
    #[wasm_bindgen(js_name = renderDisplayList)]
    pub fn render_display_list(&self, now_ms: f64) -> Result<JsValue, JsValue> {
        let session = self.session.borrow();
        helpers::serialize(&project(&session, now_ms), "Failed to serialize display list")
    }

    /// Serialized `{type, content, data}` elements of the live canvas.
    #[wasm_bindgen(js_name = serializeCanvas)]
    pub fn serialize_canvas(&self) -> Result<JsValue, JsValue> {
        let session = self.session.borrow();
        let elements = serialize_canvas(session.canvas().blocks(), session.staging());
        helpers::serialize(&elements, "Failed to serialize canvas")
    }

    // ------------------------------------------------------------------
    // Note lifecycle
    // ------------------------------------------------------------------

    /// Reset to a blank note. Destructive; the shell confirms first.
    #[wasm_bindgen(js_name = newNote)]
    pub fn new_note(&self) {
        wasm_info!("newNote: clearing canvas and note identity");
        self.session.borrow_mut().new_note();
    }

    #[wasm_bindgen(js_name = setTitle)]
    pub fn set_title(&self, title: String) {
        self.session.borrow_mut().set_title(title);
    }

    pub fn title(&self) -> String {
        self.session.borrow().title().to_string()
    }

    #[wasm_bindgen(js_name = noteId)]
    pub fn note_id(&self) -> Option<u32> {
        self.session.borrow().note_id().map(|id| id as u32)
    }

    /// Select a category for the open note (None clears the selection).
    #[wasm_bindgen(js_name = selectCategory)]
    pub fn select_category(&self, category_id: Option<u32>) {
        self.session
            .borrow_mut()
            .select_category(category_id.map(u64::from));
    }

    /// URL that triggers the PDF export download for the saved note.
    #[wasm_bindgen(js_name = exportPdfUrl)]
    pub fn export_pdf_url(&self) -> Result<String, JsValue> {
        match self.session.borrow().note_id() {
            Some(id) => Ok(net::export_pdf_url(id)),
            None => Err(helpers::api_error(net::ApiError::NoActiveNote)),
        }
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    /// Append a block of the given type (unknown tags become inert
    /// shells). Returns the new block's id; the shell focuses it and
    /// scrolls it into view.
    #[wasm_bindgen(js_name = insertBlock)]
    pub fn insert_block(&self, block_type: &str) -> String {
        wasm_log!("insertBlock: type={}", block_type);
        self.session.borrow_mut().insert_from_tag(block_type).id.clone()
    }

    /// Remove one block, no confirmation. Staged media goes with it.
    #[wasm_bindgen(js_name = removeBlock)]
    pub fn remove_block(&self, id: &str) -> Result<(), JsValue> {
        wasm_log!("removeBlock: id={}", id);
        self.session.borrow_mut().remove_block(id).map_err(edit_error)
    }

    // ------------------------------------------------------------------
    // Editable regions
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = beginEdit)]
    pub fn begin_edit(&self, id: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().begin_edit(id).map_err(edit_error)
    }

    #[wasm_bindgen(js_name = endEdit)]
    pub fn end_edit(&self, id: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().end_edit(id).map_err(edit_error)
    }

    #[wasm_bindgen(js_name = setBlockText)]
    pub fn set_block_text(&self, id: &str, text: String) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .set_block_text(id, text)
            .map_err(edit_error)
    }

    // ------------------------------------------------------------------
    // Checklist
    // ------------------------------------------------------------------

    /// Append an empty item; the view shows the placeholder until text is
    /// typed. Returns the new item's index.
    #[wasm_bindgen(js_name = addChecklistItem)]
    pub fn add_checklist_item(&self, id: &str) -> Result<u32, JsValue> {
        self.session
            .borrow_mut()
            .add_checklist_item(id)
            .map(|index| index as u32)
            .map_err(edit_error)
    }

    #[wasm_bindgen(js_name = removeChecklistItem)]
    pub fn remove_checklist_item(&self, id: &str, index: u32) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .remove_checklist_item(id, index as usize)
            .map_err(edit_error)
    }

    #[wasm_bindgen(js_name = setChecklistText)]
    pub fn set_checklist_text(&self, id: &str, index: u32, text: String) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .set_checklist_text(id, index as usize, text)
            .map_err(edit_error)
    }

    #[wasm_bindgen(js_name = setChecklistChecked)]
    pub fn set_checklist_checked(&self, id: &str, index: u32, checked: bool) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .set_checklist_checked(id, index as usize, checked)
            .map_err(edit_error)
    }

    // ------------------------------------------------------------------
    // Table
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = addTableColumn)]
    pub fn add_table_column(&self, id: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().add_table_column(id).map_err(edit_error)
    }

    #[wasm_bindgen(js_name = removeTableColumn)]
    pub fn remove_table_column(&self, id: &str) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .remove_table_column(id)
            .map_err(edit_error)
    }

    #[wasm_bindgen(js_name = addTableRow)]
    pub fn add_table_row(&self, id: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().add_table_row(id).map_err(edit_error)
    }

    #[wasm_bindgen(js_name = removeTableRow)]
    pub fn remove_table_row(&self, id: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().remove_table_row(id).map_err(edit_error)
    }

    #[wasm_bindgen(js_name = setTableHeader)]
    pub fn set_table_header(&self, id: &str, col: u32, text: String) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .set_table_header(id, col as usize, text)
            .map_err(edit_error)
    }

    #[wasm_bindgen(js_name = setTableCell)]
    pub fn set_table_cell(&self, id: &str, row: u32, col: u32, text: String) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .set_table_cell(id, row as usize, col as usize, text)
            .map_err(edit_error)
    }

    // ------------------------------------------------------------------
    // Img-text
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = setMediaTitle)]
    pub fn set_media_title(&self, id: &str, text: String) -> Result<(), JsValue> {
        self.session.borrow_mut().set_media_title(id, text).map_err(edit_error)
    }

    #[wasm_bindgen(js_name = setMediaDescription)]
    pub fn set_media_description(&self, id: &str, text: String) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .set_media_description(id, text)
            .map_err(edit_error)
    }

    // ------------------------------------------------------------------
    // Media staging
    // ------------------------------------------------------------------

    /// A file was picked for an image/img-text block (or dropped in).
    /// `local_url` is the object/data URL the shell created for preview.
    #[wasm_bindgen(js_name = attachMedia)]
    pub fn attach_media(
        &self,
        id: &str,
        bytes: Vec<u8>,
        mime: String,
        local_url: String,
    ) -> Result<(), JsValue> {
        wasm_log!("attachMedia: id={} mime={} ({} bytes)", id, mime, bytes.len());
        self.session
            .borrow_mut()
            .attach_media(id, bytes, mime, local_url)
            .map_err(edit_error)
    }

    /// Return a media block to its upload-placeholder state.
    #[wasm_bindgen(js_name = removeMedia)]
    pub fn remove_media(&self, id: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().remove_media(id).map_err(edit_error)
    }

    #[wasm_bindgen(js_name = startRecording)]
    pub fn start_recording(&self, id: &str, now_ms: f64) -> Result<(), JsValue> {
        wasm_log!("startRecording: id={}", id);
        self.session
            .borrow_mut()
            .start_recording(id, now_ms)
            .map_err(edit_error)
    }

    /// Stop the recorder and stage the captured blob. Returns the final
    /// elapsed label.
    #[wasm_bindgen(js_name = stopRecording)]
    pub fn stop_recording(
        &self,
        id: &str,
        bytes: Vec<u8>,
        mime: String,
        local_url: String,
        now_ms: f64,
    ) -> Result<String, JsValue> {
        wasm_log!("stopRecording: id={} ({} bytes)", id, bytes.len());
        self.session
            .borrow_mut()
            .stop_recording(id, bytes, mime, local_url, now_ms)
            .map_err(edit_error)
    }

    #[wasm_bindgen(js_name = recordingElapsed)]
    pub fn recording_elapsed(&self, now_ms: f64) -> Option<String> {
        self.session.borrow().recording_elapsed(now_ms)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = setTouchLayout)]
    pub fn set_touch_layout(&self, touch: bool) {
        self.session.borrow_mut().set_touch_layout(touch);
    }

    /// Tap-to-insert affordance for the touch layout. Returns the new
    /// block's id for auto-reveal.
    #[wasm_bindgen(js_name = tapInsert)]
    pub fn tap_insert(&self, block_type: &str) -> String {
        self.session.borrow_mut().tap_insert(block_type)
    }

    #[wasm_bindgen(js_name = paletteDragStart)]
    pub fn palette_drag_start(&self, block_type: &str) -> Result<(), JsValue> {
        let kind = BlockKind::from_tag(block_type)
            .ok_or_else(|| JsValue::from_str(&format!("unknown block type: {block_type}")))?;
        self.session
            .borrow_mut()
            .palette_drag_start(kind)
            .map_err(edit_error)
    }

    #[wasm_bindgen(js_name = blockDragStart)]
    pub fn block_drag_start(&self, id: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().block_drag_start(id).map_err(edit_error)
    }

    /// Cursor feedback for dragover: "move" while reordering, "copy" for
    /// palette drags.
    #[wasm_bindgen(js_name = dragOverEffect)]
    pub fn drag_over_effect(&self) -> String {
        self.session.borrow().drag_over_effect().as_str().to_string()
    }

    #[wasm_bindgen(js_name = dropOnBlock)]
    pub fn drop_on_block(&self, target_id: &str) -> Result<JsValue, JsValue> {
        let outcome = self
            .session
            .borrow_mut()
            .drop_on_block(target_id)
            .map_err(edit_error)?;
        wasm_log!("dropOnBlock: target={} -> {:?}", target_id, outcome);
        helpers::serialize(&outcome, "Failed to serialize drop outcome")
    }

    #[wasm_bindgen(js_name = dropOnCanvas)]
    pub fn drop_on_canvas(&self) -> Result<JsValue, JsValue> {
        let outcome = self.session.borrow_mut().drop_on_canvas().map_err(edit_error)?;
        helpers::serialize(&outcome, "Failed to serialize drop outcome")
    }

    /// Unconditional end-of-drag cleanup; fire on dragend whether the
    /// drop landed or not. Returns the id whose drag affordance to clear.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&self) -> Option<String> {
        self.session.borrow_mut().drag_end()
    }
}
