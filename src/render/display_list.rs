//! Display list for canvas rendering
//!
//! The output structure handed to JavaScript: one `RenderBlock` per canvas
//! block, in document order, with everything pre-computed (placeholder
//! activation, draggability, drag affordance, media state, recorder label)
//! so the shell renders DOM elements without consulting any state of its
//! own.

use serde::Serialize;

use crate::models::block::{Block, BlockBody, BlockKind};
use crate::models::checklist::NEW_ITEM_PLACEHOLDER;
use crate::models::media::{MediaData, MediaState};
use crate::models::session::EditorSession;

/// Top-level display list for one render pass.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DisplayList {
    pub title: String,
    /// Server identity of the open note, if it has been saved.
    pub note_id: Option<u64>,
    pub blocks: Vec<RenderBlock>,
}

/// One canvas block, ready to render.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RenderBlock {
    pub id: String,
    /// Wire type tag; doubles as the CSS hook.
    pub kind: String,
    /// False while an editable region inside the block has focus, and in
    /// the touch layout (where reordering is tap-driven).
    pub draggable: bool,
    /// True for the block currently being reorder-dragged.
    pub dragging: bool,
    pub view: BlockView,
}

/// Per-kind view payload.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockView {
    /// Heading, text and code blocks: one contenteditable region. Focus
    /// places the caret at end-of-content; `clear_on_focus` is set while
    /// the region still shows its factory default text.
    Editable {
        text: String,
        clear_on_focus: bool,
        caret_to_end: bool,
    },
    Divider,
    Checklist {
        items: Vec<ChecklistItemView>,
    },
    Table(TableView),
    Media {
        state: MediaState,
        url: Option<String>,
    },
    Voice {
        state: MediaState,
        url: Option<String>,
        recording: bool,
        /// Live `mm:ss` label while recording, "00:00" otherwise.
        elapsed: String,
    },
    ImgText {
        state: MediaState,
        url: Option<String>,
        title: String,
        description: String,
    },
    /// Unrecognized persisted type: rendered as an inert shell.
    Unknown {
        tag: String,
        content: String,
    },
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChecklistItemView {
    pub text: String,
    pub checked: bool,
    /// Placeholder to show instead of the (empty) text.
    pub placeholder: Option<&'static str>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Project the session into a display list. `now_ms` feeds the recorder's
/// elapsed-time label; the model itself holds no clock.
pub fn project(session: &EditorSession, now_ms: f64) -> DisplayList {
    DisplayList {
        title: session.title().to_string(),
        note_id: session.note_id(),
        blocks: session
            .canvas()
            .blocks()
            .iter()
            .map(|block| project_block(session, block, now_ms))
            .collect(),
    }
}

fn project_block(session: &EditorSession, block: &Block, now_ms: f64) -> RenderBlock {
    let editing = session.editing() == Some(block.id.as_str());
    RenderBlock {
        id: block.id.clone(),
        kind: block.kind_tag().to_string(),
        draggable: !editing && !session.touch_layout(),
        dragging: session.drag_state().dragged_block() == Some(block.id.as_str()),
        view: project_view(session, block, now_ms),
    }
}

fn project_view(session: &EditorSession, block: &Block, now_ms: f64) -> BlockView {
    match &block.body {
        BlockBody::Heading { text } => editable(BlockKind::Heading, text),
        BlockBody::Text { text } => editable(BlockKind::Text, text),
        BlockBody::Code { text } => editable(BlockKind::Code, text),
        BlockBody::Divider => BlockView::Divider,
        BlockBody::Checklist(list) => BlockView::Checklist {
            items: list
                .items
                .iter()
                .map(|item| ChecklistItemView {
                    text: item.text.clone(),
                    checked: item.checked,
                    placeholder: item.text.is_empty().then_some(NEW_ITEM_PLACEHOLDER),
                })
                .collect(),
        },
        BlockBody::Table(grid) => BlockView::Table(TableView {
            headers: grid.headers().to_vec(),
            rows: grid.rows().to_vec(),
        }),
        BlockBody::Image(media) => BlockView::Media {
            state: media_state(session, &block.id, media),
            url: media.url.clone(),
        },
        BlockBody::Voice(media) => {
            let recording = session.recorder().is_recording_block(&block.id);
            BlockView::Voice {
                state: media_state(session, &block.id, media),
                url: media.url.clone(),
                recording,
                elapsed: session
                    .recording_elapsed(now_ms)
                    .filter(|_| recording)
                    .unwrap_or_else(|| "00:00".to_string()),
            }
        }
        BlockBody::ImgText {
            media,
            title,
            description,
        } => BlockView::ImgText {
            state: media_state(session, &block.id, media),
            url: media.url.clone(),
            title: title.clone(),
            description: description.clone(),
        },
        BlockBody::Unknown { tag, content } => BlockView::Unknown {
            tag: tag.clone(),
            content: content.clone(),
        },
    }
}

fn editable(kind: BlockKind, text: &str) -> BlockView {
    BlockView::Editable {
        text: text.to_string(),
        clear_on_focus: Some(text) == kind.default_text(),
        caret_to_end: true,
    }
}

fn media_state(session: &EditorSession, block_id: &str, media: &MediaData) -> MediaState {
    media.state(session.staging().contains(block_id))
}
