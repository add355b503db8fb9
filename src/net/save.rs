//! Save / load / delete protocol
//!
//! Save is two-phase: (1) serialize the canvas, upload every staged media
//! payload concurrently and patch the resulting permanent URLs into the
//! document, then (2) POST or PATCH the fully-resolved document. A failed
//! upload degrades only its own block to the empty state; the document
//! save still proceeds.
//!
//! The protocol is split into a sync begin (under the model borrow), an
//! async middle (no borrow), and a sync finish, so the wasm layer never
//! holds the session across an await. `save_note`/`load_note` compose the
//! pieces for native callers and tests.

use futures::future::join_all;

use crate::models::session::EditorSession;
use crate::models::staging::StagedMedia;
use crate::persist::{deserialize_elements, serialize_canvas, WireBlock};

use super::{
    ApiError, HistoryFilter, MediaUpload, NoteData, NoteDocument, NotePayload, NoteSummary,
    NoteTransport, SavedNote,
};

/// One upload owed before the document can be pushed.
pub struct PendingUpload {
    /// Position of the owning element in `SavePlan::elements`.
    pub element_index: usize,
    pub block_id: String,
    pub media: StagedMedia,
}

/// Everything phase 2 needs, captured from the session up front.
pub struct SavePlan {
    pub note_id: Option<u64>,
    pub title: String,
    pub category_id: Option<u64>,
    pub elements: Vec<WireBlock>,
    pub uploads: Vec<PendingUpload>,
}

/// Phase 1 (sync): serialize the live canvas and drain the staged payloads
/// that this save will upload. Sets the in-flight guard; a second save
/// before `finish_save` is refused.
pub fn begin_save(session: &mut EditorSession) -> Result<SavePlan, ApiError> {
    if session.save_in_flight() {
        return Err(ApiError::SaveInFlight);
    }
    session.set_save_in_flight(true);

    let elements = serialize_canvas(session.canvas().blocks(), session.staging());
    let mut uploads = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        if let Some(temp_id) = element.data.temp_id.clone() {
            if let Some(media) = session.staging_mut().take(&temp_id) {
                uploads.push(PendingUpload {
                    element_index: index,
                    block_id: temp_id,
                    media,
                });
            }
        }
    }

    Ok(SavePlan {
        note_id: session.note_id(),
        title: session.title().to_string(),
        category_id: session.selected_category(),
        elements,
        uploads,
    })
}

/// Upload every pending payload concurrently and wait for all to settle.
/// A failed upload yields `None` for its slot; the error is logged, not
/// propagated, so one bad file cannot sink the save.
pub async fn run_uploads<T: NoteTransport>(
    transport: &T,
    note_id: Option<u64>,
    uploads: &[PendingUpload],
) -> Vec<Option<String>> {
    let futures = uploads.iter().map(|pending| async move {
        match transport
            .upload_media(MediaUpload {
                bytes: &pending.media.bytes,
                mime: &pending.media.mime,
                note_id,
            })
            .await
        {
            Ok(url) => Some(url),
            Err(err) => {
                log::error!("upload failed for block {}: {err}", pending.block_id);
                None
            }
        }
    });
    join_all(futures).await
}

/// Patch upload results into the serialized document: permanent URL on
/// success, explicit null on failure. Temp markers never reach the server.
pub fn apply_upload_results(plan: &mut SavePlan, results: &[Option<String>]) {
    for (pending, result) in plan.uploads.iter().zip(results) {
        let element = &mut plan.elements[pending.element_index];
        element.data.temp_id = None;
        element.data.url = Some(result.clone());
    }
}

/// Phase 2: send the resolved document. POST creates, PATCH updates.
pub async fn push_document<T: NoteTransport>(
    transport: &T,
    plan: &SavePlan,
) -> Result<SavedNote, ApiError> {
    let payload = NotePayload {
        title: plan.title.clone(),
        category_id: plan.category_id,
        data: NoteData {
            elements: plan.elements.clone(),
        },
    };
    match plan.note_id {
        Some(id) => transport.update_note(id, &payload).await,
        None => transport.create_note(&payload).await,
    }
}

/// Final sync step: reflect settled uploads back into the model (committed
/// URL or degraded-to-empty), adopt a newly created note's id, and clear
/// the in-flight guard. Runs on success and failure alike.
pub fn finish_save(
    session: &mut EditorSession,
    plan: &SavePlan,
    results: &[Option<String>],
    saved: &Result<SavedNote, ApiError>,
) {
    for (pending, result) in plan.uploads.iter().zip(results) {
        if let Some(block) = session.canvas_mut().get_mut(&pending.block_id) {
            if let Some(media) = block.media_mut() {
                media.url = result.clone();
            }
        }
    }
    if plan.note_id.is_none() {
        if let Ok(note) = saved {
            session.set_note_id(Some(note.id));
        }
    }
    session.set_save_in_flight(false);
}

/// Full save protocol in one call.
pub async fn save_note<T: NoteTransport>(
    session: &mut EditorSession,
    transport: &T,
) -> Result<SavedNote, ApiError> {
    let mut plan = begin_save(session)?;
    let results = run_uploads(transport, plan.note_id, &plan.uploads).await;
    apply_upload_results(&mut plan, &results);
    let saved = push_document(transport, &plan).await;
    finish_save(session, &plan, &results, &saved);
    saved
}

/// Load a note and replace the open document wholesale. A failed fetch
/// leaves the current note untouched. Categories are fetched lazily when
/// the cache is empty so a note's category name can be resolved.
pub async fn load_note<T: NoteTransport>(
    session: &mut EditorSession,
    transport: &T,
    id: u64,
) -> Result<(), ApiError> {
    let doc = transport.get_note(id).await?;
    ensure_categories(session, transport).await;
    apply_loaded(session, doc);
    Ok(())
}

/// Sync tail of the load path, shared with the wasm layer.
pub fn apply_loaded(session: &mut EditorSession, doc: NoteDocument) {
    let blocks = deserialize_elements(&doc.data.elements);
    session.replace_document(doc.id, doc.title, doc.category_name, blocks);
}

/// Fill the category cache if it is empty. Read-path failure degrades to
/// an empty cache with a logged notice.
pub async fn ensure_categories<T: NoteTransport>(session: &mut EditorSession, transport: &T) {
    if !session.categories().is_empty() {
        return;
    }
    let categories = fetch_categories(transport).await;
    session.set_categories(categories);
}

/// Fetch the category list without touching the session, degrading to an
/// empty list on failure (the wasm layer must not hold the session across
/// this await).
pub async fn fetch_categories<T: NoteTransport>(
    transport: &T,
) -> Vec<crate::models::session::Category> {
    match transport.list_categories().await {
        Ok(categories) => categories,
        Err(err) => {
            log::error!("failed to fetch categories: {err}");
            Vec::new()
        }
    }
}

/// Delete the active note. Success resets to a blank note exactly like
/// `new_note`; failure leaves everything as it was.
pub async fn delete_note<T: NoteTransport>(
    session: &mut EditorSession,
    transport: &T,
) -> Result<(), ApiError> {
    let id = session.note_id().ok_or(ApiError::NoActiveNote)?;
    transport.delete_note(id).await?;
    session.new_note();
    Ok(())
}

/// Fetch the history list; read-path failure degrades to an empty list.
pub async fn fetch_history<T: NoteTransport>(
    transport: &T,
    filter: &HistoryFilter,
) -> Vec<NoteSummary> {
    match transport.list_notes(filter).await {
        Ok(notes) => notes,
        Err(err) => {
            log::error!("failed to fetch note history: {err}");
            Vec::new()
        }
    }
}

/// Client-side history search: case-insensitive title substring, with the
/// untitled fallback participating in the match.
pub fn filter_history(notes: &[NoteSummary], query: &str) -> Vec<NoteSummary> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return notes.to_vec();
    }
    notes
        .iter()
        .filter(|note| display_title(note).to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Title shown for a history row; untitled notes display the default.
pub fn display_title(note: &NoteSummary) -> &str {
    if note.title.is_empty() {
        "Untitled Note"
    } else {
        &note.title
    }
}
