//! Asynchronous persistence API (wasm32 only)
//!
//! Save, load, delete, history and categories over the browser fetch
//! transport. Each method clones the shared session handle into a
//! promise; the session is only borrowed on the synchronous edges of a
//! protocol, never across an await, so editing stays responsive (and
//! safe) while a request is in flight.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::net::fetch::FetchTransport;
use crate::net::{save, HistoryFilter};
use crate::{wasm_error, wasm_info};

use super::helpers::{self, api_error};
use super::session::NoteEditor;

#[wasm_bindgen]
impl NoteEditor {
    /// Two-phase save: upload staged media concurrently, then POST (new
    /// note) or PATCH (existing). Resolves to the `{id, title}` echo.
    #[wasm_bindgen(js_name = saveNote)]
    pub fn save_note(&self) -> js_sys::Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let transport = FetchTransport::new();

            let mut plan = save::begin_save(&mut session.borrow_mut()).map_err(api_error)?;
            wasm_info!(
                "saveNote: {} element(s), {} staged upload(s)",
                plan.elements.len(),
                plan.uploads.len()
            );

            let results = save::run_uploads(&transport, plan.note_id, &plan.uploads).await;
            save::apply_upload_results(&mut plan, &results);
            let saved = save::push_document(&transport, &plan).await;
            save::finish_save(&mut session.borrow_mut(), &plan, &results, &saved);

            match saved {
                Ok(note) => {
                    wasm_info!("saveNote: saved note id={}", note.id);
                    helpers::serialize(&note, "Failed to serialize save result")
                }
                Err(err) => {
                    wasm_error!("saveNote failed: {}", err);
                    Err(api_error(err))
                }
            }
        })
    }

    /// Replace the open document with a note fetched by id. The shell
    /// confirms before calling when unsaved changes would be lost.
    #[wasm_bindgen(js_name = loadNote)]
    pub fn load_note(&self, id: u32) -> js_sys::Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let transport = FetchTransport::new();
            let doc = transport_get(&transport, u64::from(id)).await?;

            if session.borrow().categories().is_empty() {
                let categories = save::fetch_categories(&transport).await;
                session.borrow_mut().set_categories(categories);
            }
            save::apply_loaded(&mut session.borrow_mut(), doc);
            wasm_info!("loadNote: loaded note id={}", id);
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Delete the active note after shell-side confirmation. Resolves
    /// once local state has been reset to a blank note.
    #[wasm_bindgen(js_name = deleteNote)]
    pub fn delete_note(&self) -> js_sys::Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let transport = FetchTransport::new();
            let id = session
                .borrow()
                .note_id()
                .ok_or(crate::net::ApiError::NoActiveNote)
                .map_err(api_error)?;

            use crate::net::NoteTransport;
            transport.delete_note(id).await.map_err(api_error)?;
            session.borrow_mut().new_note();
            wasm_info!("deleteNote: note id={} deleted", id);
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Fetch the history list, optionally filtered server-side. Category
    /// id 0 selects uncategorized notes. The list is cached for
    /// `searchHistory`; failures degrade to an empty drawer.
    #[wasm_bindgen(js_name = fetchHistory)]
    pub fn fetch_history(&self, category_id: Option<u32>, search: Option<String>) -> js_sys::Promise {
        let history = self.history.clone();
        future_to_promise(async move {
            let transport = FetchTransport::new();
            let filter = HistoryFilter::from_raw(category_id.map(u64::from), search);
            let notes = save::fetch_history(&transport, &filter).await;
            *history.borrow_mut() = notes.clone();
            helpers::serialize(&notes, "Failed to serialize history")
        })
    }

    /// Client-side search over the cached history list.
    #[wasm_bindgen(js_name = searchHistory)]
    pub fn search_history(&self, query: &str) -> Result<JsValue, JsValue> {
        let hits = save::filter_history(&self.history.borrow(), query);
        helpers::serialize(&hits, "Failed to serialize history")
    }

    /// Refresh the category cache and resolve to the list.
    #[wasm_bindgen(js_name = fetchCategories)]
    pub fn fetch_categories(&self) -> js_sys::Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let transport = FetchTransport::new();
            let categories = save::fetch_categories(&transport).await;
            session.borrow_mut().set_categories(categories.clone());
            helpers::serialize(&categories, "Failed to serialize categories")
        })
    }
}

async fn transport_get(
    transport: &FetchTransport,
    id: u64,
) -> Result<crate::net::NoteDocument, JsValue> {
    use crate::net::NoteTransport;
    transport.get_note(id).await.map_err(|err| {
        wasm_error!("loadNote failed: {}", err);
        api_error(err)
    })
}
