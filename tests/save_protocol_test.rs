// Two-phase save protocol against an in-memory backend: staged uploads,
// POST/PATCH switching, per-block degrade on upload failure, delete and
// load flows, and the save-in-flight guard.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use futures::executor::block_on;

use notecanvas::models::block::BlockKind;
use notecanvas::models::session::{Category, EditorSession};
use notecanvas::net::{
    save, ApiError, HistoryFilter, MediaUpload, NoteDocument, NotePayload, NoteSummary,
    NoteTransport, SavedNote, UPLOAD_API_URL,
};
use notecanvas::persist::serialize_canvas;

struct MockBackend {
    notes: RefCell<HashMap<u64, NoteDocument>>,
    next_id: Cell<u64>,
    categories: RefCell<Vec<Category>>,
    fail_uploads: Cell<bool>,
    fail_everything: Cell<bool>,
    upload_count: Cell<u64>,
}

impl MockBackend {
    fn new() -> MockBackend {
        MockBackend {
            notes: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            categories: RefCell::new(Vec::new()),
            fail_uploads: Cell::new(false),
            fail_everything: Cell::new(false),
            upload_count: Cell::new(0),
        }
    }

    fn with_categories(categories: Vec<Category>) -> MockBackend {
        let backend = MockBackend::new();
        *backend.categories.borrow_mut() = categories;
        backend
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.fail_everything.get() {
            Err(ApiError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn category_name(&self, id: Option<u64>) -> Option<String> {
        let id = id?;
        self.categories
            .borrow()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }

    fn missing(&self, id: u64) -> ApiError {
        ApiError::Status {
            url: format!("/api/notes/{id}/"),
            status: 404,
            detail: "Not found.".into(),
        }
    }
}

impl NoteTransport for MockBackend {
    async fn list_notes(&self, _filter: &HistoryFilter) -> Result<Vec<NoteSummary>, ApiError> {
        self.check()?;
        Ok(self
            .notes
            .borrow()
            .values()
            .map(|doc| NoteSummary {
                id: doc.id,
                title: doc.title.clone(),
                category_name: doc.category_name.clone(),
                updated_at: "2024-05-01T12:00:00Z".into(),
            })
            .collect())
    }

    async fn get_note(&self, id: u64) -> Result<NoteDocument, ApiError> {
        self.check()?;
        self.notes
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| self.missing(id))
    }

    async fn create_note(&self, payload: &NotePayload) -> Result<SavedNote, ApiError> {
        self.check()?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.notes.borrow_mut().insert(
            id,
            NoteDocument {
                id,
                title: payload.title.clone(),
                category_name: self.category_name(payload.category_id),
                data: payload.data.clone(),
            },
        );
        Ok(SavedNote {
            id,
            title: payload.title.clone(),
        })
    }

    async fn update_note(&self, id: u64, payload: &NotePayload) -> Result<SavedNote, ApiError> {
        self.check()?;
        let mut notes = self.notes.borrow_mut();
        if !notes.contains_key(&id) {
            return Err(self.missing(id));
        }
        notes.insert(
            id,
            NoteDocument {
                id,
                title: payload.title.clone(),
                category_name: self.category_name(payload.category_id),
                data: payload.data.clone(),
            },
        );
        Ok(SavedNote {
            id,
            title: payload.title.clone(),
        })
    }

    async fn delete_note(&self, id: u64) -> Result<(), ApiError> {
        self.check()?;
        self.notes
            .borrow_mut()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| self.missing(id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.check()?;
        Ok(self.categories.borrow().clone())
    }

    async fn upload_media(&self, _upload: MediaUpload<'_>) -> Result<String, ApiError> {
        self.check()?;
        if self.fail_uploads.get() {
            return Err(ApiError::Status {
                url: UPLOAD_API_URL.into(),
                status: 500,
                detail: "storage backend unavailable".into(),
            });
        }
        let n = self.upload_count.get() + 1;
        self.upload_count.set(n);
        Ok(format!("https://cdn.example.com/media/{n}.bin"))
    }
}

#[test]
fn create_save_reload_reproduces_the_note() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    session.set_title("Shopping");
    let heading = session.insert_block(BlockKind::Heading).id.clone();
    session.set_block_text(&heading, "Hello").unwrap();
    let list = session.insert_block(BlockKind::Checklist).id.clone();
    session.set_checklist_text(&list, 0, "Buy milk").unwrap();

    let saved = block_on(save::save_note(&mut session, &backend)).unwrap();
    assert_eq!(saved.id, 1);
    assert_eq!(session.note_id(), Some(1));

    let mut other = EditorSession::new();
    block_on(save::load_note(&mut other, &backend, 1)).unwrap();
    assert_eq!(other.title(), "Shopping");
    assert_eq!(other.note_id(), Some(1));

    let stored = backend.notes.borrow().get(&1).unwrap().data.elements.clone();
    let reloaded = serialize_canvas(other.canvas().blocks(), other.staging());
    assert_eq!(reloaded, stored);
    assert_eq!(reloaded[0].content, "Hello");
    assert_eq!(
        reloaded[1].data.items.as_ref().unwrap()[0].text,
        "Buy milk"
    );
}

#[test]
fn second_save_patches_the_same_note() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    session.insert_block(BlockKind::Text);

    block_on(save::save_note(&mut session, &backend)).unwrap();
    session.set_title("Renamed");
    let saved = block_on(save::save_note(&mut session, &backend)).unwrap();

    assert_eq!(saved.id, 1);
    assert_eq!(backend.notes.borrow().len(), 1);
    assert_eq!(backend.notes.borrow().get(&1).unwrap().title, "Renamed");
}

#[test]
fn staged_media_commits_on_save() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    let image = session.insert_block(BlockKind::Image).id.clone();
    session
        .attach_media(&image, vec![1, 2, 3], "image/png", "data:image/png;base64,AQID")
        .unwrap();

    block_on(save::save_note(&mut session, &backend)).unwrap();

    assert!(session.staging().is_empty(), "staged entry must be consumed");
    let url = session
        .canvas()
        .get(&image)
        .unwrap()
        .media()
        .unwrap()
        .url
        .clone()
        .unwrap();
    assert!(url.starts_with("https://"), "expected permanent url, got {url}");

    let binding = backend.notes.borrow();
    let stored = &binding.get(&1).unwrap().data.elements[0];
    assert_eq!(stored.data.url, Some(Some(url)));
    assert_eq!(stored.data.temp_id, None);
}

#[test]
fn all_staged_kinds_upload_in_one_save() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    let image = session.insert_block(BlockKind::Image).id.clone();
    let voice = session.insert_block(BlockKind::Voice).id.clone();
    let img_text = session.insert_block(BlockKind::ImgText).id.clone();

    session
        .attach_media(&image, vec![1], "image/png", "blob:http://x/a")
        .unwrap();
    session.start_recording(&voice, 0.0).unwrap();
    session
        .stop_recording(&voice, vec![2], "audio/webm", "blob:http://x/b", 3_000.0)
        .unwrap();
    session
        .attach_media(&img_text, vec![3], "image/jpeg", "blob:http://x/c")
        .unwrap();

    block_on(save::save_note(&mut session, &backend)).unwrap();

    assert_eq!(backend.upload_count.get(), 3);
    assert!(session.staging().is_empty());
    for id in [&image, &voice, &img_text] {
        let url = session.canvas().get(id).unwrap().media().unwrap().url.clone();
        assert!(url.unwrap().starts_with("https://"));
    }
}

#[test]
fn failed_upload_degrades_the_block_but_the_save_completes() {
    let backend = MockBackend::new();
    backend.fail_uploads.set(true);

    let mut session = EditorSession::new();
    let heading = session.insert_block(BlockKind::Heading).id.clone();
    session.set_block_text(&heading, "Still here").unwrap();
    let image = session.insert_block(BlockKind::Image).id.clone();
    session
        .attach_media(&image, vec![1], "image/png", "data:image/png;base64,AQ")
        .unwrap();

    let saved = block_on(save::save_note(&mut session, &backend)).unwrap();
    assert_eq!(saved.id, 1);
    assert_eq!(session.note_id(), Some(1));

    // The media block degraded to its empty/placeholder state...
    assert_eq!(
        session.canvas().get(&image).unwrap().media().unwrap().url,
        None
    );
    assert!(session.staging().is_empty());

    // ...while the rest of the document persisted normally.
    let stored = backend.notes.borrow().get(&1).unwrap().data.elements.clone();
    assert_eq!(stored[0].content, "Still here");
    assert_eq!(stored[1].data.url, Some(None));
    assert_eq!(stored[1].data.temp_id, None);
}

#[test]
fn overlapping_saves_are_refused() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    session.insert_block(BlockKind::Text);

    let plan = save::begin_save(&mut session).unwrap();
    assert!(matches!(
        save::begin_save(&mut session),
        Err(ApiError::SaveInFlight)
    ));

    // Finishing the first save releases the guard even when the push
    // failed.
    let failed: Result<SavedNote, ApiError> = Err(ApiError::Network("offline".into()));
    save::finish_save(&mut session, &plan, &[], &failed);
    assert!(block_on(save::save_note(&mut session, &backend)).is_ok());
}

#[test]
fn delete_resets_to_a_blank_note() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    session.set_title("Doomed");
    session.insert_block(BlockKind::Text);
    block_on(save::save_note(&mut session, &backend)).unwrap();

    block_on(save::delete_note(&mut session, &backend)).unwrap();
    assert_eq!(session.note_id(), None);
    assert!(session.canvas().is_empty());
    assert_eq!(session.title(), "Untitled Note");
    assert!(backend.notes.borrow().is_empty());
}

#[test]
fn delete_without_identity_or_on_failure_changes_nothing() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    session.insert_block(BlockKind::Text);

    assert!(matches!(
        block_on(save::delete_note(&mut session, &backend)),
        Err(ApiError::NoActiveNote)
    ));

    block_on(save::save_note(&mut session, &backend)).unwrap();
    backend.fail_everything.set(true);
    assert!(block_on(save::delete_note(&mut session, &backend)).is_err());
    assert_eq!(session.note_id(), Some(1));
    assert_eq!(session.canvas().len(), 1);
}

#[test]
fn loading_a_missing_note_leaves_the_open_note_alone() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    session.set_title("Keep me");
    session.insert_block(BlockKind::Heading);
    let before = serialize_canvas(session.canvas().blocks(), session.staging());

    let result = block_on(save::load_note(&mut session, &backend, 99));
    assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
    assert_eq!(session.title(), "Keep me");
    assert_eq!(
        serialize_canvas(session.canvas().blocks(), session.staging()),
        before
    );
}

#[test]
fn load_fetches_categories_lazily_and_resolves_by_name() {
    let backend = MockBackend::with_categories(vec![
        Category {
            id: 1,
            name: "Work".into(),
            color: Some("#4a90d9".into()),
        },
        Category {
            id: 2,
            name: "Home".into(),
            color: None,
        },
    ]);

    let mut author = EditorSession::new();
    author.set_categories(backend.categories.borrow().clone());
    author.select_category(Some(2));
    author.insert_block(BlockKind::Text);
    block_on(save::save_note(&mut author, &backend)).unwrap();

    // A fresh session has an empty category cache; loading fills it and
    // resolves the note's category by name.
    let mut reader = EditorSession::new();
    block_on(save::load_note(&mut reader, &backend, 1)).unwrap();
    assert_eq!(reader.categories().len(), 2);
    assert_eq!(reader.selected_category(), Some(2));
    assert_eq!(reader.category_label(), None);
}

#[test]
fn unknown_category_name_is_carried_as_a_label() {
    let backend = MockBackend::new();
    backend.notes.borrow_mut().insert(
        5,
        NoteDocument {
            id: 5,
            title: "Archived".into(),
            category_name: Some("Retired shelf".into()),
            data: Default::default(),
        },
    );

    let mut session = EditorSession::new();
    block_on(save::load_note(&mut session, &backend, 5)).unwrap();
    assert_eq!(session.selected_category(), None);
    assert_eq!(session.category_label(), Some("Retired shelf"));
}

#[test]
fn history_read_failure_degrades_to_empty() {
    let backend = MockBackend::new();
    let mut session = EditorSession::new();
    session.insert_block(BlockKind::Text);
    block_on(save::save_note(&mut session, &backend)).unwrap();

    let notes = block_on(save::fetch_history(&backend, &HistoryFilter::default()));
    assert_eq!(notes.len(), 1);

    backend.fail_everything.set(true);
    let notes = block_on(save::fetch_history(&backend, &HistoryFilter::default()));
    assert!(notes.is_empty());
}
