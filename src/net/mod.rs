//! HTTP collaborator contract
//!
//! Typed shapes for the note CRUD API, an error taxonomy, and the
//! `NoteTransport` trait the save/load protocol is written against. The
//! browser implementation lives in `fetch` (wasm32 only); tests drive the
//! protocol with an in-memory transport.

pub mod save;

#[cfg(target_arch = "wasm32")]
pub mod fetch;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::session::Category;
use crate::persist::WireBlock;

pub const API_BASE_URL: &str = "/api/notes/";
pub const CATEGORY_API_URL: &str = "/api/categories/";
pub const UPLOAD_API_URL: &str = "/api/upload-image/";

/// Failures crossing the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Server answered outside 2xx.
    #[error("API error: {status} on {url}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },

    /// Transport-level failure (DNS, connection, aborted request).
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the client-side deadline and was aborted.
    #[error("request timed out after {0} ms")]
    Timeout(u32),

    /// 2xx response whose body did not match the expected shape.
    #[error("malformed response body: {0}")]
    Decode(String),

    /// A save is already running; concurrent saves would race on the
    /// note identity.
    #[error("a save is already in progress")]
    SaveInFlight,

    /// Delete/export need a note that has been saved at least once.
    #[error("no note loaded")]
    NoActiveNote,
}

/// One row of the note history list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub updated_at: String,
}

/// A full note as served by `GET /api/notes/{id}/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteDocument {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub data: NoteData,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    #[serde(default)]
    pub elements: Vec<WireBlock>,
}

/// Body of note create/update requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotePayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    pub data: NoteData,
}

/// Echo returned by a successful create/update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedNote {
    pub id: u64,
    #[serde(default)]
    pub title: String,
}

/// Response of the media upload endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub permanent_url: String,
}

/// Server-side history filtering. The backend treats `category_id=null`
/// (and `0`) as "uncategorized".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CategoryFilter {
    Uncategorized,
    Id(u64),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub category: Option<CategoryFilter>,
    pub search: Option<String>,
}

impl HistoryFilter {
    /// Map the raw JS-side arguments: category id 0 selects uncategorized
    /// notes, mirroring the backend's sentinel.
    pub fn from_raw(category_id: Option<u64>, search: Option<String>) -> HistoryFilter {
        HistoryFilter {
            category: category_id.map(|id| {
                if id == 0 {
                    CategoryFilter::Uncategorized
                } else {
                    CategoryFilter::Id(id)
                }
            }),
            search: search.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Query string for the history request, empty when unfiltered.
    pub fn query_string(&self) -> String {
        let mut params = Vec::new();
        match &self.category {
            Some(CategoryFilter::Uncategorized) => params.push("category_id=null".to_string()),
            Some(CategoryFilter::Id(id)) => params.push(format!("category_id={id}")),
            None => {}
        }
        if let Some(search) = &self.search {
            params.push(format!("search={}", encode_query_component(search)));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

/// Percent-encode a query value (RFC 3986 unreserved characters pass
/// through).
fn encode_query_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// One staged payload on its way to the upload endpoint.
pub struct MediaUpload<'a> {
    pub bytes: &'a [u8],
    pub mime: &'a str,
    /// Note identity, attached when the note has been saved before so the
    /// server can organize the file.
    pub note_id: Option<u64>,
}

/// The HTTP surface the editor consumes, request/response shapes only.
/// Implemented by the browser fetch transport and by test doubles.
#[allow(async_fn_in_trait)]
pub trait NoteTransport {
    async fn list_notes(&self, filter: &HistoryFilter) -> Result<Vec<NoteSummary>, ApiError>;
    async fn get_note(&self, id: u64) -> Result<NoteDocument, ApiError>;
    async fn create_note(&self, payload: &NotePayload) -> Result<SavedNote, ApiError>;
    async fn update_note(&self, id: u64, payload: &NotePayload) -> Result<SavedNote, ApiError>;
    async fn delete_note(&self, id: u64) -> Result<(), ApiError>;
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
    /// Upload one staged payload, returning its permanent URL.
    async fn upload_media(&self, upload: MediaUpload<'_>) -> Result<String, ApiError>;
}

/// URL of the PDF export for a saved note; the shell navigates to it to
/// trigger the download.
pub fn export_pdf_url(note_id: u64) -> String {
    format!("{API_BASE_URL}{note_id}/export-pdf/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_shapes() {
        assert_eq!(HistoryFilter::default().query_string(), "");
        assert_eq!(
            HistoryFilter::from_raw(Some(3), None).query_string(),
            "?category_id=3"
        );
        assert_eq!(
            HistoryFilter::from_raw(Some(0), None).query_string(),
            "?category_id=null"
        );
        assert_eq!(
            HistoryFilter::from_raw(Some(3), Some("milk & eggs".into())).query_string(),
            "?category_id=3&search=milk%20%26%20eggs"
        );
    }

    #[test]
    fn blank_search_is_dropped() {
        let filter = HistoryFilter::from_raw(None, Some("   ".into()));
        assert_eq!(filter.search, None);
    }

    #[test]
    fn export_url_shape() {
        assert_eq!(export_pdf_url(12), "/api/notes/12/export-pdf/");
    }
}
