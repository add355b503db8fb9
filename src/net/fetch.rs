//! Browser fetch transport
//!
//! `NoteTransport` over `window.fetch`. Mutating requests carry the
//! `X-CSRFToken` header read from the `csrftoken` cookie; every request
//! races an abort-backed timeout so a hung server cannot leave the editor
//! waiting forever.

use futures::future::{select, Either};
use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response,
};

use crate::models::session::Category;

use super::{
    ApiError, HistoryFilter, MediaUpload, NoteDocument, NotePayload, NoteSummary, NoteTransport,
    SavedNote, UploadResponse, API_BASE_URL, CATEGORY_API_URL, UPLOAD_API_URL,
};

pub const DEFAULT_TIMEOUT_MS: u32 = 15_000;

pub struct FetchTransport {
    timeout_ms: u32,
}

impl Default for FetchTransport {
    fn default() -> Self {
        FetchTransport {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl FetchTransport {
    pub fn new() -> FetchTransport {
        FetchTransport::default()
    }

    pub fn with_timeout(timeout_ms: u32) -> FetchTransport {
        FetchTransport { timeout_ms }
    }

    /// Run one request to completion or abort it at the deadline.
    async fn request(&self, method: &str, url: &str, body: Body<'_>) -> Result<Response, ApiError> {
        let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;

        let headers = Headers::new().map_err(|e| network_error(url, &e))?;
        if method != "GET" {
            if let Some(token) = csrf_token() {
                headers
                    .set("X-CSRFToken", &token)
                    .map_err(|e| network_error(url, &e))?;
            }
        }

        let controller = AbortController::new().map_err(|e| network_error(url, &e))?;
        let mut opts = RequestInit::new();
        opts.method(method);
        opts.signal(Some(&controller.signal()));
        match body {
            Body::None => {}
            Body::Json(json) => {
                headers
                    .set("Content-Type", "application/json")
                    .map_err(|e| network_error(url, &e))?;
                opts.body(Some(&JsValue::from_str(json)));
            }
            // The browser supplies the multipart boundary itself.
            Body::Form(form) => {
                opts.body(Some(form.as_ref()));
            }
        }
        opts.headers(headers.as_ref());

        let request =
            Request::new_with_str_and_init(url, &opts).map_err(|e| network_error(url, &e))?;

        let fetch = JsFuture::from(window.fetch_with_request(&request));
        let timeout = TimeoutFuture::new(self.timeout_ms);
        futures::pin_mut!(fetch);
        futures::pin_mut!(timeout);

        let response = match select(fetch, timeout).await {
            Either::Left((result, _)) => result.map_err(|e| network_error(url, &e))?,
            Either::Right((_, _)) => {
                controller.abort();
                return Err(ApiError::Timeout(self.timeout_ms));
            }
        };

        let response: Response = response
            .dyn_into()
            .map_err(|e| network_error(url, &e))?;
        if !response.ok() {
            let detail = read_text(&response).await.unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status: response.status(),
                detail,
            });
        }
        Ok(response)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        body: Body<'_>,
    ) -> Result<T, ApiError> {
        let response = self.request(method, url, body).await?;
        let text = read_text(&response)
            .await
            .map_err(|e| network_error(url, &e))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

enum Body<'a> {
    None,
    Json(&'a str),
    Form(&'a FormData),
}

impl NoteTransport for FetchTransport {
    async fn list_notes(&self, filter: &HistoryFilter) -> Result<Vec<NoteSummary>, ApiError> {
        let url = format!("{API_BASE_URL}{}", filter.query_string());
        self.request_json("GET", &url, Body::None).await
    }

    async fn get_note(&self, id: u64) -> Result<NoteDocument, ApiError> {
        self.request_json("GET", &format!("{API_BASE_URL}{id}/"), Body::None)
            .await
    }

    async fn create_note(&self, payload: &NotePayload) -> Result<SavedNote, ApiError> {
        let json = serde_json::to_string(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.request_json("POST", API_BASE_URL, Body::Json(&json))
            .await
    }

    async fn update_note(&self, id: u64, payload: &NotePayload) -> Result<SavedNote, ApiError> {
        let json = serde_json::to_string(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.request_json("PATCH", &format!("{API_BASE_URL}{id}/"), Body::Json(&json))
            .await
    }

    async fn delete_note(&self, id: u64) -> Result<(), ApiError> {
        self.request("DELETE", &format!("{API_BASE_URL}{id}/"), Body::None)
            .await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.request_json("GET", CATEGORY_API_URL, Body::None).await
    }

    async fn upload_media(&self, upload: MediaUpload<'_>) -> Result<String, ApiError> {
        let form = build_upload_form(&upload).map_err(|e| network_error(UPLOAD_API_URL, &e))?;
        let response: UploadResponse = self
            .request_json("POST", UPLOAD_API_URL, Body::Form(&form))
            .await?;
        Ok(response.permanent_url)
    }
}

fn build_upload_form(upload: &MediaUpload<'_>) -> Result<FormData, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(upload.bytes));
    let mut props = BlobPropertyBag::new();
    props.type_(upload.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(parts.as_ref(), &props)?;

    let form = FormData::new()?;
    form.append_with_blob_and_filename("image", &blob, &upload_filename(upload.mime))?;
    if let Some(note_id) = upload.note_id {
        form.append_with_str("note_id", &note_id.to_string())?;
    }
    Ok(form)
}

fn upload_filename(mime: &str) -> String {
    let ext = mime.split('/').nth(1).unwrap_or("bin");
    format!("upload.{ext}")
}

/// `csrftoken` cookie value, decoded.
fn csrf_token() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let cookies = document.dyn_into::<web_sys::HtmlDocument>().ok()?.cookie().ok()?;
    for cookie in cookies.split(';') {
        if let Some(value) = cookie.trim().strip_prefix("csrftoken=") {
            return match js_sys::decode_uri_component(value) {
                Ok(decoded) => Some(String::from(decoded)),
                Err(_) => Some(value.to_string()),
            };
        }
    }
    None
}

async fn read_text(response: &Response) -> Result<String, JsValue> {
    let text = JsFuture::from(response.text()?).await?;
    Ok(text.as_string().unwrap_or_default())
}

fn network_error(url: &str, err: &JsValue) -> ApiError {
    let detail = err
        .as_string()
        .unwrap_or_else(|| format!("{err:?}"));
    ApiError::Network(format!("{url}: {detail}"))
}
