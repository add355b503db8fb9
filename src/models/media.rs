//! Media payload states and the voice recorder toggle
//!
//! Media blocks move through three states: empty (upload affordance),
//! staged (local object/data URL, bytes held in `MediaStaging`), and
//! committed (permanent server URL). The state is derived from the URL
//! scheme plus staging membership, never stored separately.

use serde::{Deserialize, Serialize};

/// URL slot of an image/voice/img-text block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaData {
    pub url: Option<String>,
}

impl MediaData {
    pub fn with_url(url: impl Into<String>) -> MediaData {
        MediaData {
            url: Some(url.into()),
        }
    }

    /// Derive the lifecycle state; `staged` is whether a staging entry
    /// exists for the owning block.
    pub fn state(&self, staged: bool) -> MediaState {
        match &self.url {
            None => MediaState::Empty,
            Some(url) if is_local_url(url) && staged => MediaState::Staged,
            Some(_) => MediaState::Committed,
        }
    }

    pub fn has_local_url(&self) -> bool {
        self.url.as_deref().is_some_and(is_local_url)
    }
}

/// Lifecycle of a media block's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaState {
    Empty,
    Staged,
    Committed,
}

/// True for URLs that only exist in this browser session (object URLs and
/// data URLs); false for anything the server can serve back.
pub fn is_local_url(url: &str) -> bool {
    url.starts_with("data:") || url.starts_with("blob:")
}

/// Voice capture is a strict two-state toggle. Elapsed time is computed
/// from a caller-supplied clock so the model stays deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording { block_id: String, started_ms: f64 },
}

impl RecorderState {
    pub fn is_recording_block(&self, id: &str) -> bool {
        matches!(self, RecorderState::Recording { block_id, .. } if block_id == id)
    }

    /// `mm:ss` label for the live elapsed-time display; `None` while idle.
    pub fn elapsed_label(&self, now_ms: f64) -> Option<String> {
        match self {
            RecorderState::Idle => None,
            RecorderState::Recording { started_ms, .. } => {
                Some(format_elapsed(now_ms - started_ms))
            }
        }
    }
}

/// Format a millisecond span as `mm:ss`, clamping negatives to 00:00.
pub fn format_elapsed(ms: f64) -> String {
    let total_secs = if ms.is_finite() && ms > 0.0 {
        (ms / 1000.0) as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_scheme_classification() {
        assert!(is_local_url("data:image/png;base64,AAAA"));
        assert!(is_local_url("blob:http://localhost/123-456"));
        assert!(!is_local_url("https://cdn.example.com/img/1.png"));
        assert!(!is_local_url("/media/uploads/1.png"));
    }

    #[test]
    fn state_derivation() {
        let empty = MediaData::default();
        assert_eq!(empty.state(false), MediaState::Empty);

        let staged = MediaData::with_url("data:image/png;base64,AAAA");
        assert_eq!(staged.state(true), MediaState::Staged);

        let committed = MediaData::with_url("https://cdn.example.com/img/1.png");
        assert_eq!(committed.state(false), MediaState::Committed);
    }

    #[test]
    fn elapsed_label_formats_mm_ss() {
        let rec = RecorderState::Recording {
            block_id: "el-1".into(),
            started_ms: 1_000.0,
        };
        assert_eq!(rec.elapsed_label(1_000.0).as_deref(), Some("00:00"));
        assert_eq!(rec.elapsed_label(62_500.0).as_deref(), Some("01:01"));
        assert_eq!(RecorderState::Idle.elapsed_label(99.0), None);
    }
}
