//! Persisted block shapes
//!
//! The wire contract a backend must honor: every canvas element is a
//! `{type, content, data}` triple, with `data` a flat per-type dictionary.
//! Media blocks always carry a `url` key (possibly null); `temp_id` only
//! appears for locally-staged media awaiting upload and never survives a
//! completed save.

use serde::{Deserialize, Deserializer, Serialize};

/// One persisted canvas element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub data: WireData,
}

/// Type-specific payload. Fields are populated per kind; everything else
/// is omitted from the JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireData {
    /// Checklist items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<WireChecklistItem>>,

    /// Table header labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,

    /// Table body rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<String>>>,

    /// Media URL. Outer `None` = key absent (non-media block); inner
    /// `None` = explicit null (media block with no payload yet).
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<Option<String>>,

    /// Temporary block id correlating a staged upload, save-time only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,

    /// Img-text title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Img-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireChecklistItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

/// Distinguish an absent `url` key from `"url": null`.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_url_survives_the_wire() {
        let json = r#"{"type":"image","content":"","data":{"url":null}}"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.data.url, Some(None));

        let out = serde_json::to_string(&block).unwrap();
        assert!(out.contains(r#""url":null"#));
    }

    #[test]
    fn absent_url_stays_absent() {
        let json = r#"{"type":"text","content":"hi","data":{}}"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.data.url, None);

        let out = serde_json::to_string(&block).unwrap();
        assert!(!out.contains("url"));
    }

    #[test]
    fn missing_data_defaults_empty() {
        let json = r#"{"type":"divider"}"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.data, WireData::default());
        assert_eq!(block.content, "");
    }
}
