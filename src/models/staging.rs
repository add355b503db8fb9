//! Media staging map
//!
//! Raw file/recording payloads selected locally but not yet uploaded,
//! keyed by the owning block's id. Entries are consumed by the save
//! protocol and discarded when the block (or its media) is removed, so a
//! local URL on a block and a staging entry always exist together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagedKind {
    Image,
    Audio,
}

/// One locally-staged payload awaiting upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StagedMedia {
    pub kind: StagedKind,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaStaging {
    entries: HashMap<String, StagedMedia>,
}

impl MediaStaging {
    pub fn new() -> MediaStaging {
        MediaStaging::default()
    }

    /// Stage a payload for a block, replacing any previous one.
    pub fn stage(&mut self, block_id: impl Into<String>, media: StagedMedia) {
        self.entries.insert(block_id.into(), media);
    }

    /// Consume the entry for a block (upload path).
    pub fn take(&mut self, block_id: &str) -> Option<StagedMedia> {
        self.entries.remove(block_id)
    }

    /// Drop the entry for a block (block/media removal path).
    pub fn discard(&mut self, block_id: &str) -> bool {
        self.entries.remove(block_id).is_some()
    }

    pub fn contains(&self, block_id: &str) -> bool {
        self.entries.contains_key(block_id)
    }

    pub fn get(&self, block_id: &str) -> Option<&StagedMedia> {
        self.entries.get(block_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> StagedMedia {
        StagedMedia {
            kind: StagedKind::Image,
            mime: "image/png".into(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[test]
    fn stage_take_consumes() {
        let mut staging = MediaStaging::new();
        staging.stage("el-1", png());
        assert!(staging.contains("el-1"));
        assert!(staging.take("el-1").is_some());
        assert!(staging.is_empty());
        assert!(staging.take("el-1").is_none());
    }

    #[test]
    fn restaging_replaces() {
        let mut staging = MediaStaging::new();
        staging.stage("el-1", png());
        staging.stage(
            "el-1",
            StagedMedia {
                kind: StagedKind::Audio,
                mime: "audio/webm".into(),
                bytes: vec![1, 2, 3],
            },
        );
        assert_eq!(staging.len(), 1);
        assert_eq!(staging.get("el-1").unwrap().kind, StagedKind::Audio);
    }
}
