//! Block types and the block envelope
//!
//! A `Block` is one typed content unit within a note. The kind enumeration
//! is closed and matched exhaustively; a persisted document may still carry
//! a type tag this build does not know, which deserializes into an inert
//! `Unknown` shell instead of crashing the canvas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checklist::Checklist;
use super::media::MediaData;
use super::table::TableGrid;

/// Closed enumeration of block types available from the palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading,
    Text,
    Code,
    Divider,
    Checklist,
    Table,
    Image,
    Voice,
    ImgText,
}

impl BlockKind {
    /// Wire tag for this kind, as stored in the persisted `type` field.
    pub fn tag(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Text => "text",
            BlockKind::Code => "code",
            BlockKind::Divider => "divider",
            BlockKind::Checklist => "checklist",
            BlockKind::Table => "table",
            BlockKind::Image => "image",
            BlockKind::Voice => "voice",
            BlockKind::ImgText => "img-text",
        }
    }

    /// Parse a wire tag. `None` for tags outside the closed enumeration.
    pub fn from_tag(tag: &str) -> Option<BlockKind> {
        match tag {
            "heading" => Some(BlockKind::Heading),
            "text" => Some(BlockKind::Text),
            "code" => Some(BlockKind::Code),
            "divider" => Some(BlockKind::Divider),
            "checklist" => Some(BlockKind::Checklist),
            "table" => Some(BlockKind::Table),
            "image" => Some(BlockKind::Image),
            "voice" => Some(BlockKind::Voice),
            "img-text" => Some(BlockKind::ImgText),
            _ => None,
        }
    }

    /// Factory default text for the kinds that carry plain content.
    pub fn default_text(&self) -> Option<&'static str> {
        match self {
            BlockKind::Heading => Some("Heading"),
            BlockKind::Text => Some("Text..."),
            BlockKind::Code => Some("// Code"),
            _ => None,
        }
    }

    /// True for kinds whose payload is (or contains) uploadable media.
    pub fn is_media(&self) -> bool {
        matches!(self, BlockKind::Image | BlockKind::Voice | BlockKind::ImgText)
    }
}

/// Factory default title/description for img-text blocks.
pub const DEFAULT_IMG_TEXT_TITLE: &str = "Title";
pub const DEFAULT_IMG_TEXT_DESCRIPTION: &str = "Description...";

/// Per-kind payload of a block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BlockBody {
    Heading { text: String },
    Text { text: String },
    Code { text: String },
    Divider,
    Checklist(Checklist),
    Table(TableGrid),
    Image(MediaData),
    Voice(MediaData),
    ImgText {
        media: MediaData,
        title: String,
        description: String,
    },
    /// A type tag this build does not recognize. The block renders as an
    /// empty shell and round-trips through save/load untouched.
    Unknown { tag: String, content: String },
}

impl BlockBody {
    /// Factory default payload for a palette kind.
    pub fn default_for(kind: BlockKind) -> BlockBody {
        match kind {
            BlockKind::Heading => BlockBody::Heading {
                text: kind.default_text().unwrap().to_string(),
            },
            BlockKind::Text => BlockBody::Text {
                text: kind.default_text().unwrap().to_string(),
            },
            BlockKind::Code => BlockBody::Code {
                text: kind.default_text().unwrap().to_string(),
            },
            BlockKind::Divider => BlockBody::Divider,
            BlockKind::Checklist => BlockBody::Checklist(Checklist::with_first_item()),
            BlockKind::Table => BlockBody::Table(TableGrid::new()),
            BlockKind::Image => BlockBody::Image(MediaData::default()),
            BlockKind::Voice => BlockBody::Voice(MediaData::default()),
            BlockKind::ImgText => BlockBody::ImgText {
                media: MediaData::default(),
                title: DEFAULT_IMG_TEXT_TITLE.to_string(),
                description: DEFAULT_IMG_TEXT_DESCRIPTION.to_string(),
            },
        }
    }
}

/// One block in the canvas: stable client-generated id plus typed payload.
///
/// The id doubles as the temporary key correlating staged media with this
/// block through the upload step of a save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub body: BlockBody,
}

impl Block {
    /// Create a fresh block with the factory defaults for `kind`.
    pub fn new(kind: BlockKind) -> Block {
        Block {
            id: new_block_id(),
            body: BlockBody::default_for(kind),
        }
    }

    /// Create a block from a wire type tag. Unrecognized tags produce an
    /// empty `Unknown` shell rather than failing.
    pub fn from_tag(tag: &str) -> Block {
        match BlockKind::from_tag(tag) {
            Some(kind) => Block::new(kind),
            None => Block {
                id: new_block_id(),
                body: BlockBody::Unknown {
                    tag: tag.to_string(),
                    content: String::new(),
                },
            },
        }
    }

    /// The kind, when the payload belongs to the closed enumeration.
    pub fn kind(&self) -> Option<BlockKind> {
        match &self.body {
            BlockBody::Heading { .. } => Some(BlockKind::Heading),
            BlockBody::Text { .. } => Some(BlockKind::Text),
            BlockBody::Code { .. } => Some(BlockKind::Code),
            BlockBody::Divider => Some(BlockKind::Divider),
            BlockBody::Checklist(_) => Some(BlockKind::Checklist),
            BlockBody::Table(_) => Some(BlockKind::Table),
            BlockBody::Image(_) => Some(BlockKind::Image),
            BlockBody::Voice(_) => Some(BlockKind::Voice),
            BlockBody::ImgText { .. } => Some(BlockKind::ImgText),
            BlockBody::Unknown { .. } => None,
        }
    }

    /// Wire type tag, including the preserved raw tag of unknown blocks.
    pub fn kind_tag(&self) -> &str {
        match &self.body {
            BlockBody::Unknown { tag, .. } => tag,
            _ => self.kind().expect("known kind").tag(),
        }
    }

    /// Plain-text content of heading/text/code blocks.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            BlockBody::Heading { text } | BlockBody::Text { text } | BlockBody::Code { text } => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Media payload, for the kinds that carry one.
    pub fn media(&self) -> Option<&MediaData> {
        match &self.body {
            BlockBody::Image(media) | BlockBody::Voice(media) => Some(media),
            BlockBody::ImgText { media, .. } => Some(media),
            _ => None,
        }
    }

    pub fn media_mut(&mut self) -> Option<&mut MediaData> {
        match &mut self.body {
            BlockBody::Image(media) | BlockBody::Voice(media) => Some(media),
            BlockBody::ImgText { media, .. } => Some(media),
            _ => None,
        }
    }
}

/// Client-generated block id, unique per session. Blocks never receive a
/// server-assigned id; only the note itself does.
pub fn new_block_id() -> String {
    format!("el-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_defaults_match_palette() {
        let heading = Block::new(BlockKind::Heading);
        assert_eq!(heading.text(), Some("Heading"));

        let code = Block::new(BlockKind::Code);
        assert_eq!(code.text(), Some("// Code"));

        let table = Block::new(BlockKind::Table);
        match &table.body {
            BlockBody::Table(grid) => {
                assert_eq!(grid.headers(), ["Header 1"]);
                assert_eq!(grid.rows(), [vec!["Data 1".to_string()]]);
            }
            other => panic!("expected table body, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_builds_inert_shell() {
        let block = Block::from_tag("embed");
        assert_eq!(block.kind(), None);
        assert_eq!(block.kind_tag(), "embed");
        assert_eq!(block.text(), None);
    }

    #[test]
    fn block_ids_are_unique() {
        let a = Block::new(BlockKind::Text);
        let b = Block::new(BlockKind::Text);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("el-"));
    }

    #[test]
    fn tag_round_trip_for_all_kinds() {
        for kind in [
            BlockKind::Heading,
            BlockKind::Text,
            BlockKind::Code,
            BlockKind::Divider,
            BlockKind::Checklist,
            BlockKind::Table,
            BlockKind::Image,
            BlockKind::Voice,
            BlockKind::ImgText,
        ] {
            assert_eq!(BlockKind::from_tag(kind.tag()), Some(kind));
        }
    }
}
