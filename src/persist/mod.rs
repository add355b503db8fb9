//! Serializer / deserializer
//!
//! Bidirectional mapping between the in-memory block model and the
//! persisted `{type, content, data}` triples. Serialization reads the
//! live model at call time; deserialization reconstructs blocks that are
//! indistinguishable from freshly created ones with the same content,
//! falling back to factory defaults for missing fields.

pub mod wire;

pub use wire::{WireBlock, WireChecklistItem, WireData};

use crate::models::block::{Block, BlockBody, BlockKind};
use crate::models::checklist::{Checklist, ChecklistItem};
use crate::models::media::{is_local_url, MediaData};
use crate::models::staging::MediaStaging;
use crate::models::table::TableGrid;

/// Serialize every block in canvas order. `staging` decides whether a
/// local media URL gets a `temp_id` back-reference for the upload step:
/// a permanent URL never does, and a local URL without a live staging
/// entry (which the session makes unrepresentable) would not either.
pub fn serialize_canvas(
    blocks: &[Block],
    staging: &MediaStaging,
) -> Vec<WireBlock> {
    blocks.iter().map(|b| serialize_block(b, staging)).collect()
}

pub fn serialize_block(block: &Block, staging: &MediaStaging) -> WireBlock {
    let mut wire = WireBlock {
        kind: block.kind_tag().to_string(),
        ..WireBlock::default()
    };

    match &block.body {
        BlockBody::Heading { text } | BlockBody::Text { text } | BlockBody::Code { text } => {
            wire.content = text.clone();
        }
        BlockBody::Divider => {}
        BlockBody::Checklist(list) => {
            wire.data.items = Some(
                list.items
                    .iter()
                    .map(|item| WireChecklistItem {
                        text: item.text.clone(),
                        checked: item.checked,
                    })
                    .collect(),
            );
        }
        BlockBody::Table(grid) => {
            wire.data.headers = Some(grid.headers().to_vec());
            wire.data.rows = Some(grid.rows().to_vec());
        }
        BlockBody::Image(media) | BlockBody::Voice(media) => {
            fill_media(&mut wire.data, media, &block.id, staging);
        }
        BlockBody::ImgText {
            media,
            title,
            description,
        } => {
            fill_media(&mut wire.data, media, &block.id, staging);
            wire.data.title = Some(title.clone());
            wire.data.description = Some(description.clone());
        }
        BlockBody::Unknown { content, .. } => {
            wire.content = content.clone();
        }
    }

    wire
}

fn fill_media(data: &mut WireData, media: &MediaData, block_id: &str, staging: &MediaStaging) {
    data.url = Some(media.url.clone());
    let staged = media
        .url
        .as_deref()
        .is_some_and(|url| is_local_url(url) && staging.contains(block_id));
    if staged {
        data.temp_id = Some(block_id.to_string());
    }
}

/// Rebuild a block from its persisted triple. Never fails: unrecognized
/// type tags become inert `Unknown` shells, and missing `data` fields
/// take the factory defaults. The block gets a fresh id; staged `temp_id`
/// markers in incoming data are meaningless outside a save and ignored.
pub fn deserialize_block(wire: &WireBlock) -> Block {
    let body = match BlockKind::from_tag(&wire.kind) {
        None => BlockBody::Unknown {
            tag: wire.kind.clone(),
            content: wire.content.clone(),
        },
        Some(BlockKind::Heading) => BlockBody::Heading {
            text: wire.content.clone(),
        },
        Some(BlockKind::Text) => BlockBody::Text {
            text: wire.content.clone(),
        },
        Some(BlockKind::Code) => BlockBody::Code {
            text: wire.content.clone(),
        },
        Some(BlockKind::Divider) => BlockBody::Divider,
        Some(BlockKind::Checklist) => BlockBody::Checklist(Checklist::from_items(
            wire.data
                .items
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|item| ChecklistItem::new(item.text, item.checked))
                .collect(),
        )),
        Some(BlockKind::Table) => BlockBody::Table(TableGrid::from_parts(
            wire.data.headers.clone().unwrap_or_default(),
            wire.data.rows.clone().unwrap_or_default(),
        )),
        Some(BlockKind::Image) => BlockBody::Image(wire_media(&wire.data)),
        Some(BlockKind::Voice) => BlockBody::Voice(wire_media(&wire.data)),
        Some(BlockKind::ImgText) => BlockBody::ImgText {
            media: wire_media(&wire.data),
            title: wire.data.title.clone().unwrap_or_default(),
            description: wire.data.description.clone().unwrap_or_default(),
        },
    };

    Block {
        id: crate::models::block::new_block_id(),
        body,
    }
}

fn wire_media(data: &WireData) -> MediaData {
    MediaData {
        url: data.url.clone().flatten(),
    }
}

/// Deserialize a whole persisted element list in order.
pub fn deserialize_elements(elements: &[WireBlock]) -> Vec<Block> {
    elements.iter().map(deserialize_block).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::staging::{StagedKind, StagedMedia};

    fn no_staging() -> MediaStaging {
        MediaStaging::new()
    }

    #[test]
    fn staged_media_gets_temp_id_permanent_does_not() {
        let mut staging = MediaStaging::new();
        let mut block = Block::new(BlockKind::Image);
        block.media_mut().unwrap().url = Some("data:image/png;base64,AA".into());
        staging.stage(
            block.id.clone(),
            StagedMedia {
                kind: StagedKind::Image,
                mime: "image/png".into(),
                bytes: vec![0],
            },
        );

        let wire = serialize_block(&block, &staging);
        assert_eq!(wire.data.temp_id.as_deref(), Some(block.id.as_str()));

        block.media_mut().unwrap().url = Some("https://cdn.example.com/1.png".into());
        let wire = serialize_block(&block, &staging);
        assert_eq!(wire.data.temp_id, None);
    }

    #[test]
    fn empty_media_serializes_explicit_null_url() {
        let block = Block::new(BlockKind::Voice);
        let wire = serialize_block(&block, &no_staging());
        assert_eq!(wire.data.url, Some(None));
        let json = serde_json::to_string(&wire).unwrap();
        assert!(json.contains(r#""url":null"#));
    }

    #[test]
    fn unknown_type_round_trips_untouched() {
        let wire = WireBlock {
            kind: "embed".into(),
            content: "<iframe>".into(),
            data: WireData::default(),
        };
        let block = deserialize_block(&wire);
        let back = serialize_block(&block, &no_staging());
        assert_eq!(back, wire);
    }

    #[test]
    fn table_defaults_fill_missing_data() {
        let wire = WireBlock {
            kind: "table".into(),
            ..WireBlock::default()
        };
        let block = deserialize_block(&wire);
        match &block.body {
            BlockBody::Table(grid) => {
                assert_eq!(grid.headers(), ["Header 1"]);
                assert_eq!(grid.row_count(), 0);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }
}
