//! Document canvas
//!
//! The ordered sequence of blocks forming one note's body. Insertion
//! order is document order is render order; a reorder is a single splice
//! with no partially-moved state observable between calls.

use serde::{Deserialize, Serialize};

use super::block::Block;
use super::error::EditError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    blocks: Vec<Block>,
}

impl Canvas {
    pub fn new() -> Canvas {
        Canvas::default()
    }

    /// Append at the canvas end (palette inserts land here).
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Remove a block, returning it so the caller can release any staged
    /// media tied to its id.
    pub fn remove(&mut self, id: &str) -> Result<Block, EditError> {
        let index = self.index_of(id)?;
        Ok(self.blocks.remove(index))
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn index_of(&self, id: &str) -> Result<usize, EditError> {
        self.blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| EditError::UnknownBlock(id.to_string()))
    }

    /// Move `dragged` relative to `target`: after the target when moving
    /// down the document, before it when moving up. Both cases reduce to a
    /// remove + insert at the target's original index.
    pub fn reorder(&mut self, dragged: &str, target: &str) -> Result<(), EditError> {
        let from = self.index_of(dragged)?;
        let to = self.index_of(target)?;
        if from == to {
            return Ok(());
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::block::BlockKind;

    fn canvas_of(n: usize) -> (Canvas, Vec<String>) {
        let mut canvas = Canvas::new();
        let mut ids = Vec::new();
        for _ in 0..n {
            let block = Block::new(BlockKind::Text);
            ids.push(block.id.clone());
            canvas.push(block);
        }
        (canvas, ids)
    }

    fn order(canvas: &Canvas) -> Vec<String> {
        canvas.blocks().iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn reorder_down_lands_after_target() {
        let (mut canvas, ids) = canvas_of(4);
        canvas.reorder(&ids[0], &ids[2]).unwrap();
        assert_eq!(
            order(&canvas),
            [&ids[1], &ids[2], &ids[0], &ids[3]].map(String::from)
        );
    }

    #[test]
    fn reorder_up_lands_before_target() {
        let (mut canvas, ids) = canvas_of(4);
        canvas.reorder(&ids[3], &ids[1]).unwrap();
        assert_eq!(
            order(&canvas),
            [&ids[0], &ids[3], &ids[1], &ids[2]].map(String::from)
        );
    }

    #[test]
    fn reorder_onto_self_is_identity() {
        let (mut canvas, ids) = canvas_of(3);
        canvas.reorder(&ids[1], &ids[1]).unwrap();
        assert_eq!(order(&canvas), ids);
    }

    #[test]
    fn remove_returns_the_block() {
        let (mut canvas, ids) = canvas_of(2);
        let removed = canvas.remove(&ids[0]).unwrap();
        assert_eq!(removed.id, ids[0]);
        assert_eq!(canvas.len(), 1);
        assert!(matches!(
            canvas.remove("el-missing"),
            Err(EditError::UnknownBlock(_))
        ));
    }
}
