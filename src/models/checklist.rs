//! Checklist sub-model
//!
//! An ordered list of independently checkable, removable items. The
//! "New item" placeholder is a view concern: the model stores only real
//! text, and the projection activates the placeholder for empty items.
//! The placeholder string is therefore never persisted, even when a user
//! types it verbatim.

use serde::{Deserialize, Serialize};

use super::error::OutOfRange;

/// Placeholder shown (by the view) for items whose text is empty.
pub const NEW_ITEM_PLACEHOLDER: &str = "New item";

/// Factory default text of the first item in a fresh checklist.
pub const DEFAULT_FIRST_ITEM: &str = "First item";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>, checked: bool) -> ChecklistItem {
        ChecklistItem {
            text: text.into(),
            checked,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    /// Factory default: one unchecked item.
    pub fn with_first_item() -> Checklist {
        Checklist {
            items: vec![ChecklistItem::new(DEFAULT_FIRST_ITEM, false)],
        }
    }

    pub fn from_items(items: Vec<ChecklistItem>) -> Checklist {
        Checklist { items }
    }

    /// Append an empty item (the view shows the placeholder for it).
    /// Returns the new item's index.
    pub fn add_item(&mut self) -> usize {
        self.items.push(ChecklistItem::new("", false));
        self.items.len() - 1
    }

    /// Remove one item. Out-of-range indices are refused, not clamped.
    pub fn remove_item(&mut self, index: usize) -> Result<(), OutOfRange> {
        if index >= self.items.len() {
            return Err(OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.remove(index);
        Ok(())
    }

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), OutOfRange> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(item) => {
                item.text = text.into();
                Ok(())
            }
            None => Err(OutOfRange { index, len }),
        }
    }

    pub fn set_checked(&mut self, index: usize, checked: bool) -> Result<(), OutOfRange> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(item) => {
                item.checked = checked;
                Ok(())
            }
            None => Err(OutOfRange { index, len }),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove_restores_count() {
        let mut list = Checklist::with_first_item();
        let before = list.len();
        let idx = list.add_item();
        assert_eq!(list.len(), before + 1);
        list.remove_item(idx).unwrap();
        assert_eq!(list.len(), before);
    }

    #[test]
    fn new_items_start_empty_and_unchecked() {
        let mut list = Checklist::default();
        let idx = list.add_item();
        assert_eq!(list.items[idx].text, "");
        assert!(!list.items[idx].checked);
    }

    #[test]
    fn typed_placeholder_text_is_kept_verbatim() {
        // A user typing exactly "New item" must not be mistaken for the
        // untouched placeholder.
        let mut list = Checklist::default();
        let idx = list.add_item();
        list.set_text(idx, NEW_ITEM_PLACEHOLDER).unwrap();
        assert_eq!(list.items[idx].text, NEW_ITEM_PLACEHOLDER);
    }

    #[test]
    fn out_of_range_is_refused() {
        let mut list = Checklist::with_first_item();
        assert!(list.remove_item(5).is_err());
        assert!(list.set_text(5, "x").is_err());
        assert!(list.set_checked(5, true).is_err());
        assert_eq!(list.len(), 1);
    }
}
