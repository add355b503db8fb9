//! Render projection
//!
//! The model is the source of truth; the DOM is a projection. This module
//! computes the display list the JS shell turns into markup. Nothing here
//! mutates the model, and nothing in the model is ever read back out of
//! the DOM.

pub mod display_list;

pub use display_list::{
    BlockView, ChecklistItemView, DisplayList, RenderBlock, TableView,
};
