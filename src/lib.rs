//! Block Note Editor WASM Module
//!
//! This is the main WASM module for the block-based note editor.
//! The Rust side owns the document model (canvas of typed blocks); the JS
//! shell forwards events in and renders the display list handed back.

pub mod api;
pub mod models;
pub mod net;
pub mod persist;
pub mod render;

// Re-export commonly used types
pub use models::block::{Block, BlockBody, BlockKind};
pub use models::canvas::Canvas;
pub use models::session::EditorSession;
pub use api::session::NoteEditor;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Note editor WASM module initialized");
}
