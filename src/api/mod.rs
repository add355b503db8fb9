//! Note Editor WASM API
//!
//! This module provides the JavaScript-facing API for the note editor.
//! The shell constructs one `NoteEditor` handle and drives everything
//! through it; there is no global editor state on either side of the
//! boundary.
//!
//! # Module Structure
//!
//! - `helpers`: serialization, error conversion and console logging
//! - `session`: synchronous editing operations (blocks, drag, media, render)
//! - `notes`: asynchronous persistence operations (save/load/delete/history),
//!   compiled for the wasm32 target only

pub mod helpers;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod notes;

pub use session::NoteEditor;
