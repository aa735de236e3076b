//! File-backed repositories. Both documents live directly in the document
//! root, which is also what the document server exposes.

pub mod document;
pub mod hotkeys;
pub mod state_store;

pub use hotkeys::{HOTKEYS_FILE, JsonHotkeyRepository};
pub use state_store::{JsonScoreboardRepository, STATE_FILE};
