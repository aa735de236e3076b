pub mod json;

pub use json::{JsonHotkeyRepository, JsonScoreboardRepository};
