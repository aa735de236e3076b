pub mod hotkey;
pub mod scoreboard;
pub mod timer;

pub use hotkey::{HotkeyAction, HotkeyBinding, Target, TimerVerb};
pub use scoreboard::{CustomField, ScoreboardState, Side, Team};
pub use timer::{Timer, TimerMode};

/// Short opaque identifier for fields and timers (8 hex chars).
pub fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
