pub mod hotkey_service;
pub mod logo_service;
pub mod scoreboard_service;

pub use hotkey_service::HotkeyService;
pub use scoreboard_service::ScoreboardService;
