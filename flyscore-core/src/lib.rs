//! Scoreboard core: the persisted document, the single-writer controller
//! around it, the first-run seeder, and the hotkey/logo helpers used by
//! whatever front end drives it.

pub mod clock;
pub mod config;
pub mod repositories;
pub mod seeder;
pub mod services;

pub use flyscore_common::error::Error;
pub use flyscore_common::models;
