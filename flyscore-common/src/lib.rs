//! Shared types for the scoreboard core: the document model, the timer
//! accounting rules, hotkey action ids, the error enum, and the repository
//! traits the core is written against.

pub mod error;
pub mod models;
pub mod traits;

pub use error::{Error, Result};
