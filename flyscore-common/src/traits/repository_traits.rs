use crate::error::Error;
use crate::models::{HotkeyBinding, ScoreboardState};

/// Durable home of the scoreboard document.
///
/// Calls block on file I/O; payloads are a few kilobytes.
pub trait ScoreboardRepository: Send + Sync {
    /// `Ok(None)` when no document exists yet.
    fn load(&self) -> Result<Option<ScoreboardState>, Error>;
    fn save(&self, state: &ScoreboardState) -> Result<(), Error>;
    /// Deletes the stored document and writes fresh defaults.
    fn reset_defaults(&self) -> Result<ScoreboardState, Error>;
    /// Writes `seed` (or defaults) only when nothing is stored yet.
    fn ensure_exists(&self, seed: Option<&ScoreboardState>) -> Result<(), Error>;
}

pub trait HotkeyRepository: Send + Sync {
    fn load_bindings(&self) -> Result<Vec<HotkeyBinding>, Error>;
    fn save_bindings(&self, bindings: &[HotkeyBinding]) -> Result<(), Error>;
}
