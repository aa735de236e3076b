use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use flyscore_common::error::Error;
use flyscore_common::models::ScoreboardState;
use flyscore_common::traits::repository_traits::ScoreboardRepository;

use super::document::{from_document, to_document};

pub const STATE_FILE: &str = "plugin.json";

/// `plugin.json` inside a document root.
///
/// Saves truncate and rewrite the file in one call. There is no
/// rename-swap, so a crash mid-write can leave a broken file; `load`
/// reports that as a parse error and callers fall back to defaults.
#[derive(Debug, Clone)]
pub struct JsonScoreboardRepository {
    root: PathBuf,
}

impl JsonScoreboardRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    /// The document text as stored, `None` if absent.
    pub fn read_raw(&self) -> Result<Option<String>, Error> {
        match fs::read_to_string(self.path()) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrites the document with `text` verbatim.
    pub fn write_raw(&self, text: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(), text)?;
        Ok(())
    }
}

impl ScoreboardRepository for JsonScoreboardRepository {
    fn load(&self) -> Result<Option<ScoreboardState>, Error> {
        let bytes = match fs::read(self.path()) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let doc: serde_json::Value = serde_json::from_slice(&bytes)?;
        from_document(&doc).map(Some)
    }

    fn save(&self, state: &ScoreboardState) -> Result<(), Error> {
        let body = serde_json::to_vec(&to_document(state))?;
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(), body)?;
        debug!("Saved {}", self.path().display());
        Ok(())
    }

    fn reset_defaults(&self) -> Result<ScoreboardState, Error> {
        match fs::remove_file(self.path()) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let def = ScoreboardState::make_defaults();
        self.save(&def)?;
        info!("Reset {} to defaults", self.path().display());
        Ok(def)
    }

    fn ensure_exists(&self, seed: Option<&ScoreboardState>) -> Result<(), Error> {
        if self.path().exists() {
            return Ok(());
        }
        match seed {
            Some(st) => self.save(st)?,
            None => self.save(&ScoreboardState::make_defaults())?,
        }
        info!("Created {}", self.path().display());
        Ok(())
    }
}
