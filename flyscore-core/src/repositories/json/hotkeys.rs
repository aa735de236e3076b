use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use flyscore_common::error::Error;
use flyscore_common::models::HotkeyBinding;
use flyscore_common::traits::repository_traits::HotkeyRepository;

pub const HOTKEYS_FILE: &str = "hotkeys.json";

/// `hotkeys.json`: `[{"id": ..., "label": ..., "seq": ...}, ...]`.
#[derive(Debug, Clone)]
pub struct JsonHotkeyRepository {
    root: PathBuf,
}

impl JsonHotkeyRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(HOTKEYS_FILE)
    }
}

impl HotkeyRepository for JsonHotkeyRepository {
    fn load_bindings(&self) -> Result<Vec<HotkeyBinding>, Error> {
        let bytes = match fs::read(self.path()) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let doc: Value = serde_json::from_slice(&bytes)?;
        let Value::Array(items) = doc else {
            return Err(Error::Parse(format!("{} is not an array", HOTKEYS_FILE)));
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<HotkeyBinding>(item) {
                Ok(b) if !b.action_id.is_empty() => out.push(b),
                Ok(_) => {}
                Err(e) => warn!("Skipping malformed hotkey entry: {}", e),
            }
        }
        Ok(out)
    }

    fn save_bindings(&self, bindings: &[HotkeyBinding]) -> Result<(), Error> {
        let keep: Vec<&HotkeyBinding> = bindings.iter().filter(|b| !b.action_id.is_empty()).collect();
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(), serde_json::to_vec(&keep)?)?;
        Ok(())
    }
}
