// ================================================================
// File: flyscore-core/src/config.rs
// ================================================================
//
// Where the document root lives and which port the server should try first.
//
// Resolution order for the data root:
//   1. explicit override (CLI flag)
//   2. FLY_SCORE_DATA_ROOT environment variable (.env is honoured by the binary)
//   3. the root persisted in settings.json
//   4. the platform default, which is then persisted

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use flyscore_common::error::Error;
use flyscore_common::models::scoreboard::DEFAULT_SERVER_PORT;

pub const APP_DIR_NAME: &str = "fly-scoreboard";
pub const DATA_ROOT_ENV: &str = "FLY_SCORE_DATA_ROOT";
pub const PORT_ENV: &str = "FLY_SCORE_PORT";
pub const SETTINGS_FILE: &str = "settings.json";

/// Period of the optional timer flush, in milliseconds. Zero disables it.
pub const DEFAULT_TICK_MS: u64 = 200;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_root: Option<String>,
}

/// The persisted "which folder is the document root" setting.
#[derive(Debug, Clone)]
pub struct DataRootSettings {
    path: PathBuf,
}

impl DataRootSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/fly-scoreboard/settings.json`, if the platform has a config dir.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|d| Self::new(d.join(APP_DIR_NAME).join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> SettingsFile {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring unreadable settings file {}: {}", self.path.display(), e);
                SettingsFile::default()
            }),
            Err(_) => SettingsFile::default(),
        }
    }

    /// The configured root, never falling back to a default. Creates the
    /// directory if it has gone missing.
    pub fn get_no_ui(&self) -> Option<PathBuf> {
        let configured = self.read().data_root?;
        let trimmed = configured.trim();
        if trimmed.is_empty() {
            return None;
        }
        let dir = absolutize(Path::new(trimmed));
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("Could not create data root {}: {}", dir.display(), e);
        }
        Some(dir)
    }

    /// Persists `root` as the data root, creating it first.
    pub fn set(&self, root: &Path) -> Result<PathBuf, Error> {
        fs::create_dir_all(root)?;
        let abs = absolutize(root);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(&SettingsFile {
            data_root: Some(abs.to_string_lossy().into_owned()),
        })?;
        fs::write(&self.path, body)?;
        info!("Global data root set to: {}", abs.display());
        Ok(abs)
    }

    /// Configured root, or the platform default (persisted on first use).
    pub fn resolve(&self) -> Result<PathBuf, Error> {
        if let Some(existing) = self.get_no_ui() {
            return Ok(existing);
        }
        let def = default_data_root();
        self.set(&def)
    }
}

/// `<data_dir>/fly-scoreboard`, else `~/.fly-scoreboard`.
pub fn default_data_root() -> PathBuf {
    let base = dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .or_else(|| dirs::home_dir().map(|h| h.join(".fly-scoreboard")))
        .unwrap_or_else(|| PathBuf::from(".fly-scoreboard"));
    if let Err(e) = fs::create_dir_all(&base) {
        warn!("Could not create default data root {}: {}", base.display(), e);
    }
    absolutize(&base)
}

pub fn absolutize(p: &Path) -> PathBuf {
    std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf())
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub data_root: Option<PathBuf>,
    pub port: Option<u16>,
    pub tick_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_root: PathBuf,
    /// Port to try first; `None` means "whatever plugin.json says".
    pub preferred_port: Option<u16>,
    pub tick_ms: u64,
}

impl AppConfig {
    pub fn resolve(overrides: ConfigOverrides, settings: Option<&DataRootSettings>) -> Result<Self, Error> {
        Self::resolve_with(overrides, settings, |key| std::env::var(key).ok())
    }

    /// Same as `resolve`, with the environment lookup supplied by the caller.
    pub fn resolve_with<F>(
        overrides: ConfigOverrides,
        settings: Option<&DataRootSettings>,
        env: F,
    ) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_root = match overrides.data_root {
            Some(p) => {
                fs::create_dir_all(&p)?;
                absolutize(&p)
            }
            None => match env(DATA_ROOT_ENV).filter(|v| !v.trim().is_empty()) {
                Some(v) => {
                    let p = PathBuf::from(v.trim());
                    fs::create_dir_all(&p)?;
                    absolutize(&p)
                }
                None => match settings {
                    Some(s) => s.resolve()?,
                    None => default_data_root(),
                },
            },
        };

        let preferred_port = match overrides.port {
            Some(p) => Some(p),
            None => match env(PORT_ENV) {
                Some(v) => match v.trim().parse::<u16>() {
                    Ok(p) => Some(p),
                    Err(_) => {
                        warn!("Ignoring {}='{}': not a port number", PORT_ENV, v);
                        None
                    }
                },
                None => None,
            },
        };

        Ok(Self {
            data_root,
            preferred_port,
            tick_ms: overrides.tick_ms.unwrap_or(DEFAULT_TICK_MS),
        })
    }

    /// The preferred port, falling back to the one stored in the document.
    pub fn port_or(&self, stored: u16) -> u16 {
        match self.preferred_port {
            Some(p) => p,
            None if stored != 0 => stored,
            None => DEFAULT_SERVER_PORT,
        }
    }
}
