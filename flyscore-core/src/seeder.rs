// ================================================================
// File: flyscore-core/src/seeder.rs
// ================================================================
//
// First-run setup of the document root: the overlay page and an initial
// plugin.json. Files that already exist are never touched, so user edits to
// the overlay survive every restart.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use flyscore_common::error::Error;
use flyscore_common::traits::repository_traits::ScoreboardRepository;

use crate::config::absolutize;
use crate::repositories::JsonScoreboardRepository;

pub const OVERLAY_DIR: &str = "overlay";

pub const DEFAULT_OVERLAY_FILES: [(&str, &str); 3] = [
    ("index.html", include_str!("../assets/overlay/index.html")),
    ("style.css", include_str!("../assets/overlay/style.css")),
    ("script.js", include_str!("../assets/overlay/script.js")),
];

/// Makes `root` a working document root and returns its absolute path.
pub fn seed_if_needed(root: &Path) -> Result<PathBuf, Error> {
    let root = absolutize(root);
    let overlay = root.join(OVERLAY_DIR);
    fs::create_dir_all(&overlay)?;

    for (name, body) in DEFAULT_OVERLAY_FILES {
        let dst = overlay.join(name);
        if dst.exists() {
            debug!("Keeping existing {}", dst.display());
            continue;
        }
        fs::write(&dst, body)?;
        info!("Seeded default overlay file {}", dst.display());
    }

    JsonScoreboardRepository::new(&root).ensure_exists(None)?;
    Ok(root)
}
