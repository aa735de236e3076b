// ================================================================
// File: flyscore-core/src/services/logo_service.rs
// ================================================================
//
// Team logos live directly in the document root as `<prefix>-<hash8>.<ext>`
// so the overlay can reference them relative to plugin.json. A new logo for
// the same prefix replaces the old files.

use std::fs;
use std::path::{Component, Path};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use flyscore_common::error::Error;
use flyscore_common::models::Side;

/// File name prefix used for a team's logo.
pub fn logo_prefix(side: Side) -> &'static str {
    match side {
        Side::Home => "home",
        Side::Away => "away",
    }
}

/// Lower-case extension for `path`, sniffing the bytes when the name has
/// none (or something implausible). Defaults to `png`.
pub fn normalized_ext(path: &Path, bytes: &[u8]) -> String {
    let mut ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if ext.is_empty() || ext.len() > 5 {
        ext = sniff_ext(bytes).unwrap_or_default().to_string();
    }
    if ext == "jpeg" {
        ext = "jpg".to_string();
    }
    if ext.is_empty() { "png".to_string() } else { ext }
}

fn sniff_ext(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else if bytes.starts_with(b"GIF8") {
        Some("gif")
    } else {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_ascii_lowercase();
        head.contains("<svg").then_some("svg")
    }
}

/// First eight hex digits of the SHA-256 of `bytes`.
pub fn short_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(8);
    for b in digest.iter().take(4) {
        hex.push_str(&format!("{b:02x}"));
    }
    hex
}

fn matches_prefix(file_name: &str, prefix: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(prefix) else {
        return false;
    };
    (rest.starts_with('-') || rest.starts_with('.')) && rest.contains('.')
}

/// Removes every `<prefix>-*.*` / `<prefix>.*` file in `root`. Returns how
/// many were removed.
pub fn clean_prefix(root: &Path, prefix: &str) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !entry.path().is_file() || !matches_prefix(&name, prefix) {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                info!("Cleaned logo with prefix '{}': {}", prefix, name);
                removed += 1;
            }
            Err(e) => warn!("Failed removing {}: {}", entry.path().display(), e),
        }
    }
    removed
}

/// Copies `src` into `root` and returns the root-relative file name.
pub fn copy_logo(root: &Path, src: &Path, prefix: &str) -> Result<String, Error> {
    let bytes = fs::read(src)?;
    fs::create_dir_all(root)?;
    clean_prefix(root, prefix);

    let rel = format!("{}-{}.{}", prefix, short_hash(&bytes), normalized_ext(src, &bytes));
    fs::write(root.join(&rel), &bytes)?;
    info!("Logo copied to document root: {} (from {})", rel, src.display());
    Ok(rel)
}

/// Turns user input into a value for `Team::logo`: empty and `data:` URIs
/// pass through, paths to existing files are copied into the root.
pub fn normalize_logo_ref(root: &Path, input: &str, prefix: &str) -> Result<String, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with("data:") {
        return Ok(trimmed.to_string());
    }
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        if !candidate.is_file() {
            return Err(Error::NotFound(format!("logo file {}", candidate.display())));
        }
        return copy_logo(root, candidate, prefix);
    }
    if root.join(candidate).is_file() {
        return Ok(trimmed.to_string());
    }
    Err(Error::NotFound(format!("logo file {trimmed}")))
}

/// Deletes a root-relative logo file. Paths that would leave the root are
/// refused.
pub fn delete_logo_if_exists(root: &Path, rel: &str) -> bool {
    let rel = rel.trim();
    if rel.is_empty() || rel.starts_with("data:") {
        return false;
    }
    let rel_path = Path::new(rel);
    if rel_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        warn!("Refusing to delete logo outside the document root: {}", rel);
        return false;
    }
    let abs = root.join(rel_path);
    if !abs.is_file() {
        return false;
    }
    match fs::remove_file(&abs) {
        Ok(()) => {
            info!("Removed logo: {}", abs.display());
            true
        }
        Err(e) => {
            warn!("Failed removing logo {}: {}", abs.display(), e);
            false
        }
    }
}
