//! Persistent storage for the single API token.
//!
//! One string under one fixed file, the desktop analog of a value in
//! browser local storage. The storage client never reads this directly; the
//! token is resolved once during configuration and passed in explicitly.

use crate::errors::{GalleryError, GalleryResult};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const APP_DIR: &str = "gallery-store";
const TOKEN_FILE: &str = "token";

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store rooted at the platform config directory,
    /// e.g. `~/.config/gallery-store/token`.
    pub fn default_location() -> GalleryResult<Self> {
        let base = dirs::config_dir().ok_or(GalleryError::NoConfigDir)?;
        Ok(Self {
            path: base.join(APP_DIR).join(TOKEN_FILE),
        })
    }

    /// Store rooted at an explicit file path. Used by tests.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, token: &str) -> GalleryResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token.trim())?;
        tracing::debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    /// Read the stored token. A missing file or a blank one is `None`.
    pub fn load(&self) -> GalleryResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim().to_string();
                Ok((!token.is_empty()).then_some(token))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(GalleryError::Io(err)),
        }
    }

    /// Delete the stored token. Returns whether one existed.
    pub fn forget(&self) -> GalleryResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(GalleryError::Io(err)),
        }
    }
}
