//! File-backed token persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use admin_core::{TokenStore, TOKEN_KEY};
use tracing::warn;

/// Keeps the token in a file named `__TOKEN__` inside `dir`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    type Error = io::Error;

    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Some(token.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read token");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), Self::Error> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
