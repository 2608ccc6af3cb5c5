//! Plain-text token persistence
//!
//! Each token kind lives in its own file inside the configured token
//! directory. The file holds the literal token string and nothing else:
//! - `access_token.txt`
//! - `refresh_token.txt`
//!
//! Writes overwrite the previous value (last write wins). Nothing is ever
//! deleted; the files are the only state that survives between runs.

use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{ACCESS_TOKEN_FILE, REFRESH_TOKEN_FILE};
use crate::error::{AuthError, Result};

/// Logical name of a persisted token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_TOKEN_FILE,
            TokenKind::Refresh => REFRESH_TOKEN_FILE,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access token"),
            TokenKind::Refresh => f.write_str("refresh token"),
        }
    }
}

/// Handles persistent storage of OAuth tokens
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing a token kind
    pub fn path(&self, kind: TokenKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Writes `value` as the full contents of the file for `kind`
    ///
    /// The value goes to a temporary file in the same directory, created
    /// owner-only (0600 on Unix), which is then renamed over the target.
    /// Readers see either the old token or the new one, never a partial write.
    pub fn save(&self, kind: TokenKind, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| AuthError::Storage {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path(kind);
        let storage_error = |source| AuthError::Storage {
            path: path.clone(),
            source,
        };

        let mut file = tempfile::NamedTempFile::new_in(&self.dir).map_err(storage_error)?;
        file.write_all(value.as_bytes()).map_err(storage_error)?;
        file.as_file().sync_all().map_err(storage_error)?;
        file.persist(&path).map_err(|e| storage_error(e.error))?;

        debug!("Saved {} to {:?}", kind, path);
        Ok(())
    }

    /// Reads the token for `kind`, trimmed of surrounding whitespace
    ///
    /// A missing file, or one holding only whitespace, is reported as
    /// [`AuthError::NotFound`].
    pub fn load(&self, kind: TokenKind) -> Result<String> {
        let path = self.path(kind);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No {} file at {:?}", kind, path);
                return Err(AuthError::NotFound { kind });
            }
            Err(source) => return Err(AuthError::Storage { path, source }),
        };

        let token = content.trim();
        if token.is_empty() {
            debug!("{:?} is empty", path);
            return Err(AuthError::NotFound { kind });
        }

        Ok(token.to_string())
    }
}
