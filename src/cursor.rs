//! Cursor store: the single durable checkpoint between runs.
//!
//! The cursor is the id of the last item confirmed delivered, stored as
//! plain UTF-8 text. Writes go to `<file>.tmp` and are renamed into place so
//! a crash never leaves a half-written id behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{cursor_io_err, CursorError};

/// Persistence for the sync cursor.
pub trait CursorStore {
    /// The stored cursor, or `None` when there is no usable prior state.
    ///
    /// Never fails: unreadable state is treated as a first run.
    fn load(&self) -> Option<String>;

    /// Persist `id` as the new cursor.
    fn save(&mut self, id: &str) -> Result<(), CursorError>;
}

/// Cursor kept in a plain-text file.
#[derive(Debug, Clone)]
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                if id.is_empty() {
                    warn!(path = %self.path.display(), "state file is empty, assuming first run");
                    None
                } else {
                    Some(id.to_string())
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "state file not found, assuming first run");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable state file, assuming first run");
                None
            }
        }
    }

    fn save(&mut self, id: &str) -> Result<(), CursorError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| cursor_io_err(dir, e))?;
        }

        let tmp = self.tmp_path();
        std::fs::write(&tmp, id).map_err(|e| cursor_io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(cursor_io_err(&self.path, e));
        }
        info!(id, "updated state file");
        Ok(())
    }
}

/// Wraps a store so that saves are logged but never written.
///
/// Used for dry runs, where the next real run must still see the old cursor.
#[derive(Debug, Clone)]
pub struct ReadOnlyCursor<C>(pub C);

impl<C: CursorStore> CursorStore for ReadOnlyCursor<C> {
    fn load(&self) -> Option<String> {
        self.0.load()
    }

    fn save(&mut self, id: &str) -> Result<(), CursorError> {
        info!(id, "[dry-run] would update state file");
        Ok(())
    }
}
