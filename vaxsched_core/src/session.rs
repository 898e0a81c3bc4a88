//! Staff session persistence with file locking.
//!
//! A successful staff login is kept in `<data_dir>/session.json` until
//! logout. Search and schedule assignment refuse to run without it.

use crate::{Error, Result, StaffSession};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SESSION_FILE: &str = "session.json";

/// Location of the session file inside a data directory
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

impl StaffSession {
    /// Load the session from a file with shared locking
    ///
    /// Returns `None` if there is no session. An unreadable or corrupted file
    /// is logged and treated as logged out.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No session file at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open session file {:?}: {}", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock session file {:?}: {}", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read session file {:?}: {}", path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<StaffSession>(&contents) {
            Ok(session) if !session.token.is_empty() => {
                tracing::debug!("Loaded session for {} from {:?}", session.name, path);
                Ok(Some(session))
            }
            Ok(_) => {
                tracing::warn!("Session file {:?} has an empty token, ignoring", path);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Failed to parse session file {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Load the session or fail with `NotLoggedIn`
    pub fn require(path: &Path) -> Result<Self> {
        Self::load(path)?.ok_or(Error::NotLoggedIn)
    }

    /// Save the session atomically (temp file, fsync, rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "session path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved session for {} to {:?}", self.name, path);
        Ok(())
    }

    /// Remove the session file. Returns whether a session existed.
    pub fn clear(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!("Cleared staff session at {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Fail with `Forbidden` unless this role may assign schedules
    pub fn ensure_can_assign(&self) -> Result<()> {
        if self.role.can_assign() {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "role '{}' cannot create dose schedules",
                self.role
            )))
        }
    }
}
