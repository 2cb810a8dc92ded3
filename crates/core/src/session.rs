//! Session token storage.
//!
//! The token is handed to whoever needs it through a [`SessionStore`] rather
//! than read from ambient global state.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ApplicationError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not read session file `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write session file `{path}`: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not parse session file `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("could not encode session token: {0}")]
    Encode(serde_json::Error),
    #[error("session store lock is poisoned")]
    Poisoned,
}

impl From<SessionError> for ApplicationError {
    fn from(value: SessionError) -> Self {
        Self::Session(value.to_string())
    }
}

pub trait SessionStore: Send + Sync {
    fn get(&self) -> Result<Option<SecretString>, SessionError>;
    fn set(&self, token: SecretString) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    token: Mutex<Option<SecretString>>,
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> Result<Option<SecretString>, SessionError> {
        let guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set(&self, token: SecretString) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Persists the token as a small JSON document so it survives restarts.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Creates or truncates `path` readable by the owner only.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<SecretString>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SessionError::Read { path: self.path.clone(), source }),
        };

        let file: SessionFile = serde_json::from_str(&raw)
            .map_err(|source| SessionError::Parse { path: self.path.clone(), source })?;
        if file.token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(file.token.into()))
    }

    fn set(&self, token: SecretString) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| SessionError::Write { path: self.path.clone(), source })?;
        }

        let file = SessionFile { token: token.expose_secret().to_string() };
        let raw = serde_json::to_string(&file).map_err(SessionError::Encode)?;

        // Staged beside the target and renamed so readers never see a partial
        // file. A leftover staging file would keep its old permissions.
        let staging = self.staging_path();
        let _ = fs::remove_file(&staging);
        write_private(&staging, raw.as_bytes())
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|source| {
                let _ = fs::remove_file(&staging);
                SessionError::Write { path: self.path.clone(), source }
            })
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Write { path: self.path.clone(), source }),
        }
    }
}
