use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use engine_logging::{engine_info, engine_warn};
use roster_engine::{ApiContext, Role};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse session file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize session: {0}")]
    Serialize(#[from] ron::Error),
}

/// Sign-in state kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub center_id: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, center_id: Option<String>) -> Self {
        let role = if center_id.is_some() {
            Role::Center
        } else {
            Role::Admin
        };
        Self {
            token: token.into(),
            role,
            center_id,
            saved_at: Utc::now(),
        }
    }

    pub fn apply(&self, context: ApiContext) -> ApiContext {
        let context = context.with_token(self.token.clone());
        match (&self.role, &self.center_id) {
            (Role::Center, Some(center_id)) => context.with_center(center_id.clone()),
            _ => context,
        }
    }
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nobody is signed in.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let session: Session = ron::from_str(&content)?;
        engine_info!("Loaded session for role {:?} from {:?}", session.role, self.path);
        Ok(Some(session))
    }

    /// Like [`SessionStore::load`], but an unreadable file counts as signed out.
    pub fn load_or_warn(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(err) => {
                engine_warn!("Ignoring session file {:?}: {}", self.path, err);
                None
            }
        }
    }

    /// Writes the session through a temp file in the same directory, then renames it.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let content = ron::ser::to_string_pretty(session, ron::ser::PrettyConfig::new())?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        engine_info!("Saved session to {:?}", self.path);
        Ok(())
    }

    /// Removes the session file. Returns false if there was none.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
