// src/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::hrms_client::{io_context, HrmsError};

/// The only credential pair the console accepts. There is no server-side
/// account system behind this; the gate is a demo convenience, not a
/// security boundary.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin1";

/// Login flag persisted between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub logged_in: bool,
    pub logged_in_at: DateTime<Utc>,
}

/// Session state: loaded once at startup, set on login, cleared on logout.
/// Commands receive this instead of touching the file themselves.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    stored: Option<StoredSession>,
}

impl Session {
    /// Reads the persisted flag if the file exists. A file that fails to
    /// parse counts as logged out.
    pub fn load(path: &Path) -> Result<Self, HrmsError> {
        if !path.exists() {
            debug!("No session file at {:?}", path);
            return Ok(Self {
                path: path.to_path_buf(),
                stored: None,
            });
        }
        let json_string = fs::read_to_string(path)
            .map_err(|e| io_context(e, format!("Failed to read session file: {:?}", path)))?;
        let stored = match serde_json::from_str::<StoredSession>(&json_string) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(
                    "Session file {:?} is unreadable ({}); treating as logged out",
                    path, e
                );
                None
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            stored,
        })
    }

    pub fn is_active(&self) -> bool {
        self.stored.as_ref().map_or(false, |s| s.logged_in)
    }

    /// Literal credential check. Success persists the flag; any other pair
    /// leaves the session untouched.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool, HrmsError> {
        if username != ADMIN_USERNAME || password != ADMIN_PASSWORD {
            info!("Rejected login attempt for user '{}'", username);
            return Ok(false);
        }
        let stored = StoredSession {
            logged_in: true,
            logged_in_at: Utc::now(),
        };
        self.save(&stored)?;
        self.stored = Some(stored);
        info!("Session flag set");
        Ok(true)
    }

    /// Clears the flag and removes the file.
    pub fn logout(&mut self) -> Result<(), HrmsError> {
        self.stored = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                io_context(e, format!("Failed to remove session file: {:?}", self.path))
            })?;
        }
        info!("Session cleared");
        Ok(())
    }

    fn save(&self, stored: &StoredSession) -> Result<(), HrmsError> {
        let json_string = serde_json::to_string_pretty(stored)?;
        if let Some(parent) = self.path.parent() {
            // parent is empty for bare filenames like the default path
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    io_context(
                        e,
                        format!("Failed to create directory for session file: {:?}", parent),
                    )
                })?;
            }
        }
        let mut file = File::create(&self.path)
            .map_err(|e| io_context(e, format!("Failed to create session file: {:?}", self.path)))?;
        file.write_all(json_string.as_bytes())
            .map_err(|e| io_context(e, format!("Failed to write session file: {:?}", self.path)))?;
        debug!("Session flag written to {:?}", self.path);
        Ok(())
    }
}
