//! Who is logged in, and which student the screens are showing.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::types::{AdminAccount, StudentRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// Logged in with a mobile number + OTP
  Parent,
  /// Logged in with office credentials
  Admin,
}

/// Logged-in user state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub role: Role,
  /// Mobile number for parents, admin id for admins
  pub login: String,
  pub display_name: String,
  /// Students linked to a parent's mobile number (empty for admins)
  pub students: Vec<StudentRef>,
  active: usize,
  pub started_at: DateTime<Utc>,
}

impl Session {
  pub fn parent(mobile: &str, students: Vec<StudentRef>) -> Self {
    let display_name = match students.as_slice() {
      [only] => only.name.clone(),
      _ => format!("Parent ({})", mobile),
    };
    Self {
      role: Role::Parent,
      login: mobile.to_string(),
      display_name,
      students,
      active: 0,
      started_at: Utc::now(),
    }
  }

  pub fn admin(account: AdminAccount) -> Self {
    Self {
      role: Role::Admin,
      login: account.id,
      display_name: account.name,
      students: Vec::new(),
      active: 0,
      started_at: Utc::now(),
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  /// The student parent screens are showing
  pub fn active_student(&self) -> Option<&StudentRef> {
    self.students.get(self.active)
  }

  pub fn select_student(&mut self, student_id: &str) -> bool {
    match self.students.iter().position(|s| s.student_id == student_id) {
      Some(i) => {
        self.active = i;
        true
      }
      None => false,
    }
  }

  /// Move to the next linked student, wrapping around.
  pub fn cycle_student(&mut self) -> Option<&StudentRef> {
    if self.students.is_empty() {
      return None;
    }
    self.active = (self.active + 1) % self.students.len();
    self.active_student()
  }

  /// Cache subject for data that is not tied to a specific student.
  pub fn subject(&self) -> String {
    match self.role {
      Role::Admin => format!("admin:{}", self.login),
      Role::Parent => self
        .active_student()
        .map(|s| s.student_id.clone())
        .unwrap_or_else(|| format!("parent:{}", self.login)),
    }
  }
}

/// Persists the session between runs as JSON.
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

  /// Load the saved session. A missing file is no session; an unreadable
  /// one is logged and treated the same so a bad file never blocks startup.
  pub fn load(&self) -> Result<Option<Session>> {
    if !self.path.exists() {
      return Ok(None);
    }

    let contents = std::fs::read_to_string(&self.path)
      .map_err(|e| eyre!("Failed to read session {}: {}", self.path.display(), e))?;

    match serde_json::from_str::<Session>(&contents) {
      Ok(mut session) => {
        if session.active >= session.students.len() {
          session.active = 0;
        }
        Ok(Some(session))
      }
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
        Ok(None)
      }
    }
  }

  pub fn save(&self, session: &Session) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let json = serde_json::to_string_pretty(session)
      .map_err(|e| eyre!("Failed to serialize session: {}", e))?;
    std::fs::write(&self.path, json)
      .map_err(|e| eyre!("Failed to write session {}: {}", self.path.display(), e))?;

    info!(role = ?session.role, login = %session.login, "session saved");
    Ok(())
  }

  pub fn clear(&self) -> Result<()> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => {
        info!("session cleared");
        Ok(())
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(eyre!(
        "Failed to remove session {}: {}",
        self.path.display(),
        e
      )),
    }
  }
}
