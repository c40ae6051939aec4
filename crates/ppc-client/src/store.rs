use crate::auth::AuthProfile;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persists the single credential record as a JSON blob on disk. The record
/// is versionless; a malformed or missing blob silently falls back to the
/// default profile.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional location under the user state directory.
    pub fn default_path() -> PathBuf {
        resolve_state_dir().join("auth.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> AuthProfile {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return AuthProfile::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => profile,
            Err(err) => {
                warn!("credential_store_malformed: {err}");
                AuthProfile::default()
            }
        }
    }

    pub fn save(&self, profile: &AuthProfile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(profile)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Removes the stored record and blanks the in-memory credentials. The
    /// mode is left untouched so the prompt reopens on the same scheme.
    pub fn clear(&self, profile: &mut AuthProfile) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(StoreError::Io(err)),
        }
        profile.token.clear();
        profile.user.clear();
        profile.pass.clear();
        Ok(())
    }
}

fn resolve_state_dir() -> PathBuf {
    if let Ok(value) = std::env::var("PPC_STATE_DIR") {
        if !value.trim().is_empty() {
            return PathBuf::from(value);
        }
    }
    if let Ok(value) = std::env::var("XDG_STATE_HOME") {
        if !value.trim().is_empty() {
            return PathBuf::from(value).join("ppc");
        }
    }
    if let Ok(value) = std::env::var("HOME") {
        return PathBuf::from(value)
            .join(".local")
            .join("state")
            .join("ppc");
    }
    PathBuf::from(".ppc/state")
}
