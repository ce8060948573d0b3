//! Bearer credential handling.
//!
//! The credential is obtained elsewhere (the backend's login flow) and handed
//! to this client either directly or through a token file. Networked
//! operations receive it explicitly as a [`Session`]; nothing reads it from
//! ambient state.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ApiError;

/// An authenticated session: the bearer token sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wrap a token, rejecting blank input.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_owned();
        if token.is_empty() { None } else { Some(Self { token }) }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::CredentialStore`] when the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<Session>, ApiError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Session::new(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::CredentialStore(format!("{}: {e}", self.path.display()))),
        }
    }

    /// Persist a session, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::CredentialStore`] on any filesystem failure.
    pub fn save(&self, session: &Session) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.store_error(&e))?;
        }
        fs::write(&self.path, session.token()).map_err(|e| self.store_error(&e))?;
        restrict_permissions(&self.path).map_err(|e| self.store_error(&e))?;
        tracing::info!(path = %self.path.display(), "credential stored");
        Ok(())
    }

    /// Remove the stored session. Removing a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::CredentialStore`] on any other filesystem failure.
    pub fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "credential cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.store_error(&e)),
        }
    }

    fn store_error(&self, e: &std::io::Error) -> ApiError {
        ApiError::CredentialStore(format!("{}: {e}", self.path.display()))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Pick the session to use: an explicit token wins over the stored one.
///
/// # Errors
///
/// Returns [`ApiError::MissingCredential`] when neither source has a token,
/// or a store error when the token file is unreadable.
pub fn resolve(explicit: Option<&str>, store: &CredentialStore) -> Result<Session, ApiError> {
    if let Some(session) = explicit.and_then(Session::new) {
        return Ok(session);
    }
    store.load()?.ok_or(ApiError::MissingCredential)
}
