//! Client error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Three classes matter to the reviewer: the backend could not be reached,
//! the credential is missing or rejected (go log in), or the backend refused
//! the request (show its `detail` when it sent one). Nothing here is fatal to
//! an interactive session.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Shown when the backend cannot be reached.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Check that the server is reachable.";

/// Shown when the backend rejects a request without a `detail`.
pub const GENERIC_ERROR_MESSAGE: &str = "The server could not complete the request.";

/// Shown when a login is required.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Session missing or expired. Set a token with `palografico auth set-token`.";

/// Errors produced by backend client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// No bearer credential is available.
    #[error("missing credential")]
    MissingCredential,

    /// The backend answered 401.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}{}", detail_suffix(.detail))]
    Backend { status: u16, detail: Option<String> },

    /// A response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value was invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The credential store could not be read or written.
    #[error("credential store error: {0}")]
    CredentialStore(String),

    /// A local workspace edit was refused before reaching the backend.
    #[error("{0}")]
    Rejected(#[from] review::ReviewError),
}

impl ApiError {
    /// Build the error for a non-success response from its status and raw body.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 {
            return Self::Unauthorized;
        }
        Self::Backend { status, detail: extract_detail(body) }
    }

    /// Whether the user must (re)authenticate before retrying.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Unauthorized)
    }

    /// Whether the backend answered 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Backend { status: 404, .. })
    }

    /// Message suitable for a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => CONNECTION_ERROR_MESSAGE.to_owned(),
            Self::MissingCredential | Self::Unauthorized => LOGIN_REQUIRED_MESSAGE.to_owned(),
            Self::Backend { detail: Some(detail), .. } => detail.clone(),
            Self::Backend { detail: None, .. } | Self::Decode(_) => GENERIC_ERROR_MESSAGE.to_owned(),
            Self::HttpClientBuild(_) | Self::Config(_) | Self::CredentialStore(_) | Self::Rejected(_) => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Pull a human-readable `detail` out of an error body.
///
/// Accepts a string `detail` or a validation list whose entries carry `msg`.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if messages.is_empty() { None } else { Some(messages.join("; ")) }
        }
        _ => None,
    }
}
