//! Error types for mmbridge.
//!
//! A single `thiserror` enum covers name resolution, remote failures and the
//! session's reauthentication path. The cache itself never errors; a miss is
//! an ordinary `None`.

use thiserror::Error;

use crate::constants::AUTH_ERROR_PHRASES;

/// Result type alias using `BridgeError`.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for all mmbridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // ═══════════════════════════════════════════════════════════════════════════
    // NAME RESOLUTION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No team visible to the session carries this name.
    #[error("Team '{0}' not found")]
    TeamNotFound(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // REMOTE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The remote API (or its driver) reported a failure.
    ///
    /// `status` is set when the driver surfaced an HTTP status; the message is
    /// the driver's text verbatim.
    #[error("{message}")]
    Api {
        /// HTTP status, when known.
        status: Option<u16>,
        /// Driver error text.
        message: String,
    },

    /// A remote call attempt did not finish before its deadline.
    #[error("Remote call '{operation}' timed out after {seconds}s")]
    Timeout {
        /// Name of the remote operation.
        operation: String,
        /// Deadline that elapsed.
        seconds: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // AUTHENTICATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Login or token verification failed.
    #[error("Failed to authenticate with Mattermost: {0}")]
    AuthenticationFailed(String),

    /// A call failed with an auth error, and reauthenticating then retrying
    /// failed as well.
    #[error(
        "Session expired and re-authentication failed. Original error: {original}. Retry error: {retry}"
    )]
    ReauthFailed {
        /// Message of the first failure.
        original: String,
        /// Message of the reauthentication or retry failure.
        retry: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The server URL could not be parsed.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl BridgeError {
    /// Creates a remote error without a status code.
    pub fn api(message: impl Into<String>) -> Self {
        BridgeError::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a remote error carrying an HTTP status.
    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        BridgeError::Api {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Returns the HTTP status of a remote error, if one was reported.
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true if this error means the session is no longer authenticated.
    ///
    /// A structured 401 wins; otherwise the message is matched against
    /// [`AUTH_ERROR_PHRASES`].
    pub fn is_auth_error(&self) -> bool {
        match self {
            BridgeError::Api { status: Some(401), .. } => true,
            BridgeError::Api { message, .. } => message_indicates_auth_failure(message),
            BridgeError::AuthenticationFailed(_) => true,
            _ => false,
        }
    }

    /// Returns true if the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BridgeError::TeamNotFound(_) | BridgeError::Api { status: Some(404), .. }
        )
    }

    /// Returns true if a later attempt at the same call might succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            BridgeError::Timeout { .. } => true,
            BridgeError::Api { status, .. } => {
                !self.is_auth_error() && status.map_or(true, |s| s >= 500)
            }
            _ => false,
        }
    }
}

/// Case-insensitive match of an error message against [`AUTH_ERROR_PHRASES`].
pub fn message_indicates_auth_failure(message: &str) -> bool {
    let lowered = message.to_lowercase();
    AUTH_ERROR_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}
