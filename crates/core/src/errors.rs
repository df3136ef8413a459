use thiserror::Error;

/// Message used when the server rejects credentials without explaining why.
pub const DEFAULT_UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Message shown when no response reached the client at all.
pub const CONNECTIVITY_MESSAGE: &str = "No response from server";

/// Unified error type for the entire wallet-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport / API ─────────────────────────────────────────────
    /// No response was received (DNS, refused connection, timeout, ...).
    #[error("No response from server: {0}")]
    Connectivity(String),

    /// The server answered 401. The session must be considered expired.
    /// `message` is whatever the server said, if anything; `epoch` identifies
    /// the session the rejected request was sent under.
    #[error("{}", .message.as_deref().unwrap_or(DEFAULT_UNAUTHORIZED_MESSAGE))]
    Unauthorized {
        message: Option<String>,
        epoch: Option<u64>,
    },

    /// The server answered with a non-2xx status and a readable message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The server answered with a non-2xx status and nothing readable.
    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // ── Local ───────────────────────────────────────────────────────
    /// The request could not be built (bad header value, bad URL); nothing was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid storage file: {0}")]
    InvalidStorage(String),

    #[error("Unsupported storage version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Request was cancelled")]
    Cancelled,
}

/// Coarse failure category, used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reached the client.
    Connectivity,
    /// 401: forced logout + login redirect.
    Authentication,
    /// Other 4xx/5xx carrying a server message.
    Rejected,
    /// Server failure without a readable message, or an unparseable body.
    Unknown,
    /// Failed before anything was sent, or while touching local state.
    Local,
}

impl CoreError {
    /// A 401 not yet tied to a session epoch.
    #[must_use]
    pub fn unauthorized(message: Option<String>) -> Self {
        CoreError::Unauthorized {
            message,
            epoch: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Connectivity(_) => ErrorKind::Connectivity,
            CoreError::Unauthorized { .. } => ErrorKind::Authentication,
            CoreError::Api { .. } => ErrorKind::Rejected,
            CoreError::Http { .. } | CoreError::UnexpectedResponse(_) => ErrorKind::Unknown,
            CoreError::InvalidRequest(_)
            | CoreError::Validation(_)
            | CoreError::InvalidConfig(_)
            | CoreError::InvalidStorage(_)
            | CoreError::UnsupportedVersion(_)
            | CoreError::Serialization(_)
            | CoreError::Deserialization(_)
            | CoreError::FileIO(_)
            | CoreError::Cancelled => ErrorKind::Local,
        }
    }

    /// The human-readable message a UI should surface.
    ///
    /// Connectivity failures collapse to [`CONNECTIVITY_MESSAGE`] so the user
    /// never sees socket-level detail; that detail is still in `Display`.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            CoreError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// HTTP status of a server-reported failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Unauthorized { .. } => Some(401),
            CoreError::Api { status, .. } | CoreError::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Session epoch a rejected request was dispatched under, if known.
    #[must_use]
    pub fn session_epoch(&self) -> Option<u64> {
        match self {
            CoreError::Unauthorized { epoch, .. } => *epoch,
            _ => None,
        }
    }

    /// Tag a 401 with the epoch it was dispatched under; other errors pass through.
    #[must_use]
    pub fn with_session_epoch(self, session_epoch: u64) -> Self {
        match self {
            CoreError::Unauthorized { message, .. } => CoreError::Unauthorized {
                message,
                epoch: Some(session_epoch),
            },
            other => other,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Builder errors never left the process. Anything else means no
        // response was read. The URL is dropped from the message.
        if e.is_builder() {
            return CoreError::InvalidRequest(e.without_url().to_string());
        }
        CoreError::Connectivity(e.without_url().to_string())
    }
}
