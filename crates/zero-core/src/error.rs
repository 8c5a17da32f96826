//! Error Types

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// PostgreSQL `unique_violation`, surfaced by the data store on duplicate rows
pub const DUPLICATE_KEY_CODE: &str = "23505";

/// Fallback shown when the identity provider gives no message
pub const AUTH_FALLBACK_MESSAGE: &str = "Authentication failed";

/// Errors raised by the identity, data and catalog services
#[derive(Error, Debug)]
pub enum ClientError {
    /// Identity provider rejected the request (bad credentials, weak password, ...)
    #[error("{message}")]
    Auth {
        message: String,
        code: Option<String>,
    },

    /// Data store rejected the request
    #[error("Database error ({}): {message}", .code.as_deref().unwrap_or("unknown"))]
    Database {
        code: Option<String>,
        message: String,
        details: Option<String>,
    },

    /// Operation requires a signed-in user
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Transport failure or unexpected HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Build a data store error carrying a Postgres/PostgREST code
    pub fn database(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            code: Some(code.into()),
            message: message.into(),
            details: None,
        }
    }

    /// Build an identity provider error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            code: None,
        }
    }

    /// True when the store refused a row because it already exists
    pub fn is_duplicate_key(&self) -> bool {
        matches!(
            self,
            Self::Database { code: Some(code), .. } if code == DUPLICATE_KEY_CODE
        )
    }

    /// Message shown to the user.
    ///
    /// Provider errors are passed through verbatim; everything else gets a
    /// generic notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth { message, .. } if message.trim().is_empty() => {
                AUTH_FALLBACK_MESSAGE.into()
            }
            Self::Auth { message, .. } => message.clone(),
            Self::NotAuthenticated => "Please sign in again.".into(),
            Self::Network(_) => "The service is currently unavailable. Please try again.".into(),
            Self::Config(_) => "Service configuration error.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
