//! Error types for microrpc.
//!
//! Protocol errors detected while routing a request are never raised past the
//! server boundary: they are folded into the response document under their
//! kind name (see [`RpcError::kind_name`]). On the client, every failure the
//! server reports comes back as [`RpcError::Remote`], matched by kind string.

use std::time::Duration;
use thiserror::Error;

/// Wire kind names transmitted in `error_type`.
pub mod kind {
    pub const NAMESPACE_NOT_FOUND: &str = "NamespaceNotFound";
    pub const ATTRIBUTE_NOT_FOUND: &str = "AttributeNotFound";
    pub const UNSUPPORTED_OPERATION: &str = "UnsupportedOperation";
    pub const MALFORMED_REQUEST: &str = "MalformedRequest";
    /// Used when a response flags an error without naming its kind.
    pub const REMOTE_ERROR: &str = "RemoteError";
    /// Argument binding and argument type failures.
    pub const TYPE_ERROR: &str = "TypeError";
    pub const VALUE_ERROR: &str = "ValueError";
    pub const ZERO_DIVISION_ERROR: &str = "ZeroDivisionError";
    /// A callable panicked while running on the server.
    pub const PANIC: &str = "Panic";
}

/// Main error type for microrpc.
#[derive(Debug, Error)]
pub enum RpcError {
    // Routing errors (transmitted to the caller)
    #[error("No module named '{namespace}'")]
    NamespaceNotFound { namespace: String },

    #[error("Module {namespace} has no attribute '{attr}'")]
    AttributeNotFound { namespace: String, attr: String },

    #[error("Undefined magic code '{code}'")]
    UnsupportedOperation { code: String },

    #[error("{message}")]
    MalformedRequest { message: String },

    /// A failure reported by the server, reconstructed on the client.
    ///
    /// `kind` is whatever name the server transmitted; no lookup into a
    /// local taxonomy happens.
    #[error("{kind}: {message}")]
    Remote { kind: String, message: String },

    // Host-side errors (never transmitted)
    #[error("Unit not found: {name}")]
    UnitNotFound { name: String },

    #[error("Invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for microrpc operations.
pub type Result<T> = std::result::Result<T, RpcError>;

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RpcError::Timeout(crate::config::ClientConfig::REQUEST_TIMEOUT)
        } else {
            RpcError::Network {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl RpcError {
    /// Create a malformed-request error.
    pub fn malformed(message: impl Into<String>) -> Self {
        RpcError::MalformedRequest {
            message: message.into(),
        }
    }

    /// The kind name used for this error on the wire.
    ///
    /// For [`RpcError::Remote`] this is the name the server sent, so callers
    /// can tell remote failure categories apart by string comparison.
    pub fn kind_name(&self) -> &str {
        match self {
            RpcError::NamespaceNotFound { .. } => kind::NAMESPACE_NOT_FOUND,
            RpcError::AttributeNotFound { .. } => kind::ATTRIBUTE_NOT_FOUND,
            RpcError::UnsupportedOperation { .. } => kind::UNSUPPORTED_OPERATION,
            RpcError::MalformedRequest { .. } => kind::MALFORMED_REQUEST,
            RpcError::Remote { kind, .. } => kind,
            RpcError::UnitNotFound { .. } => "UnitNotFound",
            RpcError::InvalidEndpoint { .. } => "InvalidEndpoint",
            RpcError::Network { .. } => "NetworkError",
            RpcError::Timeout(_) => "Timeout",
            RpcError::Json { .. } => "JsonError",
        }
    }

    /// The primary message text, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            RpcError::Remote { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Check whether this error carries the given kind name.
    pub fn is_kind(&self, name: &str) -> bool {
        self.kind_name() == name
    }

    /// Check whether the error originated on the server.
    pub fn is_remote(&self) -> bool {
        matches!(self, RpcError::Remote { .. })
    }
}
