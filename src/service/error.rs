//! Error types for the query endpoint.

use std::error::Error;
use std::fmt;

use crate::query::QueryError;
use crate::store::StoreError;

/// Why a request could not be answered.
#[derive(Debug)]
pub enum ServiceError {
    /// The request payload is not base64-encoded UTF-8 text.
    DecodeFailed(String),
    /// Malformed query text.
    Syntax(QueryError),
    /// The requested version has not been committed.
    VersionNotFound { requested: u64, head: u64 },
    Store(StoreError),
    /// Results could not be serialized.
    Encode(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
            ServiceError::Syntax(e) => write!(f, "{}", e),
            ServiceError::VersionNotFound { requested, head } => {
                write!(f, "version {} not found (head is {})", requested, head)
            }
            ServiceError::Store(e) => write!(f, "store error: {}", e),
            ServiceError::Encode(msg) => write!(f, "encode failed: {}", msg),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServiceError::Syntax(e) => Some(e),
            ServiceError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidVersion { requested, head } => {
                ServiceError::VersionNotFound { requested, head }
            }
            other => ServiceError::Store(other),
        }
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Store(e) => e.into(),
            syntax => ServiceError::Syntax(syntax),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Encode(err.to_string())
    }
}

impl ServiceError {
    /// Error condition reported to the transport.
    pub fn condition(&self) -> &'static str {
        match self {
            ServiceError::DecodeFailed(_) => "bad-request",
            ServiceError::Syntax(_) => "undefined-condition",
            ServiceError::VersionNotFound { .. } => "item-not-found",
            ServiceError::Store(_) => "internal-server-error",
            ServiceError::Encode(_) => "internal-server-error",
        }
    }
}
