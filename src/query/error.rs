use std::fmt;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Malformed query text. `position` is a byte offset into the query and
    /// `fragment` the offending text starting there.
    Syntax {
        message: String,
        fragment: String,
        position: usize,
    },
    /// The store could not answer (bad version, poisoned lock).
    Store(StoreError),
}

impl QueryError {
    pub(crate) fn syntax(message: impl Into<String>, source: &str, position: usize) -> Self {
        let fragment: String = source
            .get(position..)
            .unwrap_or("")
            .chars()
            .take(16)
            .collect();
        QueryError::Syntax {
            message: message.into(),
            fragment,
            position,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, QueryError::Syntax { .. })
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Syntax {
                message,
                fragment,
                position,
            } if fragment.is_empty() => {
                write!(f, "syntax error at position {}: {} (at end of query)", position, message)
            }
            QueryError::Syntax {
                message,
                fragment,
                position,
            } => write!(
                f,
                "syntax error at position {}: {} (near {:?})",
                position, message, fragment
            ),
            QueryError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Store(e) => Some(e),
            QueryError::Syntax { .. } => None,
        }
    }
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::Store(err)
    }
}
