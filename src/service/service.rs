use log::debug;
use serde::{Deserialize, Serialize};

use crate::query::Query;
use crate::store::Store;

use super::encode::{decode_query, encode_nodes};
use super::error::ServiceError;

/// What the transport sends back for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// base64-encoded JSON array of matched items.
    Result(String),
    Error { condition: String, message: String },
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }

    /// HTTP-style status code for this reply.
    pub fn status_code(&self) -> u16 {
        match self {
            Reply::Result(_) => 200,
            Reply::Error { condition, .. } if condition == "internal-server-error" => 500,
            Reply::Error { .. } => 400,
        }
    }
}

impl From<ServiceError> for Reply {
    fn from(err: ServiceError) -> Self {
        Reply::Error {
            condition: err.condition().to_string(),
            message: err.to_string(),
        }
    }
}

/// Read-only query endpoint over a shared store.
///
/// Every request pins its own view, so a write committed while a request is
/// running is not visible to it.
///
/// ## Example
///
/// ```
/// use mdb::service::{encode_query, QueryService, Reply};
/// use mdb::Store;
///
/// let service = QueryService::new(Store::new());
/// let reply = service.handle(&encode_query("*"), None);
/// assert!(matches!(reply, Reply::Result(_)));
/// ```
#[derive(Clone)]
pub struct QueryService {
    store: Store,
}

impl QueryService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Answer a base64-encoded query at `version` (head when `None`).
    /// Failures are reported in the reply, never raised.
    pub fn handle(&self, encoded_query: &str, version: Option<u64>) -> Reply {
        let outcome = decode_query(encoded_query).and_then(|text| self.query(&text, version));
        match outcome {
            Ok(encoded) => Reply::Result(encoded),
            Err(err) => {
                debug!(
                    "event=query module=service status=error condition={} error={}",
                    err.condition(),
                    err
                );
                err.into()
            }
        }
    }

    /// Evaluate decoded query text and return the base64 result payload.
    pub fn query(&self, text: &str, version: Option<u64>) -> Result<String, ServiceError> {
        let query = Query::parse(text)?;
        let view = self.store.view(version)?;
        let nodes = query.evaluate(&view)?;
        debug!(
            "event=query module=service status=ok query={:?} version={} matches={}",
            text,
            view.version(),
            nodes.len()
        );
        encode_nodes(&view, &nodes)
    }
}
