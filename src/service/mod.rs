//! Query service endpoint - decodes a base64 query, evaluates it against a
//! pinned store view and encodes the matches as base64 JSON.
//!
//! The HTTP transport lives behind the `http` feature.

mod encode;
mod error;
#[cfg(feature = "http")]
mod http;
mod service;

pub use encode::{decode_query, decode_result, encode_query, node_json};
pub use error::ServiceError;
#[cfg(feature = "http")]
pub use http::{router, serve};
pub use service::{QueryService, Reply};
