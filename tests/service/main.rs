//! Query service endpoint integration tests.

mod support;
mod endpoint;
mod connection;

#[cfg(feature = "http")]
mod http;
