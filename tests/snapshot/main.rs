//! Snapshot loader integration tests.

mod support;
mod loading;
