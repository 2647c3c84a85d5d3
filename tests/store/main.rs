//! Content store integration tests.

mod concurrency;
mod versions;
