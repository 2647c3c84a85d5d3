//! Per-id write claims.
//!
//! The content store never queues writers on the same id: a writer claims the
//! id's lock without blocking and the store turns a failed claim into a
//! conflict. `LockManager` hands out one lock per id.

mod error;
mod in_memory;
mod lock;
mod lock_manager;

pub use error::LockError;
pub use in_memory::{InMemoryLock, InMemoryLockManager};
pub use lock::Lock;
pub use lock_manager::LockManager;
