use super::LockError;

/// A single non-blocking claim.
pub trait Lock: Send + Sync {
    /// Try to take the claim. Returns `Ok(false)` when someone else holds it.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the claim.
    fn unlock(&self) -> Result<(), LockError>;

    /// Whether the claim is currently held.
    fn is_locked(&self) -> Result<bool, LockError>;
}
