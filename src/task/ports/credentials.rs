//! Credential verification port.

/// Checks a supplied secret against a stored hash.
///
/// Implementations may be CPU-heavy; callers run them off the async
/// executor.
pub trait CredentialVerifier: Send + Sync {
    /// Returns `true` when `plain` matches `hash`.
    ///
    /// Malformed hashes verify as `false`.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}
