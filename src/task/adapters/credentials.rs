//! bcrypt-backed credential verification.

use crate::task::ports::CredentialVerifier;

/// Verifies passwords against bcrypt hashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl CredentialVerifier for BcryptVerifier {
    fn verify(&self, plain: &str, hash: &str) -> bool {
        bcrypt::verify(plain, hash).unwrap_or(false)
    }
}
