//! Credential verification for directory collaborators.

use bcrypt::verify;

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed stored hash is reported as a mismatch rather than an error so
/// that a corrupt directory entry cannot be distinguished from a bad password.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored credential hash could not be parsed");
            false
        }
    }
}
