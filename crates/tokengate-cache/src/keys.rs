//! Session key generation.

use uuid::Uuid;

/// Key holding the active session record for `subject_id`.
pub fn session(prefix: &str, subject_id: Uuid) -> String {
    if prefix.is_empty() {
        format!("token-{}", subject_id)
    } else {
        format!("{}:token-{}", prefix, subject_id)
    }
}
