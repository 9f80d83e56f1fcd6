//! Lookup of login identities.
//!
//! The session authority never stores users itself; login resolves the
//! submitted identity through a [`UserDirectory`].

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read user directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse user directory: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate directory entry for {0}")]
    Duplicate(String),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError>;
}

/// Directory held in memory, keyed by lowercased email.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, DirectoryUser>,
}

impl InMemoryDirectory {
    pub fn new(users: impl IntoIterator<Item = DirectoryUser>) -> Result<Self, DirectoryError> {
        let mut map = HashMap::new();
        for user in users {
            let key = user.email.to_lowercase();
            if map.contains_key(&key) {
                return Err(DirectoryError::Duplicate(key));
            }
            map.insert(key, user);
        }
        Ok(Self { users: map })
    }

    /// Loads a JSON array of `{id, email, name, password_hash}` entries.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let raw = std::fs::read(path.as_ref())?;
        let users: Vec<DirectoryUser> = serde_json::from_slice(&raw)?;
        Self::new(users)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        Ok(self.users.get(&identity.trim().to_lowercase()).cloned())
    }
}
