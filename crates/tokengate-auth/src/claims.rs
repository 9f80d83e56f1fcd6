//! Claim sets carried inside signed tokens.
//!
//! A [`ClaimSet`] is an ordered name → value mapping and round-trips through
//! the codec unchanged, including claims this crate does not interpret.
//! The claims read by the session authority are:
//!
//! - `id`: subject identifier (UUID)
//! - `username`: display identity
//! - `uid`: per-issuance nonce matched against the stored session
//! - `exp`: absolute expiry, seconds since the epoch
//! - `iat`: issued-at, seconds since the epoch

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::AuthError;

pub const CLAIM_ID: &str = "id";
pub const CLAIM_USERNAME: &str = "username";
pub const CLAIM_UID: &str = "uid";
pub const CLAIM_EXP: &str = "exp";
pub const CLAIM_IAT: &str = "iat";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn subject_id(&self) -> Option<Uuid> {
        self.get_str(CLAIM_ID).and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn username(&self) -> Option<&str> {
        self.get_str(CLAIM_USERNAME)
    }

    pub fn uid(&self) -> Option<&str> {
        self.get_str(CLAIM_UID)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.0.get(CLAIM_EXP).and_then(Value::as_i64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Typed view of the identity claims of a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub uid: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<&ClaimSet> for Identity {
    type Error = AuthError;

    /// Fails with [`AuthError::Malformed`] when `id`, `username` or `uid` is
    /// missing or `id` is not a UUID.
    fn try_from(claims: &ClaimSet) -> Result<Self, Self::Error> {
        let id = claims.subject_id().ok_or(AuthError::Malformed)?;
        let username = claims.username().ok_or(AuthError::Malformed)?;
        let uid = claims.uid().ok_or(AuthError::Malformed)?;

        Ok(Self {
            id,
            username: username.to_string(),
            uid: uid.to_string(),
            expires_at: claims
                .expires_at()
                .and_then(|exp| Utc.timestamp_opt(exp, 0).single()),
        })
    }
}
