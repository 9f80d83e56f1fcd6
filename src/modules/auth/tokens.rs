//! Token lifecycle: issuance, liveness, prolongation and revocation.
//!
//! Each subject has at most one session record in the store, keyed by its id
//! and holding the `uid` nonces of the current access/refresh pair. Issuing a
//! new pair overwrites the record, so every token minted earlier for that
//! subject stops passing [`TokenService::validate_liveness`] even while its
//! signature and `exp` are still valid. Concurrent logins for one subject race
//! and the last store write wins.
//!
//! The record's TTL is the inactivity window. It is reset on every authorized
//! request via [`TokenService::spawn_prolong`]; once it lapses the subject is
//! logged out regardless of token expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, instrument, warn};
use uuid::Uuid;

use tokengate_auth::claims::{CLAIM_EXP, CLAIM_IAT, CLAIM_ID, CLAIM_UID, CLAIM_USERNAME};
use tokengate_auth::{AuthError, ClaimSet, Identity, TokenCodec};
use tokengate_cache::{SessionStore, StoreError, keys};
use tokengate_config::{JwtConfig, SessionConfig};

use crate::metrics;

/// Which slot of the session record a token is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// The stored liveness record for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "access_token")]
    pub access_uid: String,
    #[serde(rename = "refresh_token")]
    pub refresh_uid: String,
}

impl SessionRecord {
    fn uid_for(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_uid,
            TokenKind::Refresh => &self.refresh_uid,
        }
    }
}

/// The subject a token pair is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: Uuid,
    pub username: String,
}

impl From<&Identity> for Subject {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub inactivity: Duration,
}

impl TokenLifetimes {
    pub fn from_config(jwt: &JwtConfig, session: &SessionConfig) -> Self {
        Self {
            access: jwt.access_lifetime(),
            refresh: jwt.refresh_lifetime(),
            inactivity: session.inactivity_window(),
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self::from_config(&JwtConfig::default(), &SessionConfig::default())
    }
}

/// Issues and tracks token pairs. Cheap to clone; all clones share the codec
/// and the store handle.
#[derive(Clone)]
pub struct TokenService {
    codec: Arc<TokenCodec>,
    store: Arc<dyn SessionStore>,
    key_prefix: Arc<str>,
    lifetimes: TokenLifetimes,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("codec", &self.codec)
            .field("key_prefix", &self.key_prefix)
            .field("lifetimes", &self.lifetimes)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn SessionStore>,
        key_prefix: impl Into<Arc<str>>,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            codec,
            store,
            key_prefix: key_prefix.into(),
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    fn session_key(&self, subject_id: Uuid) -> String {
        keys::session(&self.key_prefix, subject_id)
    }

    /// Mints an access/refresh pair with fresh, independent nonces and
    /// overwrites the subject's session record with them.
    #[instrument(skip(self, subject), fields(subject.id = %subject.id))]
    pub async fn issue_pair(&self, subject: &Subject) -> Result<TokenPair, AuthError> {
        let (access_token, access_uid, access_expiry) =
            self.mint(subject, self.lifetimes.access)?;
        let (refresh_token, refresh_uid, _) = self.mint(subject, self.lifetimes.refresh)?;

        let record = SessionRecord {
            access_uid,
            refresh_uid,
        };
        let payload = serde_json::to_vec(&record)
            .map_err(|e| AuthError::Internal(format!("failed to encode session record: {e}")))?;

        self.store
            .set(
                &self.session_key(subject.id),
                &payload,
                self.lifetimes.inactivity,
            )
            .await
            .map_err(store_failure)?;

        metrics::track_tokens_issued();
        info!("Token pair issued");

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expiry,
        })
    }

    fn mint(
        &self,
        subject: &Subject,
        lifetime: Duration,
    ) -> Result<(String, String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|e| AuthError::Internal(format!("token lifetime out of range: {e}")))?;
        let exp = now + lifetime;
        let uid = Uuid::new_v4().to_string();

        let claims = ClaimSet::new()
            .with(CLAIM_ID, subject.id.to_string())
            .with(CLAIM_USERNAME, subject.username.as_str())
            .with(CLAIM_UID, uid.as_str())
            .with(CLAIM_EXP, exp.timestamp())
            .with(CLAIM_IAT, now.timestamp());

        let token = self.codec.encode(&claims).map_err(|e| match e {
            AuthError::Internal(_) => e,
            other => AuthError::Internal(format!("failed to sign token: {other}")),
        })?;

        Ok((token, uid, exp))
    }

    /// Verifies a token with the codec, returning its claims.
    pub fn parse(&self, token: &str) -> Result<ClaimSet, AuthError> {
        self.codec.decode(token)
    }

    /// Verifies a token and maps its claims to a typed [`Identity`].
    pub fn parse_and_identify(&self, token: &str) -> Result<(ClaimSet, Identity), AuthError> {
        let claims = self.parse(token)?;
        let identity = Identity::try_from(&claims)?;
        Ok((claims, identity))
    }

    /// Checks that `claims.uid` is the nonce currently recorded for the
    /// subject in the slot selected by `kind`.
    ///
    /// Returns [`AuthError::NoActiveSession`] when the record is missing,
    /// cannot be decoded, or holds a different nonce.
    #[instrument(skip(self, claims), fields(subject.id))]
    pub async fn validate_liveness(
        &self,
        claims: &ClaimSet,
        kind: TokenKind,
    ) -> Result<(), AuthError> {
        let (Some(subject_id), Some(uid)) = (claims.subject_id(), claims.uid()) else {
            return Err(AuthError::NoActiveSession);
        };
        tracing::Span::current().record("subject.id", tracing::field::display(subject_id));

        let raw = self
            .store
            .get(&self.session_key(subject_id))
            .await
            .map_err(store_failure)?
            .ok_or(AuthError::NoActiveSession)?;

        let record: SessionRecord = serde_json::from_slice(&raw).map_err(|e| {
            warn!(error = %e, "Unreadable session record");
            AuthError::NoActiveSession
        })?;

        if record.uid_for(kind) != uid {
            debug!(?kind, "Token nonce does not match active session");
            return Err(AuthError::NoActiveSession);
        }

        Ok(())
    }

    /// Resets the session TTL to the inactivity window. Failures are logged
    /// and otherwise ignored.
    #[instrument(skip(self))]
    pub async fn prolong(&self, subject_id: Uuid) {
        match self
            .store
            .expire(&self.session_key(subject_id), self.lifetimes.inactivity)
            .await
        {
            Ok(true) => debug!("Session prolonged"),
            Ok(false) => debug!("No session to prolong"),
            Err(e) => {
                metrics::track_prolong_failure();
                warn!(error = %e, "Failed to prolong session");
            }
        }
    }

    /// Runs [`TokenService::prolong`] on a detached task. The task is not tied
    /// to the calling request and outlives its cancellation.
    pub fn spawn_prolong(&self, subject_id: Uuid) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(
            async move { service.prolong(subject_id).await }
                .instrument(info_span!("prolong_session", subject.id = %subject_id)),
        )
    }

    /// Deletes the subject's session record. Deleting an absent record succeeds.
    #[instrument(skip(self))]
    pub async fn revoke(&self, subject_id: Uuid) -> Result<(), AuthError> {
        self.store
            .delete(&self.session_key(subject_id))
            .await
            .map_err(store_failure)?;

        metrics::track_session_revoked();
        info!("Session revoked");
        Ok(())
    }
}

fn store_failure(err: StoreError) -> AuthError {
    AuthError::Internal(format!("session store: {err}"))
}
