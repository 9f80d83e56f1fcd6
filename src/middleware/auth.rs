//! The two-stage verification pipeline.
//!
//! [`verify_token`] runs on every API request. It locates a token, checks its
//! signature and expiry, and records a [`TokenOutcome`] in the request
//! extensions without ever rejecting. [`require_session`] is layered onto
//! protected routes only: it turns a non-verified outcome into a 401, checks
//! the token against the subject's active session and attaches an
//! [`AuthUser`] for handlers.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tokengate_auth::{AuthError, ClaimSet, Identity};
use tracing::debug;

use crate::metrics;
use crate::modules::auth::TokenKind;
use crate::state::AppState;

/// Cookie consulted when no `Authorization` header is present.
pub const TOKEN_COOKIE: &str = "jwt";

/// Result of the extraction stage for one request.
#[derive(Debug, Clone, Default)]
pub enum TokenOutcome {
    Verified {
        token: String,
        claims: ClaimSet,
    },
    Rejected {
        token: String,
        error: AuthError,
    },
    #[default]
    Missing,
}

impl TokenOutcome {
    /// Hands the verified claims to the authorization stage, or the reason
    /// there are none.
    pub fn into_claims(self) -> Result<ClaimSet, AuthError> {
        match self {
            Self::Verified { claims, .. } => Ok(claims),
            Self::Rejected { error, .. } => Err(error),
            Self::Missing => Err(AuthError::NoCredential),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for TokenOutcome {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<TokenOutcome>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Finds the raw token: `Authorization: Bearer <t>` first, with the scheme
/// matched case-insensitively, then the [`TOKEN_COOKIE`] cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        CookieJar::from_headers(headers)
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Extraction stage. Never rejects; downstream decides what a missing or
/// failed token means.
pub async fn verify_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = match token_from_headers(req.headers()) {
        None => TokenOutcome::Missing,
        Some(token) => match state.tokens.parse(&token) {
            Ok(claims) => TokenOutcome::Verified { token, claims },
            Err(error) => {
                debug!(kind = error.kind(), "Token failed verification");
                TokenOutcome::Rejected { token, error }
            }
        },
    };

    req.extensions_mut().insert(outcome);
    next.run(req).await
}

/// Authorization stage for protected routes.
///
/// Rejects with the recorded failure, or [`AuthError::NoCredential`] when no
/// token was found. On success the session's inactivity timer is reset on a
/// detached task and the identity is attached as [`AuthUser`].
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let outcome = req
        .extensions()
        .get::<TokenOutcome>()
        .cloned()
        .unwrap_or_default();

    let identity = authorize(&state, outcome)
        .await
        .inspect_err(|e| metrics::track_rejection(e.kind()))?;

    state.tokens.spawn_prolong(identity.id);
    req.extensions_mut().insert(AuthUser(identity));

    Ok(next.run(req).await)
}

async fn authorize(state: &AppState, outcome: TokenOutcome) -> Result<Identity, AuthError> {
    let claims = outcome.into_claims()?;
    let identity = Identity::try_from(&claims)?;
    state
        .tokens
        .validate_liveness(&claims, TokenKind::Access)
        .await?;
    Ok(identity)
}

/// Identity of a request that passed [`require_session`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::NoCredential)
    }
}
