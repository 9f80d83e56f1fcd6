//! Authentication failure taxonomy.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokengate_core::AppError;

/// Message returned when no credential accompanied the request.
pub const MSG_NO_TOKEN: &str = "no token found";
/// Message returned for malformed, wrongly signed or superseded tokens.
pub const MSG_UNAUTHORIZED: &str = "token is unauthorized";
/// Message returned for tokens past their expiry (skew included).
pub const MSG_EXPIRED: &str = "token is expired";

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("no credential supplied")]
    NoCredential,

    #[error("token is not a well-formed signed token")]
    Malformed,

    #[error("token signature or algorithm did not verify")]
    SignatureInvalid,

    #[error("token expired beyond the accepted clock skew")]
    Expired,

    #[error("token does not match an active session")]
    NoActiveSession,

    #[error("codec has no signing key configured")]
    SigningKeyMissing,

    #[error("codec has no verification key configured")]
    VerificationKeyMissing,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for failures caused by the presented credential itself, as opposed
    /// to server-side faults.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Self::NoCredential
                | Self::Malformed
                | Self::SignatureInvalid
                | Self::Expired
                | Self::NoActiveSession
        )
    }

    /// The stable client-facing message for this failure.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::NoCredential => MSG_NO_TOKEN,
            Self::Malformed | Self::SignatureInvalid | Self::NoActiveSession => MSG_UNAUTHORIZED,
            Self::Expired => MSG_EXPIRED,
            _ => "internal error",
        }
    }

    pub fn status(&self) -> StatusCode {
        if self.is_credential_failure() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoCredential => "no_credential",
            Self::Malformed => "malformed",
            Self::SignatureInvalid => "signature_invalid",
            Self::Expired => "expired",
            Self::NoActiveSession => "no_active_session",
            Self::SigningKeyMissing => "signing_key_missing",
            Self::VerificationKeyMissing => "verification_key_missing",
            Self::InvalidKey(_) => "invalid_key",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        if err.is_credential_failure() {
            AppError::unauthorized(err.public_message())
        } else {
            AppError::internal(err)
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_public_messages() {
        assert_eq!(AuthError::NoCredential.public_message(), "no token found");
        assert_eq!(AuthError::Malformed.public_message(), "token is unauthorized");
        assert_eq!(
            AuthError::SignatureInvalid.public_message(),
            "token is unauthorized"
        );
        assert_eq!(AuthError::Expired.public_message(), "token is expired");
        assert_eq!(
            AuthError::NoActiveSession.public_message(),
            "token is unauthorized"
        );
        assert_ne!(
            AuthError::NoActiveSession.kind(),
            AuthError::SignatureInvalid.kind()
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::Expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::NoActiveSession.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::SigningKeyMissing.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::Internal("store down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_detail_not_leaked() {
        let response = AuthError::Internal("redis://secret-host refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("secret-host"));
        assert!(body.contains("internal error"));
    }

    #[tokio::test]
    async fn test_expired_response_body() {
        let response = AuthError::Expired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "token is expired");
    }
}
