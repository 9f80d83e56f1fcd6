//! Signed token encoding and verification.
//!
//! A [`TokenCodec`] is bound to exactly one [`Algorithm`] at construction.
//! Tokens whose header names any other algorithm are rejected with
//! [`AuthError::SignatureInvalid`], even when the key bytes would verify them
//! under that other algorithm. Supported families:
//!
//! - HMAC (`HS256`, `HS384`, `HS512`): a shared secret; the signing secret
//!   doubles as the verification secret when none is given
//! - RSA (`RS*`, `PS*`): PEM private key to sign, PEM public key to verify
//! - ECDSA (`ES256`, `ES384`): PKCS#8 PEM private key, PEM public key
//!
//! Either key may be absent. A codec without a signing key is verify-only and
//! fails [`TokenCodec::encode`] with [`AuthError::SigningKeyMissing`].

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use tokengate_config::JwtConfig;
use tracing::debug;

use crate::claims::CLAIM_EXP;
use crate::{AuthError, ClaimSet};

/// Raw key material handed to [`TokenCodec::new`].
///
/// For HMAC both fields are secrets; for RSA and ECDSA they are PEM documents.
#[derive(Default, Clone, Copy)]
pub struct CodecKeys<'a> {
    pub signing: Option<&'a [u8]>,
    pub verifying: Option<&'a [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
}

impl KeyFamily {
    fn of(algorithm: Algorithm) -> Result<Self, AuthError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(Self::Hmac),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Ok(Self::Rsa),
            Algorithm::ES256 | Algorithm::ES384 => Ok(Self::Ec),
            other => Err(AuthError::UnsupportedAlgorithm(format!("{other:?}"))),
        }
    }

    fn encoding_key(self, material: &[u8]) -> Result<EncodingKey, AuthError> {
        match self {
            Self::Hmac => Ok(EncodingKey::from_secret(non_empty(material)?)),
            Self::Rsa => EncodingKey::from_rsa_pem(material).map_err(invalid_key),
            Self::Ec => EncodingKey::from_ec_pem(material).map_err(invalid_key),
        }
    }

    fn decoding_key(self, material: &[u8]) -> Result<DecodingKey, AuthError> {
        match self {
            Self::Hmac => Ok(DecodingKey::from_secret(non_empty(material)?)),
            Self::Rsa => DecodingKey::from_rsa_pem(material).map_err(invalid_key),
            Self::Ec => DecodingKey::from_ec_pem(material).map_err(invalid_key),
        }
    }
}

fn non_empty(secret: &[u8]) -> Result<&[u8], AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidKey("empty HMAC secret".into()));
    }
    Ok(secret)
}

fn invalid_key(err: jsonwebtoken::errors::Error) -> AuthError {
    AuthError::InvalidKey(err.to_string())
}

/// Encodes and verifies signed tokens for a single algorithm.
///
/// Immutable after construction and safe to share across tasks behind an `Arc`.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("can_sign", &self.encoding_key.is_some())
            .field("can_verify", &self.decoding_key.is_some())
            .field("skew_secs", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Builds a codec pinned to `algorithm`.
    ///
    /// `skew` is the grace period applied to `exp`: a token is still accepted
    /// while `exp >= now - skew`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UnsupportedAlgorithm`] for algorithms outside the HMAC, RSA and ECDSA families
    /// - [`AuthError::InvalidKey`] when key material does not parse for the family
    pub fn new(algorithm: Algorithm, keys: CodecKeys<'_>, skew: Duration) -> Result<Self, AuthError> {
        let family = KeyFamily::of(algorithm)?;

        let verifying = match (family, keys.verifying) {
            (_, Some(material)) => Some(material),
            (KeyFamily::Hmac, None) => keys.signing,
            (_, None) => None,
        };

        let encoding_key = keys.signing.map(|m| family.encoding_key(m)).transpose()?;
        let decoding_key = verifying.map(|m| family.decoding_key(m)).transpose()?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = skew.as_secs();
        validation.validate_aud = false;
        // Any claim set is accepted; `exp` is enforced only when present.
        validation.required_spec_claims.clear();

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Shorthand for an HMAC codec that signs and verifies with `secret`.
    pub fn hmac(algorithm: Algorithm, secret: &[u8], skew: Duration) -> Result<Self, AuthError> {
        Self::new(
            algorithm,
            CodecKeys {
                signing: Some(secret),
                verifying: None,
            },
            skew,
        )
    }

    /// Builds a codec from [`JwtConfig`], reading PEM files for asymmetric families.
    pub fn from_config(config: &JwtConfig) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(config.algorithm.trim())
            .map_err(|_| AuthError::UnsupportedAlgorithm(config.algorithm.clone()))?;

        let (signing, verifying) = match KeyFamily::of(algorithm)? {
            KeyFamily::Hmac => (config.secret.clone().map(String::into_bytes), None),
            KeyFamily::Rsa | KeyFamily::Ec => (
                config.private_key_path.as_deref().map(read_key).transpose()?,
                config.public_key_path.as_deref().map(read_key).transpose()?,
            ),
        };

        if signing.is_none() && verifying.is_none() {
            return Err(AuthError::InvalidKey(format!(
                "no key material configured for {algorithm:?}"
            )));
        }

        Self::new(
            algorithm,
            CodecKeys {
                signing: signing.as_deref(),
                verifying: verifying.as_deref(),
            },
            config.skew(),
        )
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn skew(&self) -> Duration {
        Duration::from_secs(self.validation.leeway)
    }

    pub fn can_sign(&self) -> bool {
        self.encoding_key.is_some()
    }

    /// Signs `claims` into a compact `header.payload.signature` token.
    pub fn encode(&self, claims: &ClaimSet) -> Result<String, AuthError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or(AuthError::SigningKeyMissing)?;

        encode(&Header::new(self.algorithm), claims, key)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))
    }

    /// Parses and verifies `token`, returning its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Malformed`]: not a structurally valid signed token, or
    ///   an `exp` claim that is not a JSON number
    /// - [`AuthError::SignatureInvalid`]: wrong key or an algorithm other than the pinned one
    /// - [`AuthError::Expired`]: `exp` is further in the past than the skew allows
    pub fn decode(&self, token: &str) -> Result<ClaimSet, AuthError> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or(AuthError::VerificationKeyMissing)?;

        let claims = decode::<ClaimSet>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let mapped = classify(&e);
                debug!(error = %e, kind = mapped.kind(), "Token rejected");
                mapped
            })?;

        // jsonwebtoken skips an unparseable optional `exp` instead of failing.
        if claims.get(CLAIM_EXP).is_some_and(|exp| !exp.is_number()) {
            debug!(kind = AuthError::Malformed.kind(), "Token rejected: non-numeric exp");
            return Err(AuthError::Malformed);
        }

        Ok(claims)
    }
}

fn read_key(path: &std::path::Path) -> Result<Vec<u8>, AuthError> {
    std::fs::read(path).map_err(|e| AuthError::InvalidKey(format!("{}: {e}", path.display())))
}

fn classify(err: &jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::ImmatureSignature => AuthError::SignatureInvalid,
        _ => AuthError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    const SECRET: &[u8] = b"secretpass";
    const RSA_PRIVATE: &str = include_str!("../tests/fixtures/rsa_private.pem");
    const RSA_PUBLIC: &str = include_str!("../tests/fixtures/rsa_public.pem");
    const RSA_OTHER_PRIVATE: &str = include_str!("../tests/fixtures/rsa_other_private.pem");
    const EC_PRIVATE: &str = include_str!("../tests/fixtures/ec_private.pem");
    const EC_PUBLIC: &str = include_str!("../tests/fixtures/ec_public.pem");

    fn hs256() -> TokenCodec {
        TokenCodec::hmac(Algorithm::HS256, SECRET, Duration::from_secs(30)).unwrap()
    }

    fn rsa(algorithm: Algorithm, private: Option<&str>, public: Option<&str>) -> TokenCodec {
        TokenCodec::new(
            algorithm,
            CodecKeys {
                signing: private.map(str::as_bytes),
                verifying: public.map(str::as_bytes),
            },
            Duration::from_secs(30),
        )
        .unwrap()
    }

    fn foreign_token(algorithm: Algorithm, secret: &[u8], claims: &ClaimSet) -> String {
        jsonwebtoken::encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn sample_claims() -> ClaimSet {
        ClaimSet::new()
            .with("key", "val")
            .with("key2", "val2")
            .with("count", 7)
            .with("nested", json!({"inner": ["a", "b"]}))
    }

    #[test]
    fn test_hmac_roundtrip() {
        let codec = hs256();
        let claims = sample_claims().with("exp", Utc::now().timestamp() + 600);
        let token = codec.encode(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_rsa_roundtrip_without_exp() {
        let codec = rsa(Algorithm::RS256, Some(RSA_PRIVATE), Some(RSA_PUBLIC));
        let claims = sample_claims();
        let token = codec.encode(&claims).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_ec_roundtrip() {
        let codec = rsa(Algorithm::ES256, Some(EC_PRIVATE), Some(EC_PUBLIC));
        let claims = sample_claims();
        let token = codec.encode(&claims).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_rsa_verify_only() {
        let signer = rsa(Algorithm::RS256, Some(RSA_PRIVATE), Some(RSA_PUBLIC));
        let verifier = rsa(Algorithm::RS256, None, Some(RSA_PUBLIC));
        assert!(!verifier.can_sign());

        let claims = sample_claims();
        assert!(matches!(
            verifier.encode(&claims),
            Err(AuthError::SigningKeyMissing)
        ));

        let token = signer.encode(&claims).unwrap();
        assert_eq!(verifier.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_rsa_sign_only_cannot_decode() {
        let signer = rsa(Algorithm::RS256, Some(RSA_PRIVATE), None);
        let token = signer.encode(&sample_claims()).unwrap();
        assert!(matches!(
            signer.decode(&token),
            Err(AuthError::VerificationKeyMissing)
        ));
    }

    #[test]
    fn test_rsa_wrong_key_rejected() {
        let signer = rsa(Algorithm::RS256, Some(RSA_OTHER_PRIVATE), None);
        let verifier = rsa(Algorithm::RS256, None, Some(RSA_PUBLIC));
        let token = signer.encode(&sample_claims()).unwrap();
        assert!(matches!(
            verifier.decode(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = foreign_token(Algorithm::HS256, b"wrong", &ClaimSet::new());
        assert!(matches!(
            hs256().decode(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_correct_secret_wrong_algorithm_rejected() {
        let token = foreign_token(Algorithm::HS512, SECRET, &ClaimSet::new());
        assert!(matches!(
            hs256().decode(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_secret_and_wrong_algorithm_rejected() {
        let token = foreign_token(Algorithm::HS512, b"wrong", &ClaimSet::new());
        assert!(matches!(
            hs256().decode(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_hmac_with_public_key_rejected_by_rsa_verifier() {
        // Classic confusion: HMAC-sign using the RSA public key bytes as the secret.
        let token = foreign_token(Algorithm::HS256, RSA_PUBLIC.as_bytes(), &sample_claims());
        let verifier = rsa(Algorithm::RS256, None, Some(RSA_PUBLIC));
        assert!(matches!(
            verifier.decode(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_malformed_rejected() {
        let codec = hs256();
        assert!(matches!(codec.decode("asdf"), Err(AuthError::Malformed)));
        assert!(matches!(codec.decode(""), Err(AuthError::Malformed)));
        assert!(codec.decode("invalid.token.here").is_err());
    }

    #[test]
    fn test_expiry_within_skew_accepted() {
        let codec = hs256();
        let claims = ClaimSet::new().with("exp", Utc::now().timestamp() - 29);
        let token = codec.encode(&claims).unwrap();
        assert!(codec.decode(&token).is_ok());
    }

    #[test]
    fn test_expiry_beyond_skew_rejected() {
        let codec = hs256();
        let claims = ClaimSet::new().with("exp", Utc::now().timestamp() - 31);
        let token = codec.encode(&claims).unwrap();
        assert!(matches!(codec.decode(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_long_expired_rejected() {
        let codec = hs256();
        let claims = ClaimSet::new().with("exp", Utc::now().timestamp() - 1000);
        let token = codec.encode(&claims).unwrap();
        assert!(matches!(codec.decode(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_string_exp_is_malformed() {
        let codec = hs256();
        let stale = (Utc::now().timestamp() - 1000).to_string();
        let token = codec.encode(&ClaimSet::new().with("exp", stale)).unwrap();
        assert!(matches!(codec.decode(&token), Err(AuthError::Malformed)));

        let future = (Utc::now().timestamp() + 600).to_string();
        let token = codec.encode(&ClaimSet::new().with("exp", future)).unwrap();
        assert!(matches!(codec.decode(&token), Err(AuthError::Malformed)));
    }

    #[test]
    fn test_non_numeric_exp_is_malformed() {
        let codec = hs256();
        for exp in [json!(null), json!(true), json!([1]), json!({"at": 1})] {
            let token = codec.encode(&ClaimSet::new().with("exp", exp)).unwrap();
            assert!(matches!(codec.decode(&token), Err(AuthError::Malformed)));
        }
    }

    #[test]
    fn test_expired_with_wrong_key_reports_signature() {
        let claims = ClaimSet::new().with("exp", Utc::now().timestamp() - 1000);
        let token = foreign_token(Algorithm::HS256, b"wrong", &claims);
        assert!(matches!(
            hs256().decode(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let result = TokenCodec::hmac(Algorithm::EdDSA, SECRET, Duration::ZERO);
        assert!(matches!(result, Err(AuthError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = TokenCodec::hmac(Algorithm::HS256, b"", Duration::ZERO);
        assert!(matches!(result, Err(AuthError::InvalidKey(_))));
    }

    #[test]
    fn test_garbage_pem_rejected() {
        let result = TokenCodec::new(
            Algorithm::RS256,
            CodecKeys {
                signing: None,
                verifying: Some(b"not a pem"),
            },
            Duration::ZERO,
        );
        assert!(matches!(result, Err(AuthError::InvalidKey(_))));
    }

    #[test]
    fn test_from_config_hmac() {
        let config = JwtConfig {
            algorithm: "HS384".into(),
            secret: Some("config-secret".into()),
            clock_skew: 10,
            ..JwtConfig::default()
        };
        let codec = TokenCodec::from_config(&config).unwrap();
        assert_eq!(codec.algorithm(), Algorithm::HS384);
        assert_eq!(codec.skew(), Duration::from_secs(10));
        assert!(codec.can_sign());
    }

    #[test]
    fn test_from_config_without_keys_fails() {
        let config = JwtConfig::default();
        assert!(matches!(
            TokenCodec::from_config(&config),
            Err(AuthError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_from_config_unknown_algorithm() {
        let config = JwtConfig {
            algorithm: "HS999".into(),
            secret: Some("s".into()),
            ..JwtConfig::default()
        };
        assert!(matches!(
            TokenCodec::from_config(&config),
            Err(AuthError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_from_config_reads_pem_files() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let config = JwtConfig {
            algorithm: "RS256".into(),
            private_key_path: Some(dir.join("rsa_private.pem")),
            public_key_path: Some(dir.join("rsa_public.pem")),
            ..JwtConfig::default()
        };
        let codec = TokenCodec::from_config(&config).unwrap();
        let token = codec.encode(&sample_claims()).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), sample_claims());
    }
}
