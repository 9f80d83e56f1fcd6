//! # Tokengate Auth
//!
//! The claims codec and its supporting types:
//!
//! - [`claims`]: [`ClaimSet`], the decoded token payload, and [`Identity`], its typed view
//! - [`codec`]: [`TokenCodec`], signing and verification pinned to one algorithm
//! - [`error`]: [`AuthError`], the failure taxonomy surfaced to callers
//!
//! # Example
//!
//! ```ignore
//! use tokengate_auth::{ClaimSet, TokenCodec};
//! use jsonwebtoken::Algorithm;
//! use std::time::Duration;
//!
//! let codec = TokenCodec::hmac(Algorithm::HS256, b"secret", Duration::from_secs(30))?;
//! let token = codec.encode(&ClaimSet::new().with("username", "a@example.com"))?;
//! let claims = codec.decode(&token)?;
//! ```

pub mod claims;
pub mod codec;
pub mod error;

pub use claims::{ClaimSet, Identity};
pub use codec::{CodecKeys, TokenCodec};
pub use error::AuthError;
pub use jsonwebtoken::Algorithm;
