//! Request middleware and extractors.
//!
//! - [`auth`]: the token verification pipeline and the `AuthUser` extractors
//!
//! # Flow
//!
//! 1. `verify_token` reads `Authorization: Bearer <token>` (or the `jwt`
//!    cookie), verifies it and stores a `TokenOutcome` on the request
//! 2. `require_session`, on protected routes, rejects anything but a verified
//!    token whose `uid` matches the subject's active session
//! 3. Handlers take `AuthUser` for the attached identity
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn whoami(AuthUser(identity): AuthUser) -> String {
//!     identity.username
//! }
//! ```

pub mod auth;
