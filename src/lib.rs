//! # Tokengate
//!
//! A token-based session authority built on Axum. It issues signed
//! access/refresh token pairs, verifies them on incoming requests, and ties
//! every pair to a server-side session record so that tokens can be revoked
//! before they expire.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── tokengate-core/    # AppError, password verification
//! ├── tokengate-config/  # Environment-driven configuration
//! ├── tokengate-auth/    # Claims codec, claim sets, AuthError
//! └── tokengate-cache/   # Session store trait, Redis and in-memory stores
//! src/
//! ├── middleware/        # Verification pipeline (extractor + authorizer)
//! └── modules/
//!     ├── auth/          # Token lifecycle, login/refresh/logout
//!     └── users/         # User directory, /me
//! ```
//!
//! ## Sessions
//!
//! Each subject has at most one live session. A session record stores the
//! `uid` nonce of the current access token and of the current refresh token.
//! A token is accepted on a protected route only if its signature and expiry
//! verify *and* its `uid` matches the record. The record expires after a
//! period of inactivity (default 15 minutes), which every authorized request
//! resets.
//!
//! | Token | Default lifetime |
//! |-------|------------------|
//! | Access | 30 minutes |
//! | Refresh | 2 hours |
//!
//! Logging in again, or refreshing, replaces the record and so invalidates
//! every earlier token for that subject. Logging out deletes it.
//!
//! ## Quick Start
//!
//! ```bash
//! JWT_SECRET=change-me
//! SESSION_STORE=redis
//! REDIS_URL=redis://127.0.0.1:6379
//! USER_DIRECTORY_PATH=./users.json
//! ```
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`.

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

pub use tokengate_auth;
pub use tokengate_cache;
pub use tokengate_config;
pub use tokengate_core;
