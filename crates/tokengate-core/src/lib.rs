//! # Tokengate Core
//!
//! Foundational types shared by every Tokengate crate:
//!
//! - [`errors`]: [`AppError`], an HTTP-aware error carrying a status code
//! - [`password`]: bcrypt credential verification used by the login flow

pub mod errors;
pub mod password;

pub use errors::AppError;
pub use password::verify_password;
