pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod tokens;

pub use tokens::{Subject, TokenKind, TokenPair, TokenService};
