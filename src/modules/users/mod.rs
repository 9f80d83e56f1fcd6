pub mod controller;
pub mod directory;
pub mod model;
pub mod router;

pub use directory::{DirectoryError, DirectoryUser, InMemoryDirectory, UserDirectory};
