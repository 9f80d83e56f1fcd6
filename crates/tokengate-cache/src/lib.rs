//! # Tokengate Cache
//!
//! The narrow key/value interface the token lifecycle manager needs from an
//! external session store, plus two implementations:
//!
//! - [`RedisSessionStore`]: backed by a shared redis `ConnectionManager`
//! - [`MemorySessionStore`]: in-process map honouring TTLs, for tests and single-node dev
//!
//! # Example
//!
//! ```ignore
//! use tokengate_cache::{RedisSessionStore, SessionStore, keys};
//!
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! let key = keys::session("tokengate", user_id);
//! store.set(&key, b"{}", Duration::from_secs(900)).await?;
//! ```

pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use self::memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;
pub use self::store::{SessionStore, StoreError};
