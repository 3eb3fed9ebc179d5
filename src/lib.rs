//! Redache - A thin cache facade over Redis and other key-value stores
//!
//! Stores values with human-friendly TTLs (`"6 hours"`, a date, or seconds),
//! encodes objects and arrays as JSON, and can compute and cache a fallback
//! on a miss.

pub mod cache;
pub mod config;
pub mod error;
pub mod store;

pub use cache::{Cache, Fallback, Ttl};
pub use config::Config;
pub use error::{CacheError, Result, StoreError};
pub use store::{MemoryStore, RedisStore, Store};
