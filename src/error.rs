//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Boxed error used to carry failures from third-party code (store clients,
/// fallback producers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for the cache facade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The amount of a TTL phrase is not numeric
    #[error("TTL unit amount {0} must be numeric.")]
    InvalidTtlAmount(String),

    /// The unit of a TTL phrase is not a known time unit
    #[error("TTL unit symbol {0} is not valid.")]
    InvalidTtlUnit(String),

    /// The TTL matches none of the accepted forms
    #[error("Cannot parse TTL.")]
    UnparseableTtl,

    /// Failure reported by the backing store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Value could not be converted to JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Fallback producer returned an error
    #[error("Fallback producer failed: {0}")]
    Fallback(BoxError),
}

// == Store Error Enum ==
/// Errors raised by [`Store`](crate::store::Store) implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Expiry must be a positive number of seconds
    #[error("Invalid expire time: {0}")]
    InvalidExpiry(i64),

    /// Error from an external store client
    #[error("Store backend error: {0}")]
    Backend(BoxError),
}

impl StoreError {
    /// Wraps any client error as a backend failure.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        StoreError::Backend(err.into())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;
