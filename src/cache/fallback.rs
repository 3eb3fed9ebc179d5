//! Fallback Module
//!
//! The value `get_or` returns and caches on a miss, either given up front or
//! computed on demand.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::error::{BoxError, CacheError, Result};

type Produced = std::result::Result<Value, BoxError>;
type Producer = Box<dyn FnOnce() -> BoxFuture<'static, Produced> + Send>;

// == Fallback ==
/// Value used when a key is missing.
///
/// Producers are only invoked on a miss. A fallback resolving to
/// `Value::Null` counts as absent and is never cached.
pub enum Fallback {
    /// Literal value
    Value(Value),
    /// Deferred computation, always awaited
    Producer(Producer),
}

impl Fallback {
    /// Literal fallback.
    pub fn value(value: impl Into<Value>) -> Self {
        Fallback::Value(value.into())
    }

    /// Fallback computed by a synchronous closure.
    pub fn from_fn<F, T>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
        T: Into<Value>,
    {
        Fallback::Producer(Box::new(move || {
            let value: Value = f().into();
            async move { Produced::Ok(value) }.boxed()
        }))
    }

    /// Fallback computed by an asynchronous closure.
    pub fn from_async<F, Fut, T>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Into<Value>,
    {
        Fallback::Producer(Box::new(move || {
            f().map(|value| Produced::Ok(value.into())).boxed()
        }))
    }

    /// Fallback computed by an asynchronous closure that may fail.
    ///
    /// The error is returned from `get_or` as [`CacheError::Fallback`] and
    /// nothing is cached.
    pub fn try_from_async<F, Fut, T, E>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: Into<Value>,
        E: Into<BoxError>,
    {
        Fallback::Producer(Box::new(move || {
            f().map(|result| -> Produced {
                match result {
                    Ok(value) => Ok(value.into()),
                    Err(err) => Err(err.into()),
                }
            })
            .boxed()
        }))
    }

    /// Resolves the fallback to a concrete value, running the producer if any.
    pub(crate) async fn resolve(self) -> Result<Value> {
        match self {
            Fallback::Value(value) => Ok(value),
            Fallback::Producer(produce) => produce().await.map_err(CacheError::Fallback),
        }
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Fallback::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<Value> for Fallback {
    fn from(value: Value) -> Self {
        Fallback::Value(value)
    }
}

impl From<&str> for Fallback {
    fn from(value: &str) -> Self {
        Fallback::Value(Value::from(value))
    }
}

impl From<String> for Fallback {
    fn from(value: String) -> Self {
        Fallback::Value(Value::from(value))
    }
}
