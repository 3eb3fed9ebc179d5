//! Cache Module
//!
//! Cache facade with human-friendly TTLs and transparent JSON values.

pub mod codec;
mod facade;
mod fallback;
mod ttl;


// Re-export public types
pub use facade::Cache;
pub use fallback::Fallback;
pub use ttl::{Ttl, TtlUnit};
