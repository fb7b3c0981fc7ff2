//! Caching infrastructure
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TtlCache`] | Concurrent TTL map driven by an injectable clock |

pub mod ttl;

pub use ttl::TtlCache;
