//! Cache abstraction layer for mdinline.
//!
//! Rendered diagrams are expensive to produce, so they are stored in a
//! content-addressed key-value store: the key is derived from the diagram
//! source, so an entry never goes stale and is never evicted explicitly.
//!
//! Two traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: Process-wide in-memory storage shared by all buckets of one cache
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use mdinline_cache::{Cache, CacheBucketExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("diagrams");
//! bucket.set_string("png-SyfFKj2rKt3CoKnELR1Io4ZDoSa70000", "iVBORw0KGgo=");
//! assert_eq!(
//!     bucket.get_string("png-SyfFKj2rKt3CoKnELR1Io4ZDoSa70000").as_deref(),
//!     Some("iVBORw0KGgo=")
//! );
//! ```

mod ext;
mod file;
mod memory;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Keys are opaque strings chosen by the caller. Because callers derive keys
/// from content, a hit is always valid and overwriting an entry with the same
/// key is idempotent.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `None` on cache miss. Storage errors and corrupt entries are
    /// reported as misses as well.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache, overwriting any existing entry.
    ///
    /// Failures are logged and otherwise ignored: the cache is optional.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// A `Cache` produces buckets that are logically isolated from each other.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name returns handles
    /// that share the same underlying storage.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
