//! In-memory cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Cache, CacheBucket};

type Buckets = HashMap<String, HashMap<String, Vec<u8>>>;

/// Process-wide in-memory [`Cache`].
///
/// Clones share storage, so one `MemoryCache` can back every conversion
/// run in a process.
#[derive(Clone, Default)]
pub struct MemoryCache {
    buckets: Arc<Mutex<Buckets>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries stored in the named bucket.
    #[must_use]
    pub fn len(&self, bucket: &str) -> usize {
        let buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets.get(bucket).map_or(0, HashMap::len)
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            buckets: Arc::clone(&self.buckets),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    buckets: Arc<Mutex<Buckets>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets.get(&self.name)?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets
            .entry(self.name.clone())
            .or_default()
            .insert(key.to_owned(), value.to_vec());
    }
}
