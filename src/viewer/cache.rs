//! LRU cache for rendered page bitmaps

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::types::{PageBitmap, RenderParams};

/// Number of bitmaps kept before eviction
pub const DEFAULT_CACHE_SIZE: usize = 8;

/// Cache key for rendered bitmaps
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number (1-indexed)
    pub page: usize,
    /// Zoom factor (stored as millionths for stable hashing)
    pub zoom_millionths: u32,
}

impl CacheKey {
    /// Create a cache key from render parameters
    #[must_use]
    pub fn from_params(page: usize, params: &RenderParams) -> Self {
        Self {
            page,
            zoom_millionths: (params.zoom * 1_000_000.0) as u32,
        }
    }
}

/// LRU cache for rendered bitmaps
pub struct PageCache {
    cache: LruCache<CacheKey, Arc<PageBitmap>>,
}

impl PageCache {
    /// Create a new cache with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).expect("1 is non-zero")),
            ),
        }
    }

    /// Get a cached bitmap, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<PageBitmap>> {
        self.cache.get(key).cloned()
    }

    /// Check if a key is in the cache without promoting it
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a bitmap, returning a shared handle to it
    pub fn insert(&mut self, key: CacheKey, bitmap: PageBitmap) -> Arc<PageBitmap> {
        let arc = Arc::new(bitmap);
        self.cache.put(key, arc.clone());
        arc
    }

    /// Clear all cached bitmaps
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of cached bitmaps
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
