//! Bounded pools of reusable resources
//!
//! Contexts, staging buffers and memory streams grow internal capacity as
//! they are used. Handing them back to a [`Cache`] keeps that capacity for
//! the next session instead of reallocating it.
//!
//! # Usage
//!
//! ```ignore
//! static BUFFERS: Lazy<Cache<Vec<u8>>> = Lazy::new(Cache::new);
//!
//! let mut buf = BUFFERS.claim();
//! buf.extend_from_slice(b"payload");
//! // dropped here: reset and returned to BUFFERS
//! ```
//!
//! A claimed value is owned exclusively by the [`Cached`] guard. Release
//! happens in `Drop`, so every exit path (including `?` and panics
//! unwinding through the caller) returns the value.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Maximum number of idle values a cache keeps.
///
/// Values released into a full cache are dropped.
pub const MAX_CACHE_SIZE: usize = 16;

/// A value that can be returned to a pool.
pub trait Recyclable: Default + Send + 'static {
    /// Return the value to its pristine state, keeping allocations.
    fn reset(&mut self);
}

impl Recyclable for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// Thread-safe pool of idle values.
pub struct Cache<T: Recyclable> {
    idle: Mutex<Vec<T>>,
}

impl<T: Recyclable> Cache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Cache {
            idle: Mutex::new(Vec::with_capacity(MAX_CACHE_SIZE)),
        }
    }

    /// Claim a value: an idle one if available, a fresh default otherwise.
    pub fn claim(&'static self) -> Cached<T> {
        let value = self.idle.lock().pop().unwrap_or_default();
        Cached {
            value,
            home: Some(self),
        }
    }

    /// Number of idle values.
    pub fn len(&self) -> usize {
        self.idle.lock().len()
    }

    /// Whether no idle value is available.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill the cache with up to `count` fresh values (capped at
    /// [`MAX_CACHE_SIZE`]).
    pub fn warmup(&self, count: usize) {
        let count = count.min(MAX_CACHE_SIZE);
        let mut idle = self.idle.lock();
        while idle.len() < count {
            idle.push(T::default());
        }
    }

    /// Drop every idle value.
    pub fn clear(&self) {
        self.idle.lock().clear();
    }

    fn release(&self, mut value: T) {
        value.reset();
        let mut idle = self.idle.lock();
        if idle.len() < MAX_CACHE_SIZE {
            idle.push(value);
        } else {
            tracing::trace!(target: "graphstream", "cache full, dropping released value");
        }
    }
}

impl<T: Recyclable> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive guard over a value claimed from a [`Cache`].
pub struct Cached<T: Recyclable> {
    value: T,
    home: Option<&'static Cache<T>>,
}

impl<T: Recyclable> Cached<T> {
    /// Wrap a value that belongs to no cache. Dropping it just drops it.
    pub fn detached(value: T) -> Self {
        Cached { value, home: None }
    }

    /// Whether the value goes back to a cache on drop.
    pub fn is_pooled(&self) -> bool {
        self.home.is_some()
    }

    /// Take the value out; it will not be returned to the cache.
    pub fn into_inner(mut self) -> T {
        self.home = None;
        std::mem::take(&mut self.value)
    }
}

impl<T: Recyclable> Deref for Cached<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Recyclable> DerefMut for Cached<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Recyclable> Drop for Cached<T> {
    fn drop(&mut self) {
        if let Some(home) = self.home.take() {
            home.release(std::mem::take(&mut self.value));
        }
    }
}
