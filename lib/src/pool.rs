//! Reusable scratch buffers for document serialization
//!
//! A buffer is checked out with [`BufferPool::acquire`], always empty (only its
//! capacity survives reuse), and goes back to the pool when the guard drops.
//! The drop runs on every exit path, including early `?` returns and panics.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Idle buffers kept by the global pool
const GLOBAL_POOL_SIZE: usize = 8;
/// Buffers that grew beyond this are dropped instead of pooled
const MAX_RETAINED_CAPACITY: usize = 16 * 1024 * 1024;

static GLOBAL: Lazy<BufferPool> = Lazy::new(|| BufferPool::new(GLOBAL_POOL_SIZE));

/// Bounded pool of `String` buffers
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<String>>,
    max_idle: usize,
}

impl BufferPool {
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    /// Process-wide pool
    pub fn global() -> &'static BufferPool {
        &GLOBAL
    }

    /// Check out an empty buffer
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let mut buffer = self.idle.lock().pop().unwrap_or_default();
        buffer.clear();
        PooledBuffer { buffer, pool: self }
    }

    fn release(&self, buffer: String) {
        if buffer.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buffer);
        }
    }

    /// Number of idle buffers currently held
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

/// Scoped checkout of a pooled buffer; returns it to the pool on drop
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buffer: String,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_returns_empty_buffer() {
        let pool = BufferPool::new(2);
        {
            let mut buf = pool.acquire();
            buf.push_str("stale contents");
        }
        assert_eq!(pool.idle_count(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= "stale contents".len());
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_released_on_error_path() {
        fn fails(pool: &BufferPool) -> Result<(), ()> {
            let mut buf = pool.acquire();
            buf.push('x');
            Err(())
        }

        let pool = BufferPool::new(2);
        assert!(fails(&pool).is_err());
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_released_on_panic() {
        let pool = BufferPool::new(2);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _buf = pool.acquire();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_pool_is_bounded() {
        let pool = BufferPool::new(2);
        {
            let _a = pool.acquire();
            let _b = pool.acquire();
            let _c = pool.acquire();
        }
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn test_oversized_buffers_not_retained() {
        let pool = BufferPool::new(2);
        {
            let mut buf = pool.acquire();
            buf.reserve(MAX_RETAINED_CAPACITY + 1);
        }
        assert_eq!(pool.idle_count(), 0);
    }
}
