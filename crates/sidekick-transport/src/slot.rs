//! Single-slot overwrite queue
//!
//! Capacity one: a write always replaces whatever is still unread. The
//! capture feed is live, so a stale payload is worth less than no payload.

use parking_lot::Mutex;

/// Latest-wins hand-off cell shared by a producer and a consumer
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Mutex<Option<T>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        LatestSlot {
            inner: Mutex::new(None),
        }
    }

    /// Store `value`, returning the unread value it superseded (if any)
    pub fn put(&self, value: T) -> Option<T> {
        self.inner.lock().replace(value)
    }

    /// Take the newest value and leave the slot empty
    pub fn take(&self) -> Option<T> {
        self.inner.lock().take()
    }

    /// Drop any unread value
    pub fn clear(&self) {
        self.inner.lock().take();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_none()
    }
}
