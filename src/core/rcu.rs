/*!
 * Read-Copy-Update (RCU) Cell
 * Zero-contention reads for per-world area snapshots
 */

use arc_swap::ArcSwap;
use std::sync::Arc;

/// RCU-protected value with zero-contention reads
///
/// # Performance
///
/// - **Reads**: atomic pointer load, no lock
/// - **Writes**: clone-modify-swap; callers serialize writers themselves
/// - **Best for**: area snapshots, read on every world event, written only by authoring
///
/// Readers holding an `Arc<T>` keep seeing the version they loaded; a swap
/// never exposes a half-updated value.
pub struct RcuCell<T> {
    inner: ArcSwap<T>,
}

impl<T> RcuCell<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            inner: ArcSwap::from_pointee(value),
        }
    }

    /// Load current snapshot (zero-contention)
    #[inline(always)]
    pub fn load(&self) -> Arc<T> {
        self.inner.load_full()
    }

    /// Replace the snapshot, returning the previous one
    #[inline]
    pub fn swap(&self, new_value: T) -> Arc<T> {
        self.inner.swap(Arc::new(new_value))
    }

    /// Clone-modify-swap
    ///
    /// Not atomic against concurrent `update` calls on the same cell; hold the
    /// owning store's writer lock.
    #[inline]
    pub fn update<F>(&self, f: F) -> Arc<T>
    where
        T: Clone,
        F: FnOnce(&mut T),
    {
        let mut next = T::clone(&self.inner.load());
        f(&mut next);
        self.swap(next)
    }
}

impl<T: Default> Default for RcuCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
