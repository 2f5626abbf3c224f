//! Per-instance exclusive lock for power transitions
//!
//! The lock is only taken by the power, standby and reset entry points.
//! Exposure and gain writes run on the single control thread of an
//! instance and never acquire it.

/// Scoped exclusive access to a sensor's control bus
pub trait BusLock {
    /// Guard that releases the lock when dropped
    type Guard<'a>
    where
        Self: 'a;

    /// Block until the lock is held
    fn acquire(&self) -> Self::Guard<'_>;
}

/// No-op lock for instances that are never shared between threads
impl BusLock for () {
    type Guard<'a> = ();

    fn acquire(&self) -> Self::Guard<'_> {}
}

#[cfg(feature = "std")]
impl BusLock for std::sync::Mutex<()> {
    type Guard<'a> = std::sync::MutexGuard<'a, ()>;

    fn acquire(&self) -> Self::Guard<'_> {
        // Guarded data is unit, poisoning carries no meaning
        std::sync::Mutex::lock(self).unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(feature = "std")]
impl<L: BusLock> BusLock for std::sync::Arc<L> {
    type Guard<'a>
        = L::Guard<'a>
    where
        Self: 'a;

    fn acquire(&self) -> Self::Guard<'_> {
        (**self).acquire()
    }
}
