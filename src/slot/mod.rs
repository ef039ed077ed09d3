//! `AtomicOwnedSlot<T>`: an atomically replaceable owned `Arc<T>`.
//!
//! The slot stores the address of one `Arc<T>` allocation in an
//! address-sized [`AtomicCell`] and owns exactly one strong count on the
//! object it currently names.
//!
//! Bookkeeping discipline:
//! - **retain before publish**: the strong count travelling with a new
//!   address is taken before the address becomes visible;
//! - **release after swap**: the count on a replaced object is given up only
//!   after the swap has committed, and only once no reader can still be
//!   between reading the old address and retaining it.
//!
//! The second half is what makes [`load`](AtomicOwnedSlot::load) safe. Every
//! operation pins the current thread with `crossbeam_epoch`, and a replaced
//! address is retired with [`Guard::defer`]: the release runs once every
//! thread pinned at the time of the swap has unpinned. Writers never wait for
//! readers, so a reader preempted mid-load delays reclamation, not progress.
//! Until the deferred release runs, a replaced object reports one extra
//! strong count.
//!
//! Ordering: a published object must be visible in full to whoever loads its
//! address, so publishing operations are at least `Release` and reading
//! operations at least `Acquire` (see [`MemoryOrder::with_release`] /
//! [`MemoryOrder::with_acquire`]). Stronger requests (`SeqCst`) are honoured.

use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use std::sync::Arc;

use crossbeam_epoch::{self as epoch, Guard};

use crate::atomic::order::{check_cas, check_load, check_store};
use crate::atomic::{AtomicCell, AtomicScalar, MemoryOrder};

#[cfg(test)]
mod tests;

/// A lock-free slot holding one owned `Arc<T>`, replaceable atomically.
///
/// Compare-and-swap compares by object identity (`Arc::as_ptr`), not by
/// value. Replacing operations need `T: Send + Sync + 'static` because the
/// release of a replaced object may run later, on another thread.
///
/// ```rust
/// use std::sync::Arc;
/// use orderly::{AtomicOwnedSlot, MemoryOrder};
///
/// let slot = AtomicOwnedSlot::new(Arc::new("a"));
/// let b = Arc::new("b");
///
/// let mut expected = slot.load(MemoryOrder::Acquire);
/// assert!(slot.compare_and_swap_strong_seq_cst(&mut expected, &b));
/// assert_eq!(*slot.load_seq_cst(), "b");
/// ```
pub struct AtomicOwnedSlot<T> {
    address: AtomicCell<*mut T>,
    _owns: PhantomData<Arc<T>>,
}

impl<T> AtomicOwnedSlot<T> {
    /// Creates a slot owning `object`.
    pub fn new(object: Arc<T>) -> Self {
        Self {
            address: AtomicCell::new(Self::retain(object)),
            _owns: PhantomData,
        }
    }

    /// `true` if every operation of the slot is lock-free on this target.
    ///
    /// Epoch pinning and deferred release never wait on another thread, so
    /// this is the lock-freedom of the address cell.
    #[inline]
    pub fn is_lock_free() -> bool {
        <*mut T>::is_lock_free()
    }

    /// Returns a retained reference to the current object.
    ///
    /// `order` must be a load order; it is strengthened to at least
    /// `Acquire`.
    pub fn load(&self, order: MemoryOrder) -> Arc<T> {
        check_load(order);
        let _guard = epoch::pin();
        let current = self.address.load(order.with_acquire());
        // SAFETY: `current` was published by this slot, which holds a strong
        // count on it; a replacement defers that release past our guard.
        unsafe { Self::retain_unpublished(current) }
    }

    /// [`load`](Self::load) with `SeqCst`.
    #[inline]
    pub fn load_seq_cst(&self) -> Arc<T> {
        self.load(MemoryOrder::SeqCst)
    }

    /// Returns the current address without retaining the object.
    ///
    /// The pointer is only good for identity comparisons: a concurrent
    /// `store`, `exchange` or successful compare-and-swap may release the
    /// object as soon as this returns. Dereferencing it requires the caller
    /// to guarantee no such operation can run.
    #[inline]
    pub fn load_ptr(&self, order: MemoryOrder) -> *const T {
        self.address.load(order).cast_const()
    }

    /// `true` if the slot currently holds `object` (by identity).
    #[inline]
    pub fn ptr_eq(&self, object: &Arc<T>, order: MemoryOrder) -> bool {
        core::ptr::eq(self.load_ptr(order), Arc::as_ptr(object))
    }

    /// Consumes the slot, returning its object with the slot's count.
    pub fn into_inner(self) -> Arc<T> {
        let this = ManuallyDrop::new(self);
        let current = this.address.load(MemoryOrder::Relaxed);
        // SAFETY: we own the slot; its count moves into the returned `Arc`.
        unsafe { Arc::from_raw(current) }
    }

    /// Turns an owned `Arc` into a raw address carrying one strong count.
    #[inline(always)]
    fn retain(object: Arc<T>) -> *mut T {
        Arc::into_raw(object).cast_mut()
    }

    /// Takes a new strong count on a published address.
    ///
    /// # Safety
    /// `address` must come from [`retain`](Self::retain) and its object must
    /// stay alive for the duration of the call.
    #[inline(always)]
    unsafe fn retain_unpublished(address: *mut T) -> Arc<T> {
        // SAFETY: upheld by the caller.
        unsafe {
            Arc::increment_strong_count(address.cast_const());
            Arc::from_raw(address.cast_const())
        }
    }
}

impl<T: Send + Sync + 'static> AtomicOwnedSlot<T> {
    /// Replaces the held object with `object`, releasing the previous one.
    ///
    /// `order` must be a store order; it is strengthened to at least
    /// `Release`.
    pub fn store(&self, object: Arc<T>, order: MemoryOrder) {
        check_store(order);
        let guard = epoch::pin();
        let previous = self.publish(object, order.with_release());
        // SAFETY: `previous` carried the slot's count and is no longer published.
        unsafe { Self::retire(previous, &guard) };
    }

    /// [`store`](Self::store) with `SeqCst`.
    #[inline]
    pub fn store_seq_cst(&self, object: Arc<T>) {
        self.store(object, MemoryOrder::SeqCst);
    }

    /// Replaces the held object with `object`, returning the previous one.
    ///
    /// The caller receives its own count on the previous object; the
    /// slot's count is released like any other replaced address.
    pub fn exchange(&self, object: Arc<T>, order: MemoryOrder) -> Arc<T> {
        let guard = epoch::pin();
        let previous = self.publish(object, order.with_release().with_acquire());
        // SAFETY: the slot's count on `previous` is not released yet.
        let handed = unsafe { Self::retain_unpublished(previous) };
        // SAFETY: `previous` carried the slot's count and is no longer published.
        unsafe { Self::retire(previous, &guard) };
        handed
    }

    /// [`exchange`](Self::exchange) with `SeqCst`.
    #[inline]
    pub fn exchange_seq_cst(&self, object: Arc<T>) -> Arc<T> {
        self.exchange(object, MemoryOrder::SeqCst)
    }

    /// Replaces the held object with `desired` if it is `expected` (by identity).
    ///
    /// On success the slot takes its own count on `desired` and releases its
    /// count on the replaced object. On failure `*expected` is replaced by
    /// the object the slot actually holds. May fail spuriously, in which case
    /// `*expected` is left naming the same object.
    ///
    /// Unlike a raw-address slot, the object written into `*expected` on
    /// failure is retained for the caller, so it stays valid however many
    /// swaps race with the caller afterwards.
    pub fn compare_and_swap_weak(
        &self,
        expected: &mut Arc<T>,
        desired: &Arc<T>,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        self.compare_and_swap(expected, desired, success, failure, true)
    }

    /// Weak compare-and-swap with the failure order derived from `order`.
    #[inline]
    pub fn compare_and_swap_weak_with_order(
        &self,
        expected: &mut Arc<T>,
        desired: &Arc<T>,
        order: MemoryOrder,
    ) -> bool {
        self.compare_and_swap_weak(expected, desired, order, order.cas_failure_order())
    }

    /// Weak compare-and-swap with `SeqCst`.
    #[inline]
    pub fn compare_and_swap_weak_seq_cst(&self, expected: &mut Arc<T>, desired: &Arc<T>) -> bool {
        self.compare_and_swap_weak(expected, desired, MemoryOrder::SeqCst, MemoryOrder::SeqCst)
    }

    /// Like [`compare_and_swap_weak`](Self::compare_and_swap_weak), but only
    /// fails when the slot really holds a different object.
    pub fn compare_and_swap_strong(
        &self,
        expected: &mut Arc<T>,
        desired: &Arc<T>,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        self.compare_and_swap(expected, desired, success, failure, false)
    }

    /// Strong compare-and-swap with the failure order derived from `order`.
    #[inline]
    pub fn compare_and_swap_strong_with_order(
        &self,
        expected: &mut Arc<T>,
        desired: &Arc<T>,
        order: MemoryOrder,
    ) -> bool {
        self.compare_and_swap_strong(expected, desired, order, order.cas_failure_order())
    }

    /// Strong compare-and-swap with `SeqCst`.
    #[inline]
    pub fn compare_and_swap_strong_seq_cst(
        &self,
        expected: &mut Arc<T>,
        desired: &Arc<T>,
    ) -> bool {
        self.compare_and_swap_strong(expected, desired, MemoryOrder::SeqCst, MemoryOrder::SeqCst)
    }

    fn compare_and_swap(
        &self,
        expected: &mut Arc<T>,
        desired: &Arc<T>,
        success: MemoryOrder,
        failure: MemoryOrder,
        weak: bool,
    ) -> bool {
        check_cas(success, failure);
        let success = success.with_release().with_acquire();
        let failure = failure.with_acquire();

        let candidate = Self::retain(Arc::clone(desired));
        let mut observed = Arc::as_ptr(expected).cast_mut();

        let guard = epoch::pin();
        let swapped = if weak {
            self.address
                .compare_and_swap_weak(&mut observed, candidate, success, failure)
        } else {
            self.address
                .compare_and_swap_strong(&mut observed, candidate, success, failure)
        };

        if swapped {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                replaced = ?observed,
                published = ?candidate,
                "owned slot compare-and-swap"
            );
            // SAFETY: `observed` is the address we replaced; its slot count is ours.
            unsafe { Self::retire(observed, &guard) };
            true
        } else {
            // SAFETY: `observed` was published when we read it under `guard`,
            // so its release cannot have run yet.
            let current = unsafe { Self::retain_unpublished(observed) };
            // SAFETY: `candidate` was never published; undo its retain.
            drop(unsafe { Arc::from_raw(candidate) });
            *expected = current;
            false
        }
    }

    /// Unconditional publish: retains `object`, swaps its address in and
    /// returns the replaced address, which still carries the slot's count.
    #[inline]
    fn publish(&self, object: Arc<T>, order: MemoryOrder) -> *mut T {
        let incoming = Self::retain(object);
        let previous = self.address.exchange(incoming, order);
        #[cfg(feature = "tracing")]
        tracing::trace!(replaced = ?previous, published = ?incoming, "owned slot publish");
        previous
    }

    /// Releases the slot's count on a replaced address once every thread
    /// pinned before the swap has unpinned.
    ///
    /// # Safety
    /// `previous` must be an address this slot no longer publishes whose
    /// slot count has not been released yet, and `guard` must have been
    /// pinned before the swap that replaced it.
    unsafe fn retire(previous: *mut T, guard: &Guard) {
        // SAFETY: the count carried by `previous` belongs to us.
        let count = unsafe { Arc::from_raw(previous.cast_const()) };
        #[cfg(feature = "tracing")]
        tracing::trace!(retired = ?previous, "owned slot release deferred");
        guard.defer(move || drop(count));
    }
}

impl<T> Drop for AtomicOwnedSlot<T> {
    fn drop(&mut self) {
        let current = *self.address.get_mut();
        // SAFETY: exclusive access; the slot's count on `current` is released once.
        drop(unsafe { Arc::from_raw(current.cast_const()) });
    }
}

impl<T: Default> Default for AtomicOwnedSlot<T> {
    fn default() -> Self {
        Self::new(Arc::new(T::default()))
    }
}

impl<T> From<Arc<T>> for AtomicOwnedSlot<T> {
    fn from(object: Arc<T>) -> Self {
        Self::new(object)
    }
}

impl<T> fmt::Debug for AtomicOwnedSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicOwnedSlot")
            .field("address", &self.load_ptr(MemoryOrder::Relaxed))
            .finish_non_exhaustive()
    }
}
