//! The base operation set every atomic-capable scalar provides.
//!
//! [`AtomicScalar`] binds a plain scalar (`u8`, `bool`, `*mut T`, ...) to its
//! native backend storage and exposes the contract operations as associated
//! functions over that storage. Each operation comes in three forms:
//!
//! - explicit order(s): `atomic_load(a, MemoryOrder::Acquire)`
//! - default order: `atomic_load_seq_cst(a)`, always `SeqCst`
//! - for compare-and-swap, a single-order form (`*_with_order`) whose failure
//!   order is derived with [`MemoryOrder::cas_failure_order`]
//!
//! A failed compare-and-swap is an ordinary `false` return, never an error.

use super::backend::AtomicBackend;
use super::order::{check_cas, check_load, check_store, MemoryOrder};

/// A scalar type that can live in an atomic location.
///
/// Implemented once per width; all operations are provided.
pub trait AtomicScalar: Copy + Sized {
    /// Backend storage for this scalar.
    type Atomic: AtomicBackend<Value = Self>;

    /// `true` if operations on this width never fall back to a lock.
    #[inline(always)]
    fn is_lock_free() -> bool {
        <Self::Atomic as AtomicBackend>::IS_LOCK_FREE
    }

    /// Creates backend storage holding `value`.
    #[inline(always)]
    fn new_atomic(value: Self) -> Self::Atomic {
        <Self::Atomic as AtomicBackend>::new(value)
    }

    /// Publishes `value`.
    ///
    /// `order` must be `Relaxed`, `Release` or `SeqCst`.
    #[inline(always)]
    fn atomic_store(atomic: &Self::Atomic, value: Self, order: MemoryOrder) {
        check_store(order);
        atomic.store(value, order.to_std());
    }

    /// [`atomic_store`](Self::atomic_store) with `SeqCst`.
    #[inline(always)]
    fn atomic_store_seq_cst(atomic: &Self::Atomic, value: Self) {
        Self::atomic_store(atomic, value, MemoryOrder::SeqCst);
    }

    /// Returns the current value.
    ///
    /// `order` must be `Relaxed`, `Consume`, `Acquire` or `SeqCst`.
    #[inline(always)]
    fn atomic_load(atomic: &Self::Atomic, order: MemoryOrder) -> Self {
        check_load(order);
        atomic.load(order.to_std())
    }

    /// [`atomic_load`](Self::atomic_load) with `SeqCst`.
    #[inline(always)]
    fn atomic_load_seq_cst(atomic: &Self::Atomic) -> Self {
        Self::atomic_load(atomic, MemoryOrder::SeqCst)
    }

    /// Replaces the value, returning the one it replaced.
    #[inline(always)]
    fn atomic_exchange(atomic: &Self::Atomic, new_value: Self, order: MemoryOrder) -> Self {
        atomic.swap(new_value, order.to_std())
    }

    /// [`atomic_exchange`](Self::atomic_exchange) with `SeqCst`.
    #[inline(always)]
    fn atomic_exchange_seq_cst(atomic: &Self::Atomic, new_value: Self) -> Self {
        Self::atomic_exchange(atomic, new_value, MemoryOrder::SeqCst)
    }

    /// Replaces the value with `desired` if it equals `*expected`.
    ///
    /// On failure `*expected` receives the observed value. May return `false`
    /// even when the values matched; use inside a retry loop.
    #[inline(always)]
    fn atomic_compare_and_swap_weak(
        atomic: &Self::Atomic,
        expected: &mut Self,
        desired: Self,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        check_cas(success, failure);
        match atomic.compare_exchange_weak(*expected, desired, success.to_std(), failure.to_std()) {
            Ok(_) => true,
            Err(actual) => {
                *expected = actual;
                false
            }
        }
    }

    /// Weak compare-and-swap with the failure order derived from `order`.
    #[inline(always)]
    fn atomic_compare_and_swap_weak_with_order(
        atomic: &Self::Atomic,
        expected: &mut Self,
        desired: Self,
        order: MemoryOrder,
    ) -> bool {
        let failure = order.cas_failure_order();
        Self::atomic_compare_and_swap_weak(atomic, expected, desired, order, failure)
    }

    /// Weak compare-and-swap with `SeqCst` on both paths.
    #[inline(always)]
    fn atomic_compare_and_swap_weak_seq_cst(
        atomic: &Self::Atomic,
        expected: &mut Self,
        desired: Self,
    ) -> bool {
        Self::atomic_compare_and_swap_weak(
            atomic,
            expected,
            desired,
            MemoryOrder::SeqCst,
            MemoryOrder::SeqCst,
        )
    }

    /// Replaces the value with `desired` if it equals `*expected`.
    ///
    /// Returns `false` only when the comparison really failed, in which case
    /// `*expected` receives the observed value.
    #[inline(always)]
    fn atomic_compare_and_swap_strong(
        atomic: &Self::Atomic,
        expected: &mut Self,
        desired: Self,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        check_cas(success, failure);
        match atomic.compare_exchange(*expected, desired, success.to_std(), failure.to_std()) {
            Ok(_) => true,
            Err(actual) => {
                *expected = actual;
                false
            }
        }
    }

    /// Strong compare-and-swap with the failure order derived from `order`.
    #[inline(always)]
    fn atomic_compare_and_swap_strong_with_order(
        atomic: &Self::Atomic,
        expected: &mut Self,
        desired: Self,
        order: MemoryOrder,
    ) -> bool {
        let failure = order.cas_failure_order();
        Self::atomic_compare_and_swap_strong(atomic, expected, desired, order, failure)
    }

    /// Strong compare-and-swap with `SeqCst` on both paths.
    #[inline(always)]
    fn atomic_compare_and_swap_strong_seq_cst(
        atomic: &Self::Atomic,
        expected: &mut Self,
        desired: Self,
    ) -> bool {
        Self::atomic_compare_and_swap_strong(
            atomic,
            expected,
            desired,
            MemoryOrder::SeqCst,
            MemoryOrder::SeqCst,
        )
    }
}

macro_rules! impl_atomic_scalar {
    ($($value:ty => $atomic:ty;)*) => {$(
        impl AtomicScalar for $value {
            type Atomic = $atomic;
        }
    )*};
}

impl_atomic_scalar! {
    bool => core::sync::atomic::AtomicBool;
    u8 => core::sync::atomic::AtomicU8;
    i8 => core::sync::atomic::AtomicI8;
    u16 => core::sync::atomic::AtomicU16;
    i16 => core::sync::atomic::AtomicI16;
    u32 => core::sync::atomic::AtomicU32;
    i32 => core::sync::atomic::AtomicI32;
    usize => core::sync::atomic::AtomicUsize;
    isize => core::sync::atomic::AtomicIsize;
}

#[cfg(target_has_atomic = "64")]
impl_atomic_scalar! {
    u64 => core::sync::atomic::AtomicU64;
    i64 => core::sync::atomic::AtomicI64;
}

impl<T> AtomicScalar for *mut T {
    type Atomic = core::sync::atomic::AtomicPtr<T>;
}
