//! Wrapping add/subtract read-modify-write operations.
//!
//! Overflow wraps (two's complement) exactly like the hardware instruction.
//! It is never promoted to a panic, even in debug builds: lock-free counters
//! rely on wraparound.

use num_traits::{WrappingAdd, WrappingSub};

use super::backend::ArithmeticBackend;
use super::contract::AtomicScalar;
use super::order::MemoryOrder;

/// Integer scalars supporting atomic add and subtract.
pub trait AtomicArithmetic: AtomicScalar<Atomic: ArithmeticBackend> + WrappingAdd + WrappingSub {
    /// Adds `value`, returning the value before the addition.
    #[inline(always)]
    fn atomic_fetch_and_add(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        atomic.fetch_add(value, order.to_std())
    }

    /// Subtracts `value`, returning the value before the subtraction.
    #[inline(always)]
    fn atomic_fetch_and_sub(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        atomic.fetch_sub(value, order.to_std())
    }

    /// Adds `value`, returning the value after the addition.
    #[inline(always)]
    fn atomic_add_and_fetch(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        Self::atomic_fetch_and_add(atomic, value, order).wrapping_add(&value)
    }

    /// Subtracts `value`, returning the value after the subtraction.
    #[inline(always)]
    fn atomic_sub_and_fetch(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        Self::atomic_fetch_and_sub(atomic, value, order).wrapping_sub(&value)
    }

    /// [`atomic_fetch_and_add`](Self::atomic_fetch_and_add) with `SeqCst`.
    #[inline(always)]
    fn atomic_fetch_and_add_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_fetch_and_add(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_fetch_and_sub`](Self::atomic_fetch_and_sub) with `SeqCst`.
    #[inline(always)]
    fn atomic_fetch_and_sub_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_fetch_and_sub(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_add_and_fetch`](Self::atomic_add_and_fetch) with `SeqCst`.
    #[inline(always)]
    fn atomic_add_and_fetch_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_add_and_fetch(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_sub_and_fetch`](Self::atomic_sub_and_fetch) with `SeqCst`.
    #[inline(always)]
    fn atomic_sub_and_fetch_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_sub_and_fetch(atomic, value, MemoryOrder::SeqCst)
    }
}

macro_rules! impl_atomic_arithmetic {
    ($($value:ty),* $(,)?) => {$(
        impl AtomicArithmetic for $value {}
    )*};
}

impl_atomic_arithmetic!(u8, i8, u16, i16, u32, i32, usize, isize);

#[cfg(target_has_atomic = "64")]
impl_atomic_arithmetic!(u64, i64);
