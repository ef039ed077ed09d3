//! Bitwise and/or/xor read-modify-write operations.

use core::ops::{BitAnd, BitOr, BitXor};

use super::backend::BitwiseBackend;
use super::contract::AtomicScalar;
use super::order::MemoryOrder;

/// Integer scalars supporting atomic bitwise operations.
pub trait AtomicBitwise:
    AtomicScalar<Atomic: BitwiseBackend>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
{
    /// ANDs in `value`, returning the value before the operation.
    #[inline(always)]
    fn atomic_fetch_and_bit_and(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        atomic.fetch_and(value, order.to_std())
    }

    /// ORs in `value`, returning the value before the operation.
    #[inline(always)]
    fn atomic_fetch_and_bit_or(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        atomic.fetch_or(value, order.to_std())
    }

    /// XORs in `value`, returning the value before the operation.
    #[inline(always)]
    fn atomic_fetch_and_bit_xor(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        atomic.fetch_xor(value, order.to_std())
    }

    /// ANDs in `value`, returning the value after the operation.
    #[inline(always)]
    fn atomic_bit_and_and_fetch(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        Self::atomic_fetch_and_bit_and(atomic, value, order) & value
    }

    /// ORs in `value`, returning the value after the operation.
    #[inline(always)]
    fn atomic_bit_or_and_fetch(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        Self::atomic_fetch_and_bit_or(atomic, value, order) | value
    }

    /// XORs in `value`, returning the value after the operation.
    #[inline(always)]
    fn atomic_bit_xor_and_fetch(atomic: &Self::Atomic, value: Self, order: MemoryOrder) -> Self {
        Self::atomic_fetch_and_bit_xor(atomic, value, order) ^ value
    }

    /// [`atomic_fetch_and_bit_and`](Self::atomic_fetch_and_bit_and) with `SeqCst`.
    #[inline(always)]
    fn atomic_fetch_and_bit_and_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_fetch_and_bit_and(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_fetch_and_bit_or`](Self::atomic_fetch_and_bit_or) with `SeqCst`.
    #[inline(always)]
    fn atomic_fetch_and_bit_or_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_fetch_and_bit_or(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_fetch_and_bit_xor`](Self::atomic_fetch_and_bit_xor) with `SeqCst`.
    #[inline(always)]
    fn atomic_fetch_and_bit_xor_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_fetch_and_bit_xor(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_bit_and_and_fetch`](Self::atomic_bit_and_and_fetch) with `SeqCst`.
    #[inline(always)]
    fn atomic_bit_and_and_fetch_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_bit_and_and_fetch(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_bit_or_and_fetch`](Self::atomic_bit_or_and_fetch) with `SeqCst`.
    #[inline(always)]
    fn atomic_bit_or_and_fetch_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_bit_or_and_fetch(atomic, value, MemoryOrder::SeqCst)
    }

    /// [`atomic_bit_xor_and_fetch`](Self::atomic_bit_xor_and_fetch) with `SeqCst`.
    #[inline(always)]
    fn atomic_bit_xor_and_fetch_seq_cst(atomic: &Self::Atomic, value: Self) -> Self {
        Self::atomic_bit_xor_and_fetch(atomic, value, MemoryOrder::SeqCst)
    }
}

macro_rules! impl_atomic_bitwise {
    ($($value:ty),* $(,)?) => {$(
        impl AtomicBitwise for $value {}
    )*};
}

impl_atomic_bitwise!(u8, i8, u16, i16, u32, i32, usize, isize);

#[cfg(target_has_atomic = "64")]
impl_atomic_bitwise!(u64, i64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::order::strategy::any_order;
    use proptest::prelude::*;

    #[test]
    fn fetch_and_returns_previous() {
        let a = u8::new_atomic(0b1010_1010);
        assert_eq!(u8::atomic_fetch_and_bit_and_seq_cst(&a, 0b0000_1111), 0b1010_1010);
        assert_eq!(u8::atomic_load_seq_cst(&a), 0b0000_1010);
    }

    #[test]
    fn xor_and_fetch_returns_result() {
        let a = u8::new_atomic(0b0101_0101);
        assert_eq!(u8::atomic_bit_xor_and_fetch_seq_cst(&a, 0b1111_1111), 0b1010_1010);
        assert_eq!(u8::atomic_load_seq_cst(&a), 0b1010_1010);
    }

    #[test]
    fn or_on_signed_width() {
        let a = i16::new_atomic(0x0F00);
        assert_eq!(i16::atomic_bit_or_and_fetch(&a, 0x00F0, MemoryOrder::Release), 0x0FF0);
        assert_eq!(i16::atomic_fetch_and_bit_or(&a, i16::MIN, MemoryOrder::Acquire), 0x0FF0);
        assert_eq!(i16::atomic_load_seq_cst(&a), i16::MIN | 0x0FF0);
    }

    proptest! {
        #[test]
        fn and_fetch_matches_plain_and(start: u32, operand: u32, order in any_order()) {
            let a = u32::new_atomic(start);
            prop_assert_eq!(u32::atomic_bit_and_and_fetch(&a, operand, order), start & operand);
        }

        #[test]
        fn double_xor_restores(start: usize, operand: usize) {
            let a = usize::new_atomic(start);
            usize::atomic_fetch_and_bit_xor_seq_cst(&a, operand);
            prop_assert_eq!(usize::atomic_bit_xor_and_fetch_seq_cst(&a, operand), start);
        }
    }
}
