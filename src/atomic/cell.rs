//! `AtomicCell<T>`: one shared mutable scalar behind the atomic contract.

use core::fmt;
use core::ops::{AddAssign, BitAndAssign, BitOrAssign, BitXorAssign, SubAssign};

use crossbeam_utils::Backoff;

use super::arithmetic::AtomicArithmetic;
use super::backend::AtomicBackend;
use super::bitwise::AtomicBitwise;
use super::contract::AtomicScalar;
use super::order::MemoryOrder;

/// A shared scalar whose every access goes through the atomic contract.
///
/// The cell forwards each call to `T`'s [`AtomicScalar`] implementation (and
/// [`AtomicArithmetic`] / [`AtomicBitwise`] where `T` provides them); it adds
/// no semantics of its own.
///
/// The compound-assignment operators are `SeqCst` fetch-and-op calls that
/// discard the previous value. The right-hand side is either a plain `T` or
/// another cell, read with a `SeqCst` load first. They are implemented for
/// `&AtomicCell<T>` so shared handles can use them:
///
/// ```rust
/// use orderly::AtomicCell;
///
/// let hits = AtomicCell::new(0u32);
/// let mut handle = &hits;
/// handle += 3;
/// handle -= 1;
/// assert_eq!(hits.load_seq_cst(), 2);
/// ```
#[repr(transparent)]
pub struct AtomicCell<T: AtomicScalar> {
    inner: T::Atomic,
}

impl<T: AtomicScalar> AtomicCell<T> {
    /// Creates a cell holding `value`.
    #[inline(always)]
    pub fn new(value: T) -> Self {
        Self {
            inner: T::new_atomic(value),
        }
    }

    /// `true` if operations on `T` never fall back to a lock on this target.
    #[inline(always)]
    pub fn is_lock_free() -> bool {
        T::is_lock_free()
    }

    /// Consumes the cell, returning the stored value.
    #[inline(always)]
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }

    /// Mutable access through exclusive ownership; no atomic operation needed.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Publishes `value`.
    #[inline(always)]
    pub fn store(&self, value: T, order: MemoryOrder) {
        T::atomic_store(&self.inner, value, order);
    }

    /// Publishes `value` with `SeqCst`.
    #[inline(always)]
    pub fn store_seq_cst(&self, value: T) {
        T::atomic_store_seq_cst(&self.inner, value);
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: MemoryOrder) -> T {
        T::atomic_load(&self.inner, order)
    }

    /// Loads the current value with `SeqCst`.
    #[inline(always)]
    pub fn load_seq_cst(&self) -> T {
        T::atomic_load_seq_cst(&self.inner)
    }

    /// Replaces the value, returning the previous one.
    #[inline(always)]
    pub fn exchange(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_exchange(&self.inner, value, order)
    }

    /// Replaces the value with `SeqCst`, returning the previous one.
    #[inline(always)]
    pub fn exchange_seq_cst(&self, value: T) -> T {
        T::atomic_exchange_seq_cst(&self.inner, value)
    }

    /// Weak compare-and-swap; see [`AtomicScalar::atomic_compare_and_swap_weak`].
    #[inline(always)]
    pub fn compare_and_swap_weak(
        &self,
        expected: &mut T,
        desired: T,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        T::atomic_compare_and_swap_weak(&self.inner, expected, desired, success, failure)
    }

    /// Weak compare-and-swap with the failure order derived from `order`.
    #[inline(always)]
    pub fn compare_and_swap_weak_with_order(
        &self,
        expected: &mut T,
        desired: T,
        order: MemoryOrder,
    ) -> bool {
        T::atomic_compare_and_swap_weak_with_order(&self.inner, expected, desired, order)
    }

    /// Weak compare-and-swap with `SeqCst`.
    #[inline(always)]
    pub fn compare_and_swap_weak_seq_cst(&self, expected: &mut T, desired: T) -> bool {
        T::atomic_compare_and_swap_weak_seq_cst(&self.inner, expected, desired)
    }

    /// Strong compare-and-swap; see [`AtomicScalar::atomic_compare_and_swap_strong`].
    #[inline(always)]
    pub fn compare_and_swap_strong(
        &self,
        expected: &mut T,
        desired: T,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        T::atomic_compare_and_swap_strong(&self.inner, expected, desired, success, failure)
    }

    /// Strong compare-and-swap with the failure order derived from `order`.
    #[inline(always)]
    pub fn compare_and_swap_strong_with_order(
        &self,
        expected: &mut T,
        desired: T,
        order: MemoryOrder,
    ) -> bool {
        T::atomic_compare_and_swap_strong_with_order(&self.inner, expected, desired, order)
    }

    /// Strong compare-and-swap with `SeqCst`.
    #[inline(always)]
    pub fn compare_and_swap_strong_seq_cst(&self, expected: &mut T, desired: T) -> bool {
        T::atomic_compare_and_swap_strong_seq_cst(&self.inner, expected, desired)
    }

    /// Stores `new` if the current value equals `current`.
    ///
    /// Returns `Ok(previous)` on success and `Err(observed)` otherwise.
    #[inline(always)]
    pub fn compare_exchange(
        &self,
        current: T,
        new: T,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> Result<T, T> {
        let mut expected = current;
        if self.compare_and_swap_strong(&mut expected, new, success, failure) {
            Ok(current)
        } else {
            Err(expected)
        }
    }

    /// Weak version of [`compare_exchange`](Self::compare_exchange); may fail spuriously.
    #[inline(always)]
    pub fn compare_exchange_weak(
        &self,
        current: T,
        new: T,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> Result<T, T> {
        let mut expected = current;
        if self.compare_and_swap_weak(&mut expected, new, success, failure) {
            Ok(current)
        } else {
            Err(expected)
        }
    }

    /// Applies `f` in a compare-and-swap loop until it succeeds or `f`
    /// returns `None`.
    ///
    /// Returns `Ok(previous)` if a new value was stored, `Err(current)` if
    /// `f` declined. `f` may run several times under contention.
    /// `fetch_order` is used for the initial load and for failed swaps.
    pub fn fetch_update<F>(
        &self,
        set_order: MemoryOrder,
        fetch_order: MemoryOrder,
        mut f: F,
    ) -> Result<T, T>
    where
        F: FnMut(T) -> Option<T>,
    {
        let backoff = Backoff::new();
        let mut prev = self.load(fetch_order);
        while let Some(next) = f(prev) {
            let mut observed = prev;
            if self.compare_and_swap_weak(&mut observed, next, set_order, fetch_order) {
                return Ok(prev);
            }
            prev = observed;
            backoff.spin();
        }
        Err(prev)
    }
}

impl<T: AtomicArithmetic> AtomicCell<T> {
    /// Wrapping add, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_add(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_fetch_and_add(&self.inner, value, order)
    }

    /// Wrapping subtract, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_sub(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_fetch_and_sub(&self.inner, value, order)
    }

    /// Wrapping add, returning the new value.
    #[inline(always)]
    pub fn add_and_fetch(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_add_and_fetch(&self.inner, value, order)
    }

    /// Wrapping subtract, returning the new value.
    #[inline(always)]
    pub fn sub_and_fetch(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_sub_and_fetch(&self.inner, value, order)
    }

    /// `SeqCst` wrapping add, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_add_seq_cst(&self, value: T) -> T {
        T::atomic_fetch_and_add_seq_cst(&self.inner, value)
    }

    /// `SeqCst` wrapping subtract, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_sub_seq_cst(&self, value: T) -> T {
        T::atomic_fetch_and_sub_seq_cst(&self.inner, value)
    }

    /// `SeqCst` wrapping add, returning the new value.
    #[inline(always)]
    pub fn add_and_fetch_seq_cst(&self, value: T) -> T {
        T::atomic_add_and_fetch_seq_cst(&self.inner, value)
    }

    /// `SeqCst` wrapping subtract, returning the new value.
    #[inline(always)]
    pub fn sub_and_fetch_seq_cst(&self, value: T) -> T {
        T::atomic_sub_and_fetch_seq_cst(&self.inner, value)
    }
}

impl<T: AtomicBitwise> AtomicCell<T> {
    /// Bitwise AND, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_bit_and(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_fetch_and_bit_and(&self.inner, value, order)
    }

    /// Bitwise OR, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_bit_or(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_fetch_and_bit_or(&self.inner, value, order)
    }

    /// Bitwise XOR, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_bit_xor(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_fetch_and_bit_xor(&self.inner, value, order)
    }

    /// Bitwise AND, returning the new value.
    #[inline(always)]
    pub fn bit_and_and_fetch(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_bit_and_and_fetch(&self.inner, value, order)
    }

    /// Bitwise OR, returning the new value.
    #[inline(always)]
    pub fn bit_or_and_fetch(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_bit_or_and_fetch(&self.inner, value, order)
    }

    /// Bitwise XOR, returning the new value.
    #[inline(always)]
    pub fn bit_xor_and_fetch(&self, value: T, order: MemoryOrder) -> T {
        T::atomic_bit_xor_and_fetch(&self.inner, value, order)
    }

    /// `SeqCst` bitwise AND, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_bit_and_seq_cst(&self, value: T) -> T {
        T::atomic_fetch_and_bit_and_seq_cst(&self.inner, value)
    }

    /// `SeqCst` bitwise OR, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_bit_or_seq_cst(&self, value: T) -> T {
        T::atomic_fetch_and_bit_or_seq_cst(&self.inner, value)
    }

    /// `SeqCst` bitwise XOR, returning the previous value.
    #[inline(always)]
    pub fn fetch_and_bit_xor_seq_cst(&self, value: T) -> T {
        T::atomic_fetch_and_bit_xor_seq_cst(&self.inner, value)
    }

    /// `SeqCst` bitwise AND, returning the new value.
    #[inline(always)]
    pub fn bit_and_and_fetch_seq_cst(&self, value: T) -> T {
        T::atomic_bit_and_and_fetch_seq_cst(&self.inner, value)
    }

    /// `SeqCst` bitwise OR, returning the new value.
    #[inline(always)]
    pub fn bit_or_and_fetch_seq_cst(&self, value: T) -> T {
        T::atomic_bit_or_and_fetch_seq_cst(&self.inner, value)
    }

    /// `SeqCst` bitwise XOR, returning the new value.
    #[inline(always)]
    pub fn bit_xor_and_fetch_seq_cst(&self, value: T) -> T {
        T::atomic_bit_xor_and_fetch_seq_cst(&self.inner, value)
    }
}

macro_rules! impl_assign_op {
    ($bound:ident, $trait:ident, $method:ident, $forward:ident) => {
        impl<T: $bound> $trait<T> for &AtomicCell<T> {
            #[inline(always)]
            fn $method(&mut self, value: T) {
                self.$forward(value);
            }
        }

        impl<T: $bound> $trait<T> for AtomicCell<T> {
            #[inline(always)]
            fn $method(&mut self, value: T) {
                self.$forward(value);
            }
        }

        impl<T: $bound> $trait<&AtomicCell<T>> for &AtomicCell<T> {
            #[inline(always)]
            fn $method(&mut self, rhs: &AtomicCell<T>) {
                self.$forward(rhs.load_seq_cst());
            }
        }

        impl<T: $bound> $trait<&AtomicCell<T>> for AtomicCell<T> {
            #[inline(always)]
            fn $method(&mut self, rhs: &AtomicCell<T>) {
                self.$forward(rhs.load_seq_cst());
            }
        }
    };
}

impl_assign_op!(AtomicArithmetic, AddAssign, add_assign, fetch_and_add_seq_cst);
impl_assign_op!(AtomicArithmetic, SubAssign, sub_assign, fetch_and_sub_seq_cst);
impl_assign_op!(AtomicBitwise, BitAndAssign, bitand_assign, fetch_and_bit_and_seq_cst);
impl_assign_op!(AtomicBitwise, BitOrAssign, bitor_assign, fetch_and_bit_or_seq_cst);
impl_assign_op!(AtomicBitwise, BitXorAssign, bitxor_assign, fetch_and_bit_xor_seq_cst);

impl<T: AtomicScalar + Default> Default for AtomicCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: AtomicScalar> From<T> for AtomicCell<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: AtomicScalar + fmt::Debug> fmt::Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCell")
            .field(&self.load(MemoryOrder::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_aliases_discard_previous_value() {
        let cell = AtomicCell::new(0b1100u8);
        let mut handle = &cell;
        handle |= 0b0011;
        assert_eq!(cell.load_seq_cst(), 0b1111);
        handle &= 0b0110;
        assert_eq!(cell.load_seq_cst(), 0b0110);
        handle ^= 0b0101;
        assert_eq!(cell.load_seq_cst(), 0b0011);
        handle += 255;
        assert_eq!(cell.load_seq_cst(), 0b0010);
        handle -= 3;
        assert_eq!(cell.load_seq_cst(), 255);
    }

    #[test]
    fn cell_operands_are_loaded_first() {
        let total = AtomicCell::new(100u16);
        let step = AtomicCell::new(30u16);
        let mask = AtomicCell::new(0x0F0Fu16);

        let mut handle = &total;
        handle += &step;
        assert_eq!(total.load_seq_cst(), 130);
        handle -= &step;
        assert_eq!(total.load_seq_cst(), 100);
        handle |= &mask;
        assert_eq!(total.load_seq_cst(), 100 | 0x0F0F);
        handle &= &mask;
        assert_eq!(total.load_seq_cst(), 0x0F0F);
        handle ^= &mask;
        assert_eq!(total.load_seq_cst(), 0);

        // A cell may be its own operand through a shared handle.
        total.store_seq_cst(21);
        handle += &total;
        assert_eq!(total.load_seq_cst(), 42);
        // The operand cell is left untouched.
        assert_eq!(step.load_seq_cst(), 30);

        let mut owned = AtomicCell::new(7i32);
        owned -= &AtomicCell::new(10);
        owned ^= &AtomicCell::new(-1);
        assert_eq!(owned.into_inner(), 2);
    }

    #[test]
    fn owned_cell_operators() {
        let mut cell = AtomicCell::new(10i64);
        cell += 5;
        cell -= 20;
        assert_eq!(*cell.get_mut(), -5);
        assert_eq!(cell.into_inner(), -5);
    }

    #[test]
    fn compare_exchange_result_forms() {
        let cell = AtomicCell::new(3usize);
        assert_eq!(cell.compare_exchange(4, 5, MemoryOrder::AcqRel, MemoryOrder::Acquire), Err(3));
        assert_eq!(cell.compare_exchange(3, 5, MemoryOrder::AcqRel, MemoryOrder::Acquire), Ok(3));
        let mut current = cell.load(MemoryOrder::Relaxed);
        loop {
            let (success, failure) = (MemoryOrder::SeqCst, MemoryOrder::Relaxed);
            match cell.compare_exchange_weak(current, current * 2, success, failure) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
        assert_eq!(cell.load_seq_cst(), 10);
    }

    #[test]
    fn fetch_update_declines_and_accepts() {
        let cell = AtomicCell::new(7u32);
        assert_eq!(cell.fetch_update(MemoryOrder::SeqCst, MemoryOrder::SeqCst, |_| None), Err(7));
        assert_eq!(
            cell.fetch_update(MemoryOrder::AcqRel, MemoryOrder::Acquire, |v| Some(v * 3)),
            Ok(7)
        );
        assert_eq!(cell.load_seq_cst(), 21);
    }

    #[test]
    fn debug_and_default() {
        let cell: AtomicCell<bool> = AtomicCell::default();
        assert_eq!(format!("{cell:?}"), "AtomicCell(false)");
        assert!(AtomicCell::<bool>::is_lock_free());
        assert_eq!(AtomicCell::from(9i16).into_inner(), 9);
    }
}
