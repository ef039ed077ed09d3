//! Hardware atomic backend.
//!
//! Every contract operation bottoms out here. The backend is implemented for
//! the `core::sync::atomic` types, which lower to the target's native atomic
//! instructions. Widths the target cannot do atomically are not compiled at
//! all (`cfg(target_has_atomic)`), so every backend that exists is lock-free.
//!
//! The traits are sealed: the contract layer relies on each implementation
//! being a genuine single-location atomic.

use core::sync::atomic::{
    AtomicBool, AtomicI16, AtomicI32, AtomicI8, AtomicIsize, AtomicPtr, AtomicU16, AtomicU32,
    AtomicU8, AtomicUsize, Ordering,
};
#[cfg(target_has_atomic = "64")]
use core::sync::atomic::{AtomicI64, AtomicU64};

mod sealed {
    pub trait Sealed {}
}

/// Native atomic storage for one scalar width.
pub trait AtomicBackend: sealed::Sealed + Send + Sync {
    /// The plain scalar stored in this location.
    type Value: Copy;

    /// `true` if the operations never fall back to a lock on this target.
    const IS_LOCK_FREE: bool;

    /// Creates the location holding `value`.
    fn new(value: Self::Value) -> Self;

    /// Consumes the location, returning the stored value.
    fn into_inner(self) -> Self::Value;

    /// Mutable access through exclusive ownership.
    fn get_mut(&mut self) -> &mut Self::Value;

    /// Atomic store.
    fn store(&self, value: Self::Value, order: Ordering);

    /// Atomic load.
    fn load(&self, order: Ordering) -> Self::Value;

    /// Atomic exchange, returning the previous value.
    fn swap(&self, value: Self::Value, order: Ordering) -> Self::Value;

    /// Strong compare-exchange. Never fails spuriously.
    fn compare_exchange(
        &self,
        current: Self::Value,
        new: Self::Value,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Value, Self::Value>;

    /// Weak compare-exchange. May fail spuriously.
    fn compare_exchange_weak(
        &self,
        current: Self::Value,
        new: Self::Value,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Value, Self::Value>;
}

/// Wrapping fetch-and-add / fetch-and-sub.
pub trait ArithmeticBackend: AtomicBackend {
    /// Adds with wraparound, returning the previous value.
    fn fetch_add(&self, value: Self::Value, order: Ordering) -> Self::Value;

    /// Subtracts with wraparound, returning the previous value.
    fn fetch_sub(&self, value: Self::Value, order: Ordering) -> Self::Value;
}

/// Fetch-and-and / or / xor.
pub trait BitwiseBackend: AtomicBackend {
    /// Bitwise AND, returning the previous value.
    fn fetch_and(&self, value: Self::Value, order: Ordering) -> Self::Value;

    /// Bitwise OR, returning the previous value.
    fn fetch_or(&self, value: Self::Value, order: Ordering) -> Self::Value;

    /// Bitwise XOR, returning the previous value.
    fn fetch_xor(&self, value: Self::Value, order: Ordering) -> Self::Value;
}

macro_rules! impl_base_backend {
    ($atomic:ty, $value:ty, $width:tt) => {
        impl sealed::Sealed for $atomic {}

        impl AtomicBackend for $atomic {
            type Value = $value;

            const IS_LOCK_FREE: bool = cfg!(target_has_atomic = $width);

            #[inline(always)]
            fn new(value: $value) -> Self {
                <$atomic>::new(value)
            }

            #[inline(always)]
            fn into_inner(self) -> $value {
                <$atomic>::into_inner(self)
            }

            #[inline(always)]
            fn get_mut(&mut self) -> &mut $value {
                <$atomic>::get_mut(self)
            }

            #[inline(always)]
            fn store(&self, value: $value, order: Ordering) {
                <$atomic>::store(self, value, order);
            }

            #[inline(always)]
            fn load(&self, order: Ordering) -> $value {
                <$atomic>::load(self, order)
            }

            #[inline(always)]
            fn swap(&self, value: $value, order: Ordering) -> $value {
                <$atomic>::swap(self, value, order)
            }

            #[inline(always)]
            fn compare_exchange(
                &self,
                current: $value,
                new: $value,
                success: Ordering,
                failure: Ordering,
            ) -> Result<$value, $value> {
                <$atomic>::compare_exchange(self, current, new, success, failure)
            }

            #[inline(always)]
            fn compare_exchange_weak(
                &self,
                current: $value,
                new: $value,
                success: Ordering,
                failure: Ordering,
            ) -> Result<$value, $value> {
                <$atomic>::compare_exchange_weak(self, current, new, success, failure)
            }
        }
    };
}

macro_rules! impl_integer_backend {
    ($($atomic:ty => $value:ty, $width:tt;)*) => {$(
        impl_base_backend!($atomic, $value, $width);

        impl ArithmeticBackend for $atomic {
            #[inline(always)]
            fn fetch_add(&self, value: $value, order: Ordering) -> $value {
                <$atomic>::fetch_add(self, value, order)
            }

            #[inline(always)]
            fn fetch_sub(&self, value: $value, order: Ordering) -> $value {
                <$atomic>::fetch_sub(self, value, order)
            }
        }

        impl BitwiseBackend for $atomic {
            #[inline(always)]
            fn fetch_and(&self, value: $value, order: Ordering) -> $value {
                <$atomic>::fetch_and(self, value, order)
            }

            #[inline(always)]
            fn fetch_or(&self, value: $value, order: Ordering) -> $value {
                <$atomic>::fetch_or(self, value, order)
            }

            #[inline(always)]
            fn fetch_xor(&self, value: $value, order: Ordering) -> $value {
                <$atomic>::fetch_xor(self, value, order)
            }
        }
    )*};
}

impl_base_backend!(AtomicBool, bool, "8");

impl_integer_backend! {
    AtomicU8 => u8, "8";
    AtomicI8 => i8, "8";
    AtomicU16 => u16, "16";
    AtomicI16 => i16, "16";
    AtomicU32 => u32, "32";
    AtomicI32 => i32, "32";
    AtomicUsize => usize, "ptr";
    AtomicIsize => isize, "ptr";
}

#[cfg(target_has_atomic = "64")]
impl_integer_backend! {
    AtomicU64 => u64, "64";
    AtomicI64 => i64, "64";
}

impl<T> sealed::Sealed for AtomicPtr<T> {}

impl<T> AtomicBackend for AtomicPtr<T> {
    type Value = *mut T;

    const IS_LOCK_FREE: bool = cfg!(target_has_atomic = "ptr");

    #[inline(always)]
    fn new(value: *mut T) -> Self {
        AtomicPtr::new(value)
    }

    #[inline(always)]
    fn into_inner(self) -> *mut T {
        AtomicPtr::into_inner(self)
    }

    #[inline(always)]
    fn get_mut(&mut self) -> &mut *mut T {
        AtomicPtr::get_mut(self)
    }

    #[inline(always)]
    fn store(&self, value: *mut T, order: Ordering) {
        AtomicPtr::store(self, value, order);
    }

    #[inline(always)]
    fn load(&self, order: Ordering) -> *mut T {
        AtomicPtr::load(self, order)
    }

    #[inline(always)]
    fn swap(&self, value: *mut T, order: Ordering) -> *mut T {
        AtomicPtr::swap(self, value, order)
    }

    #[inline(always)]
    fn compare_exchange(
        &self,
        current: *mut T,
        new: *mut T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<*mut T, *mut T> {
        AtomicPtr::compare_exchange(self, current, new, success, failure)
    }

    #[inline(always)]
    fn compare_exchange_weak(
        &self,
        current: *mut T,
        new: *mut T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<*mut T, *mut T> {
        AtomicPtr::compare_exchange_weak(self, current, new, success, failure)
    }
}
