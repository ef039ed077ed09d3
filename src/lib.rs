//! # `orderly` - Lock-free atomics with explicit memory ordering
//!
//! Portable building blocks for lock-free shared state: atomic scalars whose
//! every operation names its memory ordering, and an atomically swappable
//! slot owning a reference-counted heap object.
//!
//! ## Components
//!
//! 1. **[`MemoryOrder`]**: the six ordering modes (`Relaxed`, `Consume`,
//!    `Acquire`, `Release`, `AcqRel`, `SeqCst`) and the legality rules per
//!    operation kind.
//!
//! 2. **[`AtomicScalar`]**: the base contract (store, load, exchange, weak and
//!    strong compare-and-swap, lock-freedom query) over `bool`, the 8 to 64-bit
//!    integers, `usize`/`isize` and raw pointers. Each operation has an
//!    explicit-order form and a `SeqCst` form; compare-and-swap also has a
//!    single-order form that derives its failure order.
//!
//! 3. **[`AtomicArithmetic`] / [`AtomicBitwise`]**: wrapping add/sub and
//!    and/or/xor, each as fetch-then-op and op-then-fetch.
//!
//! 4. **[`AtomicCell<T>`]**: a generic wrapper binding one scalar to its
//!    contract, with `+=`, `-=`, `&=`, `|=`, `^=` aliases.
//!
//! 5. **[`AtomicOwnedSlot<T>`]**: holds exactly one strong count on an
//!    `Arc<T>` and replaces it atomically, retaining before every publish and
//!    releasing only after the swap has committed.
//!
//! ## Error model
//!
//! Every operation completes. A failed compare-and-swap is a `false` return,
//! not an error. Illegal orderings (`Release` on a load, a CAS failure order
//! stronger than its success order, ...) are programmer errors and trip a
//! `debug_assert!`.
//!
//! ## Example
//!
//! ```rust
//! use orderly::{AtomicCell, MemoryOrder};
//!
//! let cell = AtomicCell::new(250u8);
//! assert_eq!(cell.fetch_and_add(10, MemoryOrder::AcqRel), 250);
//! assert_eq!(cell.load(MemoryOrder::Acquire), 4);
//!
//! let mut expected = 4;
//! assert!(cell.compare_and_swap_strong_with_order(&mut expected, 5, MemoryOrder::Release));
//! assert_eq!(cell.load_seq_cst(), 5);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod atomic;
pub mod capabilities;
pub mod slot;

pub use atomic::{AtomicArithmetic, AtomicBitwise, AtomicCell, AtomicScalar, MemoryOrder};
pub use capabilities::Capabilities;
pub use slot::AtomicOwnedSlot;

// Compile-time layout assertions.
const _: () = {
    use core::mem;

    // `AtomicCell` is `repr(transparent)` over the native atomic.
    assert!(mem::size_of::<AtomicCell<u8>>() == 1);
    assert!(mem::size_of::<AtomicCell<u16>>() == 2);
    assert!(mem::size_of::<AtomicCell<u32>>() == 4);
    assert!(mem::size_of::<AtomicCell<bool>>() == 1);
    assert!(mem::size_of::<AtomicCell<usize>>() == mem::size_of::<usize>());
    assert!(mem::align_of::<AtomicCell<u16>>() == mem::align_of::<core::sync::atomic::AtomicU16>());

    // The owned slot's address is exactly one pointer.
    assert!(mem::size_of::<AtomicCell<*mut u64>>() == mem::size_of::<*mut u64>());
};
