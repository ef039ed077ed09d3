//! Lock-free atomic scalars with explicit memory ordering.
//!
//! Layering, leaves first:
//! - [`order`]: the six ordering modes and which operations accept which;
//! - [`backend`]: the native atomic instructions, one implementation per width;
//! - [`contract`]: [`AtomicScalar`], the base operation set over a backend;
//! - [`arithmetic`] / [`bitwise`]: fetch-and-op extensions for integers;
//! - [`cell`]: [`AtomicCell<T>`], the ergonomic wrapper.
//!
//! Capabilities compose as trait bounds, so generic code asks for exactly
//! what it uses:
//!
//! ```rust
//! use orderly::{AtomicArithmetic, AtomicCell, MemoryOrder};
//!
//! fn bump<T: AtomicArithmetic + From<u8>>(counter: &AtomicCell<T>) -> T {
//!     counter.add_and_fetch(T::from(1), MemoryOrder::Relaxed)
//! }
//!
//! let c = AtomicCell::new(u8::MAX);
//! assert_eq!(bump(&c), 0);
//! ```

pub mod arithmetic;
pub mod backend;
pub mod bitwise;
pub mod cell;
pub mod contract;
pub mod order;

pub use arithmetic::AtomicArithmetic;
pub use backend::{ArithmeticBackend, AtomicBackend, BitwiseBackend};
pub use bitwise::AtomicBitwise;
pub use cell::AtomicCell;
pub use contract::AtomicScalar;
pub use order::MemoryOrder;
