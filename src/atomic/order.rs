//! Memory ordering modes and their per-operation legality rules.
//!
//! The six modes mirror the C++20 memory model. Each atomic operation kind
//! accepts only a subset of them:
//!
//! | operation | legal orders |
//! |---|---|
//! | store | `Relaxed`, `Release`, `SeqCst` |
//! | load | `Relaxed`, `Consume`, `Acquire`, `SeqCst` |
//! | exchange / fetch-and-op | all six |
//! | CAS success | all six |
//! | CAS failure | a load order no stronger than the success order |
//!
//! Illegal combinations are programmer errors. They are caught by
//! `debug_assert!` in the contract layer and are never rewritten into legal
//! ones.

use core::fmt;
use core::sync::atomic::Ordering;

use serde::Serialize;

/// Ordering strength requested for a single atomic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryOrder {
    /// No ordering constraints, only atomicity.
    Relaxed,
    /// Data-dependency ordering for loads.
    ///
    /// Rust exposes no consume ordering; the backend strengthens it to
    /// [`Ordering::Acquire`].
    Consume,
    /// Later reads and writes cannot move before this load.
    Acquire,
    /// Earlier reads and writes cannot move after this store.
    Release,
    /// Both `Acquire` and `Release`, for read-modify-write operations.
    AcqRel,
    /// `AcqRel` plus participation in a single global total order.
    #[default]
    SeqCst,
}

impl MemoryOrder {
    /// Every ordering mode, weakest first.
    pub const ALL: [Self; 6] = [
        Self::Relaxed,
        Self::Consume,
        Self::Acquire,
        Self::Release,
        Self::AcqRel,
        Self::SeqCst,
    ];

    /// Orders accepted by `store`.
    pub const STORE_ORDERS: [Self; 3] = [Self::Relaxed, Self::Release, Self::SeqCst];

    /// Orders accepted by `load`.
    pub const LOAD_ORDERS: [Self; 4] = [Self::Relaxed, Self::Consume, Self::Acquire, Self::SeqCst];

    /// Maps onto the native ordering constant.
    #[inline(always)]
    pub const fn to_std(self) -> Ordering {
        match self {
            Self::Relaxed => Ordering::Relaxed,
            Self::Consume | Self::Acquire => Ordering::Acquire,
            Self::Release => Ordering::Release,
            Self::AcqRel => Ordering::AcqRel,
            Self::SeqCst => Ordering::SeqCst,
        }
    }

    /// Returns `true` if this order may be used for a plain store.
    #[inline]
    pub const fn is_valid_for_store(self) -> bool {
        matches!(self, Self::Relaxed | Self::Release | Self::SeqCst)
    }

    /// Returns `true` if this order may be used for a plain load.
    #[inline]
    pub const fn is_valid_for_load(self) -> bool {
        matches!(self, Self::Relaxed | Self::Consume | Self::Acquire | Self::SeqCst)
    }

    /// Returns `true` if `self` is a legal failure order for a
    /// compare-and-swap whose success order is `success`.
    ///
    /// The failure path only loads, so `self` must be a load order and must
    /// not be stronger than the load half of `success`.
    #[inline]
    pub const fn is_valid_cas_failure(self, success: Self) -> bool {
        self.is_valid_for_load() && self.load_strength() <= success.load_strength()
    }

    /// Derives the failure order used by the single-order CAS forms.
    ///
    /// `Release` becomes `Relaxed` and `AcqRel` becomes `Acquire`; every other
    /// order is returned unchanged.
    #[inline]
    pub const fn cas_failure_order(self) -> Self {
        match self {
            Self::Release => Self::Relaxed,
            Self::AcqRel => Self::Acquire,
            other => other,
        }
    }

    /// The weakest order at least as strong as `self` that also releases.
    #[inline]
    pub const fn with_release(self) -> Self {
        match self {
            Self::Relaxed | Self::Release => Self::Release,
            Self::Consume | Self::Acquire | Self::AcqRel => Self::AcqRel,
            Self::SeqCst => Self::SeqCst,
        }
    }

    /// The weakest order at least as strong as `self` that also acquires.
    #[inline]
    pub const fn with_acquire(self) -> Self {
        match self {
            Self::Relaxed | Self::Consume | Self::Acquire => Self::Acquire,
            Self::Release | Self::AcqRel => Self::AcqRel,
            Self::SeqCst => Self::SeqCst,
        }
    }

    /// Strength of the acquire side of this order.
    const fn load_strength(self) -> u8 {
        match self {
            Self::Relaxed | Self::Release => 0,
            Self::Consume => 1,
            Self::Acquire | Self::AcqRel => 2,
            Self::SeqCst => 3,
        }
    }

    /// Lower-case name of the order.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Consume => "consume",
            Self::Acquire => "acquire",
            Self::Release => "release",
            Self::AcqRel => "acq_rel",
            Self::SeqCst => "seq_cst",
        }
    }
}

impl fmt::Display for MemoryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MemoryOrder> for Ordering {
    #[inline(always)]
    fn from(order: MemoryOrder) -> Self {
        order.to_std()
    }
}

/// Debug-build check for store orders.
#[inline(always)]
pub(crate) fn check_store(order: MemoryOrder) {
    debug_assert!(order.is_valid_for_store(), "illegal memory order for store: {order}");
}

/// Debug-build check for load orders.
#[inline(always)]
pub(crate) fn check_load(order: MemoryOrder) {
    debug_assert!(order.is_valid_for_load(), "illegal memory order for load: {order}");
}

/// Debug-build check for a compare-and-swap order pair.
#[inline(always)]
pub(crate) fn check_cas(success: MemoryOrder, failure: MemoryOrder) {
    debug_assert!(
        failure.is_valid_cas_failure(success),
        "illegal compare-and-swap orders: success {success}, failure {failure}"
    );
}

/// `proptest` strategies over legal orders.
#[cfg(any(test, feature = "proptest"))]
pub mod strategy {
    use super::MemoryOrder;
    use proptest::prelude::*;

    /// Any of the six orders.
    pub fn any_order() -> impl Strategy<Value = MemoryOrder> {
        proptest::sample::select(MemoryOrder::ALL.to_vec())
    }

    /// Orders legal for `store`.
    pub fn store_order() -> impl Strategy<Value = MemoryOrder> {
        proptest::sample::select(MemoryOrder::STORE_ORDERS.to_vec())
    }

    /// Orders legal for `load`.
    pub fn load_order() -> impl Strategy<Value = MemoryOrder> {
        proptest::sample::select(MemoryOrder::LOAD_ORDERS.to_vec())
    }

    /// Legal `(success, failure)` pairs for compare-and-swap.
    pub fn cas_orders() -> impl Strategy<Value = (MemoryOrder, MemoryOrder)> {
        let pairs: Vec<_> = MemoryOrder::ALL
            .iter()
            .flat_map(|&s| {
                MemoryOrder::ALL
                    .iter()
                    .filter(move |f| f.is_valid_cas_failure(s))
                    .map(move |&f| (s, f))
            })
            .collect();
        proptest::sample::select(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_load_sets_are_disjoint_except_relaxed_and_seq_cst() {
        for order in MemoryOrder::ALL {
            let both = order.is_valid_for_store() && order.is_valid_for_load();
            assert_eq!(both, matches!(order, MemoryOrder::Relaxed | MemoryOrder::SeqCst));
        }
        assert!(!MemoryOrder::AcqRel.is_valid_for_store());
        assert!(!MemoryOrder::AcqRel.is_valid_for_load());
    }

    #[test]
    fn single_order_downgrade() {
        use MemoryOrder::*;
        assert_eq!(Relaxed.cas_failure_order(), Relaxed);
        assert_eq!(Consume.cas_failure_order(), Consume);
        assert_eq!(Acquire.cas_failure_order(), Acquire);
        assert_eq!(Release.cas_failure_order(), Relaxed);
        assert_eq!(AcqRel.cas_failure_order(), Acquire);
        assert_eq!(SeqCst.cas_failure_order(), SeqCst);

        // The derived pair is always legal.
        for order in MemoryOrder::ALL {
            assert!(order.cas_failure_order().is_valid_cas_failure(order), "{order}");
        }
    }

    #[test]
    fn failure_order_rules() {
        use MemoryOrder::*;
        assert!(Relaxed.is_valid_cas_failure(Release));
        assert!(Acquire.is_valid_cas_failure(AcqRel));
        assert!(SeqCst.is_valid_cas_failure(SeqCst));
        assert!(!Release.is_valid_cas_failure(SeqCst));
        assert!(!AcqRel.is_valid_cas_failure(SeqCst));
        assert!(!SeqCst.is_valid_cas_failure(Acquire));
        assert!(!Acquire.is_valid_cas_failure(Relaxed));
    }

    #[test]
    fn strengthening_never_weakens() {
        for order in MemoryOrder::ALL {
            let released = order.with_release();
            let acquired = order.with_acquire();
            assert!(matches!(
                released,
                MemoryOrder::Release | MemoryOrder::AcqRel | MemoryOrder::SeqCst
            ));
            assert!(acquired.load_strength() >= order.load_strength().max(2), "{order}");
            assert_eq!(order == MemoryOrder::SeqCst, released == MemoryOrder::SeqCst);
        }
        assert_eq!(MemoryOrder::Relaxed.with_release().with_acquire(), MemoryOrder::AcqRel);
    }

    #[test]
    fn std_mapping() {
        assert_eq!(MemoryOrder::Consume.to_std(), Ordering::Acquire);
        assert_eq!(Ordering::from(MemoryOrder::AcqRel), Ordering::AcqRel);
        assert_eq!(MemoryOrder::default(), MemoryOrder::SeqCst);
        assert_eq!(MemoryOrder::AcqRel.to_string(), "acq_rel");
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&MemoryOrder::SeqCst).unwrap();
        assert_eq!(json, "\"seq_cst\"");
    }
}
