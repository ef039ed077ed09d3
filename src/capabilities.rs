//! Process-wide report of the target's atomic capabilities.
//!
//! Computed once, on first use, and immutable afterwards.

use std::sync::OnceLock;

use serde::Serialize;

use crate::atomic::AtomicScalar;

/// Lock-freedom of every supported width on the running target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Target architecture (`x86_64`, `aarch64`, ...).
    pub arch: &'static str,
    /// Pointer width in bits.
    pub pointer_width: u32,
    /// Per-width lock-freedom, narrowest first.
    pub lock_free: LockFreedom,
}

/// `true` for each width whose operations never fall back to a lock.
///
/// A width missing on the target (no native atomics) reports `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockFreedom {
    /// `bool`.
    pub bool: bool,
    /// `u8` / `i8`.
    pub int8: bool,
    /// `u16` / `i16`.
    pub int16: bool,
    /// `u32` / `i32`.
    pub int32: bool,
    /// `u64` / `i64`.
    pub int64: bool,
    /// Raw pointers, `usize` and `isize`.
    pub pointer: bool,
}

static CURRENT: OnceLock<Capabilities> = OnceLock::new();

impl Capabilities {
    /// The report for this process, initialised on first call.
    pub fn current() -> &'static Capabilities {
        CURRENT.get_or_init(Self::detect)
    }

    fn detect() -> Self {
        let caps = Self {
            arch: std::env::consts::ARCH,
            pointer_width: usize::BITS,
            lock_free: LockFreedom {
                bool: bool::is_lock_free(),
                int8: u8::is_lock_free(),
                int16: u16::is_lock_free(),
                int32: u32::is_lock_free(),
                int64: int64_lock_free(),
                pointer: <*mut ()>::is_lock_free(),
            },
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(?caps, "atomic capabilities detected");
        caps
    }

    /// `true` if every width is lock-free.
    pub fn all_lock_free(&self) -> bool {
        let l = self.lock_free;
        l.bool && l.int8 && l.int16 && l.int32 && l.int64 && l.pointer
    }

    /// Pretty-printed JSON rendering of the report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(target_has_atomic = "64")]
fn int64_lock_free() -> bool {
    u64::is_lock_free()
}

#[cfg(not(target_has_atomic = "64"))]
fn int64_lock_free() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_is_initialised_once() {
        let first = Capabilities::current();
        let second = Capabilities::current();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.pointer_width as usize, core::mem::size_of::<usize>() * 8);
    }

    #[test]
    fn json_names_every_width() {
        let json = Capabilities::current().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["bool", "int8", "int16", "int32", "int64", "pointer"] {
            assert!(value["lock_free"][key].is_boolean(), "{key}");
        }
        assert_eq!(value["arch"], std::env::consts::ARCH);
    }

    #[test]
    fn common_targets_are_fully_lock_free() {
        if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
            assert!(Capabilities::current().all_lock_free());
        }
    }
}
