use super::*;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Debug, PartialEq)]
struct Node(u32);

/// Drives epoch collection until `done` holds; deferred releases run once
/// every thread pinned before them has moved on.
fn settle(mut done: impl FnMut() -> bool) {
    for _ in 0..100_000 {
        if done() {
            return;
        }
        epoch::pin().flush();
        thread::yield_now();
    }
    assert!(done(), "deferred releases never ran");
}

#[test]
fn slot_holds_exactly_one_count() {
    let a = Arc::new(Node(1));
    let slot = AtomicOwnedSlot::new(Arc::clone(&a));
    assert_eq!(Arc::strong_count(&a), 2);

    let loaded = slot.load(MemoryOrder::Consume);
    assert!(Arc::ptr_eq(&loaded, &a));
    assert_eq!(Arc::strong_count(&a), 3);
    drop(loaded);

    drop(slot);
    assert_eq!(Arc::strong_count(&a), 1);
}

#[test]
fn store_releases_previous_object() {
    let a = Arc::new(Node(1));
    let b = Arc::new(Node(2));
    let slot = AtomicOwnedSlot::new(Arc::clone(&a));

    for order in MemoryOrder::STORE_ORDERS {
        slot.store(Arc::clone(&b), order);
        assert_eq!(Arc::strong_count(&b), 2, "{order}");
        settle(|| Arc::strong_count(&a) == 1);
        slot.store(Arc::clone(&a), order);
        settle(|| Arc::strong_count(&b) == 1);
    }
    assert!(slot.ptr_eq(&a, MemoryOrder::Relaxed));
}

#[test]
fn exchange_hands_previous_object_to_caller() {
    let a = Arc::new(Node(1));
    let b = Arc::new(Node(2));
    let slot = AtomicOwnedSlot::new(Arc::clone(&a));

    for order in MemoryOrder::ALL {
        let previous = slot.exchange(Arc::clone(&b), order);
        assert!(Arc::ptr_eq(&previous, &a), "{order}");
        assert!(slot.ptr_eq(&b, MemoryOrder::SeqCst));
        // Handle + `previous` once the slot's count is gone.
        settle(|| Arc::strong_count(&a) == 2);
        let previous = slot.exchange(previous, order);
        assert!(Arc::ptr_eq(&previous, &b), "{order}");
        settle(|| Arc::strong_count(&b) == 2);
    }
    assert_eq!(Arc::strong_count(&a), 2);
}

#[test]
fn cas_success_moves_the_slot_count() {
    let a = Arc::new(Node(1));
    let b = Arc::new(Node(2));
    let slot = AtomicOwnedSlot::new(Arc::clone(&a));

    let mut expected = Arc::clone(&a);
    assert!(slot.compare_and_swap_strong(
        &mut expected,
        &b,
        MemoryOrder::AcqRel,
        MemoryOrder::Acquire
    ));
    assert!(Arc::ptr_eq(&expected, &a));
    // test handle + slot.
    assert_eq!(Arc::strong_count(&b), 2);
    // test handle + `expected`; the slot gives up its count.
    settle(|| Arc::strong_count(&a) == 2);
}

#[test]
fn cas_failure_reports_current_object_retained() {
    let a = Arc::new(Node(1));
    let b = Arc::new(Node(2));
    let c = Arc::new(Node(3));
    let slot = AtomicOwnedSlot::new(Arc::clone(&b));

    let mut expected = Arc::clone(&a);
    assert!(!slot.compare_and_swap_strong_with_order(&mut expected, &c, MemoryOrder::Release));
    assert!(Arc::ptr_eq(&expected, &b));
    assert_eq!(Arc::strong_count(&a), 1);
    // test handle + slot + `expected`.
    assert_eq!(Arc::strong_count(&b), 3);
    // The candidate retain was undone.
    assert_eq!(Arc::strong_count(&c), 1);
}

#[test]
fn weak_cas_loop_converges() {
    let slot = AtomicOwnedSlot::new(Arc::new(Node(0)));
    let mut expected = slot.load_seq_cst();
    loop {
        let next = Arc::new(Node(expected.0 + 1));
        if slot.compare_and_swap_weak_with_order(&mut expected, &next, MemoryOrder::AcqRel) {
            break;
        }
    }
    assert_eq!(*slot.load_seq_cst(), Node(1));
}

#[test]
fn into_inner_keeps_the_count() {
    let a = Arc::new(Node(7));
    let slot = AtomicOwnedSlot::from(Arc::clone(&a));
    let inner = slot.into_inner();
    assert!(Arc::ptr_eq(&inner, &a));
    assert_eq!(Arc::strong_count(&a), 2);
}

#[test]
fn readers_never_see_a_released_object() {
    let slot = AtomicOwnedSlot::new(Arc::new(Node(0)));
    let slot = &slot;

    thread::scope(|s| {
        s.spawn(move || {
            for i in 1..2_000 {
                slot.store(Arc::new(Node(i)), MemoryOrder::Release);
            }
        });
        for _ in 0..2 {
            s.spawn(move || {
                let mut last = 0;
                for _ in 0..2_000 {
                    let node = slot.load(MemoryOrder::Acquire);
                    // Single writer publishing increasing values.
                    assert!(node.0 >= last);
                    last = node.0;
                }
            });
        }
    });
    assert_eq!(slot.load_seq_cst().0, 1_999);
}

#[test]
fn stalled_reader_does_not_block_writers() {
    let slot = Arc::new(AtomicOwnedSlot::new(Arc::new(Node(0))));

    // A reader that has read the address but not yet retained it.
    let stalled = epoch::pin();
    let seen = slot.load_ptr(MemoryOrder::Acquire).cast_mut();

    let (finished, wait) = mpsc::channel();
    let writer = Arc::clone(&slot);
    thread::spawn(move || {
        writer.store(Arc::new(Node(1)), MemoryOrder::Release);
        drop(writer.exchange(Arc::new(Node(2)), MemoryOrder::AcqRel));
        let mut expected = writer.load_seq_cst();
        assert!(writer.compare_and_swap_strong_seq_cst(&mut expected, &Arc::new(Node(3))));
        let _ = finished.send(());
    });
    assert!(
        wait.recv_timeout(Duration::from_secs(5)).is_ok(),
        "writer did not finish while a reader was pinned"
    );

    // The replaced object outlives the writer for the late retain.
    // SAFETY: `seen` was published while `stalled` was pinned.
    let late = unsafe { AtomicOwnedSlot::retain_unpublished(seen) };
    assert_eq!(*late, Node(0));
    drop(stalled);
    assert_eq!(*slot.load_seq_cst(), Node(3));
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "illegal memory order for load")]
fn release_load_traps_in_debug() {
    let slot = AtomicOwnedSlot::new(Arc::new(Node(0)));
    let _ = slot.load(MemoryOrder::Release);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "illegal memory order for store")]
fn acquire_store_traps_in_debug() {
    let slot = AtomicOwnedSlot::new(Arc::new(Node(0)));
    slot.store(Arc::new(Node(1)), MemoryOrder::Acquire);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "illegal compare-and-swap orders")]
fn failure_stronger_than_success_traps_in_debug() {
    let slot = AtomicOwnedSlot::new(Arc::new(Node(0)));
    let mut expected = slot.load_seq_cst();
    let _ = slot.compare_and_swap_strong(
        &mut expected,
        &Arc::new(Node(1)),
        MemoryOrder::Relaxed,
        MemoryOrder::SeqCst,
    );
}

#[test]
fn slot_is_send_and_sync_for_shareable_objects() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AtomicOwnedSlot<Node>>();
    assert!(AtomicOwnedSlot::<Node>::is_lock_free());
    assert!(format!("{:?}", AtomicOwnedSlot::<u8>::default()).starts_with("AtomicOwnedSlot"));
}
