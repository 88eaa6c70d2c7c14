use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tdl_core::uid::{UidLease, INBOX_UID, ROOT_FOLDER_UID};
use tdl_core::{UidAllocator, UidError, UidSource};

#[test]
fn sequential_mode_counts_from_one() {
    let ids = UidAllocator::sequential();
    assert_eq!(ids.next_uid().unwrap(), 1);
    assert_eq!(ids.next_uid().unwrap(), 2);
    assert_eq!(ids.next_uid().unwrap(), 3);
}

#[test]
fn registering_an_issued_uid_is_a_duplicate() {
    let ids = UidAllocator::sequential();
    ids.next_uid().unwrap();
    ids.next_uid().unwrap();

    assert_eq!(ids.note_existing_uid(2), Err(UidError::Duplicate(2)));
    assert_eq!(ids.note_existing_uid(0), Err(UidError::Zero));
}

#[test]
fn sequential_mode_runs_out_at_the_top_of_the_range() {
    let ids = UidAllocator::sequential();
    ids.note_existing_uid(i64::MAX - 1).unwrap();

    assert_eq!(ids.next_uid().unwrap(), i64::MAX);
    assert_eq!(ids.next_uid(), Err(UidError::Exhausted));
}

#[test]
fn sequential_mode_continues_after_registered_uids() {
    let ids = UidAllocator::sequential();
    ids.note_existing_uid(-40).unwrap();
    assert_eq!(ids.next_uid().unwrap(), 1);
    ids.note_existing_uid(41).unwrap();
    assert_eq!(ids.next_uid().unwrap(), 42);
}

#[test]
fn random_mode_skips_reserved_uids_and_never_repeats() {
    let ids = UidAllocator::random();
    let mut drawn = HashSet::new();
    for _ in 0..2_000 {
        let uid = ids.next_uid().unwrap();
        assert!(![0, INBOX_UID, ROOT_FOLDER_UID].contains(&uid));
        assert!(drawn.insert(uid));
    }
    assert_eq!(ids.len(), 2_000);
}

#[test]
fn allocator_is_shareable_across_threads() {
    let ids = Arc::new(UidAllocator::random());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ids = Arc::clone(&ids);
            thread::spawn(move || (0..250).map(|_| ids.next_uid().unwrap()).collect::<Vec<_>>())
        })
        .collect();
    let mut all = HashSet::new();
    for handle in handles {
        for uid in handle.join().unwrap() {
            assert!(all.insert(uid));
        }
    }
    assert_eq!(all.len(), 1_000);
}

#[test]
fn reset_forgets_everything() {
    let ids = UidAllocator::sequential();
    ids.next_uid().unwrap();
    ids.reset();
    assert!(ids.is_empty());
    assert_eq!(ids.next_uid().unwrap(), 1);
}

#[test]
fn replay_lease_hands_back_recorded_uids() {
    let ids = UidAllocator::random();
    let fresh = UidLease::fresh(&ids);
    let first = fresh.next_uid().unwrap();
    let second = fresh.next_uid().unwrap();
    let recorded = fresh.into_issued();
    assert_eq!(recorded, vec![first, second]);

    ids.reset();
    let replay = UidLease::replay(&ids, &recorded);
    assert!(replay.is_replay());
    assert_eq!(replay.next_uid().unwrap(), first);
    assert_eq!(replay.next_uid().unwrap(), second);
    assert_eq!(replay.next_uid(), Err(UidError::ReplayExhausted));
    assert!(ids.is_registered(first));
}
