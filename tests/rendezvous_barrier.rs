use palisade::{Barrier, BarrierError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn releases_all_participants_together() {
    let participants = 6;
    let barrier = Arc::new(Barrier::new(participants).expect("valid barrier"));
    let before = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();
    for _ in 0..participants {
        let barrier = barrier.clone();
        let before = before.clone();
        handles.push(thread::spawn(move || {
            before.fetch_add(1, Ordering::SeqCst);
            barrier.wait();
            // Nobody passes the barrier until every arrival was counted.
            assert_eq!(before.load(Ordering::SeqCst), participants);
        }));
    }
    for handle in handles {
        handle.join().expect("participant finished");
    }
}

#[test]
fn exactly_one_participant_is_the_releaser() {
    let participants = 4;
    let barrier = Arc::new(Barrier::new(participants).expect("valid barrier"));
    let mut handles = Vec::new();
    for _ in 0..participants {
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || barrier.wait()));
    }
    let releasers = handles
        .into_iter()
        .map(|handle| handle.join().expect("participant finished"))
        .filter(|released| *released)
        .count();
    assert_eq!(releasers, 1);
}

#[test]
fn barrier_resets_for_the_next_cycle() {
    let barrier = Arc::new(Barrier::new(2).expect("valid barrier"));
    for _ in 0..3 {
        let other = barrier.clone();
        let handle = thread::spawn(move || other.wait());
        barrier.wait();
        handle.join().expect("participant finished");
    }
}

#[test]
fn single_participant_barrier_never_blocks() {
    let barrier = Barrier::new(1).expect("valid barrier");
    assert!(barrier.wait());
    assert!(barrier.wait());
    assert_eq!(barrier.participants(), 1);
}

#[test]
fn zero_participants_is_rejected_at_construction() {
    assert_eq!(
        Barrier::new(0).unwrap_err(),
        BarrierError::ZeroParticipants
    );
}
