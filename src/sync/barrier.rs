use std::sync::{Condvar, Mutex};
use thiserror::Error;

/// Error raised when a barrier is constructed with no participants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarrierError {
    #[error("barrier requires at least one participant")]
    ZeroParticipants,
}

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
}

/// Rendezvous point for a fixed set of participants.
///
/// `wait` blocks until all `n` participants have arrived, then releases them
/// together; the barrier then resets for the next cycle. A participant that
/// never arrives deadlocks the rest — callers needing cancellation must wrap
/// the barrier externally.
#[derive(Debug)]
pub struct Barrier {
    participants: usize,
    state: Mutex<BarrierState>,
    cv: Condvar,
}

impl Barrier {
    /// Builds a barrier for exactly `participants` threads.
    pub fn new(participants: usize) -> Result<Self, BarrierError> {
        if participants == 0 {
            return Err(BarrierError::ZeroParticipants);
        }
        Ok(Self {
            participants,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
            }),
            cv: Condvar::new(),
        })
    }

    /// Blocks until all participants have arrived.
    ///
    /// Returns true for the single participant whose arrival released the
    /// group, false for all others.
    pub fn wait(&self) -> bool {
        let mut guard = self.state.lock().unwrap();
        guard.arrived += 1;
        if guard.arrived == self.participants {
            guard.arrived = 0;
            guard.generation = guard.generation.wrapping_add(1);
            self.cv.notify_all();
            return true;
        }
        let generation = guard.generation;
        while guard.generation == generation {
            guard = self.cv.wait(guard).unwrap();
        }
        false
    }

    /// Configured participant count.
    pub fn participants(&self) -> usize {
        self.participants
    }
}
