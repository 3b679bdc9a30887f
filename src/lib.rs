//! Palisade fault-tolerance and consensus core shared by the grid-dispatch
//! and incident-response control planes.
//!
//! Every component is a narrow decision engine: callers supply outcomes,
//! logical timestamps, votes, and delta events, and read back plain state or
//! boolean results. No component reads a wall clock or performs I/O, so all
//! transitions replay deterministically under synthetic time in tests.

pub mod breaker;
pub mod cascade;
pub mod consensus;
pub mod replay;
pub mod retry;
pub mod sync;

pub use breaker::{
    BreakerConfig, BreakerError, BreakerState, BreakerTelemetry, CircuitBreaker,
    BREAKER_OPEN_REASON,
};
pub use cascade::{CascadeDetector, CascadeSignal, CorrelationWindow, CorrelationWindowError};
pub use consensus::election::{
    election_backoff_ms, run_election, CandidateProfile, ElectionError, ElectionResult,
    ElectionTelemetry, VoterProfile, ELECTION_NO_QUORUM_REASON,
};
pub use consensus::{
    count_votes, has_quorum, log_consistency, safe_leader_transfer, validate_vote,
    weighted_quorum, LogCheck, TransferOutcome, Vote, VoteDecision, VoteRequest,
};
pub use replay::{replay_dispatch, DeltaEvent, DispatchSnapshot, ReplayTelemetry};
pub use retry::{RetryConfig, RetryError, RetrySchedule};
pub use sync::{
    parallel_map, parallel_reduce, Barrier, BarrierError, BoundedBuffer, BoundedBufferError,
    ConcurrentSet,
};
