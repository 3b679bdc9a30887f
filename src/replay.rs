use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Versioned delta record carried in a dispatch event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaEvent {
    pub version: u64,
    pub idempotency_key: String,
    pub generation_delta: i64,
    pub reserve_delta: i64,
}

impl DeltaEvent {
    pub fn new(
        version: u64,
        idempotency_key: impl Into<String>,
        generation_delta: i64,
        reserve_delta: i64,
    ) -> Self {
        Self {
            version,
            idempotency_key: idempotency_key.into(),
            generation_delta,
            reserve_delta,
        }
    }
}

/// Authoritative dispatch state reconstructed from an event log.
///
/// A pure function of `(base values, event list)`, never a mutable store:
/// each idempotency key contributes to the accumulated deltas at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSnapshot {
    pub base_generation: i64,
    pub base_reserve: i64,
    pub generation_delta: i64,
    pub reserve_delta: i64,
    /// Events actually applied (duplicates excluded).
    pub applied_count: usize,
    pub duplicates_skipped: usize,
    /// Highest version among applied events, zero for an empty log.
    pub last_version: u64,
    applied_keys: BTreeSet<String>,
}

impl DispatchSnapshot {
    /// Final generation value: base plus the sum of unique deltas.
    pub fn generation(&self) -> i64 {
        self.base_generation.saturating_add(self.generation_delta)
    }

    /// Final reserve value: base plus the sum of unique deltas.
    pub fn reserve(&self) -> i64 {
        self.base_reserve.saturating_add(self.reserve_delta)
    }

    /// Whether an idempotency key contributed to this snapshot.
    pub fn was_applied(&self, idempotency_key: &str) -> bool {
        self.applied_keys.contains(idempotency_key)
    }

    /// Keys applied during the replay, in sorted order.
    pub fn applied_keys(&self) -> impl Iterator<Item = &str> {
        self.applied_keys.iter().map(String::as_str)
    }
}

/// Deterministically rebuilds a dispatch snapshot from a delta event log.
///
/// Events are applied in input order; an event whose idempotency key was
/// already applied is skipped, so replaying a log with duplicates yields the
/// same snapshot as replaying it without them.
pub fn replay_dispatch(
    base_generation: i64,
    base_reserve: i64,
    events: &[DeltaEvent],
) -> DispatchSnapshot {
    let mut snapshot = DispatchSnapshot {
        base_generation,
        base_reserve,
        generation_delta: 0,
        reserve_delta: 0,
        applied_count: 0,
        duplicates_skipped: 0,
        last_version: 0,
        applied_keys: BTreeSet::new(),
    };
    for event in events {
        if !snapshot.applied_keys.insert(event.idempotency_key.clone()) {
            snapshot.duplicates_skipped += 1;
            continue;
        }
        snapshot.generation_delta = snapshot
            .generation_delta
            .saturating_add(event.generation_delta);
        snapshot.reserve_delta = snapshot.reserve_delta.saturating_add(event.reserve_delta);
        snapshot.applied_count += 1;
        snapshot.last_version = snapshot.last_version.max(event.version);
    }
    snapshot
}

/// Counters recorded by callers after each replay, exported to `/metrics`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayTelemetry {
    replays_total: u64,
    applied_total: u64,
    duplicates_total: u64,
}

impl ReplayTelemetry {
    /// Folds one replay outcome into the counters.
    pub fn record(&mut self, snapshot: &DispatchSnapshot) {
        self.replays_total = self.replays_total.saturating_add(1);
        self.applied_total = self
            .applied_total
            .saturating_add(snapshot.applied_count as u64);
        self.duplicates_total = self
            .duplicates_total
            .saturating_add(snapshot.duplicates_skipped as u64);
    }

    pub fn replays_total(&self) -> u64 {
        self.replays_total
    }

    pub fn applied_total(&self) -> u64 {
        self.applied_total
    }

    pub fn duplicates_total(&self) -> u64 {
        self.duplicates_total
    }

    /// Metric lines emitted to `/metrics`.
    pub fn render_metrics(&self) -> String {
        format!(
            "palisade_replay_total {}\npalisade_replay_applied_total {}\npalisade_replay_duplicates_total {}\n",
            self.replays_total, self.applied_total, self.duplicates_total
        )
    }
}
