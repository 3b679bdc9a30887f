use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status reason surfaced to callers while the breaker rejects traffic.
pub const BREAKER_OPEN_REASON: &str = "BREAKER_OPEN";

/// Error raised when a breaker is constructed with invalid thresholds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakerError {
    /// Failure threshold must allow at least one failure before opening.
    #[error("failure threshold must be positive")]
    ZeroFailureThreshold,
    /// Half-open probing requires at least one probe.
    #[error("probe limit must be positive")]
    ZeroProbeLimit,
    /// The open state must hold for a positive duration.
    #[error("timeout must be positive")]
    ZeroTimeout,
}

/// Per-dependency breaker thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures required to trip the breaker.
    pub failure_threshold: u32,
    /// Consecutive successful probes required to close again.
    pub probe_limit: u32,
    /// How long the breaker stays open before probing, in logical ms.
    pub timeout_ms: u64,
}

impl BreakerConfig {
    fn validate(&self) -> Result<(), BreakerError> {
        if self.failure_threshold == 0 {
            return Err(BreakerError::ZeroFailureThreshold);
        }
        if self.probe_limit == 0 {
            return Err(BreakerError::ZeroProbeLimit);
        }
        if self.timeout_ms == 0 {
            return Err(BreakerError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Health states of a monitored dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    /// Canonical lowercase label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

/// Counters exported so operators can audit breaker churn.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BreakerTelemetry {
    opened_total: u64,
    closed_total: u64,
    probe_failures_total: u64,
    rejected_total: u64,
}

impl BreakerTelemetry {
    /// Number of closed→open transitions.
    pub fn opened_total(&self) -> u64 {
        self.opened_total
    }

    /// Number of half-open→closed recoveries.
    pub fn closed_total(&self) -> u64 {
        self.closed_total
    }

    /// Number of half-open→open reopens caused by a failed probe.
    pub fn probe_failures_total(&self) -> u64 {
        self.probe_failures_total
    }

    /// Number of requests rejected while open.
    pub fn rejected_total(&self) -> u64 {
        self.rejected_total
    }

    /// Metric lines emitted to `/metrics`.
    pub fn render_metrics(&self) -> String {
        format!(
            "palisade_breaker_opened_total {}\npalisade_breaker_closed_total {}\npalisade_breaker_probe_failures_total {}\npalisade_breaker_rejected_total {}\n",
            self.opened_total, self.closed_total, self.probe_failures_total, self.rejected_total
        )
    }
}

/// Per-dependency circuit breaker driven by caller-reported outcomes.
///
/// All timestamps are caller-supplied logical milliseconds; the open state is
/// re-evaluated lazily on the next call rather than by a background timer.
/// Timestamps that regress below a previously observed value are clamped so
/// the open window never runs backwards.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: BreakerState,
    failure_count: u32,
    probe_success_count: u32,
    opened_at_ms: u64,
    last_seen_ms: u64,
    telemetry: BreakerTelemetry,
}

impl CircuitBreaker {
    /// Builds a closed breaker, rejecting non-positive thresholds up front.
    pub fn new(config: BreakerConfig) -> Result<Self, BreakerError> {
        config.validate()?;
        Ok(Self {
            config,
            state: BreakerState::Closed,
            failure_count: 0,
            probe_success_count: 0,
            opened_at_ms: 0,
            last_seen_ms: 0,
            telemetry: BreakerTelemetry::default(),
        })
    }

    /// Records a call outcome and applies any resulting transition.
    pub fn record_result(&mut self, success: bool, timestamp_ms: u64) {
        let now_ms = self.clamp_timestamp(timestamp_ms);
        self.maybe_begin_probing(now_ms);
        match self.state {
            BreakerState::Closed => {
                if success {
                    self.failure_count = 0;
                    return;
                }
                self.failure_count = self.failure_count.saturating_add(1);
                if self.failure_count >= self.config.failure_threshold {
                    self.trip_open(now_ms, "failure_threshold");
                }
            }
            // Still inside the open window: outcomes carry no state weight.
            BreakerState::Open => {}
            BreakerState::HalfOpen => {
                if success {
                    self.probe_success_count = self.probe_success_count.saturating_add(1);
                    if self.probe_success_count >= self.config.probe_limit {
                        self.close(now_ms);
                    }
                    return;
                }
                // A single failed probe reopens regardless of prior probes.
                self.telemetry.probe_failures_total =
                    self.telemetry.probe_failures_total.saturating_add(1);
                self.trip_open(now_ms, "failed_probe");
            }
        }
    }

    /// Returns whether a request may proceed at the given timestamp.
    ///
    /// True while closed or half-open; while open, true only once the timeout
    /// has elapsed, which also moves the breaker into half-open so the caller
    /// can issue a probe.
    pub fn allow_request(&mut self, timestamp_ms: u64) -> bool {
        let now_ms = self.clamp_timestamp(timestamp_ms);
        self.maybe_begin_probing(now_ms);
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                self.telemetry.rejected_total = self.telemetry.rejected_total.saturating_add(1);
                false
            }
        }
    }

    /// Current breaker state.
    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// Consecutive failures observed while closed.
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Successful probes observed while half-open.
    pub fn probe_success_count(&self) -> u32 {
        self.probe_success_count
    }

    /// Exported transition counters.
    pub fn telemetry(&self) -> &BreakerTelemetry {
        &self.telemetry
    }

    fn clamp_timestamp(&mut self, timestamp_ms: u64) -> u64 {
        let now_ms = timestamp_ms.max(self.last_seen_ms);
        self.last_seen_ms = now_ms;
        now_ms
    }

    fn maybe_begin_probing(&mut self, now_ms: u64) {
        if self.state != BreakerState::Open {
            return;
        }
        if now_ms.saturating_sub(self.opened_at_ms) >= self.config.timeout_ms {
            self.state = BreakerState::HalfOpen;
            self.failure_count = 0;
            self.probe_success_count = 0;
            info!(
                "event=breaker_transition next=half_open opened_at_ms={} at_ms={}",
                self.opened_at_ms, now_ms
            );
        }
    }

    fn trip_open(&mut self, now_ms: u64, cause: &str) {
        let prev = self.state;
        self.state = BreakerState::Open;
        self.opened_at_ms = now_ms;
        self.failure_count = 0;
        self.probe_success_count = 0;
        self.telemetry.opened_total = self.telemetry.opened_total.saturating_add(1);
        warn!(
            "event=breaker_transition prev={} next=open cause={} reason={} at_ms={}",
            prev.as_str(),
            cause,
            BREAKER_OPEN_REASON,
            now_ms
        );
    }

    fn close(&mut self, now_ms: u64) {
        self.state = BreakerState::Closed;
        self.failure_count = 0;
        self.probe_success_count = 0;
        self.telemetry.closed_total = self.telemetry.closed_total.saturating_add(1);
        info!(
            "event=breaker_transition prev=half_open next=closed at_ms={}",
            now_ms
        );
    }
}
