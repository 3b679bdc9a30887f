use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error raised when a correlation window is built with invalid bounds.
#[derive(Debug, Error, PartialEq)]
pub enum CorrelationWindowError {
    /// A zero-width window can never contain an error pair.
    #[error("window must be positive")]
    ZeroWindow,
    /// Thresholds at or below zero would flag every healthy pair.
    #[error("correlation threshold must be positive, got {threshold}")]
    NonPositiveThreshold { threshold: f64 },
}

/// Sliding-window bounds for one cascade query, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationWindow {
    window_ms: u64,
    correlation_threshold: f64,
}

impl CorrelationWindow {
    pub fn new(window_ms: u64, correlation_threshold: f64) -> Result<Self, CorrelationWindowError> {
        if window_ms == 0 {
            return Err(CorrelationWindowError::ZeroWindow);
        }
        if !(correlation_threshold > 0.0) {
            return Err(CorrelationWindowError::NonPositiveThreshold {
                threshold: correlation_threshold,
            });
        }
        Ok(Self {
            window_ms,
            correlation_threshold,
        })
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn correlation_threshold(&self) -> f64 {
        self.correlation_threshold
    }
}

/// Outcome of one cascade query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeSignal {
    pub upstream_count: usize,
    pub downstream_count: usize,
    /// downstream / upstream error ratio; zero when the upstream is quiet.
    pub correlation: f64,
    pub cascading: bool,
}

/// Correlates error bursts across services within a sliding time window.
///
/// Errors are kept as raw timestamps and every query recounts them from
/// scratch, so results are reproducible under replay with no decay
/// approximation. Regressing timestamps are clamped to the highest value
/// already observed.
#[derive(Debug, Default, Clone)]
pub struct CascadeDetector {
    errors: HashMap<String, Vec<u64>>,
    last_seen_ms: u64,
}

impl CascadeDetector {
    /// Creates a detector with no recorded errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error timestamp for a service.
    pub fn record_error(&mut self, service: impl Into<String>, timestamp_ms: u64) {
        let clamped = timestamp_ms.max(self.last_seen_ms);
        self.last_seen_ms = clamped;
        self.errors.entry(service.into()).or_default().push(clamped);
    }

    /// Counts both services' errors inside `[now - window, now]` and reports
    /// whether the downstream/upstream ratio reaches the threshold.
    pub fn correlate(
        &self,
        upstream: &str,
        downstream: &str,
        now_ms: u64,
        window: &CorrelationWindow,
    ) -> CascadeSignal {
        let floor = now_ms.saturating_sub(window.window_ms());
        let upstream_count = self.count_in_window(upstream, floor, now_ms);
        let downstream_count = self.count_in_window(downstream, floor, now_ms);
        let correlation = if upstream_count == 0 {
            0.0
        } else {
            downstream_count as f64 / upstream_count as f64
        };
        CascadeSignal {
            upstream_count,
            downstream_count,
            correlation,
            cascading: upstream_count > 0 && correlation >= window.correlation_threshold(),
        }
    }

    /// Convenience form of [`correlate`](Self::correlate) returning only the verdict.
    pub fn detect_cascade(
        &self,
        upstream: &str,
        downstream: &str,
        now_ms: u64,
        window: &CorrelationWindow,
    ) -> bool {
        self.correlate(upstream, downstream, now_ms, window).cascading
    }

    /// Total errors ever recorded for a service.
    pub fn recorded_errors(&self, service: &str) -> usize {
        self.errors.get(service).map(Vec::len).unwrap_or(0)
    }

    fn count_in_window(&self, service: &str, floor_ms: u64, now_ms: u64) -> usize {
        self.errors
            .get(service)
            .map(|stamps| {
                stamps
                    .iter()
                    .filter(|ts| (floor_ms..=now_ms).contains(*ts))
                    .count()
            })
            .unwrap_or(0)
    }
}
