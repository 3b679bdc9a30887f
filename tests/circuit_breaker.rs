use palisade::{BreakerConfig, BreakerError, BreakerState, CircuitBreaker};

fn breaker(threshold: u32, probes: u32, timeout_ms: u64) -> CircuitBreaker {
    CircuitBreaker::new(BreakerConfig {
        failure_threshold: threshold,
        probe_limit: probes,
        timeout_ms,
    })
    .expect("valid config")
}

#[test]
fn trips_after_consecutive_failures_and_recovers_via_probes() {
    let mut breaker = breaker(3, 2, 1_000);
    breaker.record_result(false, 100);
    breaker.record_result(false, 200);
    assert_eq!(breaker.state(), BreakerState::Closed);
    breaker.record_result(false, 300);
    assert_eq!(breaker.state(), BreakerState::Open);

    // Before the timeout the breaker rejects and ignores outcomes.
    assert!(!breaker.allow_request(400));
    breaker.record_result(false, 500);
    assert_eq!(breaker.state(), BreakerState::Open);

    // Timeout elapsed: the success counts as the first probe.
    breaker.record_result(true, 1_300);
    assert_eq!(breaker.state(), BreakerState::HalfOpen);
    assert_eq!(breaker.probe_success_count(), 1);
    breaker.record_result(true, 1_400);
    assert_eq!(breaker.state(), BreakerState::Closed);
    breaker.record_result(true, 1_500);
    assert_eq!(breaker.state(), BreakerState::Closed);
}

#[test]
fn opens_after_exactly_the_threshold() {
    for threshold in 1..=5u32 {
        let mut breaker = breaker(threshold, 1, 1_000);
        for n in 0..threshold - 1 {
            breaker.record_result(false, u64::from(n) * 10);
            assert_eq!(breaker.state(), BreakerState::Closed);
        }
        breaker.record_result(false, u64::from(threshold) * 10);
        assert_eq!(breaker.state(), BreakerState::Open);
    }
}

#[test]
fn intervening_success_resets_the_failure_streak() {
    let mut breaker = breaker(3, 1, 1_000);
    breaker.record_result(false, 10);
    breaker.record_result(false, 20);
    breaker.record_result(true, 30);
    breaker.record_result(false, 40);
    breaker.record_result(false, 50);
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.failure_count(), 2);
}

#[test]
fn single_failed_probe_reopens_without_partial_credit() {
    let mut breaker = breaker(2, 3, 100);
    breaker.record_result(false, 0);
    breaker.record_result(false, 1);
    assert_eq!(breaker.state(), BreakerState::Open);

    breaker.record_result(true, 200);
    breaker.record_result(true, 210);
    assert_eq!(breaker.probe_success_count(), 2);
    breaker.record_result(false, 220);
    assert_eq!(breaker.state(), BreakerState::Open);
    assert_eq!(breaker.probe_success_count(), 0);
    assert_eq!(breaker.telemetry().probe_failures_total(), 1);

    // The reopen restarted the timeout window at t=220.
    assert!(!breaker.allow_request(300));
    assert!(breaker.allow_request(320));
    assert_eq!(breaker.state(), BreakerState::HalfOpen);
}

#[test]
fn allow_request_signals_probe_after_timeout() {
    let mut breaker = breaker(1, 1, 500);
    breaker.record_result(false, 1_000);
    assert!(!breaker.allow_request(1_400));
    assert!(breaker.allow_request(1_500));
    assert_eq!(breaker.state(), BreakerState::HalfOpen);
    assert!(breaker.allow_request(1_501));
}

#[test]
fn regressing_timestamps_are_clamped() {
    let mut breaker = breaker(1, 1, 1_000);
    breaker.record_result(false, 5_000);
    // An earlier timestamp cannot rewind the open window.
    assert!(!breaker.allow_request(100));
    assert!(breaker.allow_request(6_000));
}

#[test]
fn telemetry_counts_transitions_and_rejections() {
    let mut breaker = breaker(1, 1, 1_000);
    breaker.record_result(false, 0);
    assert!(!breaker.allow_request(10));
    assert!(!breaker.allow_request(20));
    breaker.record_result(true, 1_000);
    let telemetry = breaker.telemetry();
    assert_eq!(telemetry.opened_total(), 1);
    assert_eq!(telemetry.closed_total(), 1);
    assert_eq!(telemetry.rejected_total(), 2);
    assert!(telemetry
        .render_metrics()
        .contains("palisade_breaker_opened_total 1"));
}

#[test]
fn construction_rejects_non_positive_knobs() {
    let base = BreakerConfig {
        failure_threshold: 1,
        probe_limit: 1,
        timeout_ms: 1,
    };
    assert_eq!(
        CircuitBreaker::new(BreakerConfig {
            failure_threshold: 0,
            ..base
        })
        .unwrap_err(),
        BreakerError::ZeroFailureThreshold
    );
    assert_eq!(
        CircuitBreaker::new(BreakerConfig {
            probe_limit: 0,
            ..base
        })
        .unwrap_err(),
        BreakerError::ZeroProbeLimit
    );
    assert_eq!(
        CircuitBreaker::new(BreakerConfig {
            timeout_ms: 0,
            ..base
        })
        .unwrap_err(),
        BreakerError::ZeroTimeout
    );
}
