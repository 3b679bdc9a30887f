use palisade::{
    election_backoff_ms, run_election, safe_leader_transfer, CandidateProfile, ElectionError,
    ElectionResult, ElectionTelemetry, VoterProfile, ELECTION_NO_QUORUM_REASON,
};

fn voters(log_lens: &[usize]) -> Vec<VoterProfile> {
    log_lens
        .iter()
        .enumerate()
        .map(|(idx, len)| VoterProfile::new(format!("voter-{idx}"), *len))
        .collect()
}

#[test]
fn up_to_date_candidate_wins_in_the_first_round() {
    let candidates = vec![
        CandidateProfile::new("alpha", 10),
        CandidateProfile::new("beta", 8),
    ];
    let result = run_election(&candidates, &voters(&[9, 9, 9, 9, 9]), 4, 3).expect("valid shape");
    assert_eq!(result.winner.as_deref(), Some("alpha"));
    assert_eq!(result.term, 5);
    assert_eq!(result.rounds, 1);
    assert_eq!(result.vote_count, 5);
    assert!(result.has_quorum);
    assert_eq!(result.status_reason(), None);
}

#[test]
fn stale_candidates_exhaust_every_round_without_quorum() {
    // No candidate log reaches the voters' length, so every voter abstains.
    let candidates = vec![CandidateProfile::new("alpha", 2)];
    let result = run_election(&candidates, &voters(&[5, 5, 5]), 0, 4).expect("valid shape");
    assert_eq!(result.winner, None);
    assert_eq!(result.rounds, 4);
    assert_eq!(result.term, 4);
    assert_eq!(result.vote_count, 0);
    assert!(!result.has_quorum);
    assert_eq!(result.status_reason(), Some(ELECTION_NO_QUORUM_REASON));
}

#[test]
fn voters_prefer_the_longest_log_then_the_smallest_id() {
    let candidates = vec![
        CandidateProfile::new("zeta", 10),
        CandidateProfile::new("alpha", 10),
        CandidateProfile::new("mid", 6),
    ];
    let result = run_election(&candidates, &voters(&[5, 5, 5]), 0, 1).expect("valid shape");
    assert_eq!(result.winner.as_deref(), Some("alpha"));
    assert!(result.has_quorum);
}

#[test]
fn voters_too_far_ahead_only_grant_eligible_candidates() {
    let candidates = vec![
        CandidateProfile::new("alpha", 4),
        CandidateProfile::new("beta", 8),
    ];
    // Three voters can accept beta; two can accept nobody ahead of them.
    let result = run_election(&candidates, &voters(&[3, 5, 8, 9, 10]), 0, 2).expect("valid shape");
    assert_eq!(result.winner.as_deref(), Some("beta"));
    assert_eq!(result.vote_count, 3);
    assert!(result.has_quorum);
}

#[test]
fn exactly_half_the_voters_is_not_quorum() {
    let candidates = vec![CandidateProfile::new("alpha", 5)];
    // Two of four voters can grant alpha; 2/4 is not a strict majority.
    let result = run_election(&candidates, &voters(&[5, 5, 9, 9]), 0, 2).expect("valid shape");
    assert_eq!(result.winner, None);
    assert_eq!(result.vote_count, 2);
    assert!(!result.has_quorum);
}

#[test]
fn empty_cluster_shapes_are_rejected() {
    let candidates = vec![CandidateProfile::new("alpha", 1)];
    let electorate = voters(&[1]);
    assert_eq!(
        run_election(&[], &electorate, 0, 1).unwrap_err(),
        ElectionError::NoCandidates
    );
    assert_eq!(
        run_election(&candidates, &[], 0, 1).unwrap_err(),
        ElectionError::NoVoters
    );
    assert_eq!(
        run_election(&candidates, &electorate, 0, 0).unwrap_err(),
        ElectionError::ZeroRounds
    );
}

#[test]
fn election_backoff_is_exponential() {
    assert_eq!(election_backoff_ms(150, 1), 150);
    assert_eq!(election_backoff_ms(150, 2), 300);
    assert_eq!(election_backoff_ms(150, 3), 600);
    assert_eq!(election_backoff_ms(150, 4), 1_200);
    // Round 0 is clamped to the base delay.
    assert_eq!(election_backoff_ms(150, 0), 150);
    assert_eq!(election_backoff_ms(u64::MAX, 40), u64::MAX);
}

#[test]
fn transfer_requires_a_cluster_member() {
    let members = vec!["n1".to_string(), "n2".to_string(), "n3".to_string()];
    let outcome = safe_leader_transfer("n1", "n2", &members);
    assert!(outcome.transferred);
    assert_eq!(outcome.leader, "n2");

    let outcome = safe_leader_transfer("n1", "outsider", &members);
    assert!(!outcome.transferred);
    assert_eq!(outcome.leader, "n1");
}

#[test]
fn telemetry_counts_rounds_and_failures() {
    let mut telemetry = ElectionTelemetry::default();
    telemetry.record(&ElectionResult {
        winner: Some("alpha".to_string()),
        term: 3,
        rounds: 1,
        vote_count: 4,
        has_quorum: true,
    });
    telemetry.record(&ElectionResult {
        winner: None,
        term: 7,
        rounds: 4,
        vote_count: 1,
        has_quorum: false,
    });
    assert_eq!(telemetry.elections_total(), 2);
    assert_eq!(telemetry.rounds_total(), 5);
    assert_eq!(telemetry.no_quorum_total(), 1);
    assert!(telemetry
        .render_metrics()
        .contains("palisade_election_no_quorum_total 1"));
}
