use super::{has_quorum, validate_vote, VoteRequest};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Status reason surfaced when an election exhausts its rounds.
pub const ELECTION_NO_QUORUM_REASON: &str = "ELECTION_NO_QUORUM";

/// Error raised when an election is invoked with an empty cluster shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElectionError {
    #[error("election requires at least one candidate")]
    NoCandidates,
    #[error("election requires at least one voter")]
    NoVoters,
    #[error("election requires at least one round")]
    ZeroRounds,
}

/// Replica standing for election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    pub log_len: usize,
}

impl CandidateProfile {
    pub fn new(id: impl Into<String>, log_len: usize) -> Self {
        Self {
            id: id.into(),
            log_len,
        }
    }
}

/// Replica casting a ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterProfile {
    pub id: String,
    pub log_len: usize,
}

impl VoterProfile {
    pub fn new(id: impl Into<String>, log_len: usize) -> Self {
        Self {
            id: id.into(),
            log_len,
        }
    }
}

/// Outcome of a multi-round election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResult {
    pub winner: Option<String>,
    /// Term reached when the election stopped.
    pub term: u64,
    /// Rounds actually run.
    pub rounds: u32,
    /// Ballots collected by the leading candidate in the final round.
    pub vote_count: usize,
    pub has_quorum: bool,
}

impl ElectionResult {
    /// Machine-readable reason for callers surfacing failed elections.
    pub fn status_reason(&self) -> Option<&'static str> {
        if self.has_quorum {
            None
        } else {
            Some(ELECTION_NO_QUORUM_REASON)
        }
    }
}

/// Runs up to `max_rounds` election rounds starting after `start_term`.
///
/// The term increments by exactly 1 each round. Every voter casts one
/// deterministic ballot: among the candidates whose log is at least as long
/// as its own it picks the longest log, breaking ties toward the smallest
/// candidate id; with no eligible candidate it abstains. The election stops
/// at the first term where the leading candidate holds a strict majority of
/// the voters, or after `max_rounds` without one.
pub fn run_election(
    candidates: &[CandidateProfile],
    voters: &[VoterProfile],
    start_term: u64,
    max_rounds: u32,
) -> Result<ElectionResult, ElectionError> {
    if candidates.is_empty() {
        return Err(ElectionError::NoCandidates);
    }
    if voters.is_empty() {
        return Err(ElectionError::NoVoters);
    }
    if max_rounds == 0 {
        return Err(ElectionError::ZeroRounds);
    }

    let mut term = start_term;
    let mut rounds = 0;
    let mut leading_votes = 0;
    let mut leader: Option<String> = None;
    while rounds < max_rounds {
        term = term.saturating_add(1);
        rounds += 1;
        let tally = round_tally(candidates, voters, term);
        let (candidate, votes) = leading_candidate(&tally);
        leading_votes = votes;
        leader = candidate.map(str::to_string);
        let quorate = has_quorum(votes, voters.len());
        info!(
            "event=election_round term={} round={} leading={:?} votes={} voters={} quorum={}",
            term,
            rounds,
            leader,
            votes,
            voters.len(),
            quorate
        );
        if quorate {
            return Ok(ElectionResult {
                winner: leader,
                term,
                rounds,
                vote_count: leading_votes,
                has_quorum: true,
            });
        }
    }
    Ok(ElectionResult {
        winner: None,
        term,
        rounds,
        vote_count: leading_votes,
        has_quorum: false,
    })
}

/// Exponential per-round election-timeout backoff, saturating at `u64::MAX`.
///
/// Round 1 waits the base delay; each further round doubles it. Rounds below
/// 1 are clamped to the base delay.
pub fn election_backoff_ms(base_ms: u64, round: u32) -> u64 {
    let exponent = round.saturating_sub(1);
    let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor)
}

fn round_tally<'a>(
    candidates: &'a [CandidateProfile],
    voters: &[VoterProfile],
    term: u64,
) -> BTreeMap<&'a str, usize> {
    let mut tally = BTreeMap::new();
    for voter in voters {
        if let Some(choice) = ballot_for(candidates, voter, term) {
            *tally.entry(choice).or_insert(0) += 1;
        }
    }
    tally
}

fn ballot_for<'a>(
    candidates: &'a [CandidateProfile],
    voter: &VoterProfile,
    term: u64,
) -> Option<&'a str> {
    let mut choice: Option<&CandidateProfile> = None;
    for candidate in candidates {
        let request = VoteRequest {
            candidate_id: &candidate.id,
            candidate_term: term,
            candidate_log_len: candidate.log_len,
            voter_term: term,
            voter_log_len: voter.log_len,
            prior_vote: None,
        };
        if !validate_vote(&request).granted() {
            continue;
        }
        let better = match choice {
            None => true,
            Some(current) => {
                candidate.log_len > current.log_len
                    || (candidate.log_len == current.log_len && candidate.id < current.id)
            }
        };
        if better {
            choice = Some(candidate);
        }
    }
    choice.map(|c| c.id.as_str())
}

fn leading_candidate<'a>(tally: &BTreeMap<&'a str, usize>) -> (Option<&'a str>, usize) {
    let mut leading = (None, 0);
    for (candidate, votes) in tally {
        if *votes > leading.1 {
            leading = (Some(*candidate), *votes);
        }
    }
    leading
}

/// Counters recorded by the cluster coordinator after each election.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ElectionTelemetry {
    elections_total: u64,
    rounds_total: u64,
    no_quorum_total: u64,
}

impl ElectionTelemetry {
    /// Folds one election outcome into the counters.
    pub fn record(&mut self, result: &ElectionResult) {
        self.elections_total = self.elections_total.saturating_add(1);
        self.rounds_total = self.rounds_total.saturating_add(u64::from(result.rounds));
        if !result.has_quorum {
            self.no_quorum_total = self.no_quorum_total.saturating_add(1);
        }
    }

    pub fn elections_total(&self) -> u64 {
        self.elections_total
    }

    pub fn rounds_total(&self) -> u64 {
        self.rounds_total
    }

    pub fn no_quorum_total(&self) -> u64 {
        self.no_quorum_total
    }

    /// Metric lines emitted to `/metrics`.
    pub fn render_metrics(&self) -> String {
        format!(
            "palisade_elections_total {}\npalisade_election_rounds_total {}\npalisade_election_no_quorum_total {}\n",
            self.elections_total, self.rounds_total, self.no_quorum_total
        )
    }
}
