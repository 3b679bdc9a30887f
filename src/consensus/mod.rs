//! Vote/quorum arithmetic, term validation, and log-consistency checks.
//!
//! Everything in this module is a pure function over explicit arguments: no
//! current-term or current-leader state lives here, which is what makes the
//! functions safe to call from any number of threads and trivial to test.

pub mod election;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One ballot cast by a voter for a candidate in a given term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter_id: String,
    pub candidate_id: String,
    pub term: u64,
}

impl Vote {
    pub fn new(
        voter_id: impl Into<String>,
        candidate_id: impl Into<String>,
        term: u64,
    ) -> Self {
        Self {
            voter_id: voter_id.into(),
            candidate_id: candidate_id.into(),
            term,
        }
    }
}

/// Tallies votes for one fixed term.
///
/// Votes cast in other terms are ignored, and each voter counts at most once
/// per term: the first ballot wins, later duplicates are dropped.
pub fn count_votes(votes: &[Vote], term: u64) -> BTreeMap<String, u32> {
    let mut tally = BTreeMap::new();
    let mut voters_seen = BTreeSet::new();
    for vote in votes {
        if vote.term != term {
            continue;
        }
        if !voters_seen.insert(vote.voter_id.as_str()) {
            continue;
        }
        *tally.entry(vote.candidate_id.clone()).or_insert(0) += 1;
    }
    tally
}

/// Strict-majority quorum: exactly half is not quorum.
pub fn has_quorum(count: usize, total: usize) -> bool {
    (count as u128) * 2 > total as u128
}

/// Weight-based quorum: decided by the summed weight of voting nodes
/// strictly exceeding half of `total_weight`, never by raw vote count.
/// Nodes without a registered weight contribute nothing.
pub fn weighted_quorum(
    voting_nodes: &[String],
    weights: &HashMap<String, u64>,
    total_weight: u64,
) -> bool {
    let mut counted = BTreeSet::new();
    let mut sum: u128 = 0;
    for node in voting_nodes {
        if !counted.insert(node.as_str()) {
            continue;
        }
        sum += u128::from(weights.get(node).copied().unwrap_or(0));
    }
    sum * 2 > u128::from(total_weight)
}

/// Inputs a voter evaluates before granting its ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest<'a> {
    pub candidate_id: &'a str,
    pub candidate_term: u64,
    pub candidate_log_len: usize,
    pub voter_term: u64,
    pub voter_log_len: usize,
    /// Candidate this voter already voted for in the current term, if any.
    pub prior_vote: Option<&'a str>,
}

/// Outcome of evaluating a [`VoteRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDecision {
    Granted,
    /// Candidate's term is behind the voter's.
    StaleTerm,
    /// Voter already committed its ballot to a different candidate this term.
    AlreadyVoted,
    /// Candidate's log is shorter than the voter's.
    LogBehind,
}

impl VoteDecision {
    pub fn granted(self) -> bool {
        self == VoteDecision::Granted
    }
}

/// Grants a vote iff the candidate's term is at least the voter's, the voter
/// has not already voted for a different candidate this term, and the
/// candidate's log is at least as long as the voter's (ties favor the
/// candidate).
pub fn validate_vote(request: &VoteRequest<'_>) -> VoteDecision {
    if request.candidate_term < request.voter_term {
        return VoteDecision::StaleTerm;
    }
    if let Some(prior) = request.prior_vote {
        if prior != request.candidate_id {
            return VoteDecision::AlreadyVoted;
        }
    }
    if request.candidate_log_len < request.voter_log_len {
        return VoteDecision::LogBehind;
    }
    VoteDecision::Granted
}

/// Result of comparing a follower log against the leader log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogCheck {
    pub consistent: bool,
    /// First index at which the logs disagree, or the number of entries
    /// compared when the follower is a prefix of (or equal to) the leader.
    pub divergence_index: usize,
}

/// Scans two version logs index-by-index for the first point of divergence.
///
/// A follower that extends past the leader diverges at the leader's length:
/// the extra entries have no counterpart and must be truncated.
pub fn log_consistency(leader_log: &[u64], follower_log: &[u64]) -> LogCheck {
    let compared = leader_log.len().min(follower_log.len());
    for index in 0..compared {
        if leader_log[index] != follower_log[index] {
            return LogCheck {
                consistent: false,
                divergence_index: index,
            };
        }
    }
    if follower_log.len() > leader_log.len() {
        return LogCheck {
            consistent: false,
            divergence_index: leader_log.len(),
        };
    }
    LogCheck {
        consistent: true,
        divergence_index: compared,
    }
}

/// Outcome of a leadership-transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub transferred: bool,
    pub leader: String,
}

/// Hands leadership to the proposed successor only when it is a cluster
/// member; otherwise leadership is unchanged.
pub fn safe_leader_transfer(
    current_leader: &str,
    proposed_successor: &str,
    cluster_members: &[String],
) -> TransferOutcome {
    if cluster_members.iter().any(|m| m == proposed_successor) {
        TransferOutcome {
            transferred: true,
            leader: proposed_successor.to_string(),
        }
    } else {
        TransferOutcome {
            transferred: false,
            leader: current_leader.to_string(),
        }
    }
}
