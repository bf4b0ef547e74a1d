use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quizzard_engine::{OutcomeRecord, SessionSummary, StatsStore, UserId};

/// One resolved clue or question, stamped with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedOutcome {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: OutcomeRecord,
}

/// One completed session, stamped with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedSession {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: SessionSummary,
}

/// Everything recorded for one player, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHistory {
    #[serde(default)]
    pub outcomes: Vec<RecordedOutcome>,
    #[serde(default)]
    pub sessions: Vec<RecordedSession>,
}

impl UserHistory {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty() && self.sessions.is_empty()
    }
}

/// In-memory statistics store, append-only per user.
///
/// Serializes to a plain map of user histories, so an embedder can persist
/// the whole store as one JSON document and reload it at startup. Nothing
/// recorded is ever rewritten; summaries are derived on read.
///
/// # Examples
///
/// ```
/// use quizzard_engine::{ContentId, Outcome, OutcomeRecord, StatsStore as _, UserId};
/// use quizzard_stats::MemoryStatsStore;
///
/// let mut store = MemoryStatsStore::new();
/// let user = UserId::new("alice");
/// store.record_outcome(
///     &user,
///     OutcomeRecord {
///         content_id: ContentId::new("c1"),
///         outcome: Outcome::Incorrect,
///         points_earned: 0,
///         points_possible: 3,
///     },
/// );
/// assert_eq!(store.missed_or_skipped(&user).len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStatsStore {
    users: HashMap<UserId, UserHistory>,
}

impl MemoryStatsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded history of one player.
    #[must_use]
    pub fn history(&self, user: &UserId) -> Option<&UserHistory> {
        self.users.get(user)
    }

    /// All players with any recorded history.
    pub fn users(&self) -> impl Iterator<Item = &UserId> {
        self.users.keys()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl StatsStore for MemoryStatsStore {
    fn record_outcome(&mut self, user: &UserId, record: OutcomeRecord) {
        self.users
            .entry(user.clone())
            .or_default()
            .outcomes
            .push(RecordedOutcome {
                recorded_at: Utc::now(),
                record,
            });
    }

    fn record_session_completed(&mut self, user: &UserId, summary: SessionSummary) {
        self.users
            .entry(user.clone())
            .or_default()
            .sessions
            .push(RecordedSession {
                recorded_at: Utc::now(),
                summary,
            });
    }

    fn missed_or_skipped(&self, user: &UserId) -> Vec<OutcomeRecord> {
        let Some(history) = self.users.get(user) else {
            return Vec::new();
        };
        history
            .outcomes
            .iter()
            .filter(|recorded| !recorded.record.outcome.is_correct())
            .map(|recorded| recorded.record.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizzard_engine::{ContentId, Outcome, TeamScore};

    fn record(id: &str, outcome: Outcome, earned: u32) -> OutcomeRecord {
        OutcomeRecord {
            content_id: ContentId::new(id),
            outcome,
            points_earned: earned,
            points_possible: 5,
        }
    }

    #[test]
    fn test_missed_or_skipped_excludes_correct_outcomes() {
        let mut store = MemoryStatsStore::new();
        let user = UserId::new("alice");
        store.record_outcome(&user, record("c1", Outcome::Correct, 5));
        store.record_outcome(&user, record("c2", Outcome::Incorrect, 0));
        store.record_outcome(&user, record("c3", Outcome::Skip, 0));

        let missed = store.missed_or_skipped(&user);
        let ids: Vec<_> = missed.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(ids, ["c2", "c3"]);
    }

    #[test]
    fn test_histories_are_kept_per_user() {
        let mut store = MemoryStatsStore::new();
        store.record_outcome(&UserId::new("alice"), record("c1", Outcome::Correct, 5));
        store.record_session_completed(
            &UserId::new("bob"),
            SessionSummary::Board {
                episode: None,
                scores: vec![TeamScore {
                    name: "bob".to_owned(),
                    score: 1200,
                }],
            },
        );

        assert_eq!(store.history(&UserId::new("alice")).unwrap().outcomes.len(), 1);
        assert_eq!(store.history(&UserId::new("bob")).unwrap().sessions.len(), 1);
        assert!(store.history(&UserId::new("carol")).is_none());
        assert!(store.missed_or_skipped(&UserId::new("carol")).is_empty());
    }

    #[test]
    fn test_store_round_trips_through_json() {
        let mut store = MemoryStatsStore::new();
        let user = UserId::new("alice");
        store.record_outcome(&user, record("c1", Outcome::Incorrect, 0));
        store.record_session_completed(
            &user,
            SessionSummary::Quiz {
                questions_resolved: 1,
                points_earned: 0,
                points_possible: 5,
            },
        );

        let json = serde_json::to_string(&store).unwrap();
        let reloaded: MemoryStatsStore = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded.history(&user), store.history(&user));
    }
}
