use serde::{Deserialize, Serialize};

use crate::core::{ContentId, EpisodeId, Outcome};

/// Identifier of the player whose statistics a session feeds.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[from(String, &str)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Append-only record of one resolved clue or question.
///
/// Earned points are unsigned credit toward statistics and always satisfy
/// `0 <= points_earned <= points_possible`; the signed score swing of a
/// wagered board clue lives only in the session score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub content_id: ContentId,
    pub outcome: Outcome,
    pub points_earned: u32,
    pub points_possible: u32,
}

/// Final score of one participant in a completed board session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub score: i64,
}

/// Completion event emitted to the stats store when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum SessionSummary {
    /// A board session: final score per participant plus the replayed
    /// episode, when the board came from one.
    Board {
        episode: Option<EpisodeId>,
        scores: Vec<TeamScore>,
    },
    /// A typed-question quiz run.
    Quiz {
        questions_resolved: u32,
        points_earned: u32,
        points_possible: u32,
    },
}

/// Durable per-user statistics, abstracted away from any persistence
/// mechanism.
///
/// The engine appends outcome and completion records as play progresses and
/// reads back only the missed-or-skipped history when constructing a learn
/// board. A consistent-at-call-time snapshot is sufficient for that read.
pub trait StatsStore {
    fn record_outcome(&mut self, user: &UserId, record: OutcomeRecord);

    fn record_session_completed(&mut self, user: &UserId, summary: SessionSummary);

    /// Records whose outcome was incorrect or skip, oldest first.
    fn missed_or_skipped(&self, user: &UserId) -> Vec<OutcomeRecord>;
}
