use serde::{Deserialize, Serialize};

use quizzard_engine::ContentId;

use crate::store::UserHistory;

/// Accuracy within one category of the clue corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAccuracy {
    pub category: String,
    pub correct: u32,
    pub total: u32,
}

impl CategoryAccuracy {
    /// Fraction of this category's outcomes that were correct.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total)
    }
}

/// Aggregate view over one player's recorded history.
///
/// Derived on read; the store itself only appends. The category breakdown
/// needs to know which category each recorded content id belongs to, which
/// is corpus knowledge the store does not carry, so the caller supplies a
/// lookup. Ids the lookup cannot place are left out of the breakdown but
/// still count toward the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub points_earned: u32,
    pub points_possible: u32,
    pub sessions_completed: u32,
    /// Per-category accuracy, most-played categories first.
    pub categories: Vec<CategoryAccuracy>,
}

impl PlayerSummary {
    /// Summarizes a recorded history.
    ///
    /// Returns `None` when nothing has been recorded yet, so an empty
    /// history never shows up as a zero-accuracy player.
    #[must_use]
    pub fn new<F>(history: &UserHistory, category_of: F) -> Option<Self>
    where
        F: Fn(&ContentId) -> Option<String>,
    {
        if history.is_empty() {
            return None;
        }

        let mut summary = Self {
            correct: 0,
            incorrect: 0,
            skipped: 0,
            points_earned: 0,
            points_possible: 0,
            sessions_completed: history.sessions.len() as u32,
            categories: Vec::new(),
        };
        for recorded in &history.outcomes {
            let record = &recorded.record;
            let correct = record.outcome.is_correct();
            if correct {
                summary.correct += 1;
            } else if record.outcome.is_skip() {
                summary.skipped += 1;
            } else {
                summary.incorrect += 1;
            }
            summary.points_earned += record.points_earned;
            summary.points_possible += record.points_possible;

            let Some(category) = category_of(&record.content_id) else {
                continue;
            };
            let entry = match summary
                .categories
                .iter_mut()
                .find(|c| c.category == category)
            {
                Some(entry) => entry,
                None => {
                    summary.categories.push(CategoryAccuracy {
                        category,
                        correct: 0,
                        total: 0,
                    });
                    summary.categories.last_mut().unwrap()
                }
            };
            entry.total += 1;
            if correct {
                entry.correct += 1;
            }
        }
        summary
            .categories
            .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        Some(summary)
    }

    /// Outcomes recorded in total.
    #[must_use]
    pub fn outcomes_recorded(&self) -> u32 {
        self.correct + self.incorrect + self.skipped
    }

    /// Fraction of recorded outcomes that were correct.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.outcomes_recorded();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizzard_engine::{Outcome, OutcomeRecord, SessionSummary};

    use crate::store::{RecordedOutcome, RecordedSession};

    fn outcome(id: &str, outcome: Outcome, earned: u32, possible: u32) -> RecordedOutcome {
        RecordedOutcome {
            recorded_at: Utc::now(),
            record: OutcomeRecord {
                content_id: ContentId::new(id),
                outcome,
                points_earned: earned,
                points_possible: possible,
            },
        }
    }

    fn history() -> UserHistory {
        UserHistory {
            outcomes: vec![
                outcome("h1", Outcome::Correct, 3, 3),
                outcome("h2", Outcome::Incorrect, 0, 3),
                outcome("s1", Outcome::Correct, 5, 5),
                outcome("x1", Outcome::Skip, 0, 4),
            ],
            sessions: vec![RecordedSession {
                recorded_at: Utc::now(),
                summary: SessionSummary::Quiz {
                    questions_resolved: 4,
                    points_earned: 8,
                    points_possible: 15,
                },
            }],
        }
    }

    fn category_of(id: &ContentId) -> Option<String> {
        match &id.as_str()[..1] {
            "h" => Some("HISTORY".to_owned()),
            "s" => Some("SCIENCE".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_summary_counts_and_accuracy() {
        let summary = PlayerSummary::new(&history(), category_of).unwrap();
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.points_earned, 8);
        assert_eq!(summary.points_possible, 15);
        assert_eq!(summary.sessions_completed, 1);
        assert_eq!(summary.outcomes_recorded(), 4);
        assert!((summary.accuracy() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_category_breakdown_skips_unknown_ids() {
        let summary = PlayerSummary::new(&history(), category_of).unwrap();
        assert_eq!(summary.categories.len(), 2);
        // HISTORY has the most outcomes and sorts first.
        assert_eq!(summary.categories[0].category, "HISTORY");
        assert_eq!(summary.categories[0].correct, 1);
        assert_eq!(summary.categories[0].total, 2);
        assert!((summary.categories[0].accuracy() - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary.categories[1].category, "SCIENCE");
        assert_eq!(summary.categories[1].total, 1);
    }

    #[test]
    fn test_empty_history_has_no_summary() {
        assert!(PlayerSummary::new(&UserHistory::default(), category_of).is_none());
    }
}
