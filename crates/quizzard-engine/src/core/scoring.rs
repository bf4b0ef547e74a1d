//! Point computation: possible points per question and pure per-type
//! outcome resolution.
//!
//! Everything here is arithmetic over counts already gathered by the play
//! state; the resolvers hold no state and never touch the corpus. All
//! rounding is exact half-up integer rounding so that the same inputs always
//! produce the same points.

use serde::{Deserialize, Serialize};

use super::question::{Difficulty, QuestionKind};

/// Result classification of one resolved question or clue.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[display("correct")]
    Correct,
    #[display("incorrect")]
    Incorrect,
    #[display("skip")]
    Skip,
}

/// Final graded result of one question: outcome plus earned and possible
/// points, with `0 <= points_earned <= points_possible` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: Outcome,
    pub points_earned: u32,
    pub points_possible: u32,
}

impl Resolution {
    #[must_use]
    pub const fn correct(points_possible: u32) -> Self {
        Self {
            outcome: Outcome::Correct,
            points_earned: points_possible,
            points_possible,
        }
    }

    #[must_use]
    pub const fn incorrect(points_possible: u32) -> Self {
        Self {
            outcome: Outcome::Incorrect,
            points_earned: 0,
            points_possible,
        }
    }

    #[must_use]
    pub const fn skipped(points_possible: u32) -> Self {
        Self {
            outcome: Outcome::Skip,
            points_earned: 0,
            points_possible,
        }
    }

    /// Partial credit; the outcome is correct only at full credit.
    #[must_use]
    pub const fn partial(points_earned: u32, points_possible: u32) -> Self {
        let points_earned = if points_earned > points_possible {
            points_possible
        } else {
            points_earned
        };
        let outcome = if points_earned == points_possible {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        Self {
            outcome,
            points_earned,
            points_possible,
        }
    }
}

/// `round(numerator / denominator)` with ties rounding up, in pure integer
/// arithmetic.
const fn div_half_up(numerator: u32, denominator: u32) -> u32 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Maximum points for a (difficulty, type) pair.
///
/// `round(base_points x type_multiplier)`, floored at 1. The multiplier is
/// held in tenths so the computation stays exact.
#[must_use]
pub const fn possible_points(difficulty: Difficulty, kind: QuestionKind) -> u32 {
    let tenths = difficulty.base_points() * kind.multiplier_tenths();
    let points = div_half_up(tenths, 10);
    if points == 0 { 1 } else { points }
}

/// Scales possible points by a correctness ratio, rounding half up.
///
/// Used by every partial-credit type: `round(possible x achieved / out_of)`.
/// A zero denominator yields zero points.
#[must_use]
pub const fn ratio_points(possible: u32, achieved: u32, out_of: u32) -> u32 {
    if out_of == 0 {
        return 0;
    }
    let achieved = if achieved > out_of { out_of } else { achieved };
    div_half_up(possible * achieved, out_of)
}

/// Find-list scoring sub-mode, chosen before play starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindScoring {
    /// Reach a minimum found-count; points scale toward it and cap at full.
    #[default]
    Target,
    /// Every find is worth one point, capped at the possible total.
    AsMany,
}

/// Resolves a finished find-list round.
///
/// Self-score rounds always resolve incorrect with zero points: their
/// correctness cannot be mechanically verified.
#[must_use]
pub fn resolve_find(
    scoring: FindScoring,
    possible: u32,
    found: u32,
    min_required: u32,
    self_score: bool,
) -> Resolution {
    if self_score {
        return Resolution::incorrect(possible);
    }
    match scoring {
        FindScoring::Target => {
            let points = ratio_points(possible, found.min(min_required), min_required);
            Resolution {
                outcome: if found >= min_required {
                    Outcome::Correct
                } else {
                    Outcome::Incorrect
                },
                points_earned: points,
                points_possible: possible,
            }
        }
        FindScoring::AsMany => Resolution::partial(found.min(possible), possible),
    }
}

/// Resolves a finished classify round: the ratio of correct picks over the
/// correct items available in the sampled grid.
#[must_use]
pub fn resolve_classify(possible: u32, correct_picked: u32, correct_available: u32) -> Resolution {
    Resolution::partial(ratio_points(possible, correct_picked, correct_available), possible)
}

/// Resolves a finished this-or-that round against the full sampled count, so
/// an elimination stop caps the score.
#[must_use]
pub fn resolve_this_or_that(possible: u32, correct: u32, sampled: u32) -> Resolution {
    Resolution::partial(ratio_points(possible, correct, sampled), possible)
}

/// Resolves a one-shot ranking submission from its position-exact match
/// count.
#[must_use]
pub fn resolve_ranking_one_shot(possible: u32, correct_positions: u32, items: u32) -> Resolution {
    Resolution::partial(ratio_points(possible, correct_positions, items), possible)
}

/// Resolves a completed anchor/adjust ranking: fewer attempts earn more,
/// `max(0, possible - (attempts - 1))`.
///
/// The mode always finishes fully ordered, so the outcome is correct;
/// attempts only reduce the points.
#[must_use]
pub fn resolve_ranking_anchored(possible: u32, attempts: u32) -> Resolution {
    Resolution {
        outcome: Outcome::Correct,
        points_earned: possible.saturating_sub(attempts.saturating_sub(1)),
        points_possible: possible,
    }
}
