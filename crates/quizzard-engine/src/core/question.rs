use serde::{Deserialize, Serialize};

use super::clue::ContentId;

/// Difficulty tier of a typed question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    #[display("very-easy")]
    VeryEasy,
    #[display("easy")]
    Easy,
    #[display("medium")]
    Medium,
    #[display("hard")]
    Hard,
    #[display("very-hard")]
    VeryHard,
}

impl Difficulty {
    /// Base point value before the question-type multiplier is applied.
    #[must_use]
    pub const fn base_points(self) -> u32 {
        match self {
            Self::VeryEasy => 1,
            Self::Easy => 2,
            Self::Medium => 3,
            Self::Hard => 4,
            Self::VeryHard => 5,
        }
    }
}

/// Question type tag, one per [`QuestionPayload`] variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[display("single-select")]
    SingleSelect,
    #[display("free-text")]
    FreeText,
    #[display("find-list")]
    FindList,
    #[display("classify")]
    Classify,
    #[display("this-or-that")]
    ThisOrThat,
    #[display("ranking")]
    Ranking,
    #[display("media")]
    Media,
    #[display("hint")]
    Hint,
}

impl QuestionKind {
    /// Type multiplier in tenths, applied on top of [`Difficulty::base_points`].
    ///
    /// Held as an integer so that possible-point computation stays exact.
    #[must_use]
    pub const fn multiplier_tenths(self) -> u32 {
        match self {
            Self::SingleSelect => 10,
            Self::FreeText => 12,
            Self::FindList => 14,
            Self::Classify => 15,
            Self::ThisOrThat => 13,
            Self::Ranking => 15,
            Self::Media => 14,
            Self::Hint => 12,
        }
    }
}

/// One item of a this-or-that pool: text plus the index of its correct bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketItem {
    pub text: String,
    pub bucket: usize,
}

/// Answer payload of a media question.
///
/// Media questions are authored either as free-text prompts or as a
/// multiple-choice variant; the authoring conventions (newline-delimited
/// option lists, starred correct options) are parsed by the ETL layer, so
/// the engine only ever sees the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum MediaAnswer {
    FreeText {
        answer: String,
        #[serde(default)]
        alternates: Vec<String>,
    },
    Choice {
        options: Vec<String>,
        correct: usize,
    },
}

/// Type-specific question payload, one variant per [`QuestionKind`].
///
/// Modeling the payload as a tagged union keeps every variant carrying only
/// its required fields, checked exhaustively at engine entry points rather
/// than discovered missing at play time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum QuestionPayload {
    SingleSelect {
        options: Vec<String>,
        /// Index of the correct option, pre-parsed by the ETL layer.
        correct: usize,
    },
    FreeText {
        answer: String,
        #[serde(default)]
        alternates: Vec<String>,
    },
    FindList {
        /// Canonical items the player tries to name.
        pool: Vec<String>,
        /// Found-count needed for a correct outcome in target mode.
        min_required: usize,
    },
    Classify {
        /// Items belonging to the sought group.
        targets: Vec<String>,
        /// Items that do not belong, used to fill the grid.
        #[serde(default)]
        decoys: Vec<String>,
    },
    ThisOrThat {
        /// Two or three bucket labels.
        buckets: Vec<String>,
        items: Vec<BucketItem>,
    },
    Ranking {
        /// Items listed in canonical order.
        items: Vec<String>,
    },
    Media {
        /// Opaque media locator resolved by the presentation layer.
        source: String,
        answer: MediaAnswer,
    },
    Hint {
        /// Label shared by questions eligible as reroll replacements.
        label: String,
        answer: String,
        #[serde(default)]
        alternates: Vec<String>,
    },
}

/// Data-quality rejection for a question payload missing required
/// type-specific content.
///
/// Surfaced at activation time so a malformed question is refused with a
/// descriptive reason instead of silently scoring zero.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MalformedQuestion {
    #[display("choice question needs at least 2 options, got {count}")]
    NotEnoughOptions { count: usize },
    #[display("correct option index {correct} is out of range for {count} options")]
    CorrectOptionOutOfRange { correct: usize, count: usize },
    #[display("answer text is empty")]
    EmptyAnswer,
    #[display("find-list pool is empty")]
    EmptyPool,
    #[display("minimum required count {min_required} is invalid for a pool of {pool}")]
    InvalidMinimum { min_required: usize, pool: usize },
    #[display("classify question has no target items")]
    NoTargets,
    #[display("this-or-that needs 2 or 3 buckets, got {count}")]
    InvalidBucketCount { count: usize },
    #[display("this-or-that has no items")]
    NoBucketItems,
    #[display("item bucket index {bucket} is out of range for {count} buckets")]
    BucketIndexOutOfRange { bucket: usize, count: usize },
    #[display("ranking needs at least 2 items, got {count}")]
    NotEnoughRankedItems { count: usize },
    #[display("media source locator is empty")]
    EmptyMediaSource,
    #[display("hint label is empty")]
    EmptyHintLabel,
}

impl QuestionPayload {
    #[must_use]
    pub const fn kind(&self) -> QuestionKind {
        match self {
            Self::SingleSelect { .. } => QuestionKind::SingleSelect,
            Self::FreeText { .. } => QuestionKind::FreeText,
            Self::FindList { .. } => QuestionKind::FindList,
            Self::Classify { .. } => QuestionKind::Classify,
            Self::ThisOrThat { .. } => QuestionKind::ThisOrThat,
            Self::Ranking { .. } => QuestionKind::Ranking,
            Self::Media { .. } => QuestionKind::Media,
            Self::Hint { .. } => QuestionKind::Hint,
        }
    }

    /// Checks type-specific well-formedness.
    ///
    /// The engine calls this before activating a question and refuses
    /// malformed payloads outright.
    pub fn validate(&self) -> Result<(), MalformedQuestion> {
        fn validate_choice(options: &[String], correct: usize) -> Result<(), MalformedQuestion> {
            if options.len() < 2 {
                return Err(MalformedQuestion::NotEnoughOptions {
                    count: options.len(),
                });
            }
            if correct >= options.len() {
                return Err(MalformedQuestion::CorrectOptionOutOfRange {
                    correct,
                    count: options.len(),
                });
            }
            Ok(())
        }

        match self {
            Self::SingleSelect { options, correct } => validate_choice(options, *correct),
            Self::FreeText { answer, .. } => {
                if answer.trim().is_empty() {
                    return Err(MalformedQuestion::EmptyAnswer);
                }
                Ok(())
            }
            Self::FindList { pool, min_required } => {
                if pool.is_empty() {
                    return Err(MalformedQuestion::EmptyPool);
                }
                if *min_required == 0 || *min_required > pool.len() {
                    return Err(MalformedQuestion::InvalidMinimum {
                        min_required: *min_required,
                        pool: pool.len(),
                    });
                }
                Ok(())
            }
            Self::Classify { targets, .. } => {
                if targets.is_empty() {
                    return Err(MalformedQuestion::NoTargets);
                }
                Ok(())
            }
            Self::ThisOrThat { buckets, items } => {
                if !(2..=3).contains(&buckets.len()) {
                    return Err(MalformedQuestion::InvalidBucketCount {
                        count: buckets.len(),
                    });
                }
                if items.is_empty() {
                    return Err(MalformedQuestion::NoBucketItems);
                }
                for item in items {
                    if item.bucket >= buckets.len() {
                        return Err(MalformedQuestion::BucketIndexOutOfRange {
                            bucket: item.bucket,
                            count: buckets.len(),
                        });
                    }
                }
                Ok(())
            }
            Self::Ranking { items } => {
                if items.len() < 2 {
                    return Err(MalformedQuestion::NotEnoughRankedItems { count: items.len() });
                }
                Ok(())
            }
            Self::Media { source, answer } => {
                if source.trim().is_empty() {
                    return Err(MalformedQuestion::EmptyMediaSource);
                }
                match answer {
                    MediaAnswer::FreeText { answer, .. } => {
                        if answer.trim().is_empty() {
                            return Err(MalformedQuestion::EmptyAnswer);
                        }
                        Ok(())
                    }
                    MediaAnswer::Choice { options, correct } => validate_choice(options, *correct),
                }
            }
            Self::Hint { label, answer, .. } => {
                if label.trim().is_empty() {
                    return Err(MalformedQuestion::EmptyHintLabel);
                }
                if answer.trim().is_empty() {
                    return Err(MalformedQuestion::EmptyAnswer);
                }
                Ok(())
            }
        }
    }
}

/// A typed quiz question.
///
/// Immutable input to the engine; session-local presentation state (shuffled
/// option order, sampled grids, remaining time, lock-in status) lives in the
/// play state, never on the question itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: ContentId,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub payload: QuestionPayload,
}

impl Question {
    /// Maximum points this question can award.
    #[must_use]
    pub fn possible_points(&self) -> u32 {
        super::scoring::possible_points(self.difficulty, self.payload.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let payload = QuestionPayload::Ranking {
            items: vec!["a".to_owned(), "b".to_owned()],
        };
        assert_eq!(payload.kind(), QuestionKind::Ranking);
    }

    mod validation {
        use super::*;

        #[test]
        fn test_single_select_needs_two_options_and_a_valid_index() {
            let payload = QuestionPayload::SingleSelect {
                options: vec!["only".to_owned()],
                correct: 0,
            };
            assert_eq!(
                payload.validate(),
                Err(MalformedQuestion::NotEnoughOptions { count: 1 })
            );

            let payload = QuestionPayload::SingleSelect {
                options: vec!["a".to_owned(), "b".to_owned()],
                correct: 2,
            };
            assert_eq!(
                payload.validate(),
                Err(MalformedQuestion::CorrectOptionOutOfRange { correct: 2, count: 2 })
            );

            let payload = QuestionPayload::SingleSelect {
                options: vec!["a".to_owned(), "b".to_owned()],
                correct: 1,
            };
            assert_eq!(payload.validate(), Ok(()));
        }

        #[test]
        fn test_find_list_minimum_must_fit_the_pool() {
            let pool = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
            let payload = QuestionPayload::FindList {
                pool: pool.clone(),
                min_required: 4,
            };
            assert_eq!(
                payload.validate(),
                Err(MalformedQuestion::InvalidMinimum {
                    min_required: 4,
                    pool: 3
                })
            );

            let payload = QuestionPayload::FindList {
                pool,
                min_required: 2,
            };
            assert_eq!(payload.validate(), Ok(()));
        }

        #[test]
        fn test_this_or_that_bucket_indices_are_checked() {
            let payload = QuestionPayload::ThisOrThat {
                buckets: vec!["fruit".to_owned(), "vegetable".to_owned()],
                items: vec![BucketItem {
                    text: "tomato".to_owned(),
                    bucket: 2,
                }],
            };
            assert_eq!(
                payload.validate(),
                Err(MalformedQuestion::BucketIndexOutOfRange { bucket: 2, count: 2 })
            );
        }

        #[test]
        fn test_ranking_needs_at_least_two_items() {
            let payload = QuestionPayload::Ranking {
                items: vec!["alone".to_owned()],
            };
            assert_eq!(
                payload.validate(),
                Err(MalformedQuestion::NotEnoughRankedItems { count: 1 })
            );
        }

        #[test]
        fn test_media_choice_is_validated_like_single_select() {
            let payload = QuestionPayload::Media {
                source: "clips/ep12.mp4".to_owned(),
                answer: MediaAnswer::Choice {
                    options: vec!["a".to_owned(), "b".to_owned()],
                    correct: 5,
                },
            };
            assert_eq!(
                payload.validate(),
                Err(MalformedQuestion::CorrectOptionOutOfRange { correct: 5, count: 2 })
            );
        }

        #[test]
        fn test_hint_needs_label_and_answer() {
            let payload = QuestionPayload::Hint {
                label: " ".to_owned(),
                answer: "paris".to_owned(),
                alternates: Vec::new(),
            };
            assert_eq!(payload.validate(), Err(MalformedQuestion::EmptyHintLabel));
        }
    }

    #[test]
    fn test_payload_serialization_is_tagged() {
        let payload = QuestionPayload::FreeText {
            answer: "paris".to_owned(),
            alternates: Vec::new(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "free-text");
        let back: QuestionPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
