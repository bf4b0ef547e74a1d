use std::time::Duration;

use arrayvec::ArrayVec;
use rand::seq::{IndexedRandom as _, SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use quizzard_evaluator::{is_acceptable_against_any, is_acceptable_answer};

use crate::core::{
    BucketItem, Difficulty, FindScoring, MalformedQuestion, MediaAnswer, Question, QuestionKind,
    QuestionPayload, Resolution, resolve_classify, resolve_find, resolve_ranking_anchored,
    resolve_ranking_one_shot, resolve_this_or_that,
};

/// Classify grids hold at most this many cells.
pub const GRID_CAPACITY: usize = 16;
/// At most this many correct-group items are sampled into a classify grid.
pub const GRID_TARGET_CAPACITY: usize = 8;
/// This-or-that rounds sample at most this many items.
pub const PAIR_SAMPLE_CAPACITY: usize = 5;

const COUNTDOWN: Duration = Duration::from_secs(30);
const COUNTDOWN_HARD: Duration = Duration::from_secs(60);
const MAX_STRIKES: u32 = 3;
/// Rounds carrying this phrase cannot be mechanically verified and always
/// score zero.
const SELF_SCORE_PHRASE: &str = "self-score";

/// Find-list attempt limit, chosen before play starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindLimit {
    /// Fixed countdown driven by [`QuestionPlay::tick`]: 30 seconds, or 60
    /// for hard-or-harder questions. Force-finalizes on expiry.
    Countdown,
    /// Force-finalizes after three non-matching attempts.
    ThreeStrikes,
    #[default]
    Unlimited,
}

/// Classify sub-mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifyMode {
    /// Any incorrect pick ends the round immediately.
    #[default]
    Elimination,
    /// Play continues until as many picks as there are correct items in the
    /// grid have been made.
    Continuous,
}

/// This-or-that sub-mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairMode {
    /// All sampled items are always played.
    #[default]
    Standard,
    /// The first miss stops the round; scoring still counts the full
    /// sampled set, so an early miss caps the score.
    Elimination,
}

/// Ranking sub-mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingMode {
    /// A single submitted permutation, scored by exact positions.
    #[default]
    OneShot,
    /// Correctly-placed items lock after each submission; fewer attempts
    /// earn more points.
    AnchorAdjust,
}

/// Per-session sub-mode selection, fixed before play starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRules {
    pub find_scoring: FindScoring,
    pub find_limit: FindLimit,
    pub classify: ClassifyMode,
    pub pair: PairMode,
    pub ranking: RankingMode,
}

/// Rejection of a play action that does not fit the active question or its
/// current state. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlayError {
    #[display("{action} does not apply to a {kind} question")]
    WrongAction {
        action: &'static str,
        kind: QuestionKind,
    },
    #[display("no option at index {index}")]
    UnknownOption { index: usize },
    #[display("no grid cell at index {index}")]
    UnknownGridCell { index: usize },
    #[display("grid cell {index} is already picked")]
    CellAlreadyPicked { index: usize },
    #[display("no bucket at index {index}")]
    UnknownBucket { index: usize },
    #[display("order must contain {expected} positions, got {got}")]
    OrderLengthMismatch { expected: usize, got: usize },
    #[display("order is not a permutation of the item positions")]
    NotAPermutation,
    #[display("position {position} is locked and cannot be moved")]
    LockedPositionMoved { position: usize },
}

/// Result of one play action: either the round continues or it has been
/// finalized with a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStep {
    Continue,
    Resolved(Resolution),
}

/// One cell of a sampled classify grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    text: String,
    is_target: bool,
    picked: bool,
}

impl GridCell {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_target(&self) -> bool {
        self.is_target
    }

    #[must_use]
    pub fn is_picked(&self) -> bool {
        self.picked
    }
}

#[derive(Debug, Clone)]
enum PlayState {
    /// Single-select, and media questions authored as multiple choice.
    Choice { display: Vec<usize>, correct: usize },
    /// Free-text, hint, and free-text media questions.
    Text { accepted: Vec<String> },
    Find {
        pool: Vec<String>,
        found: Vec<bool>,
        min_required: usize,
        misses: u32,
        remaining: Option<Duration>,
        self_score: bool,
    },
    Classify {
        grid: ArrayVec<GridCell, GRID_CAPACITY>,
        targets_available: u32,
        targets_picked: u32,
        total_picks: u32,
    },
    Pairs {
        buckets: Vec<String>,
        items: ArrayVec<BucketItem, PAIR_SAMPLE_CAPACITY>,
        next: usize,
        correct: u32,
    },
    Ranking {
        display: Vec<usize>,
        locked: Vec<bool>,
        attempts: u32,
    },
}

/// Live state of one activated question: session-local presentation state
/// (shuffled orders, sampled grids, remaining time) plus the accrued play
/// progress, finalized into a single [`Resolution`].
///
/// Every action is idempotent once finalized: a resolved play answers all
/// further actions with the existing resolution and mutates nothing, so
/// duplicate UI events can never double-count.
#[derive(Debug, Clone)]
pub struct QuestionPlay {
    question: Question,
    possible: u32,
    rules: PlayRules,
    state: PlayState,
    resolution: Option<Resolution>,
}

impl QuestionPlay {
    /// Activates a question, validating its payload and sampling the
    /// session-local presentation state from `rng`.
    pub fn new(
        question: Question,
        rules: PlayRules,
        rng: &mut Pcg32,
    ) -> Result<Self, MalformedQuestion> {
        question.payload.validate()?;
        let possible = question.possible_points();
        let state = Self::initial_state(&question, rules, rng);
        Ok(Self {
            question,
            possible,
            rules,
            state,
            resolution: None,
        })
    }

    fn initial_state(question: &Question, rules: PlayRules, rng: &mut Pcg32) -> PlayState {
        match &question.payload {
            QuestionPayload::SingleSelect { options, correct }
            | QuestionPayload::Media {
                answer: MediaAnswer::Choice { options, correct },
                ..
            } => {
                let mut display: Vec<usize> = (0..options.len()).collect();
                display.shuffle(rng);
                PlayState::Choice {
                    display,
                    correct: *correct,
                }
            }
            QuestionPayload::FreeText { answer, alternates }
            | QuestionPayload::Hint {
                answer, alternates, ..
            }
            | QuestionPayload::Media {
                answer: MediaAnswer::FreeText { answer, alternates },
                ..
            } => {
                let mut accepted = vec![answer.clone()];
                accepted.extend(alternates.iter().cloned());
                PlayState::Text { accepted }
            }
            QuestionPayload::FindList { pool, min_required } => {
                let lowered_prompt = question.prompt.to_lowercase();
                let self_score = lowered_prompt.contains(SELF_SCORE_PHRASE)
                    || pool
                        .iter()
                        .any(|item| item.to_lowercase().contains(SELF_SCORE_PHRASE));
                let remaining = match rules.find_limit {
                    FindLimit::Countdown => Some(if question.difficulty >= Difficulty::Hard {
                        COUNTDOWN_HARD
                    } else {
                        COUNTDOWN
                    }),
                    FindLimit::ThreeStrikes | FindLimit::Unlimited => None,
                };
                PlayState::Find {
                    found: vec![false; pool.len()],
                    pool: pool.clone(),
                    min_required: *min_required,
                    misses: 0,
                    remaining,
                    self_score,
                }
            }
            QuestionPayload::Classify { targets, decoys } => {
                let mut grid: ArrayVec<GridCell, GRID_CAPACITY> = targets
                    .choose_multiple(rng, GRID_TARGET_CAPACITY)
                    .map(|text| GridCell {
                        text: text.clone(),
                        is_target: true,
                        picked: false,
                    })
                    .collect();
                let targets_available = grid.len() as u32;
                let fill = GRID_CAPACITY - grid.len();
                grid.extend(decoys.choose_multiple(rng, fill).map(|text| GridCell {
                    text: text.clone(),
                    is_target: false,
                    picked: false,
                }));
                grid.shuffle(rng);
                PlayState::Classify {
                    grid,
                    targets_available,
                    targets_picked: 0,
                    total_picks: 0,
                }
            }
            QuestionPayload::ThisOrThat { buckets, items } => {
                let items: ArrayVec<BucketItem, PAIR_SAMPLE_CAPACITY> = items
                    .choose_multiple(rng, PAIR_SAMPLE_CAPACITY)
                    .cloned()
                    .collect();
                PlayState::Pairs {
                    buckets: buckets.clone(),
                    items,
                    next: 0,
                    correct: 0,
                }
            }
            QuestionPayload::Ranking { items } => {
                let mut display: Vec<usize> = (0..items.len()).collect();
                display.shuffle(rng);
                PlayState::Ranking {
                    display,
                    locked: vec![false; items.len()],
                    attempts: 0,
                }
            }
        }
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.question.payload.kind()
    }

    #[must_use]
    pub fn possible_points(&self) -> u32 {
        self.possible
    }

    #[must_use]
    pub fn rules(&self) -> PlayRules {
        self.rules
    }

    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Reroll label of a hint question.
    #[must_use]
    pub fn hint_label(&self) -> Option<&str> {
        match &self.question.payload {
            QuestionPayload::Hint { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Shuffled presentation order for choice and ranking questions:
    /// payload indices in display order.
    #[must_use]
    pub fn display_order(&self) -> Option<&[usize]> {
        match &self.state {
            PlayState::Choice { display, .. } | PlayState::Ranking { display, .. } => {
                Some(display)
            }
            _ => None,
        }
    }

    /// The sampled classify grid.
    #[must_use]
    pub fn grid(&self) -> Option<&[GridCell]> {
        match &self.state {
            PlayState::Classify { grid, .. } => Some(grid),
            _ => None,
        }
    }

    /// Bucket labels of a this-or-that question.
    #[must_use]
    pub fn buckets(&self) -> Option<&[String]> {
        match &self.state {
            PlayState::Pairs { buckets, .. } => Some(buckets),
            _ => None,
        }
    }

    /// The this-or-that item currently being presented.
    #[must_use]
    pub fn current_item(&self) -> Option<&str> {
        match &self.state {
            PlayState::Pairs { items, next, .. } => items.get(*next).map(|item| item.text.as_str()),
            _ => None,
        }
    }

    /// Canonical items found so far in a find-list round.
    #[must_use]
    pub fn found_count(&self) -> u32 {
        match &self.state {
            PlayState::Find { found, .. } => found.iter().filter(|&&f| f).count() as u32,
            _ => 0,
        }
    }

    /// Non-matching attempts so far in a find-list round.
    #[must_use]
    pub fn misses(&self) -> u32 {
        match &self.state {
            PlayState::Find { misses, .. } => *misses,
            _ => 0,
        }
    }

    /// Countdown remaining, when the find-list round is timed.
    #[must_use]
    pub fn remaining_time(&self) -> Option<Duration> {
        match &self.state {
            PlayState::Find { remaining, .. } => *remaining,
            _ => None,
        }
    }

    /// Locked positions of an anchor/adjust ranking round.
    #[must_use]
    pub fn locked_positions(&self) -> Option<&[bool]> {
        match &self.state {
            PlayState::Ranking { locked, .. } => Some(locked),
            _ => None,
        }
    }

    /// Chooses an option of a single-select (or choice-form media) question.
    /// `option` is an index into the payload's option list.
    pub fn choose(&mut self, option: usize) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        let PlayState::Choice { display, correct } = &self.state else {
            return Err(self.wrong_action("choosing an option"));
        };
        if option >= display.len() {
            return Err(PlayError::UnknownOption { index: option });
        }
        let resolution = if option == *correct {
            Resolution::correct(self.possible)
        } else {
            Resolution::incorrect(self.possible)
        };
        Ok(self.finalize(resolution))
    }

    /// Submits a free-text answer, graded by answer evaluation against the
    /// canonical answer and its alternates.
    pub fn submit_text(&mut self, text: &str) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        let PlayState::Text { accepted, .. } = &self.state else {
            return Err(self.wrong_action("submitting text"));
        };
        let resolution =
            if is_acceptable_against_any(text, accepted.iter().map(String::as_str)) {
                Resolution::correct(self.possible)
            } else {
                Resolution::incorrect(self.possible)
            };
        Ok(self.finalize(resolution))
    }

    /// Gives up and shows the answer before submitting: always resolves as
    /// zero credit, incorrect, and is terminal.
    pub fn reveal(&mut self) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        if !matches!(self.state, PlayState::Text { .. }) {
            return Err(self.wrong_action("revealing the answer"));
        }
        let resolution = Resolution::incorrect(self.possible);
        Ok(self.finalize(resolution))
    }

    /// Attempts to name one item of a find-list pool.
    ///
    /// A duplicate of an already-found item neither scores nor counts as a
    /// miss. Finding the entire pool finalizes; under three-strikes the
    /// third miss force-finalizes.
    pub fn attempt_find(&mut self, attempt: &str) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        let PlayState::Find {
            pool,
            found,
            misses,
            ..
        } = &mut self.state
        else {
            return Err(self.wrong_action("naming a find-list item"));
        };

        let matched = pool
            .iter()
            .position(|item| is_acceptable_answer(attempt, item));
        match matched {
            Some(index) if !found[index] => {
                found[index] = true;
                if found.iter().all(|&f| f) {
                    return Ok(self.finalize_find());
                }
            }
            Some(_) => {} // duplicate find, no effect
            None => {
                *misses += 1;
                if self.rules.find_limit == FindLimit::ThreeStrikes && *misses >= MAX_STRIKES {
                    return Ok(self.finalize_find());
                }
            }
        }
        Ok(PlayStep::Continue)
    }

    /// Advances the countdown of a timed find-list round; force-finalizes
    /// on expiry.
    ///
    /// The caller clocks the play by invoking this periodically; untimed
    /// rounds ignore it.
    pub fn tick(&mut self, elapsed: Duration) -> PlayStep {
        if let Some(resolution) = self.resolution {
            return PlayStep::Resolved(resolution);
        }
        let PlayState::Find {
            remaining: Some(remaining),
            ..
        } = &mut self.state
        else {
            return PlayStep::Continue;
        };
        *remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            return self.finalize_find();
        }
        PlayStep::Continue
    }

    /// Manually finalizes a find-list or classify round with whatever has
    /// accrued.
    pub fn finish(&mut self) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        match &self.state {
            PlayState::Find { .. } => Ok(self.finalize_find()),
            PlayState::Classify { .. } => Ok(self.finalize_classify()),
            _ => Err(self.wrong_action("finishing")),
        }
    }

    /// Picks one cell of a classify grid.
    pub fn pick(&mut self, index: usize) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        let classify_mode = self.rules.classify;
        let PlayState::Classify {
            grid,
            targets_available,
            targets_picked,
            total_picks,
        } = &mut self.state
        else {
            return Err(self.wrong_action("picking a grid cell"));
        };
        let cell = grid
            .get_mut(index)
            .ok_or(PlayError::UnknownGridCell { index })?;
        if cell.picked {
            return Err(PlayError::CellAlreadyPicked { index });
        }
        cell.picked = true;
        *total_picks += 1;
        if cell.is_target {
            *targets_picked += 1;
        }

        let done = match classify_mode {
            ClassifyMode::Elimination => !grid[index].is_target,
            ClassifyMode::Continuous => *total_picks >= *targets_available,
        };
        // Picking out every target also exhausts the round.
        if done || *targets_picked >= *targets_available {
            return Ok(self.finalize_classify());
        }
        Ok(PlayStep::Continue)
    }

    /// Places the current this-or-that item into a bucket.
    pub fn place(&mut self, bucket: usize) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        let pair_mode = self.rules.pair;
        let possible = self.possible;
        let PlayState::Pairs {
            buckets,
            items,
            next,
            correct,
        } = &mut self.state
        else {
            return Err(self.wrong_action("placing an item"));
        };
        if bucket >= buckets.len() {
            return Err(PlayError::UnknownBucket { index: bucket });
        }
        // Placing the last item finalizes, so an unresolved round always has
        // a current item.
        let item = &items[*next];
        let hit = item.bucket == bucket;
        if hit {
            *correct += 1;
        }
        *next += 1;

        let stopped = pair_mode == PairMode::Elimination && !hit;
        if stopped || *next >= items.len() {
            let resolution = resolve_this_or_that(possible, *correct, items.len() as u32);
            return Ok(self.finalize(resolution));
        }
        Ok(PlayStep::Continue)
    }

    /// Submits a full ordering of a ranking question: `order[position]` is
    /// the canonical item index placed at that position.
    ///
    /// One-shot finalizes immediately. Anchor/adjust locks every position
    /// that lands correctly, rejects submissions that move a locked
    /// position, and finalizes once all positions are locked.
    pub fn submit_order(&mut self, order: &[usize]) -> Result<PlayStep, PlayError> {
        if let Some(resolution) = self.resolution {
            return Ok(PlayStep::Resolved(resolution));
        }
        let ranking_mode = self.rules.ranking;
        let possible = self.possible;
        let PlayState::Ranking {
            locked, attempts, ..
        } = &mut self.state
        else {
            return Err(self.wrong_action("submitting an order"));
        };
        let expected = locked.len();
        if order.len() != expected {
            return Err(PlayError::OrderLengthMismatch {
                expected,
                got: order.len(),
            });
        }
        let mut seen = vec![false; expected];
        for &item in order {
            if item >= expected || seen[item] {
                return Err(PlayError::NotAPermutation);
            }
            seen[item] = true;
        }
        if ranking_mode == RankingMode::AnchorAdjust {
            for (position, &item) in order.iter().enumerate() {
                if locked[position] && item != position {
                    return Err(PlayError::LockedPositionMoved { position });
                }
            }
        }

        *attempts += 1;
        let correct_positions = order
            .iter()
            .enumerate()
            .filter(|&(position, &item)| item == position)
            .count() as u32;
        match ranking_mode {
            RankingMode::OneShot => {
                let resolution =
                    resolve_ranking_one_shot(possible, correct_positions, expected as u32);
                Ok(self.finalize(resolution))
            }
            RankingMode::AnchorAdjust => {
                for (position, &item) in order.iter().enumerate() {
                    if item == position {
                        locked[position] = true;
                    }
                }
                if locked.iter().all(|&l| l) {
                    let attempts = *attempts;
                    let resolution = resolve_ranking_anchored(possible, attempts);
                    return Ok(self.finalize(resolution));
                }
                Ok(PlayStep::Continue)
            }
        }
    }

    /// Skips the question: zero points, terminal.
    pub fn skip(&mut self) -> PlayStep {
        if let Some(resolution) = self.resolution {
            return PlayStep::Resolved(resolution);
        }
        let resolution = Resolution::skipped(self.possible);
        self.finalize(resolution)
    }

    fn wrong_action(&self, action: &'static str) -> PlayError {
        PlayError::WrongAction {
            action,
            kind: self.kind(),
        }
    }

    fn finalize(&mut self, resolution: Resolution) -> PlayStep {
        self.resolution = Some(resolution);
        PlayStep::Resolved(resolution)
    }

    fn finalize_find(&mut self) -> PlayStep {
        let PlayState::Find {
            found,
            min_required,
            self_score,
            ..
        } = &self.state
        else {
            return PlayStep::Continue;
        };
        let found = found.iter().filter(|&&f| f).count() as u32;
        let resolution = resolve_find(
            self.rules.find_scoring,
            self.possible,
            found,
            *min_required as u32,
            *self_score,
        );
        self.finalize(resolution)
    }

    fn finalize_classify(&mut self) -> PlayStep {
        let PlayState::Classify {
            targets_picked,
            targets_available,
            ..
        } = &self.state
        else {
            return PlayStep::Continue;
        };
        let resolution = resolve_classify(self.possible, *targets_picked, *targets_available);
        self.finalize(resolution)
    }
}
