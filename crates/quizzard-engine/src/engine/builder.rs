use std::{collections::HashSet, fmt::Write as _, ops::RangeInclusive};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
    seq::{IndexedRandom, SliceRandom as _},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    core::{Clue, ClueFilter, EpisodeId, Round},
    engine::{
        board::{Board, COLUMN_CAPACITY},
        outcome::{StatsStore, UserId},
        repository::ClueRepository,
    },
};

/// Requested category counts clamp to this range.
pub const CATEGORY_BOUNDS: RangeInclusive<usize> = 2..=8;

/// Seed for deterministic board construction.
///
/// A 128-bit seed initializing the session's random number generator; the
/// same seed over the same corpus produces the same boards, shuffles, and
/// samples, which makes sessions replayable and tests deterministic.
/// Serializes as a 32-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSeed([u8; 16]);

impl GameSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub(crate) fn rng(self) -> Pcg32 {
        use rand::SeedableRng as _;
        Pcg32::from_seed(self.0)
    }
}

impl Serialize for GameSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for GameSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<GameSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GameSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        GameSeed(seed)
    }
}

/// Shaping parameters shared by the random and custom strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomParams {
    /// Distinct categories per round, clamped to [`CATEGORY_BOUNDS`].
    pub categories: usize,
    pub include_double: bool,
    /// Restrict sampling to triple stumpers.
    pub stumpers_only: bool,
    /// Append one random final clue.
    pub include_final: bool,
}

impl Default for RandomParams {
    fn default() -> Self {
        Self {
            categories: 6,
            include_double: true,
            stumpers_only: false,
            include_final: true,
        }
    }
}

/// Board construction strategy, chosen when a session leaves `Idle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "strategy")]
pub enum BuildStrategy {
    /// Load one specific archived episode as-is.
    Replay { episode: EpisodeId },
    /// Pick a random episode, optionally bounded by season and excluding
    /// special episodes.
    RandomReplay {
        seasons: Option<RangeInclusive<u16>>,
        include_specials: bool,
    },
    /// Sample fresh categories from the whole corpus.
    Random(RandomParams),
    /// Apply a caller-supplied filter, then shape like `Random`.
    Custom {
        filter: ClueFilter,
        shape: RandomParams,
    },
    /// Rebuild the user's previously missed or skipped clues as a
    /// single-round board.
    Learn { user: UserId, categories: usize },
}

/// Construction failure; the session stays `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BuildError {
    #[display("no eligible clues to build a board from")]
    EmptyConstruction,
    #[display("unknown episode: {_0}")]
    UnknownEpisode(#[error(not(source))] EpisodeId),
}

/// One sampled category and its clues, held by the plan so round switches
/// can rebuild boards without re-consulting the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySet {
    pub title: String,
    pub clues: Vec<Clue>,
}

/// The session's constructed game: category sets per round plus an optional
/// final clue.
///
/// A plan is built once per session and outlives individual boards: moving
/// between rounds re-materializes the round's board from the same sets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GamePlan {
    pub episode: Option<EpisodeId>,
    pub single: Vec<CategorySet>,
    pub double: Vec<CategorySet>,
    pub final_clue: Option<Clue>,
}

impl GamePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.double.is_empty() && self.final_clue.is_none()
    }

    /// Rounds actually present in the constructed game, in play order.
    #[must_use]
    pub fn rounds(&self) -> Vec<Round> {
        let mut rounds = Vec::with_capacity(3);
        if !self.single.is_empty() {
            rounds.push(Round::Single);
        }
        if !self.double.is_empty() {
            rounds.push(Round::Double);
        }
        if self.final_clue.is_some() {
            rounds.push(Round::Final);
        }
        rounds
    }

    #[must_use]
    pub fn has_round(&self, round: Round) -> bool {
        self.rounds().contains(&round)
    }

    /// Materializes a fresh, fully-unrevealed board for one present round.
    #[must_use]
    pub fn board_for(&self, round: Round) -> Option<Board> {
        let columns = match round {
            Round::Single => to_columns(&self.single),
            Round::Double => to_columns(&self.double),
            Round::Final => {
                let clue = self.final_clue.clone()?;
                vec![(clue.category.clone(), vec![clue])]
            }
        };
        if columns.is_empty() {
            return None;
        }
        Some(Board::from_columns(round, columns))
    }
}

fn to_columns(sets: &[CategorySet]) -> Vec<(String, Vec<Clue>)> {
    sets.iter()
        .map(|set| (set.title.clone(), set.clues.clone()))
        .collect()
}

/// Builds a game plan for the given strategy.
///
/// All sampling draws from `rng`, which the session seeds from its
/// [`GameSeed`]; the stats store is consulted only by the learn strategy.
pub fn build_plan(
    strategy: &BuildStrategy,
    repo: &dyn ClueRepository,
    stats: &dyn StatsStore,
    rng: &mut Pcg32,
) -> Result<GamePlan, BuildError> {
    let plan = match strategy {
        BuildStrategy::Replay { episode } => replay_plan(episode, repo)?,
        BuildStrategy::RandomReplay {
            seasons,
            include_specials,
        } => {
            let episode = pick_episode(repo, seasons.as_ref(), *include_specials, rng)?;
            replay_plan(&episode, repo)?
        }
        BuildStrategy::Random(params) => {
            let mut clues = repo.list_clues(None);
            if params.stumpers_only {
                clues.retain(|clue| clue.is_triple_stumper);
            }
            shape_plan(&clues, params, rng)
        }
        BuildStrategy::Custom { filter, shape } => {
            let clues = repo.list_clues(Some(filter));
            shape_plan(&clues, shape, rng)
        }
        BuildStrategy::Learn { user, categories } => learn_plan(user, *categories, repo, stats),
    };
    if plan.is_empty() {
        return Err(BuildError::EmptyConstruction);
    }
    Ok(plan)
}

fn replay_plan(episode: &EpisodeId, repo: &dyn ClueRepository) -> Result<GamePlan, BuildError> {
    let clues = repo
        .episode(episode)
        .ok_or_else(|| BuildError::UnknownEpisode(episode.clone()))?;
    Ok(GamePlan {
        episode: Some(episode.clone()),
        single: group_by_category(clues.iter().filter(|c| c.round.is_single())),
        double: group_by_category(clues.iter().filter(|c| c.round.is_double())),
        final_clue: clues.iter().find(|c| c.round.is_final()).cloned(),
    })
}

/// Groups clues by category in first-seen order, cells sorted by aired value
/// so ladder values line up with the archive ordering.
fn group_by_category<'a>(clues: impl Iterator<Item = &'a Clue>) -> Vec<CategorySet> {
    let mut sets: Vec<CategorySet> = Vec::new();
    for clue in clues {
        match sets.iter_mut().find(|set| set.title == clue.category) {
            Some(set) => set.clues.push(clue.clone()),
            None => sets.push(CategorySet {
                title: clue.category.clone(),
                clues: vec![clue.clone()],
            }),
        }
    }
    for set in &mut sets {
        set.clues.sort_by_key(|clue| clue.value.unwrap_or(u32::MAX));
        set.clues.truncate(COLUMN_CAPACITY);
    }
    sets
}

fn pick_episode(
    repo: &dyn ClueRepository,
    seasons: Option<&RangeInclusive<u16>>,
    include_specials: bool,
    rng: &mut Pcg32,
) -> Result<EpisodeId, BuildError> {
    let clues = repo.list_clues(None);
    let mut seen = HashSet::new();
    let episodes: Vec<&EpisodeId> = clues
        .iter()
        .filter(|clue| seasons.is_none_or(|range| range.contains(&clue.season)))
        .filter(|clue| include_specials || !clue.is_special_episode)
        .map(|clue| &clue.episode)
        .filter(|episode| seen.insert((*episode).clone()))
        .collect();
    episodes
        .choose(rng)
        .map(|episode| (*episode).clone())
        .ok_or(BuildError::EmptyConstruction)
}

/// Random-style shaping over an eligible clue set: per round, sample N
/// distinct categories with up to five clues each, plus an optional random
/// final clue.
fn shape_plan(clues: &[Clue], params: &RandomParams, rng: &mut Pcg32) -> GamePlan {
    let categories = params.categories.clamp(*CATEGORY_BOUNDS.start(), *CATEGORY_BOUNDS.end());
    let single = sample_round(clues, Round::Single, categories, rng);
    let double = if params.include_double {
        sample_round(clues, Round::Double, categories, rng)
    } else {
        Vec::new()
    };
    let final_clue = if params.include_final {
        let finals: Vec<&Clue> = clues.iter().filter(|c| c.round.is_final()).collect();
        finals.choose(rng).map(|clue| (*clue).clone())
    } else {
        None
    };
    GamePlan {
        episode: None,
        single,
        double,
        final_clue,
    }
}

fn sample_round(
    clues: &[Clue],
    round: Round,
    categories: usize,
    rng: &mut Pcg32,
) -> Vec<CategorySet> {
    let round_clues: Vec<&Clue> = clues.iter().filter(|c| c.round == round).collect();

    // Distinct categories in first-seen order; hash-map iteration order
    // would break seed determinism.
    let mut seen = HashSet::new();
    let titles: Vec<&str> = round_clues
        .iter()
        .map(|clue| clue.category.as_str())
        .filter(|title| seen.insert(*title))
        .collect();

    titles
        .choose_multiple(rng, categories)
        .map(|&title| {
            let pool: Vec<&&Clue> = round_clues
                .iter()
                .filter(|clue| clue.category == title)
                .collect();
            let mut picked: Vec<Clue> = pool
                .choose_multiple(rng, COLUMN_CAPACITY)
                .map(|&&clue| clue.clone())
                .collect();
            picked.sort_by_key(|clue| clue.value.unwrap_or(u32::MAX));
            CategorySet {
                title: title.to_owned(),
                clues: picked,
            }
        })
        .collect()
}

/// Learn boards replay what the user got wrong: missed-or-skipped history,
/// deduplicated, grouped by category with the most-missed categories first.
fn learn_plan(
    user: &UserId,
    categories: usize,
    repo: &dyn ClueRepository,
    stats: &dyn StatsStore,
) -> GamePlan {
    let corpus = repo.list_clues(None);
    let mut seen = HashSet::new();
    let missed: Vec<&Clue> = stats
        .missed_or_skipped(user)
        .into_iter()
        .filter(|record| seen.insert(record.content_id.clone()))
        .filter_map(|record| corpus.iter().find(|clue| clue.id == record.content_id))
        .collect();

    let mut sets = group_by_category(missed.into_iter());
    // Most-missed categories first; ties keep first-seen order.
    sets.sort_by_key(|set| std::cmp::Reverse(set.clues.len()));
    sets.truncate(categories.clamp(*CATEGORY_BOUNDS.start(), *CATEGORY_BOUNDS.end()));
    GamePlan {
        episode: None,
        single: sets,
        double: Vec::new(),
        final_clue: None,
    }
}
