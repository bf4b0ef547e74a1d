use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use quizzard_evaluator::normalize;

/// Stable, globally unique identifier of a clue or question.
///
/// Identifiers are minted by the ETL collaborators that produce the corpus;
/// the engine treats them as opaque.
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
pub struct ContentId(String);

impl ContentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of the archived episode a clue was aired in.
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
pub struct EpisodeId(String);

impl EpisodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Game round a clue belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum Round {
    #[default]
    #[display("single")]
    Single,
    #[display("double")]
    Double,
    #[display("final")]
    Final,
}

impl Round {
    /// Nominal cell values assigned positionally down a board column.
    ///
    /// The final round has no nominal values; its single clue is played for
    /// a caller-declared stake.
    #[must_use]
    pub const fn value_ladder(self) -> Option<[u32; 5]> {
        match self {
            Self::Single => Some([200, 400, 600, 800, 1000]),
            Self::Double => Some([400, 800, 1200, 1600, 2000]),
            Self::Final => None,
        }
    }
}

/// An atomic quiz fact from the archived corpus.
///
/// Clues are produced by the excluded ETL/scrape collaborators and consumed
/// read-only: the engine never invents or mutates clue content. The
/// `episode`/`season`/`is_special_episode`/`is_flagged`/`tags` fields are
/// denormalized onto the record by the ETL layer so that board construction
/// can filter without a second lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    pub id: ContentId,
    pub prompt: String,
    /// Canonical accepted answer.
    pub answer: String,
    #[serde(default)]
    pub alternate_answers: Vec<String>,
    pub category: String,
    pub round: Round,
    /// Nominal value as aired; `None` for final-round clues.
    #[serde(default)]
    pub value: Option<u32>,
    /// Daily double: the responding party stakes a custom wager before
    /// seeing the prompt.
    #[serde(default)]
    pub is_daily_double: bool,
    /// Triple stumper: no original contestant answered correctly.
    #[serde(default)]
    pub is_triple_stumper: bool,
    #[serde(default)]
    pub episode: EpisodeId,
    #[serde(default)]
    pub season: u16,
    #[serde(default)]
    pub is_special_episode: bool,
    #[serde(default)]
    pub is_flagged: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Clue {
    /// Canonical answer followed by the accepted alternates.
    pub fn accepted_answers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.answer.as_str())
            .chain(self.alternate_answers.iter().map(String::as_str))
    }
}

/// Corpus selection predicate for custom board construction and repository
/// queries.
///
/// All populated fields must hold for a clue to pass; an empty filter passes
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClueFilter {
    #[serde(default)]
    pub daily_doubles_only: bool,
    #[serde(default)]
    pub triple_stumpers_only: bool,
    #[serde(default)]
    pub finals_only: bool,
    #[serde(default)]
    pub flagged_only: bool,
    /// Free-text search over prompt and answer, compared in normalized form.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub seasons: Option<RangeInclusive<u16>>,
    #[serde(default)]
    pub episode: Option<EpisodeId>,
    #[serde(default)]
    pub values: Option<RangeInclusive<u32>>,
    /// Restrict to an explicit id set when present.
    #[serde(default)]
    pub ids: Option<Vec<ContentId>>,
}

impl ClueFilter {
    #[must_use]
    pub fn matches(&self, clue: &Clue) -> bool {
        if self.daily_doubles_only && !clue.is_daily_double {
            return false;
        }
        if self.triple_stumpers_only && !clue.is_triple_stumper {
            return false;
        }
        if self.finals_only && !clue.round.is_final() {
            return false;
        }
        if self.flagged_only && !clue.is_flagged {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = normalize(search);
            if needle.is_empty() {
                return false;
            }
            if !normalize(&clue.prompt).contains(&needle)
                && !normalize(&clue.answer).contains(&needle)
            {
                return false;
            }
        }
        if let Some(tag) = &self.tag
            && !clue.tags.iter().any(|t| t == tag)
        {
            return false;
        }
        if let Some(seasons) = &self.seasons
            && !seasons.contains(&clue.season)
        {
            return false;
        }
        if let Some(episode) = &self.episode
            && clue.episode != *episode
        {
            return false;
        }
        if let Some(values) = &self.values {
            match clue.value {
                Some(value) if values.contains(&value) => {}
                _ => return false,
            }
        }
        if let Some(ids) = &self.ids
            && !ids.contains(&clue.id)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clue() -> Clue {
        Clue {
            id: ContentId::new("s01e01-c1"),
            prompt: "This river is the longest in South America".to_owned(),
            answer: "the Amazon".to_owned(),
            category: "RIVERS".to_owned(),
            round: Round::Single,
            value: Some(400),
            episode: EpisodeId::new("s01e01"),
            season: 1,
            tags: vec!["geography".to_owned()],
            ..Clue::default()
        }
    }

    #[test]
    fn test_value_ladders() {
        assert_eq!(Round::Single.value_ladder(), Some([200, 400, 600, 800, 1000]));
        assert_eq!(Round::Double.value_ladder(), Some([400, 800, 1200, 1600, 2000]));
        assert_eq!(Round::Final.value_ladder(), None);
    }

    #[test]
    fn test_accepted_answers_starts_with_canonical() {
        let clue = Clue {
            alternate_answers: vec!["Amazon River".to_owned()],
            ..clue()
        };
        let accepted: Vec<_> = clue.accepted_answers().collect();
        assert_eq!(accepted, ["the Amazon", "Amazon River"]);
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        assert!(ClueFilter::default().matches(&clue()));
    }

    #[test]
    fn test_boolean_restrictions() {
        let filter = ClueFilter {
            daily_doubles_only: true,
            ..ClueFilter::default()
        };
        assert!(!filter.matches(&clue()));
        let daily_double = Clue {
            is_daily_double: true,
            ..clue()
        };
        assert!(filter.matches(&daily_double));
    }

    #[test]
    fn test_search_is_normalized() {
        let filter = ClueFilter {
            search: Some("SOUTH AMERICA!".to_owned()),
            ..ClueFilter::default()
        };
        assert!(filter.matches(&clue()));

        let filter = ClueFilter {
            search: Some("atom".to_owned()),
            ..ClueFilter::default()
        };
        assert!(!filter.matches(&clue()));
    }

    #[test]
    fn test_search_covers_the_answer_too() {
        let filter = ClueFilter {
            search: Some("amazon".to_owned()),
            ..ClueFilter::default()
        };
        assert!(filter.matches(&clue()));
    }

    #[test]
    fn test_range_and_tag_restrictions() {
        let filter = ClueFilter {
            seasons: Some(1..=3),
            values: Some(200..=600),
            tag: Some("geography".to_owned()),
            ..ClueFilter::default()
        };
        assert!(filter.matches(&clue()));

        let filter = ClueFilter {
            seasons: Some(5..=9),
            ..ClueFilter::default()
        };
        assert!(!filter.matches(&clue()));
    }

    #[test]
    fn test_value_filter_rejects_unvalued_clues() {
        let filter = ClueFilter {
            values: Some(0..=5000),
            ..ClueFilter::default()
        };
        let final_clue = Clue {
            round: Round::Final,
            value: None,
            ..clue()
        };
        assert!(!filter.matches(&final_clue));
    }

    #[test]
    fn test_explicit_id_set() {
        let filter = ClueFilter {
            ids: Some(vec![ContentId::new("s01e01-c1")]),
            ..ClueFilter::default()
        };
        assert!(filter.matches(&clue()));

        let filter = ClueFilter {
            ids: Some(vec![ContentId::new("other")]),
            ..ClueFilter::default()
        };
        assert!(!filter.matches(&clue()));
    }
}
