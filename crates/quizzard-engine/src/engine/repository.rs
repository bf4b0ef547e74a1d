use std::collections::HashMap;

use crate::core::{Clue, ClueFilter, EpisodeId};

/// Read-only access to the clue corpus.
///
/// Supplied by the excluded ETL/scrape layer; implementations hand over
/// clues that are already deduplicated and validated (non-empty prompt and
/// answer, consistent round tagging). The corpus is immutable, so a shared
/// reference may safely back any number of concurrent sessions.
pub trait ClueRepository {
    /// All clues passing the filter, in corpus order. `None` lists the whole
    /// corpus.
    fn list_clues(&self, filter: Option<&ClueFilter>) -> Vec<Clue>;

    /// The full clue set of one archived episode, in aired order.
    fn episode(&self, id: &EpisodeId) -> Option<Vec<Clue>>;
}

/// In-memory reference repository over a preloaded corpus.
///
/// Used by tests and by embedders that load the corpus wholesale; heavier
/// backends implement [`ClueRepository`] directly.
#[derive(Debug, Clone, Default)]
pub struct MemoryClueRepository {
    clues: Vec<Clue>,
    by_episode: HashMap<EpisodeId, Vec<usize>>,
}

impl MemoryClueRepository {
    #[must_use]
    pub fn new(clues: Vec<Clue>) -> Self {
        let mut by_episode: HashMap<EpisodeId, Vec<usize>> = HashMap::new();
        for (index, clue) in clues.iter().enumerate() {
            by_episode
                .entry(clue.episode.clone())
                .or_default()
                .push(index);
        }
        Self { clues, by_episode }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }
}

impl ClueRepository for MemoryClueRepository {
    fn list_clues(&self, filter: Option<&ClueFilter>) -> Vec<Clue> {
        self.clues
            .iter()
            .filter(|clue| filter.is_none_or(|f| f.matches(clue)))
            .cloned()
            .collect()
    }

    fn episode(&self, id: &EpisodeId) -> Option<Vec<Clue>> {
        let indices = self.by_episode.get(id)?;
        Some(indices.iter().map(|&i| self.clues[i].clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentId, Round};

    fn corpus() -> MemoryClueRepository {
        let clues = vec![
            Clue {
                id: ContentId::new("a1"),
                prompt: "prompt a1".to_owned(),
                answer: "answer a1".to_owned(),
                category: "HISTORY".to_owned(),
                round: Round::Single,
                value: Some(200),
                episode: EpisodeId::new("ep1"),
                is_daily_double: true,
                ..Clue::default()
            },
            Clue {
                id: ContentId::new("a2"),
                prompt: "prompt a2".to_owned(),
                answer: "answer a2".to_owned(),
                category: "SCIENCE".to_owned(),
                round: Round::Double,
                value: Some(800),
                episode: EpisodeId::new("ep1"),
                ..Clue::default()
            },
            Clue {
                id: ContentId::new("b1"),
                prompt: "prompt b1".to_owned(),
                answer: "answer b1".to_owned(),
                category: "HISTORY".to_owned(),
                round: Round::Single,
                value: Some(400),
                episode: EpisodeId::new("ep2"),
                ..Clue::default()
            },
        ];
        MemoryClueRepository::new(clues)
    }

    #[test]
    fn test_list_without_filter_returns_everything() {
        assert_eq!(corpus().list_clues(None).len(), 3);
    }

    #[test]
    fn test_list_applies_the_filter() {
        let filter = ClueFilter {
            daily_doubles_only: true,
            ..ClueFilter::default()
        };
        let clues = corpus().list_clues(Some(&filter));
        assert_eq!(clues.len(), 1);
        assert_eq!(clues[0].id, ContentId::new("a1"));
    }

    #[test]
    fn test_episode_lookup_preserves_order() {
        let clues = corpus().episode(&EpisodeId::new("ep1")).unwrap();
        let ids: Vec<_> = clues.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2"]);

        assert!(corpus().episode(&EpisodeId::new("nope")).is_none());
    }
}
