use std::collections::VecDeque;

use rand_pcg::Pcg32;

use crate::{
    core::{MalformedQuestion, Question, QuestionPayload, Resolution},
    engine::{
        builder::GameSeed,
        outcome::{OutcomeRecord, SessionSummary, StatsStore, UserId},
        question_play::{PlayRules, QuestionPlay},
    },
};

/// Rejection of a quiz-session operation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum QuizError {
    /// The question at the head of the queue failed validation and has been
    /// discarded; activation may be retried for the next one.
    #[display("discarded a malformed question: {_0}")]
    Malformed(MalformedQuestion),
    #[display("no question is active")]
    NoActiveQuestion,
    #[display("the active question is not resolved yet")]
    ActiveQuestionUnresolved,
    #[display("the active question is already resolved")]
    AlreadyResolved,
    #[display("a question is still active")]
    QuestionStillActive,
    #[display("no questions remain in the queue")]
    QueueExhausted,
    #[display("the active question is not a hint question")]
    NotAHint,
    #[display("no unplayed hint question with the same label remains")]
    NoReplacementHint,
}

impl From<MalformedQuestion> for QuizError {
    fn from(err: MalformedQuestion) -> Self {
        Self::Malformed(err)
    }
}

/// A session over a queue of typed questions.
///
/// Questions are activated one at a time into a [`QuestionPlay`], played to
/// a resolution through it, and completed here, which rolls the resolution
/// into the running totals and appends an outcome record. All sampling and
/// shuffling draws from one seeded generator, so a session is fully
/// reproducible from its seed and question list.
#[derive(Debug, Clone)]
pub struct QuizSession {
    user: UserId,
    seed: GameSeed,
    rng: Pcg32,
    rules: PlayRules,
    queue: VecDeque<Question>,
    active: Option<QuestionPlay>,
    questions_resolved: u32,
    points_earned: u32,
    points_possible: u32,
}

impl QuizSession {
    #[must_use]
    pub fn new(user: UserId, questions: Vec<Question>, rules: PlayRules) -> Self {
        Self::with_seed(user, questions, rules, rand::random())
    }

    #[must_use]
    pub fn with_seed(
        user: UserId,
        questions: Vec<Question>,
        rules: PlayRules,
        seed: GameSeed,
    ) -> Self {
        Self {
            user,
            seed,
            rng: seed.rng(),
            rules,
            queue: questions.into(),
            active: None,
            questions_resolved: 0,
            points_earned: 0,
            points_possible: 0,
        }
    }

    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    #[must_use]
    pub fn seed(&self) -> GameSeed {
        self.seed
    }

    /// Questions still waiting in the queue, not counting the active one.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn questions_resolved(&self) -> u32 {
        self.questions_resolved
    }

    #[must_use]
    pub fn points_earned(&self) -> u32 {
        self.points_earned
    }

    #[must_use]
    pub fn points_possible(&self) -> u32 {
        self.points_possible
    }

    /// The live play of the active question, if one is active.
    #[must_use]
    pub fn play(&self) -> Option<&QuestionPlay> {
        self.active.as_ref()
    }

    /// Mutable access to the active play; all answering goes through it.
    pub fn play_mut(&mut self) -> Option<&mut QuestionPlay> {
        self.active.as_mut()
    }

    /// Activates the next queued question.
    ///
    /// A malformed question is discarded and reported; the caller may call
    /// again to move on to the one after it.
    pub fn activate_next(&mut self) -> Result<&QuestionPlay, QuizError> {
        if self.active.is_some() {
            return Err(QuizError::QuestionStillActive);
        }
        let question = self.queue.pop_front().ok_or(QuizError::QueueExhausted)?;
        let play = QuestionPlay::new(question, self.rules, &mut self.rng)?;
        Ok(self.active.insert(play))
    }

    /// Swaps an unresolved hint question for the next unplayed hint carrying
    /// the same label. The swapped-out question is dropped without a record.
    pub fn reroll_hint(&mut self) -> Result<&QuestionPlay, QuizError> {
        let active = self.active.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        if active.is_resolved() {
            return Err(QuizError::AlreadyResolved);
        }
        let label = active.hint_label().ok_or(QuizError::NotAHint)?;
        let position = self
            .queue
            .iter()
            .position(|question| {
                matches!(&question.payload, QuestionPayload::Hint { label: l, .. } if l == label)
            })
            .ok_or(QuizError::NoReplacementHint)?;
        let replacement = self
            .queue
            .remove(position)
            .ok_or(QuizError::NoReplacementHint)?;
        let play = QuestionPlay::new(replacement, self.rules, &mut self.rng)?;
        Ok(self.active.insert(play))
    }

    /// Completes the active question once its play is resolved: rolls the
    /// resolution into the totals and appends an outcome record.
    pub fn complete_question(
        &mut self,
        stats: &mut dyn StatsStore,
    ) -> Result<Resolution, QuizError> {
        let play = self.active.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        let resolution = play
            .resolution()
            .ok_or(QuizError::ActiveQuestionUnresolved)?;
        let record = OutcomeRecord {
            content_id: play.question().id.clone(),
            outcome: resolution.outcome,
            points_earned: resolution.points_earned,
            points_possible: resolution.points_possible,
        };
        stats.record_outcome(&self.user, record);

        self.active = None;
        self.questions_resolved += 1;
        self.points_earned += resolution.points_earned;
        self.points_possible += resolution.points_possible;
        Ok(resolution)
    }

    /// Ends the session and reports its summary. The active question, if
    /// any, must be completed first.
    pub fn end_session(
        &mut self,
        stats: &mut dyn StatsStore,
    ) -> Result<SessionSummary, QuizError> {
        if self.active.is_some() {
            return Err(QuizError::QuestionStillActive);
        }
        let summary = SessionSummary::Quiz {
            questions_resolved: self.questions_resolved,
            points_earned: self.points_earned,
            points_possible: self.points_possible,
        };
        stats.record_session_completed(&self.user, summary.clone());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentId, Difficulty, Outcome};

    #[derive(Debug, Default)]
    struct TestStats {
        outcomes: Vec<(UserId, OutcomeRecord)>,
        summaries: Vec<(UserId, SessionSummary)>,
    }

    impl StatsStore for TestStats {
        fn record_outcome(&mut self, user: &UserId, record: OutcomeRecord) {
            self.outcomes.push((user.clone(), record));
        }

        fn record_session_completed(&mut self, user: &UserId, summary: SessionSummary) {
            self.summaries.push((user.clone(), summary));
        }

        fn missed_or_skipped(&self, _user: &UserId) -> Vec<OutcomeRecord> {
            Vec::new()
        }
    }

    fn free_text(id: &str, answer: &str) -> Question {
        Question {
            id: ContentId::new(id),
            prompt: format!("prompt {id}"),
            difficulty: Difficulty::Medium,
            payload: QuestionPayload::FreeText {
                answer: answer.to_owned(),
                alternates: Vec::new(),
            },
        }
    }

    fn hint(id: &str, label: &str, answer: &str) -> Question {
        Question {
            id: ContentId::new(id),
            prompt: format!("prompt {id}"),
            difficulty: Difficulty::Medium,
            payload: QuestionPayload::Hint {
                label: label.to_owned(),
                answer: answer.to_owned(),
                alternates: Vec::new(),
            },
        }
    }

    fn session(questions: Vec<Question>) -> QuizSession {
        QuizSession::with_seed(
            UserId::new("alice"),
            questions,
            PlayRules::default(),
            GameSeed::from_bytes([7; 16]),
        )
    }

    #[test]
    fn test_questions_play_in_queue_order() {
        let mut quiz = session(vec![free_text("q1", "one"), free_text("q2", "two")]);
        let mut stats = TestStats::default();

        assert_eq!(quiz.activate_next().unwrap().question().id.as_str(), "q1");
        quiz.play_mut().unwrap().submit_text("one").unwrap();
        let resolution = quiz.complete_question(&mut stats).unwrap();
        assert_eq!(resolution.outcome, Outcome::Correct);

        assert_eq!(quiz.activate_next().unwrap().question().id.as_str(), "q2");
        quiz.play_mut().unwrap().submit_text("wrong").unwrap();
        quiz.complete_question(&mut stats).unwrap();

        assert_eq!(quiz.questions_resolved(), 2);
        assert_eq!(quiz.points_earned(), 4); // one correct free-text
        assert_eq!(quiz.points_possible(), 8);
        assert_eq!(stats.outcomes.len(), 2);
        assert_eq!(quiz.activate_next().unwrap_err(), QuizError::QueueExhausted);
    }

    #[test]
    fn test_activation_requires_completing_the_previous_question() {
        let mut quiz = session(vec![free_text("q1", "one"), free_text("q2", "two")]);
        quiz.activate_next().unwrap();
        assert_eq!(
            quiz.activate_next().unwrap_err(),
            QuizError::QuestionStillActive
        );
    }

    #[test]
    fn test_completion_requires_a_resolution() {
        let mut quiz = session(vec![free_text("q1", "one")]);
        let mut stats = TestStats::default();
        assert_eq!(
            quiz.complete_question(&mut stats).unwrap_err(),
            QuizError::NoActiveQuestion
        );
        quiz.activate_next().unwrap();
        assert_eq!(
            quiz.complete_question(&mut stats).unwrap_err(),
            QuizError::ActiveQuestionUnresolved
        );
    }

    #[test]
    fn test_malformed_question_is_discarded_and_play_continues() {
        let malformed = Question {
            id: ContentId::new("bad"),
            prompt: "prompt".to_owned(),
            difficulty: Difficulty::Easy,
            payload: QuestionPayload::FreeText {
                answer: String::new(),
                alternates: Vec::new(),
            },
        };
        let mut quiz = session(vec![malformed, free_text("q2", "two")]);
        assert!(matches!(
            quiz.activate_next().unwrap_err(),
            QuizError::Malformed(MalformedQuestion::EmptyAnswer)
        ));
        // The malformed question is gone; the next activation succeeds.
        assert_eq!(quiz.activate_next().unwrap().question().id.as_str(), "q2");
    }

    #[test]
    fn test_reroll_swaps_in_a_hint_with_the_same_label() {
        let mut quiz = session(vec![
            hint("h1", "movies", "casablanca"),
            free_text("q1", "one"),
            hint("h2", "movies", "vertigo"),
        ]);
        quiz.activate_next().unwrap();

        let play = quiz.reroll_hint().unwrap();
        assert_eq!(play.question().id.as_str(), "h2");
        assert_eq!(play.hint_label(), Some("movies"));
        // The swapped-out question leaves no record and the free-text
        // question keeps its place in the queue.
        assert_eq!(quiz.remaining(), 1);
        assert_eq!(quiz.questions_resolved(), 0);

        assert_eq!(quiz.reroll_hint().unwrap_err(), QuizError::NoReplacementHint);
    }

    #[test]
    fn test_reroll_rejects_non_hint_questions() {
        let mut quiz = session(vec![free_text("q1", "one")]);
        quiz.activate_next().unwrap();
        assert_eq!(quiz.reroll_hint().unwrap_err(), QuizError::NotAHint);
    }

    #[test]
    fn test_end_session_reports_the_totals() {
        let mut quiz = session(vec![free_text("q1", "one")]);
        let mut stats = TestStats::default();

        quiz.activate_next().unwrap();
        assert_eq!(
            quiz.end_session(&mut stats).unwrap_err(),
            QuizError::QuestionStillActive
        );
        quiz.play_mut().unwrap().submit_text("one").unwrap();
        quiz.complete_question(&mut stats).unwrap();

        let summary = quiz.end_session(&mut stats).unwrap();
        assert_eq!(
            summary,
            SessionSummary::Quiz {
                questions_resolved: 1,
                points_earned: 4,
                points_possible: 4,
            }
        );
        assert_eq!(stats.summaries.len(), 1);
    }

    #[test]
    fn test_same_seed_replays_identically() {
        let questions = || {
            vec![Question {
                id: ContentId::new("rank"),
                prompt: "order them".to_owned(),
                difficulty: Difficulty::Medium,
                payload: QuestionPayload::Ranking {
                    items: vec![
                        "a".to_owned(),
                        "b".to_owned(),
                        "c".to_owned(),
                        "d".to_owned(),
                    ],
                },
            }]
        };
        let mut first = session(questions());
        let mut second = session(questions());
        let order_a = first.activate_next().unwrap().display_order().unwrap().to_vec();
        let order_b = second.activate_next().unwrap().display_order().unwrap().to_vec();
        assert_eq!(order_a, order_b);
    }
}
