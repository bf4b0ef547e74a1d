use rand::Rng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use quizzard_evaluator::is_acceptable_against_any;

use crate::{
    core::{Outcome, Round},
    engine::{
        board::{Board, BoardSnapshot},
        builder::{BuildError, BuildStrategy, GamePlan, GameSeed, build_plan},
        outcome::{OutcomeRecord, SessionSummary, StatsStore, TeamScore, UserId},
        repository::ClueRepository,
    },
};

/// One scoring participant in team mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub score: i64,
}

/// Scoring mode of a session: a lone running score, or named teams with an
/// active-turn index.
///
/// Teams are a scoring concept only; a single caller drives the session
/// either way.
#[derive(Debug, Clone, PartialEq)]
pub enum Participants {
    Solo { score: i64 },
    Teams { teams: Vec<Team>, active: usize },
}

impl Participants {
    fn new(team_names: &[String]) -> Self {
        if team_names.is_empty() {
            Self::Solo { score: 0 }
        } else {
            Self::Teams {
                teams: team_names
                    .iter()
                    .map(|name| Team {
                        name: name.clone(),
                        score: 0,
                    })
                    .collect(),
                active: 0,
            }
        }
    }

    fn team_count(&self) -> usize {
        match self {
            Self::Solo { .. } => 0,
            Self::Teams { teams, .. } => teams.len(),
        }
    }

    fn apply(&mut self, delta: i64, responder: Option<usize>) {
        match self {
            Self::Solo { score } => *score += delta,
            Self::Teams { teams, .. } => {
                if let Some(team) = responder.and_then(|i| teams.get_mut(i)) {
                    team.score += delta;
                }
            }
        }
    }
}

/// The in-flight clue interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveClue {
    pub column: usize,
    pub row: usize,
    /// Captured wager replacing the nominal value for this resolution only.
    pub stake: Option<u32>,
    pub revealed: bool,
    /// Responding team, chosen per clue in team mode.
    pub responder: Option<usize>,
}

/// Session phase. Construction is synchronous, so there is no observable
/// board-building phase: a failed build leaves the session `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum BoardPhase {
    Idle,
    RoundActive,
    /// A daily double was selected bare; the prompt stays hidden until the
    /// stake is placed.
    WagerCapture { column: usize, row: usize },
    ClueActive(ActiveClue),
    Complete,
}

/// Rejection of an operation invalid for the current session state.
///
/// Every rejection leaves the session untouched; the machine never corrupts
/// state on bad input.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    #[display("cannot build board: {_0}")]
    Build(BuildError),
    #[display("{operation} is not valid in the current session phase")]
    InvalidPhase { operation: &'static str },
    #[display("no cell at column {column}, row {row}")]
    UnknownCell { column: usize, row: usize },
    #[display("cell at column {column}, row {row} is already revealed")]
    CellAlreadyRevealed { column: usize, row: usize },
    #[display("this clue does not take a wager")]
    WagerNotAllowed,
    #[display("stake must be a positive number of points")]
    InvalidStake,
    #[display("answer is already revealed")]
    AlreadyRevealed,
    #[display("answer has not been revealed yet")]
    AnswerNotRevealed,
    #[display("no team at index {index}")]
    UnknownTeam { index: usize },
    #[display("session is not in team mode")]
    NoTeams,
    #[display("a responding team must be chosen first")]
    ResponderRequired,
    #[display("round {_0} is not part of this game")]
    RoundNotPresent(#[error(not(source))] Round),
}

impl From<BuildError> for SessionError {
    fn from(err: BuildError) -> Self {
        Self::Build(err)
    }
}

/// The session/board director: a synchronous, call-and-respond state
/// machine driving one play-through.
///
/// `Idle -> RoundActive -> ClueActive (-> WagerCapture) -> RoundActive ->
/// ... -> Complete`. Every public operation either performs a transition or
/// returns a [`SessionError`] with state untouched. Corpus and stats
/// handles are passed into the operations that need them; the session owns
/// only its own mutable state.
#[derive(Debug, Clone)]
pub struct BoardSession {
    user: UserId,
    seed: GameSeed,
    rng: Pcg32,
    participants: Participants,
    plan: Option<GamePlan>,
    board: Option<Board>,
    phase: BoardPhase,
}

impl BoardSession {
    /// Creates an idle session with a random seed. An empty team list means
    /// solo play.
    #[must_use]
    pub fn new(user: UserId, team_names: &[String]) -> Self {
        Self::with_seed(user, team_names, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for reproducible board
    /// construction.
    #[must_use]
    pub fn with_seed(user: UserId, team_names: &[String], seed: GameSeed) -> Self {
        Self {
            user,
            seed,
            rng: seed.rng(),
            participants: Participants::new(team_names),
            plan: None,
            board: None,
            phase: BoardPhase::Idle,
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

    #[must_use]
    pub fn phase(&self) -> &BoardPhase {
        &self.phase
    }

    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    #[must_use]
    pub fn round(&self) -> Option<Round> {
        self.board.as_ref().map(Board::round)
    }

    /// Rounds available to [`Self::switch_round`].
    #[must_use]
    pub fn rounds(&self) -> Vec<Round> {
        self.plan.as_ref().map(GamePlan::rounds).unwrap_or_default()
    }

    #[must_use]
    pub fn scores(&self) -> Vec<TeamScore> {
        match &self.participants {
            Participants::Solo { score } => vec![TeamScore {
                name: self.user.to_string(),
                score: *score,
            }],
            Participants::Teams { teams, .. } => teams
                .iter()
                .map(|team| TeamScore {
                    name: team.name.clone(),
                    score: team.score,
                })
                .collect(),
        }
    }

    /// Builds the session's game with the given construction strategy and
    /// enters the first constructed round.
    ///
    /// On a construction failure the session stays `Idle` and the error is
    /// surfaced as a non-fatal rejection.
    pub fn build_board(
        &mut self,
        strategy: &BuildStrategy,
        repo: &dyn ClueRepository,
        stats: &dyn StatsStore,
    ) -> Result<(), SessionError> {
        if !self.phase.is_idle() {
            return Err(SessionError::InvalidPhase {
                operation: "build board",
            });
        }
        let plan = build_plan(strategy, repo, stats, &mut self.rng)?;
        let Some(round) = plan.rounds().first().copied() else {
            return Err(BuildError::EmptyConstruction.into());
        };
        self.board = plan.board_for(round);
        self.plan = Some(plan);
        self.phase = BoardPhase::RoundActive;
        Ok(())
    }

    /// Selects an unrevealed cell, optionally staking a wager up front.
    ///
    /// A bare selection of a daily double outside the final round enters
    /// wager capture with the prompt hidden; passing `wager` skips that
    /// step. The final round never enters wager capture, so its optional
    /// wager here is the only way to stake it. Wagers on ordinary cells are
    /// rejected.
    pub fn select_cell(
        &mut self,
        column: usize,
        row: usize,
        wager: Option<u32>,
    ) -> Result<(), SessionError> {
        if !self.phase.is_round_active() {
            return Err(SessionError::InvalidPhase {
                operation: "select cell",
            });
        }
        let board = self.board.as_ref().ok_or(SessionError::InvalidPhase {
            operation: "select cell",
        })?;
        let cell = board
            .cell(column, row)
            .ok_or(SessionError::UnknownCell { column, row })?;
        if cell.is_revealed() {
            return Err(SessionError::CellAlreadyRevealed { column, row });
        }

        let round = board.round();
        let takes_wager = cell.clue().is_daily_double || round.is_final();
        match wager {
            Some(0) => return Err(SessionError::InvalidStake),
            Some(_) if !takes_wager => return Err(SessionError::WagerNotAllowed),
            Some(stake) => {
                self.phase = BoardPhase::ClueActive(ActiveClue {
                    column,
                    row,
                    stake: Some(stake),
                    revealed: false,
                    responder: None,
                });
            }
            None if cell.clue().is_daily_double && !round.is_final() => {
                self.phase = BoardPhase::WagerCapture { column, row };
            }
            None => {
                self.phase = BoardPhase::ClueActive(ActiveClue {
                    column,
                    row,
                    stake: None,
                    revealed: false,
                    responder: None,
                });
            }
        }
        Ok(())
    }

    /// Declares the stake for a pending daily double and exposes the clue.
    ///
    /// Any positive stake is accepted; the nominal cell value is the
    /// conventional default but no cap is enforced.
    pub fn place_wager(&mut self, stake: u32) -> Result<(), SessionError> {
        let BoardPhase::WagerCapture { column, row } = self.phase else {
            return Err(SessionError::InvalidPhase {
                operation: "place wager",
            });
        };
        if stake == 0 {
            return Err(SessionError::InvalidStake);
        }
        self.phase = BoardPhase::ClueActive(ActiveClue {
            column,
            row,
            stake: Some(stake),
            revealed: false,
            responder: None,
        });
        Ok(())
    }

    /// Exposes the canonical answer of the active clue.
    pub fn reveal_answer(&mut self) -> Result<String, SessionError> {
        let BoardPhase::ClueActive(active) = &mut self.phase else {
            return Err(SessionError::InvalidPhase {
                operation: "reveal answer",
            });
        };
        if active.revealed {
            return Err(SessionError::AlreadyRevealed);
        }
        active.revealed = true;
        let (column, row) = (active.column, active.row);
        let answer = self
            .board
            .as_ref()
            .and_then(|board| board.cell(column, row))
            .map(|cell| cell.clue().answer.clone())
            .unwrap_or_default();
        Ok(answer)
    }

    /// Chooses the team answering the active clue. Required before an
    /// outcome can be recorded whenever more than one team exists.
    pub fn set_responder(&mut self, team: usize) -> Result<(), SessionError> {
        let team_count = self.participants.team_count();
        if team_count == 0 {
            return Err(SessionError::NoTeams);
        }
        if team >= team_count {
            return Err(SessionError::UnknownTeam { index: team });
        }
        let BoardPhase::ClueActive(active) = &mut self.phase else {
            return Err(SessionError::InvalidPhase {
                operation: "set responder",
            });
        };
        active.responder = Some(team);
        if let Participants::Teams { active: turn, .. } = &mut self.participants {
            *turn = team;
        }
        Ok(())
    }

    /// Grades a free-text answer against the active clue and resolves it in
    /// one transition: the answer is revealed, the signed stake-or-value is
    /// applied, and an outcome record is appended.
    pub fn submit_answer(
        &mut self,
        text: &str,
        stats: &mut dyn StatsStore,
    ) -> Result<Outcome, SessionError> {
        let BoardPhase::ClueActive(active) = self.phase else {
            return Err(SessionError::InvalidPhase {
                operation: "submit answer",
            });
        };
        if active.revealed {
            return Err(SessionError::AlreadyRevealed);
        }
        let responder = self.resolve_responder(active.responder)?;
        let accepted = self
            .board
            .as_ref()
            .and_then(|board| board.cell(active.column, active.row))
            .is_some_and(|cell| is_acceptable_against_any(text, cell.clue().accepted_answers()));
        let outcome = if accepted {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.resolve_active(active, outcome, responder, stats);
        Ok(outcome)
    }

    /// Records a correct/incorrect/skip judgment for the revealed clue.
    ///
    /// Applies the signed stake-or-value to the responding score, marks the
    /// cell revealed, and appends an outcome record. A second record attempt
    /// for the same clue is rejected without touching state, so duplicate
    /// UI events can never double-count.
    pub fn record_outcome(
        &mut self,
        outcome: Outcome,
        stats: &mut dyn StatsStore,
    ) -> Result<(), SessionError> {
        let BoardPhase::ClueActive(active) = self.phase else {
            return Err(SessionError::InvalidPhase {
                operation: "record outcome",
            });
        };
        if !active.revealed {
            return Err(SessionError::AnswerNotRevealed);
        }
        let responder = self.resolve_responder(active.responder)?;
        self.resolve_active(active, outcome, responder, stats);
        Ok(())
    }

    /// Moves to another round of the constructed game, rebuilding that
    /// round's board fresh.
    pub fn switch_round(&mut self, round: Round) -> Result<(), SessionError> {
        if !self.phase.is_round_active() {
            return Err(SessionError::InvalidPhase {
                operation: "switch round",
            });
        }
        let plan = self.plan.as_ref().ok_or(SessionError::InvalidPhase {
            operation: "switch round",
        })?;
        if !plan.has_round(round) {
            return Err(SessionError::RoundNotPresent(round));
        }
        self.board = plan.board_for(round);
        Ok(())
    }

    /// Ends the session, emitting the completion summary to the stats store
    /// and discarding the board.
    ///
    /// Abandoning a session is simply dropping it instead; no completion
    /// event is emitted in that case.
    pub fn end_session(
        &mut self,
        stats: &mut dyn StatsStore,
    ) -> Result<SessionSummary, SessionError> {
        if !self.phase.is_round_active() {
            return Err(SessionError::InvalidPhase {
                operation: "end session",
            });
        }
        let summary = SessionSummary::Board {
            episode: self.plan.as_ref().and_then(|plan| plan.episode.clone()),
            scores: self.scores(),
        };
        stats.record_session_completed(&self.user, summary.clone());
        self.board = None;
        self.phase = BoardPhase::Complete;
        Ok(summary)
    }

    /// Observable session state for the presentation boundary.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let interaction = match &self.phase {
            BoardPhase::WagerCapture { column, row } => {
                self.interaction_snapshot(*column, *row, None, false, None)
            }
            BoardPhase::ClueActive(active) => self.interaction_snapshot(
                active.column,
                active.row,
                active.stake,
                active.revealed,
                active.responder,
            ),
            _ => None,
        };
        SessionSnapshot {
            phase: match &self.phase {
                BoardPhase::Idle => PhaseSnapshot::Idle,
                BoardPhase::RoundActive => PhaseSnapshot::RoundActive,
                BoardPhase::WagerCapture { .. } => PhaseSnapshot::WagerCapture,
                BoardPhase::ClueActive(active) if active.revealed => PhaseSnapshot::AnswerRevealed,
                BoardPhase::ClueActive(_) => PhaseSnapshot::ClueActive,
                BoardPhase::Complete => PhaseSnapshot::Complete,
            },
            round: self.round(),
            board: self.board.as_ref().map(Board::snapshot),
            scores: self.scores(),
            interaction,
        }
    }

    fn interaction_snapshot(
        &self,
        column: usize,
        row: usize,
        stake: Option<u32>,
        revealed: bool,
        responder: Option<usize>,
    ) -> Option<InteractionSnapshot> {
        let cell = self.board.as_ref()?.cell(column, row)?;
        let wagering = stake.is_none() && matches!(self.phase, BoardPhase::WagerCapture { .. });
        Some(InteractionSnapshot {
            column,
            row,
            category: cell.clue().category.clone(),
            value: cell.value(),
            stake,
            is_daily_double: cell.clue().is_daily_double,
            // The prompt stays hidden until any pending wager is placed.
            prompt: (!wagering).then(|| cell.clue().prompt.clone()),
            answer: revealed.then(|| cell.clue().answer.clone()),
            responder,
        })
    }

    fn resolve_responder(&self, chosen: Option<usize>) -> Result<Option<usize>, SessionError> {
        match self.participants.team_count() {
            0 => Ok(None),
            1 => Ok(Some(0)),
            _ => chosen.map(Some).ok_or(SessionError::ResponderRequired),
        }
    }

    fn resolve_active(
        &mut self,
        active: ActiveClue,
        outcome: Outcome,
        responder: Option<usize>,
        stats: &mut dyn StatsStore,
    ) {
        let Some(board) = self.board.as_mut() else {
            return;
        };
        let Some(cell) = board.cell(active.column, active.row) else {
            return;
        };
        let value = active.stake.unwrap_or_else(|| cell.value().unwrap_or(0));
        let content_id = cell.clue().id.clone();

        let delta = match outcome {
            Outcome::Correct => i64::from(value),
            Outcome::Incorrect => -i64::from(value),
            Outcome::Skip => 0,
        };
        self.participants.apply(delta, responder);

        let record = OutcomeRecord {
            content_id,
            outcome,
            points_earned: if outcome.is_correct() { value } else { 0 },
            points_possible: value,
        };
        stats.record_outcome(&self.user, record);

        if let Some(board) = self.board.as_mut() {
            board.reveal(active.column, active.row);
        }
        self.phase = BoardPhase::RoundActive;
    }
}

/// Phase as exposed to the presentation boundary; the revealed sub-state of
/// an active clue surfaces as its own phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseSnapshot {
    Idle,
    RoundActive,
    WagerCapture,
    ClueActive,
    AnswerRevealed,
    Complete,
}

/// Serializable view of the observable session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: PhaseSnapshot,
    pub round: Option<Round>,
    pub board: Option<BoardSnapshot>,
    pub scores: Vec<TeamScore>,
    pub interaction: Option<InteractionSnapshot>,
}

/// The currently-active clue interaction as the caller may observe it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSnapshot {
    pub column: usize,
    pub row: usize,
    pub category: String,
    pub value: Option<u32>,
    pub stake: Option<u32>,
    pub is_daily_double: bool,
    /// `None` while a wager is being captured.
    pub prompt: Option<String>,
    /// `None` until the answer is revealed.
    pub answer: Option<String>,
    pub responder: Option<usize>,
}
