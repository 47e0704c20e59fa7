//! Turn/round state machine and the loop that drives it.
//!
//! # Phases
//! `Setup` → `Playing` → `Finished`, with `Finished` → `Playing` only through
//! `play_again` and any phase → `Setup` through `reset_to_setup`.
//!
//! Within `Playing`, every turn goes `AwaitingAnswer` → `AnswerShown` and then
//! `advance_turn` moves to the next team and word.
//!
//! Transitions take the state by value and hand back the next one. A
//! transition requested in the wrong phase returns the state untouched.

use crate::config::{
    AnswerMode, GameConfig, GameSettings, MAX_TEAMS, MAX_WORDS_PER_TEAM, MIN_TEAMS,
    MIN_WORDS_PER_TEAM, team_color,
};
use crate::error::GameError;
use crate::leaderboard::{Leaderboard, build_leaderboard};
use crate::normalize::answers_match;
use crate::timer::{Clock, TimerEvent, TurnTimers};
use crate::wordbank::{Difficulty, WordEntry, mask_word, sample_for_teams};
use crate::{debug_log, info_log};
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: usize,
    pub name: String,
    pub score: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingAnswer,
    AnswerShown,
}

/// How the current turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Correct,
    Wrong,
    TimedOut,
    /// The team asked to see the answer without guessing.
    Revealed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub teams: Vec<Team>,
    pub current_team_index: usize,
    pub current_word_index: usize,
    pub words: Vec<WordEntry>,
    pub phase: Phase,
    pub turn_phase: TurnPhase,
    pub show_hint: bool,
    /// `None` until a guess is submitted; stays `None` on time-out.
    pub selected_answer: Option<String>,
    pub is_answer_correct: Option<bool>,
    pub answer_mode: AnswerMode,
    pub difficulty: Difficulty,
    pub words_per_team: usize,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            teams: Vec::new(),
            current_team_index: 0,
            current_word_index: 0,
            words: Vec::new(),
            phase: Phase::Setup,
            turn_phase: TurnPhase::AwaitingAnswer,
            show_hint: false,
            selected_answer: None,
            is_answer_correct: None,
            answer_mode: AnswerMode::Text,
            difficulty: Difficulty::Easy,
            words_per_team: 0,
        }
    }
}

/// Check team names and word count before anything is sampled.
pub fn validate_settings(settings: &GameSettings) -> Result<Vec<String>, GameError> {
    let names: Vec<String> = settings
        .team_names
        .iter()
        .map(|n| n.trim().to_string())
        .collect();
    if names.iter().any(String::is_empty) {
        return Err(GameError::BlankTeamName);
    }
    if names.len() < MIN_TEAMS {
        return Err(GameError::TooFewTeams {
            min: MIN_TEAMS,
            got: names.len(),
        });
    }
    if names.len() > MAX_TEAMS {
        return Err(GameError::TooManyTeams {
            max: MAX_TEAMS,
            got: names.len(),
        });
    }
    if !(MIN_WORDS_PER_TEAM..=MAX_WORDS_PER_TEAM).contains(&settings.words_per_team) {
        return Err(GameError::WordCountOutOfRange {
            min: MIN_WORDS_PER_TEAM,
            max: MAX_WORDS_PER_TEAM,
            got: settings.words_per_team,
        });
    }
    Ok(names)
}

impl GameState {
    /// Leave setup: build teams and sample `words_per_team * teams` words.
    pub fn start<R: Rng + ?Sized>(
        settings: &GameSettings,
        catalog: &[WordEntry],
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let names = validate_settings(settings)?;
        let words = sample_for_teams(
            catalog,
            settings.difficulty,
            settings.words_per_team,
            names.len(),
            rng,
        );
        if words.is_empty() {
            return Err(GameError::EmptyCatalog(settings.difficulty));
        }

        let teams = names
            .into_iter()
            .enumerate()
            .map(|(id, name)| Team {
                id,
                name,
                score: 0,
                color: team_color(id),
            })
            .collect::<Vec<_>>();

        info_log!(
            "Game started: {} teams, {} {} words, {} mode",
            teams.len(),
            words.len(),
            settings.difficulty,
            settings.answer_mode
        );

        Ok(Self {
            teams,
            words,
            phase: Phase::Playing,
            answer_mode: settings.answer_mode,
            difficulty: settings.difficulty,
            words_per_team: settings.words_per_team,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn current_team(&self) -> Option<&Team> {
        self.teams.get(self.current_team_index)
    }

    #[must_use]
    pub fn next_team(&self) -> Option<&Team> {
        if self.teams.is_empty() {
            return None;
        }
        self.teams.get((self.current_team_index + 1) % self.teams.len())
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&WordEntry> {
        self.words.get(self.current_word_index)
    }

    #[must_use]
    pub fn is_last_word(&self) -> bool {
        self.current_word_index + 1 >= self.words.len()
    }

    #[must_use]
    pub fn is_awaiting_answer(&self) -> bool {
        self.phase == Phase::Playing && self.turn_phase == TurnPhase::AwaitingAnswer
    }

    #[must_use]
    pub fn outcome(&self) -> Option<TurnOutcome> {
        if self.phase != Phase::Playing || self.turn_phase != TurnPhase::AnswerShown {
            return None;
        }
        let outcome = match (self.is_answer_correct, &self.selected_answer) {
            (Some(true), _) => TurnOutcome::Correct,
            (Some(false), Some(_)) => TurnOutcome::Wrong,
            (Some(false), None) => TurnOutcome::TimedOut,
            (None, _) => TurnOutcome::Revealed,
        };
        Some(outcome)
    }

    /// Score the active team's guess. An empty string is the time-out sentinel
    /// and always counts as wrong.
    #[must_use]
    pub fn submit_answer(mut self, raw: &str, config: &GameConfig) -> Self {
        if !self.is_awaiting_answer() {
            debug_log!("submit_answer() - ignored in {:?}/{:?}", self.phase, self.turn_phase);
            return self;
        }
        let Some(correct) = self.current_word().map(|w| w.correct_answer.clone()) else {
            return self;
        };

        let is_time_up = raw.is_empty();
        let is_correct = !is_time_up && answers_match(raw, &correct);
        let points = if is_correct {
            config.points_per_correct_answer
        } else if is_time_up {
            config.points_for_time_up
        } else {
            0
        };

        let team_index = self.current_team_index;
        if let Some(team) = self.teams.get_mut(team_index) {
            team.score += points;
            info_log!(
                "Turn {}: {} answered {:?} -> {} (+{})",
                self.current_word_index + 1,
                team.name,
                raw,
                if is_correct { "correct" } else { "wrong" },
                points
            );
        }

        self.selected_answer = if is_time_up {
            None
        } else {
            Some(raw.to_string())
        };
        self.is_answer_correct = Some(is_correct);
        self.show_hint = false;
        self.turn_phase = TurnPhase::AnswerShown;
        self
    }

    /// Show the answer without a guess; no points change hands.
    #[must_use]
    pub fn reveal_answer(mut self) -> Self {
        if !self.is_awaiting_answer() {
            return self;
        }
        self.selected_answer = None;
        self.is_answer_correct = None;
        self.show_hint = false;
        self.turn_phase = TurnPhase::AnswerShown;
        self
    }

    #[must_use]
    pub fn show_hint(mut self) -> Self {
        if self.is_awaiting_answer() {
            self.show_hint = true;
        }
        self
    }

    #[must_use]
    pub fn hide_hint(mut self) -> Self {
        self.show_hint = false;
        self
    }

    #[must_use]
    pub fn set_answer_mode(mut self, mode: AnswerMode) -> Self {
        self.answer_mode = mode;
        self
    }

    /// Hand the turn to the next team and move to the next word, finishing
    /// the game once the word list is exhausted.
    #[must_use]
    pub fn advance_turn(mut self) -> Self {
        if self.phase != Phase::Playing || self.teams.is_empty() {
            debug_log!("advance_turn() - ignored in {:?}", self.phase);
            return self;
        }
        self.current_team_index = (self.current_team_index + 1) % self.teams.len();
        self.current_word_index += 1;
        self.selected_answer = None;
        self.is_answer_correct = None;
        self.show_hint = false;
        self.turn_phase = TurnPhase::AwaitingAnswer;

        if self.current_word_index >= self.words.len() {
            self.current_word_index = self.words.len();
            self.phase = Phase::Finished;
            info_log!("Game finished after {} words", self.words.len());
        }
        self
    }

    /// Throw everything away and go back to team setup.
    #[must_use]
    pub fn reset_to_setup(self) -> Self {
        info_log!("Back to setup");
        Self::default()
    }

    /// Same teams, scores zeroed, a fresh word list of the same size.
    #[must_use]
    pub fn play_again<R: Rng + ?Sized>(mut self, catalog: &[WordEntry], rng: &mut R) -> Self {
        if self.phase != Phase::Finished {
            return self;
        }
        let words = sample_for_teams(
            catalog,
            self.difficulty,
            self.words_per_team,
            self.teams.len(),
            rng,
        );
        if words.is_empty() {
            debug_log!("play_again() - no {} words left, staying finished", self.difficulty);
            return self;
        }
        for team in &mut self.teams {
            team.score = 0;
        }
        info_log!("Play again: {} words", words.len());
        Self {
            teams: self.teams,
            words,
            phase: Phase::Playing,
            answer_mode: self.answer_mode,
            difficulty: self.difficulty,
            words_per_team: self.words_per_team,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn leaderboard(&self) -> Leaderboard {
        build_leaderboard(&self.teams)
    }
}

// Interface between the state machine and a front end

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// A guess, already normalized by the input editor
    Submit(String),
    ShowHint,
    Reveal,
    NextTurn,
    SwitchMode(AnswerMode),
    PlayAgain,
    BackToStart,
    Exit,
}

/// What a front end needs to draw the current turn.
#[derive(Debug)]
pub struct TurnView<'a> {
    pub state: &'a GameState,
    /// Masked form of the current word, fixed for the whole turn
    pub masked_word: &'a str,
    pub answer_secs_left: Option<u64>,
    pub hint_secs_left: Option<u64>,
}

pub trait GameInterface {
    /// Collect setup choices. `None` quits the program.
    fn read_settings(&mut self, defaults: &GameSettings) -> Option<GameSettings>;
    fn display_setup_error(&mut self, error: &GameError);
    fn display_turn(&mut self, view: &TurnView);
    fn display_hint(&mut self, view: &TurnView);
    /// Wait briefly for the player. `None` means nothing actionable happened.
    fn read_action(&mut self, view: &TurnView) -> Option<UserAction>;
    fn display_outcome(&mut self, view: &TurnView, outcome: TurnOutcome);
    fn display_leaderboard(&mut self, board: &Leaderboard);
    /// `PlayAgain`, `BackToStart` or `Exit`; `None` keeps waiting.
    fn read_final_action(&mut self, board: &Leaderboard) -> Option<UserAction>;
    fn display_exit_message(&mut self);
}

/// Everything `game_loop` needs besides the front end.
pub struct GameContext<'a, R: Rng + ?Sized, C: Clock + ?Sized> {
    pub catalog: &'a [WordEntry],
    pub config: &'a GameConfig,
    pub defaults: &'a GameSettings,
    pub rng: &'a mut R,
    pub clock: &'a C,
}

enum Flow {
    Continue(GameState),
    Exit,
}

/// Run games until the player quits.
pub fn game_loop<I, R, C>(ctx: &mut GameContext<'_, R, C>, interface: &mut I)
where
    I: GameInterface + ?Sized,
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    let mut state = GameState::default();
    loop {
        let flow = match state.phase {
            Phase::Setup => run_setup(ctx, interface, state),
            Phase::Playing => run_turn(ctx, interface, state),
            Phase::Finished => run_leaderboard(ctx, interface, state),
        };
        match flow {
            Flow::Continue(next) => state = next,
            Flow::Exit => break,
        }
    }
    interface.display_exit_message();
}

fn run_setup<I, R, C>(ctx: &mut GameContext<'_, R, C>, interface: &mut I, state: GameState) -> Flow
where
    I: GameInterface + ?Sized,
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    let Some(settings) = interface.read_settings(ctx.defaults) else {
        return Flow::Exit;
    };
    match GameState::start(&settings, ctx.catalog, &mut *ctx.rng) {
        Ok(started) => Flow::Continue(started),
        Err(e) => {
            info_log!("Setup rejected: {}", e);
            interface.display_setup_error(&e);
            Flow::Continue(state)
        }
    }
}

fn turn_view<'a, C: Clock + ?Sized>(
    state: &'a GameState,
    masked_word: &'a str,
    timers: &TurnTimers,
    clock: &C,
) -> TurnView<'a> {
    let now = clock.now();
    TurnView {
        state,
        masked_word,
        answer_secs_left: timers.answer_secs_left(now),
        hint_secs_left: timers.hint_secs_left(now),
    }
}

/// Apply expired countdowns. The answer countdown submits the time-out
/// sentinel at most once, and only while the turn still awaits an answer.
fn apply_timer_events<I, C>(
    mut state: GameState,
    timers: &mut TurnTimers,
    masked_word: &str,
    config: &GameConfig,
    clock: &C,
    interface: &mut I,
) -> GameState
where
    I: GameInterface + ?Sized,
    C: Clock + ?Sized,
{
    for event in timers.poll(state.current_word_index, clock.now()) {
        match event {
            TimerEvent::HintExpired => state = state.hide_hint(),
            TimerEvent::AnswerExpired if state.is_awaiting_answer() => {
                state = state.submit_answer("", config);
                let view = turn_view(&state, masked_word, timers, clock);
                interface.display_outcome(&view, TurnOutcome::TimedOut);
            }
            TimerEvent::AnswerExpired => {}
        }
    }
    state
}

fn run_turn<I, R, C>(ctx: &mut GameContext<'_, R, C>, interface: &mut I, mut state: GameState) -> Flow
where
    I: GameInterface + ?Sized,
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    let turn = state.current_word_index;
    let Some(masked) = state
        .current_word()
        .map(|word| mask_word(&word.word, &mut *ctx.rng))
    else {
        return Flow::Continue(state.advance_turn());
    };
    let mut timers = TurnTimers::start(turn, ctx.config, ctx.clock.now());
    interface.display_turn(&turn_view(&state, &masked, &timers, ctx.clock));

    loop {
        state = apply_timer_events(state, &mut timers, &masked, ctx.config, ctx.clock, interface);
        let action = interface.read_action(&turn_view(&state, &masked, &timers, ctx.clock));
        // A blocking read may have outlived the countdown: time-out wins
        state = apply_timer_events(state, &mut timers, &masked, ctx.config, ctx.clock, interface);
        let Some(action) = action else {
            continue;
        };
        debug_log!("run_turn() - action {:?}", action);

        match action {
            UserAction::Submit(guess) if state.is_awaiting_answer() && !guess.is_empty() => {
                timers.cancel();
                state = state.submit_answer(&guess, ctx.config);
                if let Some(outcome) = state.outcome() {
                    let view = turn_view(&state, &masked, &timers, ctx.clock);
                    interface.display_outcome(&view, outcome);
                }
            }
            UserAction::ShowHint if state.is_awaiting_answer() => {
                state = state.show_hint();
                timers.start_hint(ctx.clock.now());
                interface.display_hint(&turn_view(&state, &masked, &timers, ctx.clock));
            }
            UserAction::Reveal if state.is_awaiting_answer() => {
                timers.cancel();
                state = state.reveal_answer();
                let view = turn_view(&state, &masked, &timers, ctx.clock);
                interface.display_outcome(&view, TurnOutcome::Revealed);
            }
            UserAction::NextTurn if !state.is_awaiting_answer() => {
                timers.cancel();
                return Flow::Continue(state.advance_turn());
            }
            UserAction::SwitchMode(mode) => {
                state = state.set_answer_mode(mode);
                interface.display_turn(&turn_view(&state, &masked, &timers, ctx.clock));
            }
            UserAction::BackToStart => {
                timers.cancel();
                return Flow::Continue(state.reset_to_setup());
            }
            UserAction::Exit => return Flow::Exit,
            other => {
                debug_log!("run_turn() - {:?} not applicable now", other);
            }
        }
    }
}

fn run_leaderboard<I, R, C>(
    ctx: &mut GameContext<'_, R, C>,
    interface: &mut I,
    state: GameState,
) -> Flow
where
    I: GameInterface + ?Sized,
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    let board = state.leaderboard();
    interface.display_leaderboard(&board);
    loop {
        match interface.read_final_action(&board) {
            Some(UserAction::PlayAgain) => {
                return Flow::Continue(state.play_again(ctx.catalog, &mut *ctx.rng));
            }
            Some(UserAction::BackToStart) => return Flow::Continue(state.reset_to_setup()),
            Some(UserAction::Exit) => return Flow::Exit,
            Some(_) | None => {}
        }
    }
}
