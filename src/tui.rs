//! TUI (Terminal User Interface) for the party game
//!
//! # Screens
//! - `Setup`: team list, difficulty, words per team and answer mode
//! - `Turn`: masked word, countdowns, hint, answer editor and scores; after a
//!   miss the correct answer is revealed one letter at a time
//! - `Leaderboard`: final standings
//!
//! The game loop owns the state; this module only keeps what it needs to
//! redraw between calls (a snapshot of the last turn view, the editors and
//! the setup form).

use crate::config::{
    AnswerMode, GameSettings, MAX_TEAMS, MAX_WORDS_PER_TEAM, MIN_TEAMS, MIN_WORDS_PER_TEAM,
    team_color,
};
use crate::error::GameError;
use crate::game_state::{GameInterface, TurnOutcome, TurnView, UserAction};
use crate::input::{TextEntry, TileEntry, VoiceEntry, length_hint};
use crate::leaderboard::{Leaderboard, medal};
use crate::normalize::letter_count;
use crate::speech::UnsupportedSpeech;
use crate::wordbank::{Difficulty, MASK_PLACEHOLDER};
use crate::{debug_log, info_log};
use clap::ValueEnum;
use crossterm::{
    cursor,
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;
const MAX_TEAM_NAME_LEN: usize = 24;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const WORD_STYLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);
const TILE_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);
const TILE_FOCUS_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiState {
    Setup,
    Turn,
    Leaderboard,
}

enum SetupCommand {
    Start,
    Quit,
}

/// Values being edited on the setup screen.
#[derive(Debug, Clone)]
struct SetupForm {
    team_names: Vec<String>,
    /// Team the Delete key removes; the last one when nothing is selected.
    selected: Option<usize>,
    name_input: String,
    difficulty: Difficulty,
    words_per_team: usize,
    answer_mode: AnswerMode,
}

impl SetupForm {
    fn from_defaults(defaults: &GameSettings) -> Self {
        Self {
            team_names: defaults.team_names.clone(),
            selected: None,
            name_input: String::new(),
            difficulty: defaults.difficulty,
            words_per_team: defaults
                .words_per_team
                .clamp(MIN_WORDS_PER_TEAM, MAX_WORDS_PER_TEAM),
            answer_mode: defaults.answer_mode,
        }
    }

    fn select_next(&mut self) {
        if self.team_names.is_empty() {
            return;
        }
        let last = self.team_names.len() - 1;
        self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
    }

    fn select_prev(&mut self) {
        if self.team_names.is_empty() {
            return;
        }
        let last = self.team_names.len() - 1;
        self.selected = Some(self.selected.map_or(last, |i| i.saturating_sub(1)));
    }

    /// Remove the selected team and keep the selection on a neighbour.
    fn remove_team(&mut self) -> Option<String> {
        let index = self
            .selected
            .filter(|&i| i < self.team_names.len())
            .or_else(|| self.team_names.len().checked_sub(1))?;
        let removed = self.team_names.remove(index);
        self.selected = match self.selected {
            Some(_) if !self.team_names.is_empty() => Some(index.min(self.team_names.len() - 1)),
            _ => None,
        };
        Some(removed)
    }

    fn settings(&self) -> GameSettings {
        GameSettings {
            team_names: self.team_names.clone(),
            difficulty: self.difficulty,
            words_per_team: self.words_per_team,
            answer_mode: self.answer_mode,
        }
    }
}

/// Owned copy of a `TurnView`, kept for redraws outside `read_action`.
#[derive(Debug, Clone)]
struct TurnScreen {
    turn: usize,
    team_name: String,
    team_color: &'static str,
    next_team: Option<String>,
    word_number: usize,
    word_total: usize,
    masked: String,
    letters: usize,
    hint: String,
    show_hint: bool,
    hint_secs: Option<u64>,
    answer_secs: Option<u64>,
    answer_mode: AnswerMode,
    awaiting: bool,
    outcome: Option<TurnOutcome>,
    guess: Option<String>,
    answer: String,
    is_last_word: bool,
    scores: Vec<(String, u32, &'static str)>,
}

impl TurnScreen {
    fn from_view(view: &TurnView) -> Option<Self> {
        let state = view.state;
        let team = state.current_team()?;
        let word = state.current_word()?;
        Some(Self {
            turn: state.current_word_index,
            team_name: team.name.clone(),
            team_color: team.color,
            next_team: state.next_team().map(|t| t.name.clone()),
            word_number: state.current_word_index + 1,
            word_total: state.words.len(),
            masked: view.masked_word.to_string(),
            letters: letter_count(&word.correct_answer),
            hint: word.hint.clone(),
            show_hint: state.show_hint,
            hint_secs: view.hint_secs_left,
            answer_secs: view.answer_secs_left,
            answer_mode: state.answer_mode,
            awaiting: state.is_awaiting_answer(),
            outcome: state.outcome(),
            guess: state.selected_answer.clone(),
            answer: word.correct_answer.clone(),
            is_last_word: state.is_last_word(),
            scores: state
                .teams
                .iter()
                .map(|t| (t.name.clone(), t.score, t.color))
                .collect(),
        })
    }
}

/// Step through a `ValueEnum`'s variants, wrapping at both ends.
fn cycle<T: ValueEnum + PartialEq + Clone>(current: &T, forward: bool) -> T {
    let variants = T::value_variants();
    let index = variants.iter().position(|v| v == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % variants.len()
    } else {
        (index + variants.len() - 1) % variants.len()
    };
    variants[next].clone()
}

/// `#RRGGBB` to a terminal color; anything else is white.
fn hex_color(hex: &str) -> Color {
    let channel =
        |range: std::ops::Range<usize>| hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok());
    match (
        hex.strip_prefix('#').map(str::len),
        channel(1..3),
        channel(3..5),
        channel(5..7),
    ) {
        (Some(6), Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

/// The first `shown` characters of `word`; the rest stay as placeholders
/// while the reveal animation runs. Spaces always show.
fn reveal_prefix(word: &str, shown: usize) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if i < shown || c == ' ' {
                c
            } else {
                MASK_PLACEHOLDER
            }
        })
        .collect()
}

/// Number of characters visible `elapsed` after the reveal started.
fn revealed_count(elapsed: Duration, interval: Duration, total: usize) -> usize {
    if interval.is_zero() {
        return total;
    }
    let steps = elapsed.as_millis() / interval.as_millis().max(1);
    usize::try_from(steps).map_or(total, |s| s.saturating_add(1).min(total))
}

fn spaced(word: &str) -> String {
    word.chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn has_modifier_keys(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
}

enum InputEvent {
    Key(KeyEvent),
    Paste(String),
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    state: TuiState,
    setup: &'a SetupForm,
    turn: Option<&'a TurnScreen>,
    revealed: usize,
    text: &'a TextEntry,
    tiles: &'a TileEntry,
    voice: &'a VoiceEntry,
    board: Option<&'a Leaderboard>,
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and game state display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    state: TuiState,
    setup: SetupForm,
    turn: Option<TurnScreen>,
    reveal_started: Instant,
    letter_reveal_interval: Duration,
    text: TextEntry,
    tiles: TileEntry,
    voice: VoiceEntry,
    board: Option<Leaderboard>,
    message: String,
    error_message: String,
    status: String,
}

impl TuiInterface {
    pub fn new(letter_reveal_interval: Duration) -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste, cursor::Hide)?;
        info_log!("Terminal setup complete: alternate screen, bracketed paste, cursor hidden");
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state: TuiState::Setup,
            setup: SetupForm::from_defaults(&GameSettings::default()),
            turn: None,
            reveal_started: Instant::now(),
            letter_reveal_interval,
            text: TextEntry::new(),
            tiles: TileEntry::new(0),
            voice: VoiceEntry::new(Box::new(UnsupportedSpeech)),
            board: None,
            message: String::new(),
            error_message: String::new(),
            status: "Ready to start".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    /// Draw the current UI state to the terminal.
    fn draw(&mut self) -> Result<(), io::Error> {
        let revealed = self.turn.as_ref().map_or(0, |turn| {
            let total = turn.answer.chars().count();
            match turn.outcome {
                Some(TurnOutcome::Correct) | None => total,
                Some(_) => revealed_count(
                    self.reveal_started.elapsed(),
                    self.letter_reveal_interval,
                    total,
                ),
            }
        });
        let ctx = RenderContext {
            state: self.state,
            setup: &self.setup,
            turn: self.turn.as_ref(),
            revealed,
            text: &self.text,
            tiles: &self.tiles,
            voice: &self.voice,
            board: self.board.as_ref(),
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    /// Log and handle draw errors appropriately
    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    /// Render the complete UI layout using the provided context.
    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(12),   // Screen body
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0]);
        match ctx.state {
            TuiState::Setup => Self::render_setup(f, chunks[1], ctx),
            TuiState::Turn => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                    .split(chunks[1]);
                Self::render_turn(f, columns[0], ctx);
                Self::render_scores(f, columns[1], ctx.turn);
            }
            TuiState::Leaderboard => Self::render_leaderboard(f, chunks[1], ctx),
        }
        Self::render_status(f, chunks[2], ctx.status);
        Self::render_instructions(f, chunks[3], ctx);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("WORD PARTY")
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn push_messages(lines: &mut Vec<Line<'_>>, message: &str, error_message: &str) {
        if !message.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![Span::styled(message.to_string(), MESSAGE_STYLE)]));
        }
        if !error_message.is_empty() {
            lines.push(Line::from(vec![Span::styled(
                error_message.to_string(),
                ERROR_STYLE,
            )]));
        }
    }

    fn render_setup(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let form = ctx.setup;
        let mut lines = vec![Line::from(vec![Span::styled(
            format!("Teams ({}/{MAX_TEAMS}):", form.team_names.len()),
            HEADER_STYLE,
        )])];
        if form.team_names.is_empty() {
            lines.push(Line::from("  (none yet)"));
        }
        for (i, name) in form.team_names.iter().enumerate() {
            let selected = form.selected == Some(i);
            lines.push(Line::from(vec![
                Span::raw(if selected { "▶ " } else { "  " }),
                Span::styled("■ ", Style::new().fg(hex_color(team_color(i)))),
                if selected {
                    Span::styled(name.clone(), TILE_FOCUS_STYLE)
                } else {
                    Span::raw(name.clone())
                },
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("New team: ", INFO_STYLE),
            Span::raw(format!("{}_", form.name_input)),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Difficulty:     < {} >", form.difficulty)));
        lines.push(Line::from(format!(
            "Words per team: < {} >  ({MIN_WORDS_PER_TEAM}-{MAX_WORDS_PER_TEAM})",
            form.words_per_team
        )));
        lines.push(Line::from(format!("Answer mode:    < {} >", form.answer_mode)));
        Self::push_messages(&mut lines, ctx.message, ctx.error_message);

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Team Setup").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_turn(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let Some(turn) = ctx.turn else {
            f.render_widget(Block::default().borders(Borders::ALL), area);
            return;
        };
        let mut lines = vec![
            Line::from(vec![Span::styled(
                format!("{}'s turn", turn.team_name),
                Style::new()
                    .fg(hex_color(turn.team_color))
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(format!(
                "Word {} of {}{}",
                turn.word_number,
                turn.word_total,
                turn.next_team
                    .as_ref()
                    .map(|n| format!("  |  Next up: {n}"))
                    .unwrap_or_default()
            )),
            Line::from(""),
            Line::from(vec![Span::styled(spaced(&turn.masked), WORD_STYLE)]),
            Line::from(format!("({} letters)", turn.letters)),
        ];
        if let Some(secs) = turn.answer_secs {
            let style = if secs <= 5 { ERROR_STYLE } else { INFO_STYLE };
            lines.push(Line::from(vec![Span::styled(format!("⏱ {secs}s left"), style)]));
        }
        if turn.show_hint {
            lines.push(Line::from(vec![Span::styled(
                format!(
                    "💡 {} ({}s)",
                    turn.hint,
                    turn.hint_secs.unwrap_or_default()
                ),
                MESSAGE_STYLE,
            )]));
        }
        lines.push(Line::from(""));

        if turn.awaiting {
            Self::push_editor(&mut lines, turn, ctx);
        } else {
            Self::push_outcome(&mut lines, turn, ctx.revealed);
        }
        Self::push_messages(&mut lines, ctx.message, ctx.error_message);

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Guess the word").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn push_editor(lines: &mut Vec<Line<'_>>, turn: &TurnScreen, ctx: &RenderContext) {
        match turn.answer_mode {
            AnswerMode::Text => {
                let value = ctx.text.value();
                let hint = length_hint(turn.letters, value);
                lines.push(Line::from(format!("> {value}_")));
                if !value.trim().is_empty() {
                    let style = if hint.ok { SUCCESS_STYLE } else { INFO_STYLE };
                    lines.push(Line::from(vec![Span::styled(hint.text, style)]));
                }
            }
            AnswerMode::Tiles => {
                let mut spans = vec![Span::raw("  ")];
                for (i, letter) in ctx.tiles.letters().iter().enumerate() {
                    if ctx.tiles.starts_word(i) {
                        spans.push(Span::raw("   "));
                    }
                    let style = if i == ctx.tiles.cursor() {
                        TILE_FOCUS_STYLE
                    } else {
                        TILE_STYLE
                    };
                    let c = letter.map_or(' ', |c| c.to_ascii_uppercase());
                    spans.push(Span::styled(format!(" {c} "), style));
                    spans.push(Span::raw(" "));
                }
                lines.push(Line::from(spans));
            }
            AnswerMode::Voice => {
                if let Some(status) = ctx.voice.status_message() {
                    lines.push(Line::from(vec![Span::styled(status, ERROR_STYLE)]));
                }
                if ctx.voice.supported() {
                    let (_, label) = ctx.voice.language();
                    let listening = if ctx.voice.is_listening() {
                        "🎤 Listening..."
                    } else {
                        "🎤 Press F4 to speak"
                    };
                    lines.push(Line::from(format!("{listening}  [{label}]")));
                    lines.push(Line::from(format!("> {}_", ctx.voice.edited())));
                }
            }
        }
    }

    fn push_outcome(lines: &mut Vec<Line<'_>>, turn: &TurnScreen, revealed: usize) {
        let (text, style) = match turn.outcome {
            Some(TurnOutcome::Correct) => ("Correct! 🎉".to_string(), SUCCESS_STYLE),
            Some(TurnOutcome::Wrong) => (
                format!(
                    "Wrong answer! 😞 You guessed: \"{}\"",
                    turn.guess.as_deref().unwrap_or_default()
                ),
                ERROR_STYLE,
            ),
            Some(TurnOutcome::TimedOut) => {
                ("Time's up! ⏰ You ran out of time.".to_string(), ERROR_STYLE)
            }
            Some(TurnOutcome::Revealed) | None => ("Answer revealed".to_string(), INFO_STYLE),
        };
        lines.push(Line::from(vec![Span::styled(text, style)]));
        lines.push(Line::from(vec![
            Span::raw("The correct answer is: "),
            Span::styled(spaced(&reveal_prefix(&turn.answer, revealed)), WORD_STYLE),
        ]));
    }

    fn render_scores(f: &mut Frame, area: Rect, turn: Option<&TurnScreen>) {
        let lines: Vec<Line> = turn
            .map(|turn| {
                turn.scores
                    .iter()
                    .map(|(name, score, color)| {
                        let marker = if *name == turn.team_name { "▶ " } else { "  " };
                        Line::from(vec![
                            Span::raw(marker),
                            Span::styled(name.clone(), Style::new().fg(hex_color(color))),
                            Span::raw(format!(": {score}")),
                        ])
                    })
                    .collect()
            })
            .unwrap_or_default();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Scores").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_leaderboard(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let mut lines = Vec::new();
        if let Some(board) = ctx.board {
            if let Some(winner) = board.winner() {
                lines.push(Line::from(vec![Span::styled(
                    format!("🏆 {} wins with {} points! 🌟", winner.name, winner.score),
                    SUCCESS_STYLE,
                )]));
                lines.push(Line::from(""));
            }
            for standing in &board.standings {
                lines.push(Line::from(vec![
                    Span::raw(format!("{} {}. ", medal(standing.rank), standing.rank)),
                    Span::styled(
                        standing.team.name.clone(),
                        Style::new().fg(hex_color(standing.team.color)),
                    ),
                    Span::raw(format!(" - {} points", standing.team.score)),
                ]));
            }
            let stats = &board.stats;
            lines.push(Line::from(""));
            lines.push(Line::from(vec![Span::styled("Game stats", HEADER_STYLE)]));
            lines.push(Line::from(format!("  Teams: {}", stats.team_count)));
            lines.push(Line::from(format!("  Total points: {}", stats.total_points)));
            lines.push(Line::from(format!("  Average: {}", stats.average_points)));
            lines.push(Line::from(format!("  Top score: {}", stats.top_score)));
        }
        Self::push_messages(&mut lines, ctx.message, ctx.error_message);
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Final Leaderboard").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let text = match ctx.state {
            TuiState::Setup => {
                "ENTER: Add/Start | PGUP/PGDN: Select team | DEL: Remove | ←/→: Difficulty | ↑/↓: Words | TAB: Mode | ESC: Quit"
            }
            TuiState::Turn => match ctx.turn {
                Some(turn) if !turn.awaiting && turn.is_last_word => {
                    "ENTER: View results | ESC: Back to start | CTRL-C: Quit"
                }
                Some(turn) if !turn.awaiting => {
                    "ENTER: Next turn | ESC: Back to start | CTRL-C: Quit"
                }
                Some(turn) if turn.answer_mode == AnswerMode::Voice => {
                    "ENTER: Submit | F1: Hint | F2: Reveal | F3: Mode | F4: Listen | F5: Language | ESC: Back"
                }
                Some(turn) if turn.answer_mode == AnswerMode::Tiles => {
                    "Type letters | ←/→: Move | F1: Hint | F2: Reveal | F3: Mode | ESC: Back | CTRL-C: Quit"
                }
                _ => "ENTER: Submit | F1: Hint | F2: Reveal | F3: Mode | ESC: Back | CTRL-C: Quit",
            },
            TuiState::Leaderboard => "P: Play again | S: Back to start | Q/ESC: Quit",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    /// Wait up to one poll interval for a key press or paste.
    fn next_event() -> Result<Option<InputEvent>, io::Error> {
        if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        let event = event::read()?;
        match event {
            Event::Paste(text) => Ok(Some(InputEvent::Paste(text))),
            Event::Key(key) => {
                // Only process Press events, ignore Release and Repeat to avoid double input
                if key.kind != event::KeyEventKind::Press {
                    return Ok(None);
                }
                // Garbage from escape sequences (alt-tab, focus changes)
                if let KeyCode::Char(c) = key.code
                    && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
                {
                    debug_log!("next_event() - Ignoring invalid character: {:?}", c);
                    return Ok(None);
                }
                Ok(Some(InputEvent::Key(key)))
            }
            Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Resize(_, _) => {
                Ok(None)
            }
        }
    }

    fn handle_setup_key(&mut self, key: KeyEvent) -> Option<SetupCommand> {
        if is_ctrl_c(&key) || key.code == KeyCode::Esc {
            return Some(SetupCommand::Quit);
        }
        self.error_message.clear();
        let form = &mut self.setup;
        match key.code {
            KeyCode::Char(c) if !has_modifier_keys(&key) => {
                if form.name_input.chars().count() < MAX_TEAM_NAME_LEN {
                    form.name_input.push(c);
                }
            }
            KeyCode::Backspace => {
                form.name_input.pop();
            }
            KeyCode::Delete => {
                if let Some(removed) = form.remove_team() {
                    debug_log!("handle_setup_key() - Removed team '{}'", removed);
                }
            }
            KeyCode::PageUp => form.select_prev(),
            KeyCode::PageDown => form.select_next(),
            KeyCode::Enter => {
                let name = form.name_input.trim().to_string();
                if !name.is_empty() {
                    if form.team_names.len() >= MAX_TEAMS {
                        self.error_message = format!("At most {MAX_TEAMS} teams can play.");
                    } else {
                        info_log!("handle_setup_key() - Added team '{}'", name);
                        form.team_names.push(name);
                        form.name_input.clear();
                    }
                } else if form.team_names.len() >= MIN_TEAMS {
                    return Some(SetupCommand::Start);
                } else {
                    self.error_message = format!("Add at least {MIN_TEAMS} teams to start.");
                }
            }
            KeyCode::Left => form.difficulty = cycle(&form.difficulty, false),
            KeyCode::Right => form.difficulty = cycle(&form.difficulty, true),
            KeyCode::Up => {
                form.words_per_team = (form.words_per_team + 1).min(MAX_WORDS_PER_TEAM);
            }
            KeyCode::Down => {
                form.words_per_team = form
                    .words_per_team
                    .saturating_sub(1)
                    .max(MIN_WORDS_PER_TEAM);
            }
            KeyCode::Tab => form.answer_mode = cycle(&form.answer_mode, true),
            _ => {
                debug_log!("handle_setup_key() - Ignoring key: {:?}", key.code);
            }
        }
        None
    }

    fn handle_turn_key(&mut self, key: KeyEvent, awaiting: bool, mode: AnswerMode) -> Option<UserAction> {
        if is_ctrl_c(&key) {
            return Some(UserAction::Exit);
        }
        match key.code {
            KeyCode::Esc => return Some(UserAction::BackToStart),
            KeyCode::F(1) => return Some(UserAction::ShowHint),
            KeyCode::F(2) => return Some(UserAction::Reveal),
            KeyCode::F(3) => return Some(UserAction::SwitchMode(cycle(&mode, true))),
            _ => {}
        }
        if !awaiting {
            return (key.code == KeyCode::Enter).then_some(UserAction::NextTurn);
        }
        self.error_message.clear();

        match mode {
            AnswerMode::Text => match key.code {
                KeyCode::Char(c) if !has_modifier_keys(&key) => self.text.push(c),
                KeyCode::Backspace => self.text.pop(),
                KeyCode::Enter => {
                    let guess = self.text.submit();
                    if guess.is_none() {
                        self.error_message = "Type a guess first.".to_string();
                    }
                    return guess.map(UserAction::Submit);
                }
                _ => {}
            },
            AnswerMode::Tiles => match key.code {
                KeyCode::Char(c) if !has_modifier_keys(&key) => {
                    return self.tiles.type_char(c).map(UserAction::Submit);
                }
                KeyCode::Backspace => self.tiles.backspace(),
                KeyCode::Left => self.tiles.move_left(),
                KeyCode::Right => self.tiles.move_right(),
                KeyCode::Enter => {
                    let guess = self.tiles.submit();
                    if guess.is_none() {
                        self.error_message =
                            format!("Fill all {} tiles first.", self.tiles.len());
                    }
                    return guess.map(UserAction::Submit);
                }
                _ => {}
            },
            AnswerMode::Voice => match key.code {
                KeyCode::F(4) => self.voice.toggle_listening(),
                KeyCode::F(5) => self.voice.cycle_language(),
                KeyCode::Char(c) if !has_modifier_keys(&key) => self.voice.push(c),
                KeyCode::Backspace => self.voice.pop(),
                KeyCode::Enter => return self.voice.submit().map(UserAction::Submit),
                _ => {}
            },
        }
        None
    }

    fn handle_paste(&mut self, text: &str, awaiting: bool, mode: AnswerMode) {
        if !awaiting {
            return;
        }
        match mode {
            AnswerMode::Text => text.chars().filter(|c| !c.is_control()).for_each(|c| self.text.push(c)),
            AnswerMode::Tiles => self.tiles.paste(text),
            AnswerMode::Voice => text.chars().filter(|c| !c.is_control()).for_each(|c| self.voice.push(c)),
        }
    }

    fn handle_leaderboard_key(key: KeyEvent) -> Option<UserAction> {
        if is_ctrl_c(&key) {
            return Some(UserAction::Exit);
        }
        match key.code {
            KeyCode::Char('p' | 'P') => Some(UserAction::PlayAgain),
            KeyCode::Char('s' | 'S') => Some(UserAction::BackToStart),
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(UserAction::Exit),
            _ => None,
        }
    }

    /// Store the latest view. A new turn resets the editors; a fresh outcome
    /// restarts the answer reveal.
    fn capture(&mut self, view: &TurnView) {
        let Some(screen) = TurnScreen::from_view(view) else {
            return;
        };
        let new_turn = self.turn.as_ref().is_none_or(|t| t.turn != screen.turn)
            || self.state != TuiState::Turn;
        if new_turn {
            debug_log!("capture() - New turn {}", screen.turn);
            self.text.clear();
            self.tiles = TileEntry::for_answer(&screen.answer);
            self.voice.reset();
            self.message.clear();
            self.error_message.clear();
        }
        let outcome_is_new = screen.outcome.is_some()
            && (new_turn || self.turn.as_ref().is_some_and(|t| t.outcome.is_none()));
        if outcome_is_new {
            self.reveal_started = Instant::now();
        }
        self.state = TuiState::Turn;
        self.turn = Some(screen);
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

impl GameInterface for TuiInterface {
    fn read_settings(&mut self, defaults: &GameSettings) -> Option<GameSettings> {
        info_log!("read_settings() - Showing setup screen");
        self.state = TuiState::Setup;
        self.setup = SetupForm::from_defaults(defaults);
        self.turn = None;
        self.board = None;
        self.message.clear();
        self.status = "Add teams, then press ENTER on an empty name to start".to_string();

        loop {
            if self.draw().is_err() {
                info_log!("read_settings() - Draw failed, quitting");
                return None;
            }
            match Self::next_event() {
                Ok(Some(InputEvent::Key(key))) => match self.handle_setup_key(key) {
                    Some(SetupCommand::Start) => return Some(self.setup.settings()),
                    Some(SetupCommand::Quit) => return None,
                    None => {}
                },
                Ok(Some(InputEvent::Paste(text))) => {
                    let room = MAX_TEAM_NAME_LEN.saturating_sub(self.setup.name_input.chars().count());
                    self.setup
                        .name_input
                        .extend(text.chars().filter(|c| !c.is_control()).take(room));
                }
                Ok(None) => {}
                Err(e) => {
                    debug_log!("read_settings() - Input error: {}", e);
                    return None;
                }
            }
        }
    }

    fn display_setup_error(&mut self, error: &GameError) {
        self.error_message = format!("Cannot start: {error}");
        self.draw_or_log();
    }

    fn display_turn(&mut self, view: &TurnView) {
        self.capture(view);
        if let Some(turn) = &self.turn {
            self.status = format!(
                "{} - word {} of {} ({} mode)",
                turn.team_name, turn.word_number, turn.word_total, turn.answer_mode
            );
        }
        self.draw_or_log();
    }

    fn display_hint(&mut self, view: &TurnView) {
        self.capture(view);
        self.draw_or_log();
    }

    fn read_action(&mut self, view: &TurnView) -> Option<UserAction> {
        self.capture(view);
        self.voice.refresh();
        if self.draw().is_err() {
            info_log!("read_action() - Draw failed, returning Exit");
            return Some(UserAction::Exit);
        }
        let awaiting = view.state.is_awaiting_answer();
        let mode = view.state.answer_mode;
        match Self::next_event() {
            Ok(Some(InputEvent::Key(key))) => self.handle_turn_key(key, awaiting, mode),
            Ok(Some(InputEvent::Paste(text))) => {
                self.handle_paste(&text, awaiting, mode);
                None
            }
            Ok(None) => None,
            Err(e) => {
                info_log!("read_action() - Error handling input: {}", e);
                Some(UserAction::Exit)
            }
        }
    }

    fn display_outcome(&mut self, view: &TurnView, outcome: TurnOutcome) {
        self.capture(view);
        self.status = match outcome {
            TurnOutcome::Correct => "Correct answer!".to_string(),
            TurnOutcome::Wrong => "Wrong answer".to_string(),
            TurnOutcome::TimedOut => "Time's up!".to_string(),
            TurnOutcome::Revealed => "Answer revealed".to_string(),
        };
        self.draw_or_log();
    }

    fn display_leaderboard(&mut self, board: &Leaderboard) {
        self.state = TuiState::Leaderboard;
        self.board = Some(board.clone());
        self.turn = None;
        self.message.clear();
        self.error_message.clear();
        self.status = "Game over".to_string();
        self.draw_or_log();
    }

    fn read_final_action(&mut self, _board: &Leaderboard) -> Option<UserAction> {
        if self.draw().is_err() {
            return Some(UserAction::Exit);
        }
        match Self::next_event() {
            Ok(Some(InputEvent::Key(key))) => Self::handle_leaderboard_key(key),
            Ok(_) => None,
            Err(e) => {
                debug_log!("read_final_action() - Input error: {}", e);
                Some(UserAction::Exit)
            }
        }
    }

    fn display_exit_message(&mut self) {
        self.message = "Thanks for playing! 🎉".to_string();
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}
