use crate::config::{
    AnswerMode, GameConfig, GameSettings, MAX_TEAMS, MAX_WORDS_PER_TEAM, MIN_TEAMS,
    MIN_WORDS_PER_TEAM,
};
use crate::error::GameError;
use crate::game_state::{GameInterface, TurnOutcome, TurnView, UserAction};
use crate::input::{TextEntry, TileEntry, VoiceEntry, length_hint};
use crate::leaderboard::{Leaderboard, medal};
use crate::normalize::letter_count;
use crate::speech::UnsupportedSpeech;
use crate::wordbank::Difficulty;
use clap::{Parser, ValueEnum};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

/// Team word-guessing party game
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Team name; repeat once per team to skip the setup prompts
    #[arg(short = 't', long = "team")]
    pub teams: Vec<String>,

    /// Word difficulty
    #[arg(short = 'd', long, value_enum, default_value_t = Difficulty::Easy)]
    pub difficulty: Difficulty,

    /// Words per team (1-15)
    #[arg(short = 'w', long = "words", default_value_t = 10)]
    pub words_per_team: usize,

    /// How guesses are entered
    #[arg(short = 'm', long, value_enum, default_value_t = AnswerMode::Text)]
    pub mode: AnswerMode,

    /// Seconds a hint stays visible
    #[arg(long, default_value_t = 5)]
    pub hint_secs: u64,

    /// Seconds a team has to answer
    #[arg(long, default_value_t = 20)]
    pub answer_secs: u64,

    /// Path to a word catalog (difficulty|word|hint|answer|options per line)
    #[arg(short = 'f', long = "words-file")]
    pub catalog_path: Option<String>,

    /// Seed for word sampling and masking
    #[arg(long)]
    pub seed: Option<u64>,

    /// Line-oriented interface instead of the full-screen one
    #[arg(long)]
    pub plain: bool,

    /// Log file (defaults to the platform data directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

impl Cli {
    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            hint_duration: Duration::from_secs(self.hint_secs),
            answer_duration: Duration::from_secs(self.answer_secs),
            ..GameConfig::default()
        }
    }

    /// Setup defaults taken from the command line.
    #[must_use]
    pub fn default_settings(&self) -> GameSettings {
        GameSettings {
            team_names: self.teams.clone(),
            difficulty: self.difficulty,
            words_per_team: self.words_per_team,
            answer_mode: self.mode,
        }
    }

    /// Settings to start with directly, when teams were given up front.
    #[must_use]
    pub fn preset_settings(&self) -> Option<GameSettings> {
        if self.teams.is_empty() {
            None
        } else {
            Some(self.default_settings())
        }
    }
}

// UI Input/Output functions

const HELP_TEXT: &str = "Commands: :hint  :reveal  :next  :mode <text|tiles|voice>  :back  :quit";

/// Parse a `:command` (without the colon).
#[must_use]
pub fn parse_command(command: &str) -> Option<UserAction> {
    let mut parts = command.split_whitespace();
    let name = parts.next()?.to_lowercase();
    match name.as_str() {
        "hint" | "h" => Some(UserAction::ShowHint),
        "reveal" | "r" => Some(UserAction::Reveal),
        "next" | "n" => Some(UserAction::NextTurn),
        "back" | "b" => Some(UserAction::BackToStart),
        "quit" | "q" | "exit" => Some(UserAction::Exit),
        "mode" | "m" => {
            let mode = AnswerMode::from_str(parts.next()?, true).ok()?;
            Some(UserAction::SwitchMode(mode))
        }
        _ => None,
    }
}

fn spaced(word: &str) -> String {
    word.chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_setup_error(error: &GameError) {
    println!("Cannot start the game: {error}");
}

pub fn display_outcome(view: &TurnView, outcome: TurnOutcome) {
    let state = view.state;
    let (Some(team), Some(word)) = (state.current_team(), state.current_word()) else {
        return;
    };
    match outcome {
        TurnOutcome::Correct => {
            println!("Correct! 🎉 {} now has {} points.", team.name, team.score);
        }
        TurnOutcome::Wrong => {
            let guess = state.selected_answer.as_deref().unwrap_or_default();
            println!(
                "Wrong answer! 😞 You guessed: \"{guess}\". The correct answer is: {}",
                word.correct_answer
            );
        }
        TurnOutcome::TimedOut => {
            println!(
                "Time's up! ⏰ You ran out of time. The answer was: {}",
                word.correct_answer
            );
        }
        TurnOutcome::Revealed => println!("The answer was: {}", word.correct_answer),
    }
    if state.is_last_word() {
        println!("Press Enter to view the results 🏆");
    } else {
        println!("Press Enter for the next turn →");
    }
}

pub fn display_leaderboard(board: &Leaderboard) {
    println!("\n=== Final Leaderboard ===");
    if let Some(winner) = board.winner() {
        println!("🏆 {} wins with {} points! 🌟", winner.name, winner.score);
    }
    for standing in &board.standings {
        println!(
            "{} {}. {} - {} points",
            medal(standing.rank),
            standing.rank,
            standing.team.name,
            standing.team.score
        );
    }
    let stats = &board.stats;
    println!(
        "Teams: {} | Total points: {} | Average: {} | Top score: {}",
        stats.team_count, stats.total_points, stats.average_points, stats.top_score
    );
}

pub fn display_exit_message() {
    println!("Thanks for playing! 🎉");
}

/// CLI implementation of the GameInterface trait
/// This struct wraps a BufRead reader and implements the game interface for line-based play
pub struct CliInterface<R: BufRead> {
    reader: R,
    preset: Option<GameSettings>,
    text: TextEntry,
    tiles: TileEntry,
    voice: VoiceEntry,
}

impl<R: BufRead> CliInterface<R> {
    /// `preset` is used once as the first setup answer, skipping the prompts.
    pub fn new(reader: R, preset: Option<GameSettings>) -> Self {
        Self {
            reader,
            preset,
            text: TextEntry::new(),
            tiles: TileEntry::new(0),
            voice: VoiceEntry::new(Box::new(UnsupportedSpeech)),
        }
    }

    /// Next input line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }

    fn read_team_names(&mut self) -> Option<Vec<String>> {
        println!("Enter team names, one per line. Blank line when done (at least {MIN_TEAMS}):");
        let mut names: Vec<String> = Vec::new();
        loop {
            let line = self.read_line()?;
            let name = line.trim();
            if name.is_empty() {
                if names.len() >= MIN_TEAMS {
                    return Some(names);
                }
                println!("Add at least {MIN_TEAMS} teams to start.");
                continue;
            }
            if names.len() >= MAX_TEAMS {
                println!("At most {MAX_TEAMS} teams can play. Blank line to start.");
                continue;
            }
            names.push(name.to_string());
            println!("Added {name} ({}/{MAX_TEAMS})", names.len());
        }
    }

    fn read_difficulty(&mut self, default: Difficulty) -> Option<Difficulty> {
        println!("Difficulty [easy/medium/hard] (default {default}):");
        let line = self.read_line()?;
        let input = line.trim();
        if input.is_empty() {
            return Some(default);
        }
        Some(input.parse::<Difficulty>().unwrap_or_else(|e| {
            println!("{e}, using {default}.");
            default
        }))
    }

    fn read_words_per_team(&mut self, default: usize) -> Option<usize> {
        println!(
            "Words per team ({MIN_WORDS_PER_TEAM}-{MAX_WORDS_PER_TEAM}, default {default}):"
        );
        let line = self.read_line()?;
        let input = line.trim();
        if input.is_empty() {
            return Some(default);
        }
        match input.parse::<usize>() {
            Ok(n) if (MIN_WORDS_PER_TEAM..=MAX_WORDS_PER_TEAM).contains(&n) => Some(n),
            _ => {
                println!("Invalid number of words, using {default}.");
                Some(default)
            }
        }
    }

    fn read_mode(&mut self, default: AnswerMode) -> Option<AnswerMode> {
        println!("Answer mode [text/tiles/voice] (default {default}):");
        let line = self.read_line()?;
        let input = line.trim();
        if input.is_empty() {
            return Some(default);
        }
        Some(AnswerMode::from_str(input, true).unwrap_or_else(|_| {
            println!("Unknown mode '{input}', using {default}.");
            default
        }))
    }

    fn read_guess(&mut self, input: &str, view: &TurnView) -> Option<UserAction> {
        let expected = view
            .state
            .current_word()
            .map_or(0, |w| letter_count(&w.correct_answer));
        match view.state.answer_mode {
            AnswerMode::Text => {
                self.text.set(input);
                let guess = self.text.submit();
                if guess.is_none() {
                    println!("Type a guess, or :reveal to see the answer.");
                }
                guess.map(UserAction::Submit)
            }
            AnswerMode::Tiles => {
                self.tiles.clear();
                self.tiles.paste(input);
                let guess = self.tiles.submit();
                if guess.is_none() {
                    println!(
                        "Fill all {} tiles with letters ({}).",
                        self.tiles.len(),
                        length_hint(expected, input).text
                    );
                }
                guess.map(UserAction::Submit)
            }
            AnswerMode::Voice => {
                if let Some(message) = self.voice.status_message()
                    && !self.voice.supported()
                {
                    println!("{message} (:mode text)");
                    return None;
                }
                if input.is_empty() {
                    self.voice.toggle_listening();
                    self.voice.refresh();
                    println!("Heard: \"{}\" (Enter to listen again)", self.voice.edited());
                    return None;
                }
                self.voice.clear();
                input.chars().for_each(|c| self.voice.push(c));
                self.voice.submit().map(UserAction::Submit)
            }
        }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn read_settings(&mut self, defaults: &GameSettings) -> Option<GameSettings> {
        if let Some(preset) = self.preset.take() {
            return Some(preset);
        }
        println!("\n=== Team setup ===");
        let team_names = self.read_team_names()?;
        let difficulty = self.read_difficulty(defaults.difficulty)?;
        let words_per_team = self.read_words_per_team(defaults.words_per_team)?;
        let answer_mode = self.read_mode(defaults.answer_mode)?;
        Some(GameSettings {
            team_names,
            difficulty,
            words_per_team,
            answer_mode,
        })
    }

    fn display_setup_error(&mut self, error: &GameError) {
        display_setup_error(error);
    }

    fn display_turn(&mut self, view: &TurnView) {
        let state = view.state;
        let (Some(team), Some(word)) = (state.current_team(), state.current_word()) else {
            return;
        };
        let letters = letter_count(&word.correct_answer);
        self.text.clear();
        self.tiles = TileEntry::for_answer(&word.correct_answer);
        self.voice.reset();

        println!(
            "\n--- {}'s turn ({} points) | Word {} of {} ---",
            team.name,
            team.score,
            state.current_word_index + 1,
            state.words.len()
        );
        if let Some(next) = state.next_team() {
            println!("Next up: {}", next.name);
        }
        println!("Guess the word: {}  ({letters} letters)", spaced(view.masked_word));
        if let Some(secs) = view.answer_secs_left {
            println!("You have {secs}s. Answer mode: {}.", state.answer_mode);
        }
        if state.answer_mode == AnswerMode::Voice
            && let Some(message) = self.voice.status_message()
        {
            println!("{message}");
        }
        println!("{HELP_TEXT}");
    }

    fn display_hint(&mut self, view: &TurnView) {
        if let Some(word) = view.state.current_word() {
            let secs = view.hint_secs_left.unwrap_or_default();
            println!("💡 Hint ({secs}s): {}", word.hint);
        }
    }

    fn read_action(&mut self, view: &TurnView) -> Option<UserAction> {
        if view.state.is_awaiting_answer() {
            println!("[{}s] Your guess:", view.answer_secs_left.unwrap_or_default());
        }
        let Some(line) = self.read_line() else {
            return Some(UserAction::Exit);
        };
        let input = line.trim();

        if let Some(command) = input.strip_prefix(':') {
            let action = parse_command(command);
            if action.is_none() {
                println!("{HELP_TEXT}");
            }
            return action;
        }
        if !view.state.is_awaiting_answer() {
            return input.is_empty().then_some(UserAction::NextTurn);
        }
        self.read_guess(input, view)
    }

    fn display_outcome(&mut self, view: &TurnView, outcome: TurnOutcome) {
        display_outcome(view, outcome);
    }

    fn display_leaderboard(&mut self, board: &Leaderboard) {
        display_leaderboard(board);
    }

    fn read_final_action(&mut self, _board: &Leaderboard) -> Option<UserAction> {
        println!("[p] Play again  [s] Back to start  [q] Quit");
        let Some(line) = self.read_line() else {
            return Some(UserAction::Exit);
        };
        match line.trim().to_lowercase().as_str() {
            "p" | "play" | "again" => Some(UserAction::PlayAgain),
            "s" | "b" | "start" | "back" => Some(UserAction::BackToStart),
            "q" | "quit" | "exit" => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn display_exit_message(&mut self) {
        display_exit_message();
    }
}
