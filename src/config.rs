//! Game tuning constants and the settings chosen on the setup screen.

use crate::wordbank::Difficulty;
use std::fmt;
use std::time::Duration;

pub const MIN_TEAMS: usize = 2;
pub const MAX_TEAMS: usize = 20;
pub const MIN_WORDS_PER_TEAM: usize = 1;
pub const MAX_WORDS_PER_TEAM: usize = 15;

/// Six-color palette assigned to teams in join order.
pub const TEAM_COLORS: [&str; 6] = [
    "#FF6B6B", // Red
    "#4ECDC4", // Teal
    "#45B7D1", // Blue
    "#96CEB4", // Green
    "#FFEAA7", // Yellow
    "#DDA0DD", // Plum
];

/// Timing and scoring knobs for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub hint_duration: Duration,
    pub answer_duration: Duration,
    pub points_per_correct_answer: u32,
    pub points_for_time_up: u32,
    pub letter_reveal_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hint_duration: Duration::from_secs(5),
            answer_duration: Duration::from_secs(20),
            points_per_correct_answer: 10,
            points_for_time_up: 0,
            letter_reveal_interval: Duration::from_millis(250),
        }
    }
}

/// How a team enters its guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AnswerMode {
    /// Free text, submitted with Enter
    #[default]
    Text,
    /// One box per letter, submitted when the last box is filled
    Tiles,
    /// Speech-to-text, editable before submitting
    Voice,
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Tiles => "tiles",
            Self::Voice => "voice",
        };
        f.write_str(name)
    }
}

/// Everything needed to leave the setup phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    pub team_names: Vec<String>,
    pub difficulty: Difficulty,
    pub words_per_team: usize,
    pub answer_mode: AnswerMode,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            team_names: Vec::new(),
            difficulty: Difficulty::Easy,
            words_per_team: 10,
            answer_mode: AnswerMode::Text,
        }
    }
}

#[must_use]
pub fn team_color(join_index: usize) -> &'static str {
    TEAM_COLORS[join_index % TEAM_COLORS.len()]
}
