// Library interface for wordparty
// This allows integration tests to access internal modules

pub mod cli;
pub mod config;
pub mod error;
pub mod game_state;
pub mod input;
pub mod leaderboard;
pub mod logging;
pub mod normalize;
pub mod speech;
pub mod timer;
pub mod tui;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use config::{AnswerMode, GameConfig, GameSettings};
pub use error::GameError;
pub use game_state::{
    GameContext, GameInterface, GameState, Phase, Team, TurnOutcome, TurnPhase, TurnView,
    UserAction, game_loop,
};
pub use leaderboard::{Leaderboard, build_leaderboard};
pub use normalize::{answers_match, normalize};
pub use timer::{Clock, ManualClock, SystemClock};
pub use wordbank::{
    Difficulty, WordEntry, embedded_catalog, load_catalog_from_file, load_catalog_from_str,
    mask_word, sample_by_difficulty, sample_for_teams,
};
