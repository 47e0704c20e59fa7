use crate::wordbank::Difficulty;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("at least {min} teams are required (got {got})")]
    TooFewTeams { min: usize, got: usize },

    #[error("at most {max} teams are allowed (got {got})")]
    TooManyTeams { max: usize, got: usize },

    #[error("team names must not be blank")]
    BlankTeamName,

    #[error("words per team must be between {min} and {max} (got {got})")]
    WordCountOutOfRange { min: usize, max: usize, got: usize },

    #[error("no {0} words in the catalog")]
    EmptyCatalog(Difficulty),

    #[error("catalog line {line}: {reason}")]
    MalformedCatalogLine { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}
