use crate::error::GameError;
use crate::info_log;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const EMBEDDED_CATALOG: &str = include_str!("resources/words.txt");

/// Character shown in place of a hidden letter.
pub const MASK_PLACEHOLDER: char = '_';

const MASK_REVEAL_TENTHS: usize = 3;
const FIELD_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub hint: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty: Difficulty,
}

/// The catalog shipped inside the binary.
pub fn embedded_catalog() -> Result<Vec<WordEntry>, GameError> {
    load_catalog_from_str(EMBEDDED_CATALOG)
}

/// Parse `difficulty|word|hint|answer|opt1,opt2,...` lines.
///
/// Blank lines and `#` comments are skipped. An empty answer falls back to the word.
pub fn load_catalog_from_str(data: &str) -> Result<Vec<WordEntry>, GameError> {
    data.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| parse_entry(line, index + 1))
        .collect()
}

pub fn load_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<WordEntry>, GameError> {
    let data = fs::read_to_string(path.as_ref())?;
    let catalog = load_catalog_from_str(&data)?;
    info_log!(
        "Loaded {} catalog entries from {}",
        catalog.len(),
        path.as_ref().display()
    );
    Ok(catalog)
}

/// `<config_dir>/wordparty/words.txt`, when the platform has a config dir.
#[must_use]
pub fn user_catalog_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wordparty").join("words.txt"))
}

fn parse_entry(line: &str, line_number: usize) -> Result<WordEntry, GameError> {
    let malformed = |reason: &str| GameError::MalformedCatalogLine {
        line: line_number,
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() < 4 || fields.len() > 5 {
        return Err(malformed("expected 4 or 5 '|' separated fields"));
    }

    let difficulty = fields[0].parse::<Difficulty>().map_err(|e| malformed(&e))?;
    let word = fields[1];
    if word.is_empty() {
        return Err(malformed("word must not be empty"));
    }
    let correct_answer = if fields[3].is_empty() { word } else { fields[3] };
    let options = fields
        .get(4)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(WordEntry {
        word: word.to_string(),
        hint: fields[2].to_string(),
        options,
        correct_answer: correct_answer.to_string(),
        difficulty,
    })
}

fn shuffled_at_level<R: Rng + ?Sized>(
    catalog: &[WordEntry],
    level: Difficulty,
    rng: &mut R,
) -> Vec<WordEntry> {
    let mut pool: Vec<WordEntry> = catalog
        .iter()
        .filter(|entry| entry.difficulty == level)
        .cloned()
        .collect();
    pool.shuffle(rng);
    pool
}

/// Up to `count` distinct entries of the given difficulty, in random order.
pub fn sample_by_difficulty<R: Rng + ?Sized>(
    catalog: &[WordEntry],
    level: Difficulty,
    count: usize,
    rng: &mut R,
) -> Vec<WordEntry> {
    let mut pool = shuffled_at_level(catalog, level, rng);
    pool.truncate(count);
    pool
}

/// Exactly `per_team * team_count` entries, cycling through one shuffle of the
/// difficulty's pool. Entries repeat once the pool runs out; an empty pool
/// yields an empty list.
pub fn sample_for_teams<R: Rng + ?Sized>(
    catalog: &[WordEntry],
    level: Difficulty,
    per_team: usize,
    team_count: usize,
    rng: &mut R,
) -> Vec<WordEntry> {
    let pool = shuffled_at_level(catalog, level, rng);
    if pool.is_empty() {
        return Vec::new();
    }
    pool.iter().cycle().take(per_team * team_count).cloned().collect()
}

/// Hide roughly 70% of a word's letters.
///
/// The first non-space letter is always shown, `max(1, floor(0.3 * letters))`
/// letters are shown in total, and spaces pass through untouched.
pub fn mask_word<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let chars: Vec<char> = word.chars().collect();
    let letter_positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| **c != ' ')
        .map(|(i, _)| i)
        .collect();

    let Some((&first, rest)) = letter_positions.split_first() else {
        return word.to_string();
    };

    let visible_count = (letter_positions.len() * MASK_REVEAL_TENTHS / 10).max(1);
    let mut others = rest.to_vec();
    others.shuffle(rng);

    let visible: HashSet<usize> = std::iter::once(first)
        .chain(others.into_iter().take(visible_count - 1))
        .collect();

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c == ' ' || visible.contains(&i) {
                c
            } else {
                MASK_PLACEHOLDER
            }
        })
        .collect()
}
