//! Final standings shown once every word has been played.

use crate::game_state::Team;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// 1-based position; tied teams keep their join order.
    pub rank: usize,
    pub team: Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameStats {
    pub team_count: usize,
    pub total_points: u32,
    pub average_points: u32,
    pub top_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Leaderboard {
    pub standings: Vec<Standing>,
    pub stats: GameStats,
}

impl Leaderboard {
    #[must_use]
    pub fn winner(&self) -> Option<&Team> {
        self.standings.first().map(|s| &s.team)
    }
}

#[must_use]
pub fn build_leaderboard(teams: &[Team]) -> Leaderboard {
    let mut sorted = teams.to_vec();
    // sort_by is stable, so equal scores stay in join order
    sorted.sort_by(|a, b| b.score.cmp(&a.score));

    let total_points: u32 = teams.iter().map(|t| t.score).sum();
    let stats = GameStats {
        team_count: teams.len(),
        total_points,
        average_points: rounded_average(total_points, teams.len()),
        top_score: sorted.first().map_or(0, |t| t.score),
    };

    let standings = sorted
        .into_iter()
        .enumerate()
        .map(|(i, team)| Standing { rank: i + 1, team })
        .collect();

    Leaderboard { standings, stats }
}

/// Medal for the podium places.
#[must_use]
pub fn medal(rank: usize) -> &'static str {
    match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "  ",
    }
}

fn rounded_average(total: u32, count: usize) -> u32 {
    let Ok(count) = u32::try_from(count) else {
        return 0;
    };
    if count == 0 {
        return 0;
    }
    // Round half up
    (2 * total + count) / (2 * count)
}
