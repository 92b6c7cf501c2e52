use anyhow::{bail, Result};
use std::fmt;

pub const GAMES_PER_SEASON: f64 = 17.0;

/// Number of completed seasons pulled for every team and player.
pub const HISTORY_YEARS: i32 = 3;

pub const ALL_TEAMS: [&str; 32] = [
    "crd", "atl", "rav", "buf", "car", "chi", "cin", "cle", "dal", "den", "det", "gnb", "htx",
    "clt", "jax", "kan", "rai", "sdg", "ram", "mia", "min", "nwe", "nor", "nyg", "nyj", "phi",
    "pit", "sfo", "sea", "tam", "oti", "was",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    QB,
    WR,
    RB,
    TE,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::QB, Position::WR, Position::RB, Position::TE];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::WR => "WR",
            Position::RB => "RB",
            Position::TE => "TE",
        }
    }

    pub fn is_skill(&self) -> bool {
        !matches!(self, Position::QB)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seasons with historical data for a projection of `season`.
pub fn history_years(season: i32) -> std::ops::Range<i32> {
    (season - HISTORY_YEARS)..season
}

/// Workbook sheet holding a team's projections, e.g. `crd` -> `Crd`.
pub fn sheet_name(team: &str) -> String {
    let mut chars = team.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
    }
}

pub fn resolve_teams(requested: &[String]) -> Result<Vec<String>> {
    if requested.is_empty() || requested.iter().any(|t| t.eq_ignore_ascii_case("all")) {
        return Ok(ALL_TEAMS.iter().map(|t| t.to_string()).collect());
    }

    let mut teams = Vec::with_capacity(requested.len());
    for team in requested {
        let team = team.trim().to_lowercase();
        if !ALL_TEAMS.contains(&team.as_str()) {
            bail!("Unknown team code: {}", team);
        }
        if !teams.contains(&team) {
            teams.push(team);
        }
    }
    Ok(teams)
}
