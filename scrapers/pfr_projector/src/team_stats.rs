use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    config::ScoringSettings,
    player::{PLAYER_NAME, POS},
    sheet::{Row, Table},
    team::{is_team_row, PASS_PLAYS, RUN_PLAYS},
    types::{sheet_name, GAMES_PER_SEASON},
    workbook::ProjectionWorkbook,
};

pub const OTHER_PLAYERS: &str = "Other Players";

const GAMES_STARTED: &str = "Games Started";
const RUSH_SHARE: &str = "Rush Share";
const YARDS_PER_CARRY: &str = "Yards/Carry";
const TDS_PER_RUSH_YARD: &str = "TDs/Rush Yard";
const TARGET_SHARE: &str = "Target Share";
const CATCH_PERCENTAGE: &str = "Catch Percentage";
const YARDS_PER_CATCH: &str = "Yards/Catch";
const TDS_PER_REC_YARD: &str = "TDs/Receiving Yard";
const INTERCEPTION_PCT: &str = "Interception %";

const CARRIES: &str = "Carries";
const RUSHING_YARDS: &str = "Rushing Yards";
const RUSHING_TDS: &str = "Rushing TDs";
const TARGETS: &str = "Targets";
const RECEPTIONS: &str = "Receptions";
const RECEIVING_YARDS: &str = "Receiving Yards";
const RECEIVING_TDS: &str = "Receiving TDs";
const PASSING_ATTEMPTS: &str = "Passing Attempts";
const INTERCEPTIONS: &str = "Interceptions";
const COMPLETIONS: &str = "Completions";
const COMPLETION_PCT: &str = "Completion %";
const PASSING_YARDS: &str = "Passing Yards";
const PASSING_TDS: &str = "Passing TDs";
const PASSING_TD_PCT: &str = "Passing TD %";
pub const FANTASY_POINTS: &str = "Fantasy Points";

const MAX_COMPLETION_PCT: f64 = 70.0;
const MAX_PASSING_TD_PCT: f64 = 8.0;

fn mul(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? * b?)
}

/// Row for the carries and targets no projected player absorbs.
fn other_players_row(rush_share: f64, target_share: f64) -> Row {
    Row::new()
        .with(POS, "WR/RB/TE")
        .with(PLAYER_NAME, OTHER_PLAYERS)
        .with(GAMES_STARTED, GAMES_PER_SEASON)
        .with(RUSH_SHARE, rush_share)
        .with(YARDS_PER_CARRY, 4.2)
        .with(TDS_PER_RUSH_YARD, 0.006)
        .with(TARGET_SHARE, target_share)
        .with(CATCH_PERCENTAGE, 62.0)
        .with(YARDS_PER_CATCH, 11.0)
        .with(TDS_PER_REC_YARD, 0.006)
}

/// Derives volume stats and fantasy points for every player on a team
/// sheet. Returns the sanity warnings raised along the way.
pub fn fill_team_stats(table: &mut Table, team: &str, scoring: &ScoringSettings) -> Result<Vec<String>> {
    let team_row = table
        .rows()
        .iter()
        .find(|row| is_team_row(row))
        .with_context(|| format!("No team-level projections found for {}", team))?;
    let run_plays = team_row
        .number(RUN_PLAYS)
        .with_context(|| format!("{} is missing for {}", RUN_PLAYS, team))?;
    let pass_plays = team_row
        .number(PASS_PLAYS)
        .with_context(|| format!("{} is missing for {}", PASS_PLAYS, team))?;

    let mut warnings = Vec::new();
    let mut warn_about = |message: String| {
        warn!("{}", message);
        warnings.push(message);
    };

    // Remainder
    table.retain(|row| row.text(PLAYER_NAME) != Some(OTHER_PLAYERS));
    let other_rush_share = 100.0 - table.column_sum(RUSH_SHARE);
    if other_rush_share < 0.0 {
        warn_about(format!("Too many carries allocated for team {}.", team));
    }
    let other_target_share = 100.0 - table.column_sum(TARGET_SHARE);
    if other_target_share < 0.0 {
        warn_about(format!("Too many targets allocated for team {}.", team));
    }
    table.push(other_players_row(other_rush_share, other_target_share));

    // Rushing and receiving
    for row in table.rows_mut().iter_mut().filter(|r| !is_team_row(r)) {
        let carries = row.number(RUSH_SHARE).map(|share| share / 100.0 * run_plays);
        let rushing_yards = mul(row.number(YARDS_PER_CARRY), carries);
        let rushing_tds = mul(rushing_yards, row.number(TDS_PER_RUSH_YARD));

        let targets = row.number(TARGET_SHARE).map(|share| share / 100.0 * pass_plays);
        let receptions = mul(targets, row.number(CATCH_PERCENTAGE)).map(|r| r / 100.0);
        let receiving_yards = mul(receptions, row.number(YARDS_PER_CATCH));
        let receiving_tds = mul(receiving_yards, row.number(TDS_PER_REC_YARD));

        row.set_opt(CARRIES, carries);
        row.set_opt(RUSHING_YARDS, rushing_yards);
        row.set_opt(RUSHING_TDS, rushing_tds);
        row.set_opt(TARGETS, targets);
        row.set_opt(RECEPTIONS, receptions);
        row.set_opt(RECEIVING_YARDS, receiving_yards);
        row.set_opt(RECEIVING_TDS, receiving_tds);
    }

    // Passing, carried by the quarterbacks in proportion to games started
    let team_receptions = table.column_sum(RECEPTIONS);
    let team_receiving_yards = table.column_sum(RECEIVING_YARDS);
    let team_receiving_tds = table.column_sum(RECEIVING_TDS);
    let mut completion_too_high = false;
    let mut td_rate_too_high = false;

    for row in table
        .rows_mut()
        .iter_mut()
        .filter(|r| r.text(POS) == Some("QB"))
    {
        let share = row.number(GAMES_STARTED).map(|gs| gs / GAMES_PER_SEASON);
        let attempts = share.map(|s| s * pass_plays);
        let interceptions = mul(attempts, row.number(INTERCEPTION_PCT)).map(|i| i / 100.0);
        let completions = share.map(|s| s * team_receptions);
        let passing_yards = share.map(|s| s * team_receiving_yards);
        let passing_tds = share.map(|s| s * team_receiving_tds);
        let completion_pct = mul(completions, attempts.map(f64::recip)).map(|p| p * 100.0);
        let passing_td_pct = mul(passing_tds, attempts.map(f64::recip)).map(|p| p * 100.0);

        completion_too_high |= completion_pct.is_some_and(|p| p.is_finite() && p > MAX_COMPLETION_PCT);
        td_rate_too_high |= passing_td_pct.is_some_and(|p| p.is_finite() && p > MAX_PASSING_TD_PCT);

        row.set_opt(PASSING_ATTEMPTS, attempts);
        row.set_opt(INTERCEPTIONS, interceptions);
        row.set_opt(COMPLETIONS, completions);
        row.set_opt(COMPLETION_PCT, completion_pct);
        row.set_opt(PASSING_YARDS, passing_yards);
        row.set_opt(PASSING_TDS, passing_tds);
        row.set_opt(PASSING_TD_PCT, passing_td_pct);
    }
    if completion_too_high {
        warn_about(format!("Completion percentage too high for team {}", team));
    }
    if td_rate_too_high {
        warn_about(format!("Passing TD percentage too high for team {}", team));
    }

    for row in table.rows_mut().iter_mut().filter(|r| !is_team_row(r)) {
        let points = fantasy_points(row, scoring);
        row.set(FANTASY_POINTS, points);
    }
    table.refresh_columns();

    Ok(warnings)
}

/// Weighted sum of a row's projected stats; missing stats count as 0.
pub fn fantasy_points(row: &Row, scoring: &ScoringSettings) -> f64 {
    let stat = |column: &str| row.number(column).unwrap_or(0.0);
    stat(RUSHING_YARDS) * scoring.rush_rec_yard
        + stat(RUSHING_TDS) * scoring.rush_rec_td
        + stat(RECEPTIONS) * scoring.reception
        + stat(RECEIVING_YARDS) * scoring.rush_rec_yard
        + stat(RECEIVING_TDS) * scoring.rush_rec_td
        + stat(INTERCEPTIONS) * scoring.interception
        + stat(PASSING_YARDS) * scoring.pass_yard
        + stat(PASSING_TDS) * scoring.pass_td
}

/// Recomputes the team sheet in `workbook` and writes it back.
pub fn fill_team_sheet(
    workbook: &mut ProjectionWorkbook,
    team: &str,
    scoring: &ScoringSettings,
) -> Result<Vec<String>> {
    let name = sheet_name(team);
    let mut table = workbook
        .sheet(&name)
        .cloned()
        .with_context(|| format!("Sheet {} not found in {:?}", name, workbook.path()))?;

    let warnings = fill_team_stats(&mut table, team, scoring)?;

    info!("Saving projections for {} in excel...", team);
    workbook.put_sheet(&name, table);
    workbook.save()?;
    Ok(warnings)
}
