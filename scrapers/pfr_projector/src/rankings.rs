use anyhow::{Context, Result};
use std::{cmp::Ordering, fs, path::Path};
use tracing::{info, warn};

use crate::{
    player::{PLAYER_NAME, POS},
    sheet::{Row, Table},
    team_stats::FANTASY_POINTS,
    types::{sheet_name, Position},
    workbook::ProjectionWorkbook,
};

const TEAM: &str = "Team";

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    pub name: String,
    pub team: String,
    pub fantasy_points: Option<f64>,
}

/// Every projected player at `position` across `teams`, best first. Players
/// without fantasy points sort last.
pub fn rank_position(
    workbook: &ProjectionWorkbook,
    teams: &[String],
    position: Position,
) -> Vec<RankedPlayer> {
    let mut ranked = Vec::new();
    for team in teams {
        let name = sheet_name(team);
        let Some(table) = workbook.sheet(&name) else {
            warn!("No sheet {} in workbook, leaving {} out of rankings", name, team);
            continue;
        };
        ranked.extend(
            table
                .rows()
                .iter()
                .filter(|row| row.text(POS) == Some(position.as_str()))
                .filter_map(|row| {
                    Some(RankedPlayer {
                        name: row.text(PLAYER_NAME)?.to_string(),
                        team: team.clone(),
                        fantasy_points: row.number(FANTASY_POINTS),
                    })
                }),
        );
    }

    ranked.sort_by(|a, b| match (a.fantasy_points, b.fantasy_points) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked
}

fn to_table(ranked: &[RankedPlayer]) -> Table {
    let mut table = Table::new();
    table.add_column(PLAYER_NAME);
    table.add_column(TEAM);
    table.add_column(FANTASY_POINTS);
    for player in ranked {
        table.push(
            Row::new()
                .with(PLAYER_NAME, player.name.as_str())
                .with(TEAM, player.team.as_str())
                .with_opt(FANTASY_POINTS, player.fantasy_points),
        );
    }
    table
}

/// Replaces the QB, WR, RB and TE sheets with fresh rankings, optionally
/// exporting each one as `<dir>/<POS>.csv`.
pub fn create_fantasy_rankings(
    workbook: &mut ProjectionWorkbook,
    teams: &[String],
    csv_dir: Option<&Path>,
) -> Result<()> {
    for position in Position::ALL {
        let ranked = rank_position(workbook, teams, position);
        info!("Saving {} rankings ({} players)", position, ranked.len());
        workbook.put_sheet(position.as_str(), to_table(&ranked));

        if let Some(dir) = csv_dir {
            write_csv(dir, position, &ranked)?;
        }
    }
    workbook.save()?;
    Ok(())
}

fn write_csv(dir: &Path, position: Position, ranked: &[RankedPlayer]) -> Result<()> {
    fs::create_dir_all(dir)?;
    let csv_path = dir.join(format!("{}.csv", position));
    info!("Writing CSV to {:?}", csv_path);

    let mut wtr = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create {:?}", csv_path))?;
    wtr.write_record(["rank", "player_name", "team", "fantasy_points"])?;
    for (rank, player) in ranked.iter().enumerate() {
        wtr.write_record([
            &(rank + 1).to_string(),
            &player.name,
            &player.team,
            &player
                .fantasy_points
                .map(|p| format!("{:.2}", p))
                .unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sheet(players: &[(&str, &str, Option<f64>)]) -> Table {
        let mut table = Table::new();
        table.push(Row::new().with("Total Plays", 1000.0));
        for (pos, name, points) in players {
            table.push(
                Row::new()
                    .with(POS, *pos)
                    .with(PLAYER_NAME, *name)
                    .with_opt(FANTASY_POINTS, *points),
            );
        }
        table
    }

    fn workbook(dir: &Path) -> ProjectionWorkbook {
        let mut workbook = ProjectionWorkbook::open(dir.join("ff.xlsx")).unwrap();
        workbook.put_sheet(
            "Crd",
            sheet(&[
                ("QB", "Kyler Murray", Some(310.0)),
                ("WR", "Marvin Harrison Jr.", Some(220.5)),
                ("WR/RB/TE", "Other Players", Some(400.0)),
            ]),
        );
        workbook.put_sheet(
            "Atl",
            sheet(&[
                ("QB", "Michael Penix Jr.", Some(280.0)),
                ("WR", "Drake London", Some(250.0)),
                ("WR", "Darnell Mooney", None),
            ]),
        );
        workbook
    }

    #[test]
    fn test_rank_position_sorted_descending() {
        let dir = tempdir().unwrap();
        let workbook = workbook(dir.path());
        let teams = vec!["crd".to_string(), "atl".to_string(), "buf".to_string()];

        let wrs: Vec<_> = rank_position(&workbook, &teams, Position::WR)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            wrs,
            vec!["Drake London", "Marvin Harrison Jr.", "Darnell Mooney"]
        );
        assert!(rank_position(&workbook, &teams, Position::TE).is_empty());
    }

    #[test]
    fn test_create_rankings_writes_sheets_and_csv() {
        let dir = tempdir().unwrap();
        let mut workbook = workbook(dir.path());
        let teams = vec!["crd".to_string(), "atl".to_string()];
        let csv_dir = dir.path().join("rankings");

        create_fantasy_rankings(&mut workbook, &teams, Some(&csv_dir)).unwrap();

        let reopened = ProjectionWorkbook::open(dir.path().join("ff.xlsx")).unwrap();
        assert_eq!(
            reopened.sheet_names().collect::<Vec<_>>(),
            vec!["Crd", "Atl", "QB", "WR", "RB", "TE"]
        );
        let qbs = reopened.sheet("QB").unwrap();
        assert_eq!(qbs.rows()[0].text(PLAYER_NAME), Some("Kyler Murray"));
        assert_eq!(qbs.rows()[0].text(TEAM), Some("crd"));
        assert_eq!(qbs.rows()[1].number(FANTASY_POINTS), Some(280.0));

        let csv = fs::read_to_string(csv_dir.join("QB.csv")).unwrap();
        assert_eq!(
            csv,
            "rank,player_name,team,fantasy_points\n1,Kyler Murray,crd,310.00\n2,Michael Penix Jr.,atl,280.00\n"
        );
    }
}
