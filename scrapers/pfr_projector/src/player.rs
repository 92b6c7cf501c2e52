use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::io::{BufRead, Write};
use tracing::info;

use crate::{
    cache::CacheKey,
    fetch::PageFetcher,
    prompt::Prompter,
    sheet::{Row, Table},
    team::Roster,
    types::{sheet_name, Position},
    workbook::ProjectionWorkbook,
};

pub const POS: &str = "Pos";
pub const PLAYER_NAME: &str = "Player Name";

/// A roster player the operator picked for projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenPlayer {
    pub name: String,
    pub position: Position,
    pub href: String,
}

/// Walks the roster's players at `position`, skipping names in `skip`, until
/// the operator picks one.
pub fn choose_player<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    roster: &Roster,
    position: Position,
    skip: &HashSet<String>,
) -> Result<Option<ChosenPlayer>> {
    for entry in roster.candidates(position) {
        if skip.contains(&entry.name) {
            continue;
        }
        let question = format!("Would you like to do projections for {}? ", entry.name);
        if !prompter.confirm(&question)? {
            continue;
        }
        let Some(href) = entry.href.clone() else {
            bail!("No player page link for {}", entry.name);
        };
        return Ok(Some(ChosenPlayer {
            name: entry.name.clone(),
            position,
            href,
        }));
    }

    prompter.say(format!(
        "No projections will be done for this instance of {}",
        position
    ))?;
    Ok(None)
}

pub fn player_page(fetcher: &PageFetcher, team: &str, player: &ChosenPlayer) -> Result<String> {
    let key = CacheKey::Player {
        team: team.to_string(),
        position: player.position,
        name: player.name.clone(),
    };
    let what = format!("stats for {} {}", player.position, player.name);
    fetcher
        .page(&key, &player.href, &what)
        .with_context(|| format!("Failed to load {}", what))
}

/// Mean of the values that are present.
pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "NaN".to_string())
}

/// Writes a player row into the team sheet, replacing an earlier row for the
/// same player and position.
pub fn save_player_row(workbook: &mut ProjectionWorkbook, team: &str, row: Row) -> Result<()> {
    let name = sheet_name(team);
    let mut table = workbook.sheet(&name).cloned().unwrap_or_else(Table::new);

    let pos = row.text(POS).map(str::to_string);
    let player = row.text(PLAYER_NAME).map(str::to_string);
    info!(
        "Saving projections for {} {} on {}",
        pos.as_deref().unwrap_or("?"),
        player.as_deref().unwrap_or("?"),
        name
    );
    table.upsert_by(row, |r| {
        r.text(POS).map(str::to_string) == pos && r.text(PLAYER_NAME).map(str::to_string) == player
    });

    workbook.put_sheet(&name, table);
    workbook.save()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::RosterEntry;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn roster() -> Roster {
        Roster {
            entries: vec![
                RosterEntry {
                    position: "WR".into(),
                    name: "Marvin Harrison Jr.".into(),
                    href: Some("/players/H/HarrMa02.htm".into()),
                },
                RosterEntry {
                    position: "WR".into(),
                    name: "Michael Wilson".into(),
                    href: Some("/players/W/WilsMi03.htm".into()),
                },
                RosterEntry {
                    position: "TE".into(),
                    name: "Trey McBride".into(),
                    href: Some("/players/M/McBrTr00.htm".into()),
                },
            ],
        }
    }

    #[test]
    fn test_choose_player_first_yes_wins() {
        let mut prompter = Prompter::new(Cursor::new(b"n\ny\n".to_vec()), Vec::new());
        let chosen = choose_player(&mut prompter, &roster(), Position::WR, &HashSet::new())
            .unwrap()
            .unwrap();
        assert_eq!(chosen.name, "Michael Wilson");
        assert_eq!(chosen.href, "/players/W/WilsMi03.htm");
    }

    #[test]
    fn test_choose_player_skips_done_and_may_pick_nobody() {
        let skip: HashSet<String> = ["Marvin Harrison Jr.".to_string()].into();
        let mut prompter = Prompter::new(Cursor::new(b"n\n".to_vec()), Vec::new());
        let chosen = choose_player(&mut prompter, &roster(), Position::WR, &skip).unwrap();
        assert!(chosen.is_none());

        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert!(!output.contains("Marvin Harrison Jr."));
        assert!(output.contains("No projections will be done for this instance of WR"));
    }

    #[test]
    fn test_mean_ignores_missing() {
        assert_eq!(mean([Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean([None, None]), None);
    }

    #[test]
    fn test_save_player_row_upserts() {
        let dir = tempdir().unwrap();
        let mut workbook = ProjectionWorkbook::open(dir.path().join("ff.xlsx")).unwrap();
        let row = |share: f64| {
            Row::new()
                .with(POS, "TE")
                .with(PLAYER_NAME, "Trey McBride")
                .with("Target Share", share)
        };

        save_player_row(&mut workbook, "crd", row(20.0)).unwrap();
        save_player_row(&mut workbook, "crd", row(24.0)).unwrap();

        let sheet = workbook.sheet("Crd").unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.rows()[0].number("Target Share"), Some(24.0));
    }
}
