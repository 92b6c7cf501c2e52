use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::{
    cache::CacheKey,
    fetch::PageFetcher,
    html::{body_rows, selector, StatRow, StatsPage},
    prompt::Prompter,
    sheet::{Row, Table},
    types::{sheet_name, Position, HISTORY_YEARS},
    workbook::ProjectionWorkbook,
};

/// One season of team-level play-calling data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSeason {
    pub head_coach: Option<String>,
    pub offensive_coordinator: Option<String>,
    pub total_plays: u32,
    pub run_plays: u32,
    pub pass_plays: u32,
    pub run_percent: f64,
    pub pass_percent: f64,
}

impl TeamSeason {
    fn with_plays(mut self, run_plays: u32, pass_plays: u32) -> Self {
        let total = run_plays + pass_plays;
        self.total_plays = total;
        self.run_plays = run_plays;
        self.pass_plays = pass_plays;
        if total > 0 {
            self.run_percent = round2(run_plays as f64 / total as f64 * 100.0);
            self.pass_percent = round2(pass_plays as f64 / total as f64 * 100.0);
        }
        self
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The last three seasons of a team plus coaching info for the season being
/// projected.
#[derive(Debug, Clone)]
pub struct TeamHistory {
    pub team: String,
    pub season: i32,
    pub seasons: BTreeMap<i32, TeamSeason>,
}

impl TeamHistory {
    pub fn load(fetcher: &PageFetcher, team: &str, season: i32) -> Result<Self> {
        let mut seasons = BTreeMap::new();

        for year in (season - HISTORY_YEARS)..=season {
            let key = CacheKey::Team {
                team: team.to_string(),
                year,
            };
            let path = format!("/teams/{}/{}.htm", team, year);
            let html = match fetcher.page(&key, &path, &format!("{} stats for {}", team, year)) {
                Ok(html) => html,
                Err(e) if year == season => {
                    warn!("No {} page for {} yet, skipping coaching info: {}", team, year, e);
                    seasons.insert(year, TeamSeason::default());
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to load {} for {}", team, year))
                }
            };

            let parsed = parse_team_page(&html, year != season)
                .with_context(|| format!("Failed to parse {} page for {}", team, year))?;
            seasons.insert(year, parsed);
        }

        Ok(Self {
            team: team.to_string(),
            season,
            seasons,
        })
    }

    pub fn get(&self, year: i32) -> Option<&TeamSeason> {
        self.seasons.get(&year)
    }

    pub fn run_plays(&self, year: i32) -> f64 {
        self.get(year).map(|s| s.run_plays as f64).unwrap_or(0.0)
    }

    pub fn pass_plays(&self, year: i32) -> f64 {
        self.get(year).map(|s| s.pass_plays as f64).unwrap_or(0.0)
    }

    fn past(&self) -> impl Iterator<Item = &TeamSeason> {
        self.seasons
            .iter()
            .filter(move |(year, _)| **year < self.season)
            .map(|(_, s)| s)
    }

    /// Mean total plays, run % and pass % over the completed seasons.
    pub fn averages(&self) -> (f64, f64, f64) {
        let past: Vec<_> = self.past().collect();
        if past.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let n = past.len() as f64;
        (
            past.iter().map(|s| s.total_plays as f64).sum::<f64>() / n,
            past.iter().map(|s| s.run_percent).sum::<f64>() / n,
            past.iter().map(|s| s.pass_percent).sum::<f64>() / n,
        )
    }

    pub fn print<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "{:<6} {:<24} {:<24} {:>11} {:>8} {:>9} {:>8} {:>10}",
            "year", "head_coach", "offensive_coordinator", "total_plays", "run_pct", "run_plays",
            "pass_pct", "pass_plays"
        )?;
        for (year, s) in &self.seasons {
            writeln!(
                out,
                "{:<6} {:<24} {:<24} {:>11} {:>8.2} {:>9} {:>8.2} {:>10}",
                year,
                s.head_coach.as_deref().unwrap_or("-"),
                s.offensive_coordinator.as_deref().unwrap_or("-"),
                s.total_plays,
                s.run_percent,
                s.run_plays,
                s.pass_percent,
                s.pass_plays
            )?;
        }
        let (plays, run, pass) = self.averages();
        writeln!(out, "Average plays: {:.1}", plays)?;
        writeln!(out, "Average run %: {:.2}", run)?;
        writeln!(out, "Average pass %: {:.2}", pass)?;
        writeln!(out)?;
        Ok(())
    }
}

fn parse_team_page(html: &str, with_plays: bool) -> Result<TeamSeason> {
    let page = StatsPage::parse(html);
    let doc = page.document();
    let mut season = TeamSeason::default();

    for p in doc.select(&selector("p")) {
        let text = p.text().collect::<String>();
        let link = p
            .select(&selector("a"))
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string());
        if text.contains("Offensive Coordinator:") {
            season.offensive_coordinator = link;
        } else if text.contains("Coach:") {
            season.head_coach = link;
        }
    }

    if with_plays {
        let first_row = doc
            .select(&selector("tbody tr"))
            .next()
            .map(StatRow::new)
            .context("Team stats table not found")?;
        let run_plays = first_row.integer("Run Plays", "rush_att")?.unwrap_or(0);
        let pass_plays = first_row.integer("Pass Plays", "pass_att")?.unwrap_or(0);
        season = season.with_plays(
            u32::try_from(run_plays).unwrap_or(0),
            u32::try_from(pass_plays).unwrap_or(0),
        );
    }

    Ok(season)
}

/// A player listed on the team's roster page.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub position: String,
    pub name: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn load(fetcher: &PageFetcher, team: &str, season: i32) -> Result<Self> {
        let key = CacheKey::Roster {
            team: team.to_string(),
            year: season,
        };
        let path = format!("/teams/{}/{}_roster.htm", team, season);
        let html = fetcher
            .page(&key, &path, &format!("{} roster for {}", team, season))
            .with_context(|| format!("Failed to load {} roster", team))?;
        Self::parse(&html)
    }

    pub fn parse(html: &str) -> Result<Self> {
        let page = StatsPage::parse(html);
        let table = page.require_table("roster")?;

        let entries = body_rows(table)
            .map(StatRow::new)
            .filter_map(|row| {
                let name = row.text("Player", "player")?;
                if name.is_empty() {
                    return None;
                }
                Some(RosterEntry {
                    position: row.text("Position", "pos").unwrap_or_default(),
                    href: row.href("player"),
                    name,
                })
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn candidates(&self, position: Position) -> impl Iterator<Item = &RosterEntry> {
        self.entries
            .iter()
            .filter(move |e| e.position.eq_ignore_ascii_case(position.as_str()))
    }
}

/// Team-level numbers for the coming season.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamProjection {
    pub total_plays: u32,
    pub run_percent: f64,
    pub pass_percent: f64,
}

pub const TOTAL_PLAYS: &str = "Total Plays";
pub const RUN_PLAYS: &str = "Run Plays";
pub const PASS_PLAYS: &str = "Pass Plays";

impl TeamProjection {
    pub fn prompt<R: BufRead, W: Write>(
        prompter: &mut Prompter<R, W>,
        history: &TeamHistory,
    ) -> Result<Self> {
        history.print(prompter.output())?;
        Ok(Self {
            total_plays: prompter.stat("plays", history.season)?,
            run_percent: prompter.stat("run %", history.season)?,
            pass_percent: prompter.stat("pass %", history.season)?,
        })
    }

    pub fn run_plays(&self) -> f64 {
        round2(self.total_plays as f64 * self.run_percent / 100.0)
    }

    pub fn pass_plays(&self) -> f64 {
        round2(self.total_plays as f64 * self.pass_percent / 100.0)
    }

    pub fn to_row(&self) -> Row {
        Row::new()
            .with(TOTAL_PLAYS, self.total_plays as f64)
            .with(RUN_PLAYS, self.run_plays())
            .with(PASS_PLAYS, self.pass_plays())
    }

    /// Writes the team row as the first row of the team sheet, replacing an
    /// earlier team row.
    pub fn save(&self, workbook: &mut ProjectionWorkbook, team: &str) -> Result<()> {
        let name = sheet_name(team);
        let mut table = workbook.sheet(&name).cloned().unwrap_or_else(Table::new);

        table.retain(|row| !is_team_row(row));
        table.insert(0, self.to_row());

        info!("Saving team-level projections for {}", team);
        workbook.put_sheet(&name, table);
        workbook.save()?;
        Ok(())
    }
}

/// Team rows carry play totals and no player.
pub fn is_team_row(row: &Row) -> bool {
    row.text("Player Name").is_none() && row.number(TOTAL_PLAYS).is_some()
}
