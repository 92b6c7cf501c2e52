//! Historical data and projections for non-quarterbacks (WR, RB, TE).

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use tracing::info;

use crate::{
    fetch::PageFetcher,
    html::{ratio, row_by_id, StatsPage},
    player::{fmt_opt, mean, player_page, ChosenPlayer, PLAYER_NAME, POS},
    prompt::Prompter,
    sheet::Row,
    team::TeamHistory,
    types::{history_years, Position},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillSeason {
    pub team: String,
    pub games: Option<f64>,
    pub games_started: Option<f64>,
    pub target_share: f64,
    pub catch_percent: f64,
    pub yards_per_catch: f64,
    pub tds_per_rec_yard: f64,
    pub rush_share: f64,
    pub yards_per_carry: f64,
    pub tds_per_rush_yard: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillHistory {
    pub name: String,
    pub position: Position,
    pub season: i32,
    pub seasons: BTreeMap<i32, SkillSeason>,
}

impl SkillHistory {
    pub fn load(fetcher: &PageFetcher, team: &TeamHistory, player: &ChosenPlayer) -> Result<Self> {
        let html = player_page(fetcher, &team.team, player)?;
        Self::parse(&html, team, &player.name, player.position)
    }

    pub fn parse(html: &str, team: &TeamHistory, name: &str, position: Position) -> Result<Self> {
        if !position.is_skill() {
            bail!("Position must be one of RB, WR, or TE");
        }
        let page = StatsPage::parse(html);
        let mut history = Self {
            name: name.to_string(),
            position,
            season: team.season,
            seasons: BTreeMap::new(),
        };

        // Receivers get the receiving-first variant of the combined table.
        let found = ["rushing_and_receiving", "receiving_and_rushing"]
            .into_iter()
            .find_map(|id| page.table(id).map(|table| (id, table)));
        let Some((prefix, table)) = found else {
            info!("Rushing/receiving table does not exist... assuming {} is a rookie", name);
            return Ok(history);
        };

        for year in history_years(team.season) {
            let Some(row) = row_by_id(table, &format!("{}.{}", prefix, year)) else {
                info!("{} does not have data for {}", name, year);
                continue;
            };
            let stat = |label: &str, data_stat: &str| -> Result<f64> {
                Ok(row.number(label, data_stat)?.unwrap_or(0.0))
            };

            let targets = stat("targets", "targets")?;
            let rec_yds = stat("receiving yards", "rec_yds")?;
            let rec_td = stat("receiving touchdowns", "rec_td")?;
            let rush_att = stat("rushing attempts", "rush_att")?;
            let rush_yds = stat("rushing yards", "rush_yds")?;
            let rush_td = stat("rushing touchdowns", "rush_td")?;

            history.seasons.insert(
                year,
                SkillSeason {
                    team: row
                        .text("Team Name", "team_name_abbr")
                        .unwrap_or_else(|| "NA".to_string()),
                    games: row.number("Games Played", "games")?,
                    games_started: row.number("Games Started", "games_started")?,
                    target_share: ratio(targets, team.pass_plays(year)) * 100.0,
                    catch_percent: stat("catch percentage", "catch_pct")?,
                    yards_per_catch: stat("yards per catch", "rec_yds_per_rec")?,
                    tds_per_rec_yard: ratio(rec_td, rec_yds),
                    rush_share: ratio(rush_att, team.run_plays(year)) * 100.0,
                    yards_per_carry: stat("yards per carry", "rush_yds_per_att")?,
                    tds_per_rush_yard: ratio(rush_td, rush_yds),
                },
            );
        }

        Ok(history)
    }

    pub fn print<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "{:<6} {:<5} {:>6} {:>6} {:>12} {:>8} {:>11} {:>12} {:>10} {:>7} {:>13}",
            "year", "team", "games", "gs", "target share", "catch %", "yards/catch",
            "TDs/rec_yard", "rush share", "ypc", "tds/rush_yard"
        )?;
        for (year, s) in &self.seasons {
            writeln!(
                out,
                "{:<6} {:<5} {:>6} {:>6} {:>12.2} {:>8.1} {:>11.2} {:>12.4} {:>10.2} {:>7.2} {:>13.4}",
                year,
                s.team,
                fmt_opt(s.games),
                fmt_opt(s.games_started),
                s.target_share,
                s.catch_percent,
                s.yards_per_catch,
                s.tds_per_rec_yard,
                s.rush_share,
                s.yards_per_carry,
                s.tds_per_rush_yard
            )?;
        }

        let avg = |f: fn(&SkillSeason) -> Option<f64>| fmt_opt(mean(self.seasons.values().map(f)));
        writeln!(out, "Average games played: {}", avg(|s| s.games))?;
        writeln!(out, "Average target share: {}", avg(|s| Some(s.target_share)))?;
        writeln!(out, "Average catch %: {}", avg(|s| Some(s.catch_percent)))?;
        writeln!(out, "Average yards/catch: {}", avg(|s| Some(s.yards_per_catch)))?;
        writeln!(out, "Average TDs/rec_yard: {}", avg(|s| Some(s.tds_per_rec_yard)))?;
        writeln!(out, "Average rush share: {}", avg(|s| Some(s.rush_share)))?;
        writeln!(out, "Average ypc: {}", avg(|s| Some(s.yards_per_carry)))?;
        writeln!(out, "Average tds/rush_yard: {}", avg(|s| Some(s.tds_per_rush_yard)))?;
        writeln!(out)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillProjection {
    pub position: Position,
    pub games: u32,
    pub target_share: f64,
    pub catch_percent: f64,
    pub yards_per_catch: f64,
    pub tds_per_rec_yard: f64,
    pub rush_share: f64,
    pub yards_per_carry: f64,
    pub tds_per_rush_yard: f64,
}

impl SkillProjection {
    pub fn prompt<R: BufRead, W: Write>(
        prompter: &mut Prompter<R, W>,
        history: &SkillHistory,
    ) -> Result<Self> {
        history.print(prompter.output())?;
        let season = history.season;
        Ok(Self {
            position: history.position,
            games: prompter.stat("games played", season)?,
            target_share: prompter.stat("target share", season)?,
            catch_percent: prompter.stat("catch percentage", season)?,
            yards_per_catch: prompter.stat("yards per catch", season)?,
            tds_per_rec_yard: prompter.stat("receiving TDs per receiving yd", season)?,
            rush_share: prompter.stat("rushing share", season)?,
            yards_per_carry: prompter.stat("yards per carry", season)?,
            tds_per_rush_yard: prompter.stat("Rushing TDs per rush yd", season)?,
        })
    }

    pub fn to_row(&self, name: &str) -> Row {
        Row::new()
            .with(POS, self.position.as_str())
            .with(PLAYER_NAME, name)
            .with("Games Started", self.games as f64)
            .with("Target Share", self.target_share)
            .with("Catch Percentage", self.catch_percent)
            .with("Yards/Catch", self.yards_per_catch)
            .with("TDs/Receiving Yard", self.tds_per_rec_yard)
            .with("Rush Share", self.rush_share)
            .with("Yards/Carry", self.yards_per_carry)
            .with("TDs/Rush Yard", self.tds_per_rush_yard)
    }
}
