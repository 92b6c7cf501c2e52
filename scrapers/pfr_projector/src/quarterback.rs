use anyhow::Result;
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
    types::history_years,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QbSeason {
    pub team: String,
    pub games: Option<f64>,
    pub games_started: Option<f64>,
    pub pass_att: Option<f64>,
    pub int_percent: Option<f64>,
    pub pass_td_percent: Option<f64>,
    pub comp_percent: Option<f64>,
    pub rush_percent: f64,
    pub yards_per_carry: Option<f64>,
    pub tds_per_rush_yard: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QbHistory {
    pub name: String,
    pub season: i32,
    /// Empty for rookies.
    pub seasons: BTreeMap<i32, QbSeason>,
}

impl QbHistory {
    pub fn load(fetcher: &PageFetcher, team: &TeamHistory, player: &ChosenPlayer) -> Result<Self> {
        let html = player_page(fetcher, &team.team, player)?;
        Self::parse(&html, team, &player.name)
    }

    pub fn parse(html: &str, team: &TeamHistory, name: &str) -> Result<Self> {
        let page = StatsPage::parse(html);
        let mut history = Self {
            name: name.to_string(),
            season: team.season,
            seasons: BTreeMap::new(),
        };

        // Rookies have no historical stat tables.
        let Some(rushing) = page.table("rushing_and_receiving") else {
            info!("Rushing/receiving table does not exist... assuming {} is a rookie", name);
            return Ok(history);
        };
        let passing = page.require_table("passing")?;

        for year in history_years(team.season) {
            let passing_row = row_by_id(passing, &format!("passing.{}", year));
            let rushing_row = row_by_id(rushing, &format!("rushing_and_receiving.{}", year));
            let (Some(passing_row), Some(rushing_row)) = (passing_row, rushing_row) else {
                info!("{} does not have data for {}", name, year);
                continue;
            };

            let rush_att = rushing_row.number("Rushing Attempts", "rush_att")?.unwrap_or(0.0);
            let rush_td = rushing_row.number("Rushing TDs", "rush_td")?.unwrap_or(0.0);
            let rush_yds = rushing_row.number("Rushing Yards", "rush_yds")?.unwrap_or(0.0);

            history.seasons.insert(
                year,
                QbSeason {
                    team: rushing_row
                        .text("Team Name", "team_name_abbr")
                        .unwrap_or_else(|| "NA".to_string()),
                    games: rushing_row.number("Games Played", "games")?,
                    games_started: rushing_row.number("Games Started", "games_started")?,
                    pass_att: passing_row.number("Pass Attempts", "pass_att")?,
                    int_percent: passing_row.number("Interception %", "pass_int_pct")?,
                    pass_td_percent: passing_row.number("Pass TD %", "pass_td_pct")?,
                    comp_percent: passing_row.number("Completion %", "pass_cmp_pct")?,
                    rush_percent: ratio(rush_att, team.run_plays(year)) * 100.0,
                    yards_per_carry: rushing_row.number("Yards per carry", "rush_yds_per_att")?,
                    tds_per_rush_yard: ratio(rush_td, rush_yds),
                },
            );
        }

        Ok(history)
    }

    pub fn print<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "{:<6} {:<5} {:>6} {:>6} {:>8} {:>7} {:>9} {:>7} {:>7} {:>7} {:>13}",
            "year", "team", "games", "gs", "pass_att", "int %", "pass td %", "comp %", "rush %",
            "ypc", "tds/rush_yard"
        )?;
        for (year, s) in &self.seasons {
            writeln!(
                out,
                "{:<6} {:<5} {:>6} {:>6} {:>8} {:>7} {:>9} {:>7} {:>7.2} {:>7} {:>13.4}",
                year,
                s.team,
                fmt_opt(s.games),
                fmt_opt(s.games_started),
                fmt_opt(s.pass_att),
                fmt_opt(s.int_percent),
                fmt_opt(s.pass_td_percent),
                fmt_opt(s.comp_percent),
                s.rush_percent,
                fmt_opt(s.yards_per_carry),
                s.tds_per_rush_yard
            )?;
        }
        let seasons = || self.seasons.values();
        writeln!(out, "Average games played: {}", fmt_opt(mean(seasons().map(|s| s.games))))?;
        writeln!(out, "Average int %: {}", fmt_opt(mean(seasons().map(|s| s.int_percent))))?;
        writeln!(
            out,
            "Average rush %: {}",
            fmt_opt(mean(seasons().map(|s| Some(s.rush_percent))))
        )?;
        writeln!(out, "Average ypc: {}", fmt_opt(mean(seasons().map(|s| s.yards_per_carry))))?;
        writeln!(
            out,
            "Average tds/rush_yard: {}",
            fmt_opt(mean(seasons().map(|s| Some(s.tds_per_rush_yard))))
        )?;
        writeln!(out)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QbProjection {
    pub games: u32,
    pub int_percent: f64,
    pub rush_share: f64,
    pub yards_per_carry: f64,
    pub tds_per_rush_yard: f64,
}

impl QbProjection {
    pub fn prompt<R: BufRead, W: Write>(
        prompter: &mut Prompter<R, W>,
        history: &QbHistory,
    ) -> Result<Self> {
        history.print(prompter.output())?;
        let season = history.season;
        Ok(Self {
            games: prompter.stat("games played", season)?,
            int_percent: prompter.stat("int %", season)?,
            rush_share: prompter.stat("rush %", season)?,
            yards_per_carry: prompter.stat("ypc", season)?,
            tds_per_rush_yard: prompter.stat("Rushing TDs/yard", season)?,
        })
    }

    pub fn to_row(&self, name: &str) -> Row {
        Row::new()
            .with(POS, "QB")
            .with(PLAYER_NAME, name)
            .with("Games Started", self.games as f64)
            .with("Interception %", self.int_percent)
            .with("Rush Share", self.rush_share)
            .with("Yards/Carry", self.yards_per_carry)
            .with("TDs/Rush Yard", self.tds_per_rush_yard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::TeamSeason;
    use std::io::Cursor;

    fn team() -> TeamHistory {
        let mut seasons = BTreeMap::new();
        for (year, run) in [(2022, 400), (2023, 500), (2024, 450)] {
            seasons.insert(
                year,
                TeamSeason {
                    run_plays: run,
                    pass_plays: 600,
                    ..Default::default()
                },
            );
        }
        TeamHistory {
            team: "crd".into(),
            season: 2025,
            seasons,
        }
    }

    const QB_PAGE: &str = r#"<html><body>
        <table id="passing"><tbody>
          <tr id="passing.2023"><td data-stat="pass_att">300</td><td data-stat="pass_int_pct">1.7</td>
              <td data-stat="pass_td_pct">3.3</td><td data-stat="pass_cmp_pct">65.7</td></tr>
          <tr id="passing.2024"><td data-stat="pass_att">541</td><td data-stat="pass_int_pct">2.0</td>
              <td data-stat="pass_td_pct">3.9</td><td data-stat="pass_cmp_pct">68.9</td></tr>
        </tbody></table>
        <div id="all_rushing_and_receiving"><!--
        <table id="rushing_and_receiving"><tbody>
          <tr id="rushing_and_receiving.2023"><td data-stat="team_name_abbr">ARI</td><td data-stat="games">8</td>
              <td data-stat="games_started">8</td><td data-stat="rush_att">50</td><td data-stat="rush_yds">244</td>
              <td data-stat="rush_yds_per_att">4.9</td><td data-stat="rush_td">3</td></tr>
          <tr id="rushing_and_receiving.2024"><td data-stat="team_name_abbr">ARI</td><td data-stat="games">17</td>
              <td data-stat="games_started">17</td><td data-stat="rush_att">90</td><td data-stat="rush_yds">0</td>
              <td data-stat="rush_yds_per_att">5.0</td><td data-stat="rush_td">5</td></tr>
        </tbody></table>
        --></div></body></html>"#;

    #[test]
    fn test_parse_history() {
        let history = QbHistory::parse(QB_PAGE, &team(), "Kyler Murray").unwrap();

        assert!(history.seasons.get(&2022).is_none());
        let s2023 = &history.seasons[&2023];
        assert_eq!(s2023.team, "ARI");
        assert_eq!(s2023.pass_att, Some(300.0));
        assert_eq!(s2023.rush_percent, 10.0);
        assert_eq!(s2023.tds_per_rush_yard, 3.0 / 244.0);

        let s2024 = &history.seasons[&2024];
        assert_eq!(s2024.rush_percent, 20.0);
        assert_eq!(s2024.tds_per_rush_yard, 0.0);
    }

    #[test]
    fn test_rookie_has_empty_history() {
        let history = QbHistory::parse(
            "<html><body><p>No stats</p></body></html>",
            &team(),
            "Cam Ward",
        )
        .unwrap();
        assert!(history.seasons.is_empty());
    }

    #[test]
    fn test_missing_passing_table_is_an_error() {
        let page = r#"<table id="rushing_and_receiving"><tbody></tbody></table>"#;
        assert!(QbHistory::parse(page, &team(), "Nobody").is_err());
    }

    #[test]
    fn test_prompt_builds_row() {
        let history = QbHistory::parse(QB_PAGE, &team(), "Kyler Murray").unwrap();
        let mut prompter = Prompter::new(
            Cursor::new(b"17\n2.1\nmany\n18\n5.2\n0.012\n".to_vec()),
            Vec::new(),
        );
        let projection = QbProjection::prompt(&mut prompter, &history).unwrap();
        assert_eq!(projection.rush_share, 18.0);

        let row = projection.to_row("Kyler Murray");
        assert_eq!(row.text(POS), Some("QB"));
        assert_eq!(row.number("Games Started"), Some(17.0));
        assert_eq!(row.number("TDs/Rush Yard"), Some(0.012));

        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert!(output.contains("Average games played: 12.500"));
        assert!(output.contains("Estimated Rushing TDs/yard for 2025: "));
    }
}
