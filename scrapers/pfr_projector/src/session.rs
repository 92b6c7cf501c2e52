use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::{
    config::ScoringSettings,
    fetch::PageFetcher,
    player::{choose_player, save_player_row, ChosenPlayer},
    prompt::Prompter,
    quarterback::{QbHistory, QbProjection},
    rankings::create_fantasy_rankings,
    skill_player::{SkillHistory, SkillProjection},
    team::{is_team_row, Roster, TeamHistory, TeamProjection},
    team_stats::fill_team_sheet,
    types::{sheet_name, Position},
    workbook::ProjectionWorkbook,
};

/// One interactive projection run over a list of teams.
pub struct Session<'a, R, W> {
    fetcher: &'a PageFetcher,
    prompter: Prompter<R, W>,
    workbook: ProjectionWorkbook,
    season: i32,
    scoring: ScoringSettings,
    csv_dir: Option<PathBuf>,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(
        fetcher: &'a PageFetcher,
        prompter: Prompter<R, W>,
        workbook: ProjectionWorkbook,
        season: i32,
        scoring: ScoringSettings,
    ) -> Self {
        Self {
            fetcher,
            prompter,
            workbook,
            season,
            scoring,
            csv_dir: None,
        }
    }

    pub fn with_csv_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.csv_dir = dir;
        self
    }

    pub fn workbook(&self) -> &ProjectionWorkbook {
        &self.workbook
    }

    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }

    pub fn run(&mut self, teams: &[String]) -> Result<()> {
        for team in teams {
            if !self
                .prompter
                .confirm(&format!("Would you like to project team {}? ", team))?
            {
                continue;
            }
            self.project_team(team)
                .with_context(|| format!("Projection failed for team {}", team))?;
        }

        create_fantasy_rankings(&mut self.workbook, teams, self.csv_dir.as_deref())?;
        info!("Projection run complete");
        Ok(())
    }

    fn project_team(&mut self, team: &str) -> Result<()> {
        let history = TeamHistory::load(self.fetcher, team, self.season)?;

        if self.prompter.confirm(&format!(
            "Do you need to do team-level projections for {}? ",
            team
        ))? {
            let projection = TeamProjection::prompt(&mut self.prompter, &history)?;
            projection.save(&mut self.workbook, team)?;
        }

        let mut roster: Option<Roster> = None;
        for position in Position::ALL {
            self.project_position(&history, &mut roster, position)?;
        }

        let has_team_row = self
            .workbook
            .sheet(&sheet_name(team))
            .is_some_and(|sheet| sheet.rows().iter().any(is_team_row));
        if !has_team_row {
            warn!("Skipping derived stats for {}: no team-level projections yet", team);
            return Ok(());
        }
        for warning in fill_team_sheet(&mut self.workbook, team, &self.scoring)? {
            self.prompter.say(warning)?;
        }
        Ok(())
    }

    fn project_position(
        &mut self,
        history: &TeamHistory,
        roster: &mut Option<Roster>,
        position: Position,
    ) -> Result<()> {
        let team = history.team.as_str();
        if !self.prompter.confirm(&format!(
            "Do you need to do {} projections for {}? ",
            position, team
        ))? {
            return Ok(());
        }

        if roster.is_none() {
            *roster = Some(Roster::load(self.fetcher, team, self.season)?);
        }
        let roster = roster.as_ref().context("Roster not loaded")?;

        let mut done = HashSet::new();
        loop {
            if let Some(player) = choose_player(&mut self.prompter, roster, position, &done)? {
                self.project_player(history, &player)?;
                done.insert(player.name);
            }
            if !self.prompter.confirm(&format!(
                "Would you like to project another {} for {}? ",
                position, team
            ))? {
                return Ok(());
            }
        }
    }

    fn project_player(&mut self, history: &TeamHistory, player: &ChosenPlayer) -> Result<()> {
        let row = if player.position == Position::QB {
            let qb = QbHistory::load(self.fetcher, history, player)?;
            QbProjection::prompt(&mut self.prompter, &qb)?.to_row(&player.name)
        } else {
            let skill = SkillHistory::load(self.fetcher, history, player)?;
            SkillProjection::prompt(&mut self.prompter, &skill)?.to_row(&player.name)
        };
        save_player_row(&mut self.workbook, &history.team, row)
    }
}
