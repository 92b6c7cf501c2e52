use anyhow::Result;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use pfr_projector::{
    config::ProjectorConfig,
    fetch::PageFetcher,
    prompt::Prompter,
    rankings::create_fantasy_rankings,
    session::Session,
    team_stats::fill_team_sheet,
    types::{resolve_teams, sheet_name},
    workbook::ProjectionWorkbook,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "CLI-based fantasy football projections from pro-football-reference data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactively project teams and players, then rebuild the rankings
    Project {
        /// Path to the Excel file where projections are stored
        workbook: PathBuf,
        /// Team codes to project, comma separated, or "all"
        #[arg(short, long, value_delimiter = ',', default_value = "all")]
        teams: Vec<String>,
        /// Season to project (defaults to the current year)
        #[arg(short, long)]
        season: Option<i32>,
        /// Always fetch pages instead of reading the HTML cache
        #[arg(long)]
        no_cache: bool,
        /// Do not write fetched pages to the HTML cache
        #[arg(long)]
        no_save_cache: bool,
        /// Also export each ranking as CSV into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Recompute derived stats for teams already in the workbook
    Fill {
        workbook: PathBuf,
        #[arg(short, long, value_delimiter = ',', default_value = "all")]
        teams: Vec<String>,
    },
    /// Rebuild the QB/WR/RB/TE ranking sheets
    Rankings {
        workbook: PathBuf,
        #[arg(short, long, value_delimiter = ',', default_value = "all")]
        teams: Vec<String>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ProjectorConfig::from_env()?;

    match cli.command {
        Commands::Project {
            workbook,
            teams,
            season,
            no_cache,
            no_save_cache,
            csv_dir,
        } => {
            config.cache.use_cache = !no_cache;
            config.cache.save_results = !no_save_cache;
            let season = season.unwrap_or_else(|| chrono::Local::now().year());
            let teams = resolve_teams(&teams)?;
            info!("Projecting {} teams for {}", teams.len(), season);

            let fetcher = PageFetcher::new(&config)?;
            let workbook = ProjectionWorkbook::open(workbook)?;
            let mut session =
                Session::new(&fetcher, Prompter::stdio(), workbook, season, config.scoring)
                    .with_csv_dir(csv_dir);
            session.run(&teams)?;
        }
        Commands::Fill { workbook, teams } => {
            let teams = resolve_teams(&teams)?;
            let mut workbook = ProjectionWorkbook::open(workbook)?;
            for team in &teams {
                if workbook.sheet(&sheet_name(team)).is_none() {
                    warn!("No sheet for {}, skipping", team);
                    continue;
                }
                // Warnings are logged as they are raised.
                fill_team_sheet(&mut workbook, team, &config.scoring)?;
            }
        }
        Commands::Rankings {
            workbook,
            teams,
            csv_dir,
        } => {
            let teams = resolve_teams(&teams)?;
            let mut workbook = ProjectionWorkbook::open(workbook)?;
            create_fantasy_rankings(&mut workbook, &teams, csv_dir.as_deref())?;
        }
    }

    Ok(())
}
