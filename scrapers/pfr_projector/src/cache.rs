use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};
use tracing::debug;

use crate::{error::ScrapeError, types::Position};

/// Identifies one cached PFR page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    Team { team: String, year: i32 },
    Roster { team: String, year: i32 },
    Player { team: String, position: Position, name: String },
}

impl CacheKey {
    fn relative_path(&self) -> PathBuf {
        match self {
            CacheKey::Team { team, year } => Path::new(team).join(format!("team_{}.html", year)),
            CacheKey::Roster { team, year } => {
                Path::new(team).join(format!("roster_{}.html", year))
            }
            CacheKey::Player {
                team,
                position,
                name,
            } => Path::new(team).join(format!(
                "{}_{}.html",
                position.as_str().to_lowercase(),
                file_safe_name(name)
            )),
        }
    }
}

fn file_safe_name(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re = UNSAFE.get_or_init(|| Regex::new(r#"[\s/\\:*?"<>|]+"#).expect("valid regex"));
    re.replace_all(name, "").into_owned()
}

/// Raw HTML pages on disk, one file per key. Nothing is ever evicted.
#[derive(Debug, Clone)]
pub struct HtmlCache {
    root: PathBuf,
}

impl HtmlCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    pub fn load(&self, key: &CacheKey) -> Result<Option<String>, ScrapeError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        debug!("Reading cached page {:?}", path);
        Ok(Some(fs::read_to_string(path)?))
    }

    pub fn store(&self, key: &CacheKey, html: &str) -> Result<(), ScrapeError> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing cached page {:?}", path);
        fs::write(path, html)?;
        Ok(())
    }
}
