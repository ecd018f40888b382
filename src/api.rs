// This module handles fetching league data from the fantasy league gateway
// The pipeline only sees the LeagueSource trait; auth and token refresh live behind the gateway

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, SourceKind};
use crate::error::{PipelineError, Result};
use crate::league::{LeagueSettings, Matchup, StandingsEntry};

/// Rate limit delay in milliseconds between week requests
const RATE_LIMIT_DELAY_MS: u64 = 250;

/// Everything the pipeline needs from the outside world.
/// Calls are sequential and blocking; a hung request blocks the pass.
pub trait LeagueSource {
    /// Playoff layout of a season
    fn settings(&self, season: u16) -> Result<LeagueSettings>;

    /// Most recent week whose results are all final, 0 before week 1 ends
    fn latest_completed_week(&self, season: u16) -> Result<u32>;

    /// All matchups of a week, whatever their status
    fn week_matchups(&self, season: u16, week: u32) -> Result<Vec<Matchup>>;

    /// Current standings of a season
    fn standings(&self, season: u16) -> Result<Vec<StandingsEntry>>;
}

/// Live week pointer as reported by the league
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeagueStatus {
    pub current_week: u32,
    #[serde(default)]
    pub current_week_complete: bool,
}

impl LeagueStatus {
    pub fn latest_completed_week(&self) -> u32 {
        if self.current_week_complete {
            self.current_week
        } else {
            self.current_week.saturating_sub(1)
        }
    }
}

/// Build the configured source
pub fn source_from_config(config: &Config) -> Result<Box<dyn LeagueSource>> {
    match config.source_kind() {
        SourceKind::Http => Ok(Box::new(HttpLeagueSource::new(config)?)),
        SourceKind::Files => Ok(Box::new(FileLeagueSource::new(&config.source.snapshot_dir))),
    }
}

/// API client for the league gateway
pub struct HttpLeagueSource {
    client: reqwest::blocking::Client,
    base_url: String,
    league_ids: Vec<(u16, String)>,
}

impl HttpLeagueSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.source.timeout_secs))
            .user_agent(config.source.user_agent.as_str())
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to create HTTP client: {}", e)))?;

        let current = config.league.current_season;
        if config.league_id(current).is_none() {
            return Err(PipelineError::Config(format!(
                "no league id configured for the current season {}",
                current
            )));
        }

        let league_ids = config
            .league
            .seasons
            .iter()
            .map(|s| (s.season, s.league_id.clone()))
            .collect();

        Ok(HttpLeagueSource {
            client,
            base_url: config.source.base_url.trim_end_matches('/').to_string(),
            league_ids,
        })
    }

    fn league_url(&self, season: u16) -> Result<String> {
        let league_id = self
            .league_ids
            .iter()
            .find(|(s, _)| *s == season)
            .map(|(_, id)| id)
            .ok_or_else(|| PipelineError::Config(format!("no league id configured for season {}", season)))?;
        Ok(format!("{}/leagues/{}", self.base_url, league_id))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PipelineError::fetch(url, e))?;
        response.json().map_err(|e| PipelineError::fetch(url, e))
    }
}

impl LeagueSource for HttpLeagueSource {
    fn settings(&self, season: u16) -> Result<LeagueSettings> {
        let url = format!("{}/settings", self.league_url(season)?);
        self.get_json(&url)
    }

    fn latest_completed_week(&self, season: u16) -> Result<u32> {
        let url = format!("{}/status", self.league_url(season)?);
        let status: LeagueStatus = self.get_json(&url)?;
        Ok(status.latest_completed_week())
    }

    fn week_matchups(&self, season: u16, week: u32) -> Result<Vec<Matchup>> {
        let url = format!("{}/weeks/{}/matchups", self.league_url(season)?, week);
        let matchups = self.get_json(&url)?;

        // Rate limiting
        thread::sleep(Duration::from_millis(RATE_LIMIT_DELAY_MS));

        Ok(matchups)
    }

    fn standings(&self, season: u16) -> Result<Vec<StandingsEntry>> {
        let url = format!("{}/standings", self.league_url(season)?);
        self.get_json(&url)
    }
}

/// Reads gateway-shaped JSON snapshots from disk:
/// `<dir>/<season>/{settings,status,standings}.json` and `<dir>/<season>/week_<n>.json`.
/// A missing week file means the week hasn't been scheduled yet.
pub struct FileLeagueSource {
    dir: PathBuf,
}

impl FileLeagueSource {
    pub fn new(dir: &Path) -> Self {
        FileLeagueSource { dir: dir.to_path_buf() }
    }

    fn snapshot<T: DeserializeOwned>(&self, season: u16, file: &str) -> Result<T> {
        let path = self.dir.join(season.to_string()).join(file);
        let content = fs::read_to_string(&path)
            .map_err(|e| PipelineError::fetch(path.display().to_string(), e))?;
        serde_json::from_str(&content).map_err(|e| PipelineError::fetch(path.display().to_string(), e))
    }
}

impl LeagueSource for FileLeagueSource {
    fn settings(&self, season: u16) -> Result<LeagueSettings> {
        self.snapshot(season, "settings.json")
    }

    fn latest_completed_week(&self, season: u16) -> Result<u32> {
        let status: LeagueStatus = self.snapshot(season, "status.json")?;
        Ok(status.latest_completed_week())
    }

    fn week_matchups(&self, season: u16, week: u32) -> Result<Vec<Matchup>> {
        let file = format!("week_{}.json", week);
        if !self.dir.join(season.to_string()).join(&file).exists() {
            return Ok(Vec::new());
        }
        self.snapshot(season, &file)
    }

    fn standings(&self, season: u16) -> Result<Vec<StandingsEntry>> {
        self.snapshot(season, "standings.json")
    }
}
