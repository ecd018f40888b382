// Configuration module for the league site builder
// Supports YAML configuration files for paths, tracked seasons, the data source and manager naming

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::store::write_atomic;

/// Locations searched when no config path is given
const DEFAULT_CONFIG_PATHS: [&str; 3] = ["league-site.yaml", "league-site.yml", ".league-site.yaml"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub league: LeagueConfig,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub managers: ManagerSettings,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            // An explicit path that fails to load is an error, not a silent fallback
            Some(p) => Self::from_file(p),
            None => {
                for default_path in DEFAULT_CONFIG_PATHS {
                    let candidate = Path::new(default_path);
                    if candidate.exists() {
                        let config = Self::from_file(candidate)?;
                        info!("Loaded configuration from {}", default_path);
                        return Ok(config);
                    }
                }
                warn!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| PipelineError::Config(format!("failed to serialize config: {}", e)))?;
        write_atomic(path, yaml.as_bytes())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.timeout_secs == 0 {
            return Err(PipelineError::Config("source.timeout_secs must be positive".to_string()));
        }
        let mut seen = std::collections::BTreeSet::new();
        for entry in &self.league.seasons {
            if !seen.insert(entry.season) {
                return Err(PipelineError::Config(format!(
                    "season {} is listed twice",
                    entry.season
                )));
            }
        }
        Ok(())
    }

    /// Every season the history covers, oldest first, always including the current one
    pub fn tracked_seasons(&self) -> Vec<u16> {
        let mut seasons: Vec<u16> = self.league.seasons.iter().map(|s| s.season).collect();
        if !seasons.contains(&self.league.current_season) {
            seasons.push(self.league.current_season);
        }
        seasons.sort_unstable();
        seasons
    }

    pub fn league_id(&self, season: u16) -> Option<&str> {
        self.league
            .seasons
            .iter()
            .find(|s| s.season == season)
            .map(|s| s.league_id.as_str())
    }

    pub fn source_kind(&self) -> SourceKind {
        parse_source_kind(&self.source.kind)
    }
}

/// Output and cache directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// JSON artifacts (history, h2h, report and preview data)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Raw API payload memo
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Rendered static pages
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        PathSettings {
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
            site_dir: default_site_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_cache_dir() -> PathBuf { PathBuf::from("cache") }
fn default_site_dir() -> PathBuf { PathBuf::from("site") }

/// Which seasons the league history spans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Season whose weekly report and preview are produced
    #[serde(default = "default_current_season")]
    pub current_season: u16,

    /// Every season with its league id on the source
    #[serde(default)]
    pub seasons: Vec<SeasonEntry>,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        LeagueConfig {
            current_season: default_current_season(),
            seasons: Vec::new(),
        }
    }
}

fn default_current_season() -> u16 { 2025 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonEntry {
    pub season: u16,
    pub league_id: String,
}

/// Where league data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Http,
    Files,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// "http" or "files"
    #[serde(default = "default_source_kind")]
    pub kind: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Snapshot directory used by the "files" source
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            kind: default_source_kind(),
            base_url: default_base_url(),
            snapshot_dir: default_snapshot_dir(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_source_kind() -> String { "http".to_string() }
fn default_base_url() -> String { "http://localhost:8080".to_string() }
fn default_snapshot_dir() -> PathBuf { PathBuf::from("snapshots") }
fn default_timeout_secs() -> u64 { 30 }
fn default_user_agent() -> String { "league-site/0.1".to_string() }

/// Manager naming rules applied while building history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerSettings {
    /// Nickname of whoever runs the site; loses co-manager credit to the partner
    #[serde(default)]
    pub operator: Option<String>,

    /// Nickname -> canonical nickname
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl ManagerSettings {
    pub fn resolve(&self, nickname: &str) -> String {
        self.aliases
            .get(nickname)
            .cloned()
            .unwrap_or_else(|| nickname.to_string())
    }
}

/// Parse source kind string to enum
fn parse_source_kind(s: &str) -> SourceKind {
    match s.to_lowercase().as_str() {
        "http" | "api" => SourceKind::Http,
        "files" | "file" | "snapshots" => SourceKind::Files,
        _ => {
            warn!("Unknown source kind '{}', defaulting to http", s);
            SourceKind::Http
        }
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    r#"# League site configuration
# All values shown are defaults unless noted - uncomment and modify as needed

paths:
  # JSON artifacts consumed by the renderer
  data_dir: data
  # Raw API payloads, one file per season/week
  cache_dir: cache
  # Rendered HTML pages
  site_dir: site

league:
  # Season for the weekly report and preview
  current_season: 2025
  # Every tracked season and its league id (example values)
  seasons:
    - season: 2024
      league_id: "449.l.123456"
    - season: 2025
      league_id: "461.l.654321"

source:
  # "http" for the league API gateway, "files" for a snapshot directory
  kind: http
  base_url: http://localhost:8080
  snapshot_dir: snapshots
  timeout_secs: 30
  user_agent: league-site/0.1

managers:
  # Co-managed teams are credited to the partner, not the operator
  # operator: Dylan
  # Fold one nickname into another
  aliases: {}
"#
    .to_string()
}
