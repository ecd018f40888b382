// Raw data cache: a memo of league source responses keyed by season and week
// Entries carry no derived meaning; the history builder is their only reader

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

use crate::error::{PipelineError, Result};
use crate::league::{LeagueSettings, Matchup};
use crate::paths::ArtifactPaths;
use crate::store::{read_json, read_json_opt, StagedWrites};

/// Envelope stored around every cached payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub season: u16,
    pub key: String,
    pub fetched_at: DateTime<Utc>,
    pub payload: T,
}

impl<T> CacheEntry<T> {
    pub fn new(season: u16, key: String, payload: T) -> Self {
        CacheEntry {
            season,
            key,
            fetched_at: Utc::now(),
            payload,
        }
    }
}

/// Cached payloads of one season
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonData {
    pub settings: Option<LeagueSettings>,
    pub weeks: BTreeMap<u32, Vec<Matchup>>,
}

/// Everything the history builder consumes, seasons in order
pub type RawSnapshot = BTreeMap<u16, SeasonData>;

pub struct RawCache<'a> {
    paths: &'a ArtifactPaths,
}

impl<'a> RawCache<'a> {
    pub fn new(paths: &'a ArtifactPaths) -> Self {
        RawCache { paths }
    }

    /// Load every cached entry of a season; an absent season is empty, not an error
    pub fn load_season(&self, season: u16) -> Result<SeasonData> {
        let mut data = SeasonData::default();

        let settings_path = self.paths.settings_cache(season);
        if let Some(entry) = read_json_opt::<CacheEntry<LeagueSettings>>(&settings_path)? {
            check_season(&settings_path, season, entry.season)?;
            data.settings = Some(entry.payload);
        }

        let dir = self.paths.season_cache(season);
        if !dir.exists() {
            return Ok(data);
        }
        let entries = fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))?;
        for dir_entry in entries {
            let dir_entry = dir_entry.map_err(|e| PipelineError::io(&dir, e))?;
            let name = dir_entry.file_name();
            let Some(week) = parse_week_file(&name.to_string_lossy()) else {
                continue;
            };
            let path = dir_entry.path();
            let entry: CacheEntry<Vec<Matchup>> = read_json(&path)?;
            check_season(&path, season, entry.season)?;
            data.weeks.insert(week, entry.payload);
        }

        Ok(data)
    }

    pub fn load_all(&self, seasons: &[u16]) -> Result<RawSnapshot> {
        let mut snapshot = RawSnapshot::new();
        for &season in seasons {
            snapshot.insert(season, self.load_season(season)?);
        }
        Ok(snapshot)
    }

    pub fn stage_settings(&self, staged: &mut StagedWrites, season: u16, settings: &LeagueSettings) -> Result<()> {
        let entry = CacheEntry::new(season, "settings".to_string(), settings);
        staged.stage_json(self.paths.settings_cache(season), &entry)
    }

    pub fn stage_week(&self, staged: &mut StagedWrites, season: u16, week: u32, matchups: &[Matchup]) -> Result<()> {
        let entry = CacheEntry::new(season, format!("week_{}", week), matchups);
        staged.stage_json(self.paths.week_cache(season, week), &entry)
    }
}

fn check_season(path: &std::path::Path, expected: u16, found: u16) -> Result<()> {
    if expected != found {
        return Err(PipelineError::corrupt(
            path,
            format!("entry belongs to season {}, filed under {}", found, expected),
        ));
    }
    Ok(())
}

/// "week_12.json" -> 12
fn parse_week_file(name: &str) -> Option<u32> {
    name.strip_prefix("week_")?.strip_suffix(".json")?.parse().ok()
}
