// On-disk layout of artifacts, cache entries and rendered pages
// Every file the pipeline reads or writes is named here

use std::path::{Path, PathBuf};

use crate::config::PathSettings;

pub const HISTORY_FILE: &str = "historical_data.json";
pub const H2H_FILE: &str = "h2h_records.json";
pub const REPORT_FILE: &str = "report_card_data.json";
pub const PREVIEW_FILE: &str = "preview_data.json";
pub const ACCOLADE_COUNTS_FILE: &str = "accolade_counts.json";
pub const ALL_TIME_FILE: &str = "all_time_records.json";
pub const LEADERBOARDS_FILE: &str = "leaderboards.json";
pub const MARKER_FILE: &str = "last_processed.json";

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    data_dir: PathBuf,
    cache_dir: PathBuf,
    site_dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(settings: &PathSettings) -> Self {
        ArtifactPaths {
            data_dir: settings.data_dir.clone(),
            cache_dir: settings.cache_dir.clone(),
            site_dir: settings.site_dir.clone(),
        }
    }

    /// All three directories under one root (tests and ad-hoc runs)
    pub fn under(root: &Path) -> Self {
        ArtifactPaths {
            data_dir: root.join("data"),
            cache_dir: root.join("cache"),
            site_dir: root.join("site"),
        }
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    pub fn history(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn h2h(&self) -> PathBuf {
        self.data_dir.join(H2H_FILE)
    }

    pub fn report(&self) -> PathBuf {
        self.data_dir.join(REPORT_FILE)
    }

    pub fn preview(&self) -> PathBuf {
        self.data_dir.join(PREVIEW_FILE)
    }

    pub fn accolade_counts(&self) -> PathBuf {
        self.data_dir.join(ACCOLADE_COUNTS_FILE)
    }

    pub fn all_time_records(&self) -> PathBuf {
        self.data_dir.join(ALL_TIME_FILE)
    }

    pub fn leaderboards(&self) -> PathBuf {
        self.data_dir.join(LEADERBOARDS_FILE)
    }

    pub fn marker(&self) -> PathBuf {
        self.data_dir.join(MARKER_FILE)
    }

    pub fn season_cache(&self, season: u16) -> PathBuf {
        self.cache_dir.join(season.to_string())
    }

    pub fn settings_cache(&self, season: u16) -> PathBuf {
        self.season_cache(season).join("settings.json")
    }

    pub fn week_cache(&self, season: u16, week: u32) -> PathBuf {
        self.season_cache(season).join(format!("week_{}.json", week))
    }

    pub fn page(&self, name: &str) -> PathBuf {
        self.site_dir.join(name)
    }
}
