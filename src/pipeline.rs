// Build coordinator: decides once per run what is stale and rebuilds it in dependency order
// history -> head-to-head -> report data -> preview data, then always renders HTML last

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::api::LeagueSource;
use crate::cache::{RawCache, RawSnapshot, SeasonData};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::h2h::{build_index, HeadToHeadIndex};
use crate::history::build_history;
use crate::leaderboards::build_leaderboards;
use crate::league::{week_status, GameRef, HistoricalGame, MatchupStatus};
use crate::paths::ArtifactPaths;
use crate::preview::{build_preview, PreviewData};
use crate::render::render_site;
use crate::report::build_report;
use crate::store::{read_json_opt, StagedWrites};

/// Everything a run needs, built once per invocation
pub struct Context {
    pub config: Config,
    pub paths: ArtifactPaths,
    pub source: Box<dyn LeagueSource>,
}

impl Context {
    pub fn new(config: Config, source: Box<dyn LeagueSource>) -> Self {
        let paths = ArtifactPaths::new(&config.paths);
        Context { config, paths, source }
    }
}

/// Latest fully processed week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessedMarker {
    pub season: u16,
    pub week: u32,
}

impl ProcessedMarker {
    pub fn game_ref(&self) -> GameRef {
        GameRef { season: self.season, week: self.week }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No head-to-head artifact yet
    Uninitialized,
    /// Head-to-head built, no week processed yet
    Bootstrapped,
    UpToDate,
    /// The league has completed a week past the marker
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Bootstrap,
    Weekly { report_week: u32 },
    Skip,
}

#[derive(Debug)]
pub struct RunSummary {
    pub state: PipelineState,
    pub pass: PassKind,
    pub written: Vec<PathBuf>,
    pub pages: Vec<&'static str>,
}

/// Pipeline state from what is on disk and what the league reports
pub fn classify(h2h_present: bool, marker: Option<ProcessedMarker>, live: GameRef) -> PipelineState {
    if !h2h_present {
        return PipelineState::Uninitialized;
    }
    if live.week == 0 {
        return PipelineState::UpToDate;
    }
    match marker {
        None => PipelineState::Bootstrapped,
        Some(m) if m.game_ref() >= live => PipelineState::UpToDate,
        Some(_) => PipelineState::Stale,
    }
}

/// What this run does for a given state
pub fn plan(state: PipelineState, force_refresh: bool, live: GameRef) -> PassKind {
    match state {
        PipelineState::Uninitialized => PassKind::Bootstrap,
        _ if live.week == 0 => PassKind::Skip,
        PipelineState::Bootstrapped | PipelineState::Stale => PassKind::Weekly { report_week: live.week },
        PipelineState::UpToDate if force_refresh => PassKind::Weekly { report_week: live.week },
        PipelineState::UpToDate => PassKind::Skip,
    }
}

/// One full invocation: assess, rebuild what is stale, render
pub fn run(ctx: &Context, force_refresh: bool) -> Result<RunSummary> {
    let season = ctx.config.league.current_season;

    let (state, pass) = if !ctx.paths.h2h().exists() {
        info!("No head-to-head records at {}, bootstrapping", ctx.paths.h2h().display());
        (PipelineState::Uninitialized, PassKind::Bootstrap)
    } else {
        let marker: Option<ProcessedMarker> = read_json_opt(&ctx.paths.marker())?;
        let latest = ctx.source.latest_completed_week(season)?;
        let live = GameRef { season, week: latest };
        let state = classify(true, marker, live);
        info!(
            "State {:?}: live {}, processed {}",
            state,
            live,
            marker.map_or_else(|| "nothing".to_string(), |m| m.game_ref().to_string())
        );
        (state, plan(state, force_refresh, live))
    };

    let written = match pass {
        PassKind::Bootstrap => bootstrap(ctx)?,
        PassKind::Weekly { report_week } => weekly(ctx, report_week, force_refresh)?,
        PassKind::Skip => {
            if force_refresh {
                warn!("Nothing to refresh before week 1 completes");
            }
            info!("Data is up to date, skipping regeneration");
            Vec::new()
        }
    };

    let pages = render_site(&ctx.paths)?;

    Ok(RunSummary { state, pass, written, pages })
}

fn progress_bar(len: u64, season: u16) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} weeks")
            .progress_chars("#>-"),
    );
    pb.set_message(season.to_string());
    pb
}

/// Bring one season's cache up to its last final week, fetching only what is missing.
/// Nothing past the first unfinished week is fetched.
fn fill_season(
    ctx: &Context,
    cache: &RawCache,
    season: u16,
    data: &mut SeasonData,
    staged: &mut StagedWrites,
) -> Result<()> {
    let settings = match &data.settings {
        Some(s) => s.clone(),
        None => {
            let fetched = ctx.source.settings(season)?;
            cache.stage_settings(staged, season, &fetched)?;
            data.settings = Some(fetched.clone());
            fetched
        }
    };

    let total = settings.total_weeks();
    let pb = progress_bar(total as u64, season);
    for week in 1..=total {
        let cached = data
            .weeks
            .get(&week)
            .map_or(false, |m| week_status(m) == MatchupStatus::Complete);
        if !cached {
            let matchups = ctx.source.week_matchups(season, week)?;
            if week_status(&matchups) != MatchupStatus::Complete {
                debug!("{} week {} is not final, stopping", season, week);
                break;
            }
            cache.stage_week(staged, season, week, &matchups)?;
            data.weeks.insert(week, matchups);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

/// Full historical rebuild: every tracked season into the cache, then history and head-to-head.
/// Cached complete weeks are reused.
fn bootstrap(ctx: &Context) -> Result<Vec<PathBuf>> {
    let cache = RawCache::new(&ctx.paths);
    let seasons = ctx.config.tracked_seasons();
    let mut snapshot = cache.load_all(&seasons)?;
    let mut staged = StagedWrites::new();

    for &season in &seasons {
        fill_season(ctx, &cache, season, snapshot.entry(season).or_default(), &mut staged)?;
    }

    let (history, _) = rebuild_history(ctx, &snapshot, &mut staged)?;
    info!("Bootstrap built {} games across {} seasons", history.len(), seasons.len());

    staged.commit()
}

/// Historical record and head-to-head index from a snapshot, both staged
fn rebuild_history(
    ctx: &Context,
    snapshot: &RawSnapshot,
    staged: &mut StagedWrites,
) -> Result<(Vec<HistoricalGame>, HeadToHeadIndex)> {
    let history = build_history(snapshot, &ctx.config.managers, &ctx.paths)?;
    let index = build_index(&history);
    staged.stage_json(ctx.paths.history(), &history)?;
    staged.stage_json(ctx.paths.h2h(), &index)?;
    Ok((history, index))
}

/// Refresh the current season up to `report_week`, rebuild every derived artifact,
/// assemble report and preview data, and move the marker.
fn weekly(ctx: &Context, report_week: u32, force_refresh: bool) -> Result<Vec<PathBuf>> {
    let season = ctx.config.league.current_season;
    let cache = RawCache::new(&ctx.paths);
    let seasons = ctx.config.tracked_seasons();
    let mut snapshot = cache.load_all(&seasons)?;
    let mut staged = StagedWrites::new();

    // Past seasons are complete; a season tracked after bootstrap has no cache yet
    for &past in seasons.iter().filter(|&&s| s != season) {
        let data = snapshot.entry(past).or_default();
        if data.settings.is_none() {
            warn!("Season {} has no cached data, fetching it", past);
        }
        fill_season(ctx, &cache, past, data, &mut staged)?;
    }

    let settings = ctx.source.settings(season)?;
    cache.stage_settings(&mut staged, season, &settings)?;
    let total_weeks = settings.total_weeks();
    let data = snapshot.entry(season).or_default();
    data.settings = Some(settings);

    let mut fetched = 0;
    for week in 1..=report_week {
        let cached = data
            .weeks
            .get(&week)
            .map_or(false, |m| week_status(m) == MatchupStatus::Complete);
        // The latest week is always re-fetched to pick up stat corrections
        if cached && !force_refresh && week != report_week {
            continue;
        }
        let matchups = ctx.source.week_matchups(season, week)?;
        if week_status(&matchups) != MatchupStatus::Complete {
            return Err(PipelineError::fetch(
                format!("{} week {}", season, week),
                "reported complete but matchups are not final",
            ));
        }
        cache.stage_week(&mut staged, season, week, &matchups)?;
        data.weeks.insert(week, matchups);
        fetched += 1;
    }
    info!("Fetched {} weeks of {}", fetched, season);

    let (history, index) = rebuild_history(ctx, &snapshot, &mut staged)?;

    let report = build_report(&history, season, report_week);
    staged.stage_json(ctx.paths.accolade_counts(), &report.counts)?;
    staged.stage_json(ctx.paths.all_time_records(), &report.all_time)?;
    staged.stage_json(ctx.paths.report(), &report.data)?;

    let boards = build_leaderboards(season, report_week, &history, &index, &report.counts, &report.all_time);
    staged.stage_json(ctx.paths.leaderboards(), &boards)?;

    let preview_week = report_week + 1;
    let preview = if report_week >= total_weeks {
        info!("Season {} ended with week {}, nothing to preview", season, report_week);
        PreviewData { season, week: preview_week, matchups: Vec::new() }
    } else {
        let standings = ctx.source.standings(season)?;
        let upcoming = ctx.source.week_matchups(season, preview_week)?;
        build_preview(season, preview_week, &standings, &upcoming, &index, &ctx.config.managers)?
    };
    staged.stage_json(ctx.paths.preview(), &preview)?;

    staged.stage_json(ctx.paths.marker(), &ProcessedMarker { season, week: report_week })?;

    staged.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeasonEntry;
    use crate::league::{LeagueSettings, Manager, Matchup, StandingsEntry, TeamResult};
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    const MANAGERS: [&str; 4] = ["Ann", "Bob", "Cat", "Dan"];

    /// In-memory league: records every call and can fail a chosen one
    #[derive(Default)]
    struct Script {
        current_season: u16,
        latest: u32,
        calls: Vec<String>,
        fail_on: Option<String>,
    }

    #[derive(Clone)]
    struct ScriptedSource(Rc<RefCell<Script>>);

    impl ScriptedSource {
        fn new(current_season: u16, latest: u32) -> Self {
            ScriptedSource(Rc::new(RefCell::new(Script {
                current_season,
                latest,
                ..Script::default()
            })))
        }

        fn set_latest(&self, week: u32) {
            self.0.borrow_mut().latest = week;
        }

        fn fail_on(&self, call: Option<&str>) {
            self.0.borrow_mut().fail_on = call.map(str::to_string);
        }

        fn take_calls(&self) -> Vec<String> {
            std::mem::take(&mut self.0.borrow_mut().calls)
        }

        fn record(&self, call: String) -> Result<()> {
            let mut script = self.0.borrow_mut();
            if script.fail_on.as_deref() == Some(call.as_str()) {
                return Err(PipelineError::fetch(call, "connection reset"));
            }
            script.calls.push(call);
            Ok(())
        }
    }

    fn settings() -> LeagueSettings {
        LeagueSettings { playoff_start_week: 4, num_playoff_teams: 4 }
    }

    fn side(i: usize, points: f64) -> TeamResult {
        TeamResult {
            team_key: format!("t{}", i),
            name: format!("Team {}", MANAGERS[i]),
            points,
            managers: vec![Manager { nickname: MANAGERS[i].to_string() }],
        }
    }

    fn week_games(season: u16, week: u32, status: MatchupStatus) -> Vec<Matchup> {
        let pairs = match week % 3 {
            1 => [(0, 1), (2, 3)],
            2 => [(0, 2), (1, 3)],
            _ => [(0, 3), (1, 2)],
        };
        let done = status == MatchupStatus::Complete;
        pairs
            .iter()
            .map(|&(a, b)| {
                let score = |i: usize| {
                    if done {
                        80.0 + ((i as u32 * 17 + week * 11 + season as u32) % 60) as f64
                    } else {
                        0.0
                    }
                };
                let (pa, pb) = (score(a), score(b));
                Matchup {
                    week,
                    status,
                    is_playoffs: week >= settings().playoff_start_week,
                    is_consolation: false,
                    is_tied: false,
                    winner_team_key: if done && pa != pb {
                        Some(format!("t{}", if pa > pb { a } else { b }))
                    } else {
                        None
                    },
                    teams: vec![side(a, pa), side(b, pb)],
                }
            })
            .collect()
    }

    impl LeagueSource for ScriptedSource {
        fn settings(&self, season: u16) -> Result<LeagueSettings> {
            self.record(format!("settings {}", season))?;
            Ok(settings())
        }

        fn latest_completed_week(&self, season: u16) -> Result<u32> {
            self.record(format!("status {}", season))?;
            Ok(self.0.borrow().latest)
        }

        fn week_matchups(&self, season: u16, week: u32) -> Result<Vec<Matchup>> {
            self.record(format!("week {}/{}", season, week))?;
            let (current, latest) = {
                let s = self.0.borrow();
                (s.current_season, s.latest)
            };
            if week > settings().total_weeks() {
                return Ok(Vec::new());
            }
            let status = if season == current && week > latest {
                MatchupStatus::Scheduled
            } else {
                MatchupStatus::Complete
            };
            Ok(week_games(season, week, status))
        }

        fn standings(&self, season: u16) -> Result<Vec<StandingsEntry>> {
            self.record(format!("standings {}", season))?;
            Ok(MANAGERS
                .iter()
                .enumerate()
                .map(|(i, m)| StandingsEntry {
                    team_key: format!("t{}", i),
                    name: format!("Team {}", m),
                    manager: m.to_string(),
                    rank: i as u32 + 1,
                    wins: 3 - i as u32,
                    losses: i as u32,
                    ties: 0,
                })
                .collect())
        }
    }

    fn context(root: &Path, source: &ScriptedSource) -> Context {
        let mut config = Config::default();
        config.paths.data_dir = root.join("data");
        config.paths.cache_dir = root.join("cache");
        config.paths.site_dir = root.join("site");
        config.league.current_season = 2024;
        config.league.seasons = vec![
            SeasonEntry { season: 2023, league_id: "423.l.1".to_string() },
            SeasonEntry { season: 2024, league_id: "449.l.1".to_string() },
        ];
        Context::new(config, Box::new(source.clone()))
    }

    /// Every file under `dir` with its bytes
    fn snapshot_dir(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(d) = stack.pop() {
            let Ok(entries) = fs::read_dir(&d) else { continue };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    files.insert(path.clone(), fs::read(&path).unwrap());
                }
            }
        }
        files
    }

    fn week_calls(calls: &[String]) -> Vec<&str> {
        calls.iter().filter(|c| c.starts_with("week ")).map(String::as_str).collect()
    }

    #[test]
    fn test_classify() {
        let live = GameRef { season: 2024, week: 5 };
        let at = |season, week| Some(ProcessedMarker { season, week });
        assert_eq!(classify(false, at(2024, 5), live), PipelineState::Uninitialized);
        assert_eq!(classify(true, None, live), PipelineState::Bootstrapped);
        assert_eq!(classify(true, at(2024, 5), live), PipelineState::UpToDate);
        assert_eq!(classify(true, at(2024, 4), live), PipelineState::Stale);
        assert_eq!(classify(true, at(2023, 17), live), PipelineState::Stale);
        assert_eq!(classify(true, None, GameRef { season: 2024, week: 0 }), PipelineState::UpToDate);
    }

    #[test]
    fn test_plan() {
        let live = GameRef { season: 2024, week: 3 };
        assert_eq!(plan(PipelineState::Uninitialized, true, live), PassKind::Bootstrap);
        assert_eq!(plan(PipelineState::UpToDate, false, live), PassKind::Skip);
        assert_eq!(plan(PipelineState::UpToDate, true, live), PassKind::Weekly { report_week: 3 });
        assert_eq!(plan(PipelineState::Stale, false, live), PassKind::Weekly { report_week: 3 });
        let preseason = GameRef { season: 2024, week: 0 };
        assert_eq!(plan(PipelineState::UpToDate, true, preseason), PassKind::Skip);
    }

    #[test]
    fn test_first_run_only_bootstraps() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let ctx = context(dir.path(), &source);

        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.state, PipelineState::Uninitialized);
        assert_eq!(summary.pass, PassKind::Bootstrap);
        assert!(ctx.paths.h2h().exists());
        assert!(ctx.paths.history().exists());
        assert!(!ctx.paths.marker().exists());
        assert!(!ctx.paths.report().exists());
        assert!(ctx.paths.page("index.html").exists());

        let calls = source.take_calls();
        assert!(!calls.iter().any(|c| c.starts_with("standings") || c.starts_with("status")));
        // 2023 is complete, 2024 stops at the first unfinished week
        assert_eq!(week_calls(&calls).len(), 5 + 3);
        assert!(!ctx.paths.week_cache(2024, 3).exists());
    }

    #[test]
    fn test_weekly_pass_then_idempotent_noop() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let ctx = context(dir.path(), &source);
        run(&ctx, false).unwrap();
        source.take_calls();

        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.state, PipelineState::Bootstrapped);
        assert_eq!(summary.pass, PassKind::Weekly { report_week: 2 });
        let calls = source.take_calls();
        assert_eq!(week_calls(&calls), vec!["week 2024/2", "week 2024/3"]);
        let marker: ProcessedMarker = crate::store::read_json(&ctx.paths.marker()).unwrap();
        assert_eq!(marker, ProcessedMarker { season: 2024, week: 2 });
        assert!(ctx.paths.page("weekly_report.html").exists());
        assert!(ctx.paths.page("weekly_preview.html").exists());
        assert!(ctx.paths.page("leaderboards.html").exists());

        let before = snapshot_dir(dir.path());
        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.state, PipelineState::UpToDate);
        assert_eq!(summary.pass, PassKind::Skip);
        assert!(summary.written.is_empty());
        assert_eq!(source.take_calls(), vec!["status 2024".to_string()]);
        assert_eq!(snapshot_dir(dir.path()), before);
    }

    #[test]
    fn test_stale_refreshes_only_new_weeks() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let ctx = context(dir.path(), &source);
        run(&ctx, false).unwrap();
        run(&ctx, false).unwrap();
        source.take_calls();

        source.set_latest(3);
        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.state, PipelineState::Stale);
        let calls = source.take_calls();
        assert_eq!(week_calls(&calls), vec!["week 2024/3", "week 2024/4"]);
        let marker: ProcessedMarker = crate::store::read_json(&ctx.paths.marker()).unwrap();
        assert_eq!(marker.week, 3);

        let report: crate::report::ReportCardData = crate::store::read_json(&ctx.paths.report()).unwrap();
        assert_eq!(report.week, 3);
        assert_eq!(report.rows.len(), 4);
    }

    #[test]
    fn test_force_refresh_refetches_every_week() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let ctx = context(dir.path(), &source);
        run(&ctx, false).unwrap();
        run(&ctx, false).unwrap();
        let report_before = fs::read(ctx.paths.report()).unwrap();
        source.take_calls();

        let summary = run(&ctx, true).unwrap();
        assert_eq!(summary.state, PipelineState::UpToDate);
        assert_eq!(summary.pass, PassKind::Weekly { report_week: 2 });
        let calls = source.take_calls();
        assert_eq!(week_calls(&calls), vec!["week 2024/1", "week 2024/2", "week 2024/3"]);
        assert_eq!(fs::read(ctx.paths.report()).unwrap(), report_before);
    }

    #[test]
    fn test_final_week_publishes_without_next_week() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 5);
        let ctx = context(dir.path(), &source);
        run(&ctx, false).unwrap();
        source.take_calls();

        // A source that rejects weeks past the championship
        source.fail_on(Some("week 2024/6"));
        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.pass, PassKind::Weekly { report_week: 5 });
        let calls = source.take_calls();
        assert_eq!(week_calls(&calls), vec!["week 2024/5"]);
        assert!(!calls.iter().any(|c| c.starts_with("standings")));

        let marker: ProcessedMarker = crate::store::read_json(&ctx.paths.marker()).unwrap();
        assert_eq!(marker, ProcessedMarker { season: 2024, week: 5 });
        let preview: PreviewData = crate::store::read_json(&ctx.paths.preview()).unwrap();
        assert_eq!(preview.week, 6);
        assert!(preview.matchups.is_empty());

        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.pass, PassKind::Skip);
    }

    #[test]
    fn test_newly_tracked_season_is_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let mut ctx = context(dir.path(), &source);
        ctx.config.league.seasons.retain(|s| s.season == 2024);
        run(&ctx, false).unwrap();
        run(&ctx, false).unwrap();
        assert!(!ctx.paths.settings_cache(2023).exists());
        source.take_calls();

        // 2023 added to the config after bootstrap
        let ctx = context(dir.path(), &source);
        source.set_latest(3);
        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.state, PipelineState::Stale);
        let calls = source.take_calls();
        assert!(calls.contains(&"settings 2023".to_string()));
        assert_eq!(week_calls(&calls).iter().filter(|c| c.starts_with("week 2023/")).count(), 5);
        assert!(ctx.paths.week_cache(2023, 5).exists());

        let history: Vec<HistoricalGame> = crate::store::read_json(&ctx.paths.history()).unwrap();
        assert_eq!(history.iter().filter(|g| g.season == 2023).count(), 10);

        // Once cached, the season costs no further fetches
        source.set_latest(4);
        run(&ctx, false).unwrap();
        let calls = source.take_calls();
        assert!(!calls.iter().any(|c| c.contains("2023")));
    }

    #[test]
    fn test_failed_fetch_leaves_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let ctx = context(dir.path(), &source);
        run(&ctx, false).unwrap();
        run(&ctx, false).unwrap();
        let before = snapshot_dir(dir.path());

        // Week 3 is fetched fine, then standings fail
        source.set_latest(3);
        source.fail_on(Some("standings 2024"));
        let err = run(&ctx, false).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(snapshot_dir(dir.path()), before);
        assert!(!ctx.paths.week_cache(2024, 3).exists());

        source.fail_on(None);
        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.state, PipelineState::Stale);
        assert!(ctx.paths.week_cache(2024, 3).exists());
    }

    #[test]
    fn test_missing_h2h_bootstraps_once() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let ctx = context(dir.path(), &source);
        run(&ctx, false).unwrap();
        run(&ctx, false).unwrap();
        let h2h_before = fs::read(ctx.paths.h2h()).unwrap();
        fs::remove_file(ctx.paths.h2h()).unwrap();
        source.take_calls();

        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.pass, PassKind::Bootstrap);
        let calls = source.take_calls();
        assert!(!calls.iter().any(|c| c.starts_with("standings") || c.starts_with("status")));
        assert_eq!(fs::read(ctx.paths.h2h()).unwrap(), h2h_before);

        let summary = run(&ctx, false).unwrap();
        assert_eq!(summary.state, PipelineState::UpToDate);
        assert_eq!(summary.pass, PassKind::Skip);
    }

    #[test]
    fn test_corrupt_marker_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(2024, 2);
        let ctx = context(dir.path(), &source);
        run(&ctx, false).unwrap();
        fs::write(ctx.paths.marker(), "{\"season\": 2024").unwrap();

        let err = run(&ctx, false).unwrap_err();
        assert!(matches!(err, PipelineError::Corrupt { .. }));
    }

    #[test]
    fn test_context_uses_configured_paths() {
        let source = ScriptedSource::new(2024, 0);
        let ctx = context(Path::new("/srv/league"), &source);
        assert_eq!(ctx.paths.h2h(), ArtifactPaths::under(Path::new("/srv/league")).h2h());
    }
}
