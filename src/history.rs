// History builder: turns cached raw season data into the normalized historical record
// Pure over its input; identical cache contents always give identical output

use fnv::FnvHashMap;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::cache::{RawSnapshot, SeasonData};
use crate::config::ManagerSettings;
use crate::error::{PipelineError, Result};
use crate::league::{week_status, GameType, HistoricalGame, LeagueSettings, Matchup, MatchupStatus};
use crate::paths::ArtifactPaths;

/// Build the historical record for every season in the snapshot, oldest first.
/// `paths` is only used to name the offending cache file in errors.
pub fn build_history(
    snapshot: &RawSnapshot,
    managers: &ManagerSettings,
    paths: &ArtifactPaths,
) -> Result<Vec<HistoricalGame>> {
    let mut games = Vec::new();
    for (&season, data) in snapshot {
        let season_games = build_season(season, data, managers, paths)?;
        info!("Season {}: {} games", season, season_games.len());
        games.extend(season_games);
    }
    Ok(games)
}

/// A raw matchup with managers resolved
struct Resolved {
    manager1: String,
    manager2: String,
    score1: f64,
    score2: f64,
    winner: Option<String>,
    is_playoffs: bool,
    is_consolation: bool,
}

fn build_season(
    season: u16,
    data: &SeasonData,
    managers: &ManagerSettings,
    paths: &ArtifactPaths,
) -> Result<Vec<HistoricalGame>> {
    let completed: Vec<(u32, &Vec<Matchup>)> = data
        .weeks
        .iter()
        .filter(|(week, matchups)| {
            let done = week_status(matchups) == MatchupStatus::Complete;
            if !done {
                debug!("Skipping {} week {} (not final)", season, week);
            }
            done
        })
        .map(|(week, matchups)| (*week, matchups))
        .collect();

    // An empty season is fine, it just hasn't been played yet
    if completed.is_empty() {
        return Ok(Vec::new());
    }

    let settings = data.settings.as_ref().ok_or_else(|| {
        PipelineError::corrupt(
            paths.settings_cache(season),
            "season has cached weeks but no settings entry",
        )
    })?;

    let mut resolved_weeks = Vec::with_capacity(completed.len());
    for (week, matchups) in completed {
        let mut resolved = Vec::with_capacity(matchups.len());
        for matchup in matchups {
            resolved.push(resolve(matchup, managers).map_err(|msg| {
                PipelineError::corrupt(paths.week_cache(season, week), msg)
            })?);
        }
        resolved_weeks.push((week, resolved));
    }

    let byes = bye_seeds(settings, &resolved_weeks);
    let mut bracket = Bracket::new(byes);

    let mut games = Vec::new();
    for (week, matchups) in &resolved_weeks {
        for m in matchups {
            let game_type = bracket.classify(settings, *week, m);
            games.push(HistoricalGame {
                season,
                week: *week,
                game_type,
                team1_manager: m.manager1.clone(),
                team2_manager: m.manager2.clone(),
                team1_score: m.score1,
                team2_score: m.score2,
                winner: m.winner.clone(),
            });
        }
    }
    Ok(games)
}

fn resolve(matchup: &Matchup, managers: &ManagerSettings) -> std::result::Result<Resolved, String> {
    let (a, b) = matchup
        .sides()
        .ok_or_else(|| format!("week {} matchup has {} teams, expected 2", matchup.week, matchup.teams.len()))?;
    let operator = managers.operator.as_deref();
    let name_of = |team: &crate::league::TeamResult| {
        team.primary_manager(operator)
            .map(|n| managers.resolve(n))
            .ok_or_else(|| format!("team {} has no managers", team.team_key))
    };
    let manager1 = name_of(a)?;
    let manager2 = name_of(b)?;
    let winner = matchup.winner().map(|w| {
        if w.team_key == a.team_key {
            manager1.clone()
        } else {
            manager2.clone()
        }
    });
    Ok(Resolved {
        manager1,
        manager2,
        score1: a.points,
        score2: b.points,
        winner,
        is_playoffs: matchup.is_playoffs,
        is_consolation: matchup.is_consolation,
    })
}

/// Top two regular-season managers by wins then points for; only leagues with byes have them
fn bye_seeds(settings: &LeagueSettings, weeks: &[(u32, Vec<Resolved>)]) -> Vec<String> {
    if !settings.has_byes() {
        return Vec::new();
    }

    let mut records: FnvHashMap<&str, (u32, f64)> = FnvHashMap::default();
    for (week, matchups) in weeks {
        if *week >= settings.playoff_start_week {
            continue;
        }
        for m in matchups {
            let r1 = records.entry(&m.manager1).or_insert((0, 0.0));
            r1.1 += m.score1;
            let r2 = records.entry(&m.manager2).or_insert((0, 0.0));
            r2.1 += m.score2;
            if let Some(w) = &m.winner {
                records.entry(w).or_insert((0, 0.0)).0 += 1;
            }
        }
    }

    let mut ranked: Vec<(&str, (u32, f64))> = records.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1 .0
            .cmp(&a.1 .0)
            .then(b.1 .1.total_cmp(&a.1 .1))
            .then(a.0.cmp(b.0))
    });
    ranked.into_iter().take(2).map(|(name, _)| name.to_string()).collect()
}

/// Tracks who advanced through the championship bracket week by week
struct Bracket {
    byes: Vec<String>,
    qf_winners: HashSet<String>,
    sf_winners: HashSet<String>,
    sf_losers: HashSet<String>,
}

impl Bracket {
    fn new(byes: Vec<String>) -> Self {
        Bracket {
            byes,
            qf_winners: HashSet::new(),
            sf_winners: HashSet::new(),
            sf_losers: HashSet::new(),
        }
    }

    fn classify(&mut self, settings: &LeagueSettings, week: u32, m: &Resolved) -> GameType {
        if m.is_consolation {
            return GameType::Consolation;
        }
        if !m.is_playoffs || week < settings.playoff_start_week {
            return GameType::Regular;
        }

        let offset = week - settings.playoff_start_week;
        let both_in = |set: &HashSet<String>| set.contains(&m.manager1) && set.contains(&m.manager2);

        if settings.has_byes() {
            match offset {
                0 => {
                    if let Some(w) = &m.winner {
                        self.qf_winners.insert(w.clone());
                    }
                    GameType::QuarterFinal
                }
                1 => {
                    let alive = |name: &String| self.qf_winners.contains(name) || self.byes.contains(name);
                    if alive(&m.manager1) && alive(&m.manager2) {
                        self.record_semifinal(m);
                        GameType::SemiFinal
                    } else {
                        GameType::Consolation
                    }
                }
                2 if both_in(&self.sf_winners) => GameType::Championship,
                2 if both_in(&self.sf_losers) => GameType::ThirdPlace,
                _ => GameType::Consolation,
            }
        } else {
            match offset {
                0 => {
                    self.record_semifinal(m);
                    GameType::SemiFinal
                }
                1 if both_in(&self.sf_winners) => GameType::Championship,
                1 => GameType::ThirdPlace,
                _ => GameType::Consolation,
            }
        }
    }

    fn record_semifinal(&mut self, m: &Resolved) {
        if let Some(w) = &m.winner {
            let loser = if *w == m.manager1 { &m.manager2 } else { &m.manager1 };
            self.sf_winners.insert(w.clone());
            self.sf_losers.insert(loser.clone());
        }
    }
}
