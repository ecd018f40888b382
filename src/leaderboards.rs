// This module builds the all-time leaderboards: head-to-head streaks and dominance,
// career records by game type, and accolade tallies per season and overall

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::accolades::{AccoladeCounts, AccoladeKind, AccoladeRecord, AllTimeRecords};
use crate::h2h::{HeadToHeadIndex, Outcome, Tally};
use crate::league::{GameType, HistoricalGame};

pub const STREAK_ROWS: usize = 15;
pub const PAIR_ROWS: usize = 10;
pub const PLAYOFF_PAIR_ROWS: usize = 5;
/// Regular-season wins a pairing needs to appear on the win % board
pub const MIN_PAIR_WINS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakRow {
    pub winner: String,
    pub loser: String,
    pub length: u32,
    /// Still running as of the pair's latest meeting
    pub active: bool,
    /// "Wk3'22 - Wk9'23"
    pub range: String,
}

/// One manager's record against one opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRow {
    pub manager: String,
    pub opponent: String,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub manager: String,
    pub record: String,
    pub games: u32,
    pub win_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccoladeLeaders {
    pub kind: AccoladeKind,
    pub title: String,
    /// Everyone tied on the top count, alphabetical
    pub leaders: Vec<String>,
    pub count: u32,
    pub record: Option<AccoladeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonAccolades {
    pub season: u16,
    pub leaders: Vec<AccoladeLeaders>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardData {
    pub season: u16,
    pub week: u32,
    pub streaks: Vec<StreakRow>,
    pub pair_win_pct: Vec<PairRow>,
    pub pair_most_wins: Vec<PairRow>,
    pub playoff_most_wins: Vec<PairRow>,
    pub regular_records: Vec<RecordRow>,
    pub playoff_records: Vec<RecordRow>,
    pub all_time_accolades: Vec<AccoladeLeaders>,
    pub season_accolades: Vec<SeasonAccolades>,
}

fn pct(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64
    }
}

/// Longest run each pair has ever produced, longest first
pub fn streak_board(index: &HeadToHeadIndex) -> Vec<StreakRow> {
    let mut rows: Vec<StreakRow> = index
        .values()
        .filter_map(|entry| {
            let longest = entry.longest_streak.as_ref()?;
            let loser = if longest.holder == entry.manager1 { &entry.manager2 } else { &entry.manager1 };
            Some(StreakRow {
                winner: longest.holder.clone(),
                loser: loser.clone(),
                length: longest.length,
                active: longest.end == entry.last_game,
                range: format!("{} - {}", longest.start, longest.end),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.length
            .cmp(&a.length)
            .then_with(|| b.active.cmp(&a.active))
            .then_with(|| a.winner.cmp(&b.winner))
            .then_with(|| a.loser.cmp(&b.loser))
    });
    rows.truncate(STREAK_ROWS);
    rows
}

fn pair_row(manager: &str, opponent: &str, tally: Tally) -> PairRow {
    PairRow {
        manager: manager.to_string(),
        opponent: opponent.to_string(),
        wins: tally.wins,
        losses: tally.losses,
        win_pct: pct(tally.wins, tally.wins + tally.losses),
    }
}

fn by_name(a: &PairRow, b: &PairRow) -> std::cmp::Ordering {
    a.manager.cmp(&b.manager).then_with(|| a.opponent.cmp(&b.opponent))
}

/// (regular win %, most regular wins, most playoff wins), every pairing seen from both sides
pub fn pair_boards(index: &HeadToHeadIndex) -> (Vec<PairRow>, Vec<PairRow>, Vec<PairRow>) {
    let mut regular = Vec::with_capacity(index.len() * 2);
    let mut playoffs = Vec::with_capacity(index.len() * 2);
    for entry in index.values() {
        for (me, them) in [(&entry.manager1, &entry.manager2), (&entry.manager2, &entry.manager1)] {
            let (reg, post) = entry.tallies_for(me);
            regular.push(pair_row(me, them, reg));
            playoffs.push(pair_row(me, them, post));
        }
    }

    let mut win_pct: Vec<PairRow> = regular
        .iter()
        .filter(|r| r.wins >= MIN_PAIR_WINS)
        .cloned()
        .collect();
    win_pct.sort_by(|a, b| {
        b.win_pct
            .total_cmp(&a.win_pct)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| by_name(a, b))
    });
    win_pct.truncate(PAIR_ROWS);

    let mut most_wins: Vec<PairRow> = regular.into_iter().filter(|r| r.wins > 0).collect();
    most_wins.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.win_pct.total_cmp(&a.win_pct))
            .then_with(|| by_name(a, b))
    });
    most_wins.truncate(PAIR_ROWS);

    let mut playoff_wins: Vec<PairRow> = playoffs.into_iter().filter(|r| r.wins > 0).collect();
    playoff_wins.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| by_name(a, b)));
    playoff_wins.truncate(PLAYOFF_PAIR_ROWS);

    (win_pct, most_wins, playoff_wins)
}

fn record_rows(tallies: &FnvHashMap<&str, Tally>) -> Vec<RecordRow> {
    let mut rows: Vec<(&str, Tally)> = tallies
        .iter()
        .filter(|(_, t)| t.total() > 0)
        .map(|(m, t)| (*m, *t))
        .collect();
    rows.sort_by(|(ma, a), (mb, b)| {
        pct(b.wins, b.total())
            .total_cmp(&pct(a.wins, a.total()))
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| ma.cmp(mb))
    });
    rows.into_iter()
        .map(|(manager, t)| RecordRow {
            manager: manager.to_string(),
            record: t.display(),
            games: t.total(),
            win_pct: pct(t.wins, t.total()),
        })
        .collect()
}

/// Career (regular season, playoff) records; consolation games count toward neither
pub fn career_records(history: &[HistoricalGame]) -> (Vec<RecordRow>, Vec<RecordRow>) {
    let mut regular: FnvHashMap<&str, Tally> = FnvHashMap::default();
    let mut playoffs: FnvHashMap<&str, Tally> = FnvHashMap::default();

    for game in history {
        let table = match game.game_type {
            GameType::Regular => &mut regular,
            GameType::Consolation => continue,
            _ => &mut playoffs,
        };
        let (first, second) = match game.winner.as_deref() {
            None => (Outcome::Tie, Outcome::Tie),
            Some(w) if w == game.team1_manager => (Outcome::Win, Outcome::Loss),
            Some(_) => (Outcome::Loss, Outcome::Win),
        };
        table.entry(game.team1_manager.as_str()).or_default().add(first);
        table.entry(game.team2_manager.as_str()).or_default().add(second);
    }

    (record_rows(&regular), record_rows(&playoffs))
}

fn kind_leaders(
    by_manager: &BTreeMap<String, BTreeMap<AccoladeKind, u32>>,
    records: Option<&AllTimeRecords>,
) -> Vec<AccoladeLeaders> {
    AccoladeKind::ALL
        .iter()
        .filter_map(|&kind| {
            let count = by_manager.values().filter_map(|k| k.get(&kind)).copied().max()?;
            let leaders = by_manager
                .iter()
                .filter(|(_, k)| k.get(&kind) == Some(&count))
                .map(|(m, _)| m.clone())
                .collect();
            Some(AccoladeLeaders {
                kind,
                title: kind.title().to_string(),
                leaders,
                count,
                record: records.and_then(|r| r.get(&kind)).cloned(),
            })
        })
        .collect()
}

/// (all-time leaders with the standing record per kind, per-season leaders newest first)
pub fn accolade_boards(counts: &AccoladeCounts, records: &AllTimeRecords) -> (Vec<AccoladeLeaders>, Vec<SeasonAccolades>) {
    let mut totals: BTreeMap<String, BTreeMap<AccoladeKind, u32>> = BTreeMap::new();
    for by_manager in counts.values() {
        for (manager, by_kind) in by_manager {
            let slot = totals.entry(manager.clone()).or_default();
            for (&kind, &n) in by_kind {
                *slot.entry(kind).or_insert(0) += n;
            }
        }
    }

    let seasons = counts
        .iter()
        .rev()
        .map(|(&season, by_manager)| SeasonAccolades {
            season,
            leaders: kind_leaders(by_manager, None),
        })
        .collect();

    (kind_leaders(&totals, Some(records)), seasons)
}

pub fn build_leaderboards(
    season: u16,
    week: u32,
    history: &[HistoricalGame],
    index: &HeadToHeadIndex,
    counts: &AccoladeCounts,
    records: &AllTimeRecords,
) -> LeaderboardData {
    let streaks = streak_board(index);
    let (pair_win_pct, pair_most_wins, playoff_most_wins) = pair_boards(index);
    let (regular_records, playoff_records) = career_records(history);
    let (all_time_accolades, season_accolades) = accolade_boards(counts, records);

    info!(
        "Leaderboards through week {} of {}: {} streaks, {} managers",
        week,
        season,
        streaks.len(),
        regular_records.len()
    );

    LeaderboardData {
        season,
        week,
        streaks,
        pair_win_pct,
        pair_most_wins,
        playoff_most_wins,
        regular_records,
        playoff_records,
        all_time_accolades,
        season_accolades,
    }
}
