// This module computes the weekly superlatives and keeps the all-time best value per kind
// A weekly value only breaks an all-time record when it is strictly better

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::league::{GameRef, GameType, HistoricalGame};
use crate::standings::weekly_scores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccoladeKind {
    TopPoints,
    ToughLuck,
    LuckiestWin,
    Heartbreak,
    Blowout,
}

/// Whether a bigger or a smaller value is the better one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Max,
    Min,
}

impl AccoladeKind {
    pub const ALL: [AccoladeKind; 5] = [
        AccoladeKind::TopPoints,
        AccoladeKind::ToughLuck,
        AccoladeKind::LuckiestWin,
        AccoladeKind::Heartbreak,
        AccoladeKind::Blowout,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            AccoladeKind::TopPoints | AccoladeKind::ToughLuck | AccoladeKind::Blowout => Direction::Max,
            AccoladeKind::LuckiestWin | AccoladeKind::Heartbreak => Direction::Min,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AccoladeKind::TopPoints => "Top Points",
            AccoladeKind::ToughLuck => "Tough Luck Loss",
            AccoladeKind::LuckiestWin => "Luckiest Win",
            AccoladeKind::Heartbreak => "Heartbreak Loss",
            AccoladeKind::Blowout => "Biggest Blowout",
        }
    }

    /// Strictly better than the stored value; equal never counts
    pub fn beats(&self, value: f64, stored: f64) -> bool {
        match self.direction() {
            Direction::Max => value > stored,
            Direction::Min => value < stored,
        }
    }
}

impl fmt::Display for AccoladeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Winner of one accolade in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccoladeRecord {
    pub kind: AccoladeKind,
    pub season: u16,
    pub week: u32,
    pub manager: String,
    pub opponent: String,
    pub value: f64,
    #[serde(default)]
    pub record_breaking: bool,
}

/// Best value ever seen per kind
pub type AllTimeRecords = BTreeMap<AccoladeKind, AccoladeRecord>;

/// season -> manager -> kind -> times won
pub type AccoladeCounts = BTreeMap<u16, BTreeMap<String, BTreeMap<AccoladeKind, u32>>>;

/// Games that feed accolades: regular-season only
pub fn eligible(game: &HistoricalGame) -> bool {
    game.game_type == GameType::Regular
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// The week's winners of every kind that applies, none flagged yet.
/// Kinds that need a decided game are absent in an all-tie week.
pub fn weekly_accolades(games: &[&HistoricalGame]) -> Vec<AccoladeRecord> {
    let Some(first) = games.first() else {
        return Vec::new();
    };
    let (season, week) = (first.season, first.week);
    let record = |kind, manager: &str, opponent: &str, value: f64| AccoladeRecord {
        kind,
        season,
        week,
        manager: manager.to_string(),
        opponent: opponent.to_string(),
        value: round2(value),
        record_breaking: false,
    };

    let mut out = Vec::with_capacity(AccoladeKind::ALL.len());
    let scores = weekly_scores(games);

    if let Some(top) = scores.first() {
        out.push(record(AccoladeKind::TopPoints, &top.manager, &top.opponent, top.score));
    }
    // Scores are sorted high to low, so the first loser is the unluckiest
    if let Some(s) = scores.iter().find(|s| s.is_loser()) {
        out.push(record(AccoladeKind::ToughLuck, &s.manager, &s.opponent, s.score));
    }
    if let Some(s) = scores.iter().rev().find(|s| s.is_winner) {
        out.push(record(AccoladeKind::LuckiestWin, &s.manager, &s.opponent, s.score));
    }

    let mut decided: Vec<&HistoricalGame> = games.iter().copied().filter(|g| g.winner.is_some()).collect();
    // Equal margins go to the alphabetically earlier credited manager
    decided.sort_by(|a, b| {
        a.margin()
            .total_cmp(&b.margin())
            .then_with(|| a.loser().cmp(&b.loser()))
    });
    if let Some(g) = decided.first() {
        if let (Some(winner), Some(loser)) = (g.winner.as_deref(), g.loser()) {
            out.push(record(AccoladeKind::Heartbreak, loser, winner, g.margin()));
        }
    }
    let widest = decided.iter().max_by(|a, b| {
        a.margin()
            .total_cmp(&b.margin())
            .then_with(|| b.winner.cmp(&a.winner))
    });
    if let Some(g) = widest {
        if let (Some(winner), Some(loser)) = (g.winner.as_deref(), g.loser()) {
            out.push(record(AccoladeKind::Blowout, winner, loser, g.margin()));
        }
    }

    out
}

/// Compute a week's accolades and fold them into the all-time store
pub fn apply_week(games: &[&HistoricalGame], store: &mut AllTimeRecords) -> Vec<AccoladeRecord> {
    let mut records = weekly_accolades(games);
    for rec in &mut records {
        let stored = store.get(&rec.kind).map(|best| best.value);
        match stored {
            None => {
                store.insert(rec.kind, rec.clone());
            }
            Some(best) if rec.kind.beats(rec.value, best) => {
                debug!("{} record broken by {}: {} (was {})", rec.kind, rec.manager, rec.value, best);
                rec.record_breaking = true;
                store.insert(rec.kind, rec.clone());
            }
            Some(_) => {}
        }
    }
    records
}

/// Eligible games grouped by week, in chronological order
fn weeks_of(history: &[HistoricalGame]) -> BTreeMap<GameRef, Vec<&HistoricalGame>> {
    let mut weeks: BTreeMap<GameRef, Vec<&HistoricalGame>> = BTreeMap::new();
    for game in history.iter().filter(|g| eligible(g)) {
        weeks.entry(game.game_ref()).or_default().push(game);
    }
    weeks
}

/// All-time store as it stood before `before`
pub fn rebuild_store(history: &[HistoricalGame], before: GameRef) -> AllTimeRecords {
    let mut store = AllTimeRecords::new();
    for (_, games) in weeks_of(history).range(..before) {
        apply_week(games, &mut store);
    }
    store
}

/// Accolade wins per season and manager, counting every week up to and including `through`
pub fn tally_counts(history: &[HistoricalGame], through: GameRef) -> AccoladeCounts {
    let mut flat: FnvHashMap<(u16, String, AccoladeKind), u32> = FnvHashMap::default();
    for (game_ref, games) in weeks_of(history).range(..=through) {
        for rec in weekly_accolades(games) {
            *flat.entry((game_ref.season, rec.manager, rec.kind)).or_insert(0) += 1;
        }
    }

    let mut counts = AccoladeCounts::new();
    for ((season, manager, kind), n) in flat {
        counts
            .entry(season)
            .or_default()
            .entry(manager)
            .or_default()
            .insert(kind, n);
    }
    counts
}

/// How many times `manager` has won `kind` in `season`
pub fn count_for(counts: &AccoladeCounts, season: u16, manager: &str, kind: AccoladeKind) -> u32 {
    counts
        .get(&season)
        .and_then(|by_manager| by_manager.get(manager))
        .and_then(|by_kind| by_kind.get(&kind))
        .copied()
        .unwrap_or(0)
}
