// This module builds the head-to-head index from the historical record
// Every entry is recomputed from scratch, never patched, so it always matches the record it came from

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::league::{format_record, GameRef, GameType, HistoricalGame};

/// Win/loss/tie counts from one manager's point of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Tally {
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Same games seen from the opponent's side
    pub fn flipped(&self) -> Tally {
        Tally {
            wins: self.losses,
            losses: self.wins,
            ties: self.ties,
        }
    }

    pub fn display(&self) -> String {
        format_record(self.wins, self.losses, self.ties)
    }

    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
    }
}

/// Result of a game for the first manager of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

/// One game between the pair, kept for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecap {
    pub season: u16,
    pub week: u32,
    pub game_type: GameType,
    pub winner: Option<String>,
}

impl GameRecap {
    /// "SF'23" for playoff games, "Wk4'23" otherwise
    pub fn short_label(&self) -> String {
        let game_ref = GameRef { season: self.season, week: self.week };
        if self.game_type.is_playoff() {
            format!("{}'{}", self.game_type, game_ref.season_short())
        } else {
            game_ref.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongestStreak {
    pub holder: String,
    pub length: u32,
    pub start: GameRef,
    pub end: GameRef,
}

/// Aggregated record between one unordered pair of managers.
/// Tallies and the signed streak are from `manager1`'s perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadEntry {
    pub manager1: String,
    pub manager2: String,
    pub regular: Tally,
    pub playoffs: Tally,
    /// Positive: manager1's run, negative: manager2's run, 0: no streak
    pub streak: i32,
    pub streak_holder: Option<String>,
    pub longest_streak: Option<LongestStreak>,
    pub regular_history: Vec<GameRecap>,
    pub playoff_history: Vec<GameRecap>,
    pub last_game: GameRef,
}

impl HeadToHeadEntry {
    pub fn total_games(&self) -> u32 {
        self.regular.total() + self.playoffs.total()
    }

    pub fn streak_len(&self) -> u32 {
        self.streak.unsigned_abs()
    }

    /// (regular, playoff) tallies as seen by `manager`
    pub fn tallies_for(&self, manager: &str) -> (Tally, Tally) {
        if manager == self.manager1 {
            (self.regular, self.playoffs)
        } else {
            (self.regular.flipped(), self.playoffs.flipped())
        }
    }

    /// Every game in chronological order
    pub fn games(&self) -> Vec<&GameRecap> {
        let mut all: Vec<&GameRecap> = self
            .regular_history
            .iter()
            .chain(self.playoff_history.iter())
            .collect();
        all.sort_by_key(|g| (g.season, g.week));
        all
    }
}

pub type HeadToHeadIndex = BTreeMap<String, HeadToHeadEntry>;

/// Order-independent key for a pair of managers
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}-{}", a, b)
    } else {
        format!("{}-{}", b, a)
    }
}

/// Extend a signed streak by one game; a tie resets it to zero
pub fn step_streak(streak: i32, outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Win if streak > 0 => streak + 1,
        Outcome::Win => 1,
        Outcome::Loss if streak < 0 => streak - 1,
        Outcome::Loss => -1,
        Outcome::Tie => 0,
    }
}

/// Signed run length of the most recent identical outcomes
pub fn compute_streak<I: IntoIterator<Item = Outcome>>(outcomes: I) -> i32 {
    outcomes.into_iter().fold(0, step_streak)
}

/// Build the index over every pair that has ever played
pub fn build_index(history: &[HistoricalGame]) -> HeadToHeadIndex {
    let mut by_pair: BTreeMap<String, Vec<&HistoricalGame>> = BTreeMap::new();
    for game in history {
        if game.team1_manager == game.team2_manager {
            debug!("Ignoring self-matchup of {} in {}", game.team1_manager, game.game_ref());
            continue;
        }
        by_pair
            .entry(pair_key(&game.team1_manager, &game.team2_manager))
            .or_default()
            .push(game);
    }

    let index: HeadToHeadIndex = by_pair
        .into_iter()
        .map(|(key, mut games)| {
            games.sort_by_key(|g| (g.season, g.week));
            let entry = build_entry(&games);
            (key, entry)
        })
        .collect();

    info!("Built head-to-head records for {} pairs", index.len());
    index
}

fn build_entry(games: &[&HistoricalGame]) -> HeadToHeadEntry {
    let first = games[0];
    let (manager1, manager2) = if first.team1_manager <= first.team2_manager {
        (first.team1_manager.clone(), first.team2_manager.clone())
    } else {
        (first.team2_manager.clone(), first.team1_manager.clone())
    };

    let mut regular = Tally::default();
    let mut playoffs = Tally::default();
    let mut regular_history = Vec::new();
    let mut playoff_history = Vec::new();
    let mut outcomes = Vec::with_capacity(games.len());

    let mut longest: Option<LongestStreak> = None;
    let mut run_start = first.game_ref();
    let mut running = 0i32;

    for game in games {
        let outcome = match game.winner.as_deref() {
            Some(w) if w == manager1 => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Tie,
        };
        outcomes.push(outcome);

        let recap = GameRecap {
            season: game.season,
            week: game.week,
            game_type: game.game_type,
            winner: game.winner.clone(),
        };
        if game.game_type.is_playoff() {
            playoffs.add(outcome);
            playoff_history.push(recap);
        } else {
            regular.add(outcome);
            regular_history.push(recap);
        }

        running = step_streak(running, outcome);
        if running.unsigned_abs() == 1 {
            run_start = game.game_ref();
        }

        let length = running.unsigned_abs();
        if length > longest.as_ref().map_or(0, |l| l.length) {
            let holder = if running > 0 { &manager1 } else { &manager2 };
            longest = Some(LongestStreak {
                holder: holder.clone(),
                length,
                start: run_start,
                end: game.game_ref(),
            });
        }
    }

    let streak = compute_streak(outcomes);
    let streak_holder = match streak.signum() {
        1 => Some(manager1.clone()),
        -1 => Some(manager2.clone()),
        _ => None,
    };

    HeadToHeadEntry {
        manager1,
        manager2,
        regular,
        playoffs,
        streak,
        streak_holder,
        longest_streak: longest,
        regular_history,
        playoff_history,
        last_game: games[games.len() - 1].game_ref(),
    }
}
