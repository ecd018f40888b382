// Standings derived from the historical record: the real table and the alternative universe,
// where every week the top half of scores earns a win

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::league::{format_record, GameType, HistoricalGame};

/// One manager's line in a standings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub rank: u32,
    pub manager: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
}

impl StandingRow {
    pub fn record(&self) -> String {
        format_record(self.wins, self.losses, self.ties)
    }
}

/// A single manager's result in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub manager: String,
    pub score: f64,
    pub opponent: String,
    pub is_winner: bool,
    pub is_tied: bool,
}

impl WeeklyScore {
    pub fn is_loser(&self) -> bool {
        !self.is_winner && !self.is_tied
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    wins: u32,
    losses: u32,
    ties: u32,
    points_for: f64,
}

/// Games of a season's given week, any game type
pub fn games_in_week(history: &[HistoricalGame], season: u16, week: u32) -> Vec<&HistoricalGame> {
    history
        .iter()
        .filter(|g| g.season == season && g.week == week)
        .collect()
}

/// Both sides of each game, highest score first (name breaks score ties)
pub fn weekly_scores(games: &[&HistoricalGame]) -> Vec<WeeklyScore> {
    let mut scores = Vec::with_capacity(games.len() * 2);
    for g in games {
        let tied = g.winner.is_none();
        scores.push(WeeklyScore {
            manager: g.team1_manager.clone(),
            score: g.team1_score,
            opponent: g.team2_manager.clone(),
            is_winner: g.winner.as_deref() == Some(g.team1_manager.as_str()),
            is_tied: tied,
        });
        scores.push(WeeklyScore {
            manager: g.team2_manager.clone(),
            score: g.team2_score,
            opponent: g.team1_manager.clone(),
            is_winner: g.winner.as_deref() == Some(g.team2_manager.as_str()),
            is_tied: tied,
        });
    }
    scores.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.manager.cmp(&b.manager)));
    scores
}

/// Managers in the top half of a sorted weekly score list
pub fn alt_winners(sorted_scores: &[WeeklyScore]) -> Vec<&str> {
    let cutoff = sorted_scores.len() / 2;
    sorted_scores[..cutoff].iter().map(|s| s.manager.as_str()).collect()
}

fn regular_games(history: &[HistoricalGame], season: u16, through_week: u32) -> impl Iterator<Item = &HistoricalGame> {
    history.iter().filter(move |g| {
        g.season == season && g.week <= through_week && g.game_type == GameType::Regular
    })
}

/// Real standings after `through_week`
pub fn real_standings(history: &[HistoricalGame], season: u16, through_week: u32) -> Vec<StandingRow> {
    let mut table: FnvHashMap<String, Accumulator> = FnvHashMap::default();
    for g in regular_games(history, season, through_week) {
        let winner = g.winner.as_deref();
        for (manager, score) in [(&g.team1_manager, g.team1_score), (&g.team2_manager, g.team2_score)] {
            let acc = table.entry(manager.clone()).or_default();
            acc.points_for += score;
            match winner {
                None => acc.ties += 1,
                Some(w) if w == manager => acc.wins += 1,
                Some(_) => acc.losses += 1,
            }
        }
    }
    ranked(table)
}

/// Alternative-universe standings after `through_week`
pub fn alt_standings(history: &[HistoricalGame], season: u16, through_week: u32) -> Vec<StandingRow> {
    let mut by_week: std::collections::BTreeMap<u32, Vec<&HistoricalGame>> = Default::default();
    for g in regular_games(history, season, through_week) {
        by_week.entry(g.week).or_default().push(g);
    }

    let mut table: FnvHashMap<String, Accumulator> = FnvHashMap::default();
    for games in by_week.values() {
        let scores = weekly_scores(games);
        let cutoff = scores.len() / 2;
        for (i, s) in scores.iter().enumerate() {
            let acc = table.entry(s.manager.clone()).or_default();
            acc.points_for += s.score;
            if i < cutoff {
                acc.wins += 1;
            } else {
                acc.losses += 1;
            }
        }
    }
    ranked(table)
}

fn ranked(table: FnvHashMap<String, Accumulator>) -> Vec<StandingRow> {
    let mut rows: Vec<(String, Accumulator)> = table.into_iter().collect();
    rows.sort_by(|(name_a, a), (name_b, b)| {
        b.wins
            .cmp(&a.wins)
            .then(b.points_for.total_cmp(&a.points_for))
            .then_with(|| name_a.cmp(name_b))
    });
    rows.into_iter()
        .enumerate()
        .map(|(i, (manager, acc))| StandingRow {
            rank: i as u32 + 1,
            manager,
            wins: acc.wins,
            losses: acc.losses,
            ties: acc.ties,
            points_for: acc.points_for,
        })
        .collect()
}

/// manager -> rank lookup
pub fn rank_map(rows: &[StandingRow]) -> FnvHashMap<&str, u32> {
    rows.iter().map(|r| (r.manager.as_str(), r.rank)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(week: u32, a: (&str, f64), b: (&str, f64)) -> HistoricalGame {
        let winner = if a.1 > b.1 {
            Some(a.0.to_string())
        } else if b.1 > a.1 {
            Some(b.0.to_string())
        } else {
            None
        };
        HistoricalGame {
            season: 2024,
            week,
            game_type: GameType::Regular,
            team1_manager: a.0.to_string(),
            team2_manager: b.0.to_string(),
            team1_score: a.1,
            team2_score: b.1,
            winner,
        }
    }

    fn history() -> Vec<HistoricalGame> {
        vec![
            game(1, ("Ann", 120.0), ("Bob", 100.0)),
            game(1, ("Cat", 90.0), ("Dan", 80.0)),
            game(2, ("Ann", 70.0), ("Cat", 75.0)),
            game(2, ("Bob", 130.0), ("Dan", 130.0)),
        ]
    }

    #[test]
    fn test_real_standings() {
        let rows = real_standings(&history(), 2024, 2);
        let names: Vec<&str> = rows.iter().map(|r| r.manager.as_str()).collect();
        // Cat 2-0, Ann 1-1 (190), Bob 0-1-1 (230), Dan 0-1-1 (210)
        assert_eq!(names, vec!["Cat", "Ann", "Bob", "Dan"]);
        assert_eq!(rows[2].record(), "0-1-1");
        assert_eq!(rows[0].rank, 1);

        let week_one = real_standings(&history(), 2024, 1);
        assert_eq!(week_one[0].manager, "Ann");
    }

    #[test]
    fn test_alt_standings() {
        let rows = alt_standings(&history(), 2024, 2);
        // Week 1 top half: Ann, Bob. Week 2 top half: Bob, Dan.
        let bob = rows.iter().find(|r| r.manager == "Bob").unwrap();
        assert_eq!((bob.wins, bob.losses), (2, 0));
        let cat = rows.iter().find(|r| r.manager == "Cat").unwrap();
        assert_eq!((cat.wins, cat.losses), (0, 2));
        assert_eq!(rows[0].manager, "Bob");
    }

    #[test]
    fn test_weekly_scores_and_alt_winners() {
        let h = history();
        let games = games_in_week(&h, 2024, 2);
        let scores = weekly_scores(&games);
        assert_eq!(scores[0].manager, "Bob");
        assert!(scores[0].is_tied && !scores[0].is_loser());
        assert_eq!(alt_winners(&scores), vec!["Bob", "Dan"]);
        let ann = scores.iter().find(|s| s.manager == "Ann").unwrap();
        assert!(ann.is_loser());
        assert_eq!(ann.opponent, "Cat");
    }
}
