// This module assembles the weekly report card view model from the historical record

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::accolades::{apply_week, count_for, eligible, rebuild_store, tally_counts, AccoladeCounts, AccoladeKind, AllTimeRecords};
use crate::league::{GameRef, HistoricalGame};
use crate::standings::{alt_standings, alt_winners, games_in_week, rank_map, real_standings, weekly_scores};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub manager: String,
    pub alt_rank: u32,
    /// Places gained since last week, positive is up; None in week 1
    pub alt_delta: Option<i32>,
    pub alt_winner: bool,
    pub real_rank: Option<u32>,
    pub real_delta: Option<i32>,
    pub real_winner: bool,
    pub weekly_score: Option<f64>,
    pub points_for: f64,
    pub alt_record: String,
    pub real_record: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAccolade {
    pub kind: AccoladeKind,
    pub title: String,
    pub manager: String,
    pub opponent: String,
    pub value: f64,
    pub record_breaking: bool,
    /// Times the manager has won this accolade this season, this week included
    pub season_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCardData {
    pub season: u16,
    pub week: u32,
    pub rows: Vec<ReportRow>,
    pub accolades: Vec<ReportAccolade>,
}

/// Everything a weekly report pass writes
#[derive(Debug, Clone)]
pub struct ReportBuild {
    pub data: ReportCardData,
    pub all_time: AllTimeRecords,
    pub counts: AccoladeCounts,
}

fn delta(previous: Option<u32>, current: u32) -> Option<i32> {
    previous.map(|prev| prev as i32 - current as i32)
}

/// Report for `season`/`week`; reruns over the same history give the same output
pub fn build_report(history: &[HistoricalGame], season: u16, week: u32) -> ReportBuild {
    let report_ref = GameRef { season, week };

    let alt_now = alt_standings(history, season, week);
    let real_now = real_standings(history, season, week);
    let (alt_prev, real_prev) = if week > 1 {
        (alt_standings(history, season, week - 1), real_standings(history, season, week - 1))
    } else {
        (Vec::new(), Vec::new())
    };
    let alt_prev_ranks = rank_map(&alt_prev);
    let real_prev_ranks = rank_map(&real_prev);
    let real_ranks = rank_map(&real_now);

    let week_games = games_in_week(history, season, week);
    let scores = weekly_scores(&week_games);
    let top_half = alt_winners(&scores);

    let rows = alt_now
        .iter()
        .map(|alt| {
            let manager = alt.manager.as_str();
            let real_row = real_now.iter().find(|r| r.manager == manager);
            let real_rank = real_ranks.get(manager).copied();
            let score = scores.iter().find(|s| s.manager == manager);
            ReportRow {
                manager: alt.manager.clone(),
                alt_rank: alt.rank,
                alt_delta: delta(alt_prev_ranks.get(manager).copied(), alt.rank),
                alt_winner: top_half.contains(&manager),
                real_rank,
                real_delta: real_rank.and_then(|r| delta(real_prev_ranks.get(manager).copied(), r)),
                real_winner: score.map_or(false, |s| s.is_winner),
                weekly_score: score.map(|s| s.score),
                points_for: alt.points_for,
                alt_record: alt.record(),
                real_record: real_row.map(|r| r.record()).unwrap_or_else(|| "0-0".to_string()),
            }
        })
        .collect();

    let mut all_time = rebuild_store(history, report_ref);
    let eligible_games: Vec<&HistoricalGame> = week_games.iter().copied().filter(|g| eligible(g)).collect();
    let weekly = apply_week(&eligible_games, &mut all_time);
    let counts = tally_counts(history, report_ref);

    let accolades: Vec<ReportAccolade> = weekly
        .into_iter()
        .map(|rec| ReportAccolade {
            kind: rec.kind,
            title: rec.kind.title().to_string(),
            season_count: count_for(&counts, season, &rec.manager, rec.kind),
            manager: rec.manager,
            opponent: rec.opponent,
            value: rec.value,
            record_breaking: rec.record_breaking,
        })
        .collect();

    info!(
        "Report for {}: {} managers, {} accolades",
        report_ref,
        alt_now.len(),
        accolades.len()
    );

    ReportBuild {
        data: ReportCardData { season, week, rows, accolades },
        all_time,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::GameType;

    fn game(season: u16, week: u32, a: (&str, f64), b: (&str, f64)) -> HistoricalGame {
        HistoricalGame {
            season,
            week,
            game_type: GameType::Regular,
            team1_manager: a.0.to_string(),
            team2_manager: b.0.to_string(),
            team1_score: a.1,
            team2_score: b.1,
            winner: Some(if a.1 > b.1 { a.0 } else { b.0 }.to_string()),
        }
    }

    fn history() -> Vec<HistoricalGame> {
        vec![
            game(2023, 1, ("Ann", 170.0), ("Cat", 60.0)),
            game(2024, 1, ("Ann", 120.0), ("Bob", 100.0)),
            game(2024, 1, ("Cat", 90.0), ("Dan", 80.0)),
            game(2024, 2, ("Ann", 70.0), ("Dan", 75.0)),
            game(2024, 2, ("Bob", 130.0), ("Cat", 125.0)),
        ]
    }

    #[test]
    fn test_rows_and_deltas() {
        let build = build_report(&history(), 2024, 2);
        let data = &build.data;
        assert_eq!((data.season, data.week), (2024, 2));
        assert_eq!(data.rows.len(), 4);

        // Alt: Bob 2-0, then Ann/Cat 1-1 by points, Dan 0-2
        let order: Vec<&str> = data.rows.iter().map(|r| r.manager.as_str()).collect();
        assert_eq!(order, vec!["Bob", "Cat", "Ann", "Dan"]);

        let bob = &data.rows[0];
        assert!(bob.alt_winner && bob.real_winner);
        assert_eq!(bob.alt_delta, Some(1));
        assert_eq!(bob.weekly_score, Some(130.0));
        assert_eq!(bob.alt_record, "2-0");
        assert_eq!(bob.real_record, "1-1");

        let week_one = build_report(&history(), 2024, 1);
        assert!(week_one.data.rows.iter().all(|r| r.alt_delta.is_none() && r.real_delta.is_none()));
    }

    #[test]
    fn test_accolades_flag_against_prior_history() {
        let build = build_report(&history(), 2024, 2);
        let top = build
            .data
            .accolades
            .iter()
            .find(|a| a.kind == AccoladeKind::TopPoints)
            .unwrap();
        assert_eq!(top.manager, "Bob");
        // 2023's 170 still stands
        assert!(!top.record_breaking);
        assert_eq!(top.season_count, 1);
        assert_eq!(build.all_time[&AccoladeKind::TopPoints].value, 170.0);

        let heartbreak = build
            .data
            .accolades
            .iter()
            .find(|a| a.kind == AccoladeKind::Heartbreak)
            .unwrap();
        assert_eq!(heartbreak.manager, "Ann");
        assert!(heartbreak.record_breaking);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let a = build_report(&history(), 2024, 2);
        let b = build_report(&history(), 2024, 2);
        assert_eq!(a.data, b.data);
        assert_eq!(a.all_time, b.all_time);
        assert_eq!(a.counts, b.counts);
    }
}
