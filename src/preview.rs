// This module assembles the upcoming-week preview from live standings and the head-to-head index

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ManagerSettings;
use crate::error::{PipelineError, Result};
use crate::h2h::{pair_key, HeadToHeadEntry, HeadToHeadIndex};
use crate::league::{Matchup, StandingsEntry, TeamResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewTeam {
    pub name: String,
    pub manager: String,
    pub rank: u32,
    pub record: String,
}

/// Head-to-head view from the first team's side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewHeadToHead {
    pub meetings: u32,
    pub regular_record: String,
    pub playoff_record: String,
    /// Playoff record followed by the rounds each side won, e.g. "1-1, SF'22; 1st'23"
    pub playoff_display: String,
    pub streak: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewMatchup {
    pub team1: PreviewTeam,
    pub team2: PreviewTeam,
    /// None for a first meeting
    pub h2h: Option<PreviewHeadToHead>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewData {
    pub season: u16,
    pub week: u32,
    pub matchups: Vec<PreviewMatchup>,
}

/// "<holder> W<n> (<games>)" for the current run, or "No Streak"
pub fn streak_description(entry: &HeadToHeadEntry) -> String {
    let Some(holder) = entry.streak_holder.as_deref() else {
        return "No Streak".to_string();
    };
    let len = entry.streak_len() as usize;
    let games = entry.games();
    let labels: Vec<String> = games[games.len().saturating_sub(len)..]
        .iter()
        .map(|g| g.short_label())
        .collect();
    format!("{} W{} ({})", holder, len, labels.join(", "))
}

fn head_to_head_view(entry: &HeadToHeadEntry, first: &str) -> PreviewHeadToHead {
    let (regular, playoffs) = entry.tallies_for(first);
    let playoff_record = playoffs.display();

    let rounds_won = |manager: &str| -> Vec<String> {
        entry
            .playoff_history
            .iter()
            .filter(|g| g.winner.as_deref() == Some(manager))
            .map(|g| g.short_label())
            .collect()
    };
    let second = if first == entry.manager1 { &entry.manager2 } else { &entry.manager1 };
    let won = rounds_won(first).join(", ");
    let lost = rounds_won(second).join(", ");

    let mut history = won;
    if !lost.is_empty() {
        history.push_str("; ");
        history.push_str(&lost);
    }
    let playoff_display = if history.is_empty() {
        playoff_record.clone()
    } else {
        format!("{}, {}", playoff_record, history)
    };

    PreviewHeadToHead {
        meetings: entry.total_games(),
        regular_record: regular.display(),
        playoff_record,
        playoff_display,
        streak: streak_description(entry),
    }
}

fn preview_team(
    team: &TeamResult,
    table: &FnvHashMap<&str, &StandingsEntry>,
    managers: &ManagerSettings,
) -> Result<PreviewTeam> {
    let row = table.get(team.team_key.as_str()).ok_or_else(|| {
        PipelineError::fetch("standings", format!("team {} is missing", team.team_key))
    })?;
    let manager = team
        .primary_manager(managers.operator.as_deref())
        .map(|n| managers.resolve(n))
        .unwrap_or_else(|| managers.resolve(&row.manager));
    Ok(PreviewTeam {
        name: team.name.clone(),
        manager,
        rank: row.rank,
        record: row.record_str(),
    })
}

/// Build the preview for `week` of `season`. An empty schedule gives a preview with no matchups.
pub fn build_preview(
    season: u16,
    week: u32,
    standings: &[StandingsEntry],
    matchups: &[Matchup],
    h2h: &HeadToHeadIndex,
    managers: &ManagerSettings,
) -> Result<PreviewData> {
    let table: FnvHashMap<&str, &StandingsEntry> = standings.iter().map(|s| (s.team_key.as_str(), s)).collect();

    let mut out = Vec::with_capacity(matchups.len());
    for matchup in matchups {
        let Some((a, b)) = matchup.sides() else {
            warn!("Skipping week {} matchup with {} teams", week, matchup.teams.len());
            continue;
        };
        let mut team1 = preview_team(a, &table, managers)?;
        let mut team2 = preview_team(b, &table, managers)?;
        if team2.rank < team1.rank {
            std::mem::swap(&mut team1, &mut team2);
        }
        let h2h_view = h2h
            .get(&pair_key(&team1.manager, &team2.manager))
            .map(|entry| head_to_head_view(entry, &team1.manager));
        out.push(PreviewMatchup { team1, team2, h2h: h2h_view });
    }
    out.sort_by_key(|m| m.team1.rank);

    info!("Preview for week {} of {}: {} matchups", week, season, out.len());
    Ok(PreviewData { season, week, matchups: out })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h2h::build_index;
    use crate::league::{GameType, HistoricalGame, Manager, MatchupStatus};

    fn standing(key: &str, manager: &str, rank: u32, wins: u32, losses: u32) -> StandingsEntry {
        StandingsEntry {
            team_key: key.to_string(),
            name: format!("Team {}", manager),
            manager: manager.to_string(),
            rank,
            wins,
            losses,
            ties: 0,
        }
    }

    fn side(key: &str, manager: &str) -> TeamResult {
        TeamResult {
            team_key: key.to_string(),
            name: format!("Team {}", manager),
            points: 0.0,
            managers: vec![Manager { nickname: manager.to_string() }],
        }
    }

    fn upcoming(a: (&str, &str), b: (&str, &str)) -> Matchup {
        Matchup {
            week: 5,
            status: MatchupStatus::Scheduled,
            is_playoffs: false,
            is_consolation: false,
            is_tied: false,
            winner_team_key: None,
            teams: vec![side(a.0, a.1), side(b.0, b.1)],
        }
    }

    fn past(season: u16, week: u32, a: &str, b: &str, winner: &str, game_type: GameType) -> HistoricalGame {
        HistoricalGame {
            season,
            week,
            game_type,
            team1_manager: a.to_string(),
            team2_manager: b.to_string(),
            team1_score: 100.0,
            team2_score: 90.0,
            winner: Some(winner.to_string()),
        }
    }

    #[test]
    fn test_preview_orders_by_rank() {
        let standings = vec![
            standing("t1", "Ann", 4, 1, 3),
            standing("t2", "Bob", 1, 4, 0),
            standing("t3", "Cat", 2, 3, 1),
            standing("t4", "Dan", 3, 2, 2),
        ];
        let matchups = vec![upcoming(("t1", "Ann"), ("t3", "Cat")), upcoming(("t4", "Dan"), ("t2", "Bob"))];
        let history = vec![
            past(2022, 15, "Ann", "Cat", "Cat", GameType::SemiFinal),
            past(2023, 3, "Cat", "Ann", "Ann", GameType::Regular),
            past(2023, 9, "Ann", "Cat", "Ann", GameType::Regular),
            past(2023, 16, "Cat", "Ann", "Ann", GameType::Championship),
        ];
        let index = build_index(&history);

        let preview = build_preview(2024, 5, &standings, &matchups, &index, &ManagerSettings::default()).unwrap();
        assert_eq!(preview.matchups.len(), 2);

        let first = &preview.matchups[0];
        assert_eq!((first.team1.manager.as_str(), first.team2.manager.as_str()), ("Bob", "Dan"));
        assert_eq!(first.team1.record, "4-0");
        assert!(first.h2h.is_none());

        let second = &preview.matchups[1];
        assert_eq!(second.team1.manager, "Cat");
        let h2h = second.h2h.as_ref().unwrap();
        assert_eq!(h2h.meetings, 4);
        assert_eq!(h2h.regular_record, "0-2");
        assert_eq!(h2h.playoff_record, "1-1");
        assert_eq!(h2h.playoff_display, "1-1, SF'22; 1st'23");
        assert_eq!(h2h.streak, "Ann W3 (Wk3'23, Wk9'23, 1st'23)");
    }

    #[test]
    fn test_empty_schedule() {
        let preview = build_preview(2024, 18, &[], &[], &HeadToHeadIndex::new(), &ManagerSettings::default()).unwrap();
        assert!(preview.matchups.is_empty());
    }

    #[test]
    fn test_unknown_team_is_an_error() {
        let matchups = vec![upcoming(("t1", "Ann"), ("t9", "Zed"))];
        let standings = vec![standing("t1", "Ann", 1, 1, 0)];
        let err = build_preview(2024, 2, &standings, &matchups, &HeadToHeadIndex::new(), &ManagerSettings::default());
        assert!(err.is_err());
    }
}
