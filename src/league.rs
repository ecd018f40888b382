// This module defines the league data structures shared by the fetch, cache and derivation steps
// Raw shapes mirror what the league source returns, HistoricalGame is the normalized record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion status of a matchup, using the source's event vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchupStatus {
    #[serde(rename = "preevent")]
    Scheduled,
    #[serde(rename = "midevent")]
    InProgress,
    #[serde(rename = "postevent")]
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manager {
    pub nickname: String,
}

/// One side of a matchup as reported by the league source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResult {
    pub team_key: String,
    pub name: String,
    #[serde(default)]
    pub points: f64,
    pub managers: Vec<Manager>,
}

impl TeamResult {
    /// Picks the manager credited with this team.
    /// Co-managed teams credit the first manager who isn't the operator.
    pub fn primary_manager(&self, operator: Option<&str>) -> Option<&str> {
        if self.managers.len() > 1 {
            if let Some(op) = operator {
                if let Some(other) = self.managers.iter().find(|m| m.nickname != op) {
                    return Some(&other.nickname);
                }
            }
        }
        self.managers.first().map(|m| m.nickname.as_str())
    }
}

/// A single weekly pairing of two teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: u32,
    pub status: MatchupStatus,
    #[serde(default)]
    pub is_playoffs: bool,
    #[serde(default)]
    pub is_consolation: bool,
    #[serde(default)]
    pub is_tied: bool,
    #[serde(default)]
    pub winner_team_key: Option<String>,
    pub teams: Vec<TeamResult>,
}

impl Matchup {
    /// Both sides, or None when the payload doesn't carry exactly two teams
    pub fn sides(&self) -> Option<(&TeamResult, &TeamResult)> {
        match self.teams.as_slice() {
            [a, b] => Some((a, b)),
            _ => None,
        }
    }

    /// Returns the winning side, None on a tie
    pub fn winner(&self) -> Option<&TeamResult> {
        let (a, b) = self.sides()?;
        if self.is_tied {
            return None;
        }
        match &self.winner_team_key {
            Some(key) if *key == a.team_key => Some(a),
            Some(key) if *key == b.team_key => Some(b),
            _ => {
                if a.points > b.points {
                    Some(a)
                } else if b.points > a.points {
                    Some(b)
                } else {
                    None
                }
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == MatchupStatus::Complete
    }
}

/// Aggregate status of a week: complete only when every matchup is final
pub fn week_status(matchups: &[Matchup]) -> MatchupStatus {
    if matchups.is_empty() {
        return MatchupStatus::Scheduled;
    }
    if matchups.iter().all(Matchup::is_complete) {
        MatchupStatus::Complete
    } else if matchups.iter().all(|m| m.status == MatchupStatus::Scheduled) {
        MatchupStatus::Scheduled
    } else {
        MatchupStatus::InProgress
    }
}

/// Season-level settings needed to classify playoff games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub playoff_start_week: u32,
    pub num_playoff_teams: u32,
}

impl LeagueSettings {
    /// Leagues with six or more playoff teams give the top two seeds a bye
    pub fn has_byes(&self) -> bool {
        self.num_playoff_teams >= 6
    }

    /// Last week of the season, championship included
    pub fn total_weeks(&self) -> u32 {
        if self.has_byes() {
            self.playoff_start_week + 2
        } else {
            self.playoff_start_week + 1
        }
    }
}

/// Live standings row from the league source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team_key: String,
    pub name: String,
    pub manager: String,
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
}

impl StandingsEntry {
    pub fn record_str(&self) -> String {
        format_record(self.wins, self.losses, self.ties)
    }
}

/// "W-L", or "W-L-T" once a tie has happened
pub fn format_record(wins: u32, losses: u32, ties: u32) -> String {
    if ties > 0 {
        format!("{}-{}-{}", wins, losses, ties)
    } else {
        format!("{}-{}", wins, losses)
    }
}

/// Classification of a historical game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "consolation")]
    Consolation,
    #[serde(rename = "QF")]
    QuarterFinal,
    #[serde(rename = "SF")]
    SemiFinal,
    #[serde(rename = "1st")]
    Championship,
    #[serde(rename = "3rd")]
    ThirdPlace,
}

impl GameType {
    /// Championship-bracket games; consolation games don't count
    pub fn is_playoff(&self) -> bool {
        matches!(
            self,
            GameType::QuarterFinal | GameType::SemiFinal | GameType::Championship | GameType::ThirdPlace
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameType::Regular => "regular",
            GameType::Consolation => "consolation",
            GameType::QuarterFinal => "QF",
            GameType::SemiFinal => "SF",
            GameType::Championship => "1st",
            GameType::ThirdPlace => "3rd",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized result of one completed matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalGame {
    pub season: u16,
    pub week: u32,
    pub game_type: GameType,
    pub team1_manager: String,
    pub team2_manager: String,
    pub team1_score: f64,
    pub team2_score: f64,
    pub winner: Option<String>,
}

impl HistoricalGame {
    pub fn loser(&self) -> Option<&str> {
        let winner = self.winner.as_deref()?;
        if winner == self.team1_manager {
            Some(&self.team2_manager)
        } else {
            Some(&self.team1_manager)
        }
    }

    pub fn margin(&self) -> f64 {
        (self.team1_score - self.team2_score).abs()
    }

    pub fn game_ref(&self) -> GameRef {
        GameRef {
            season: self.season,
            week: self.week,
        }
    }
}

/// (season, week) coordinate of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameRef {
    pub season: u16,
    pub week: u32,
}

impl GameRef {
    /// Two-digit season suffix, e.g. 2024 -> "24"
    pub fn season_short(&self) -> String {
        format!("{:02}", self.season % 100)
    }
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wk{}'{}", self.week, self.season_short())
    }
}
