//! Historical head-to-head records between two clubs.
//!
//! Records are stored once per pairing. Looking up the reverse fixture swaps
//! the per-side tallies; recent form and goal difference stay as stored.

use serde::{Deserialize, Serialize};

use super::momentum::FormResult;
use super::{Fixture, FixtureTable, Mirrored};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidePair<T> {
    pub home: T,
    pub away: T,
}

impl<T> SidePair<T> {
    fn swapped(self) -> Self {
        Self {
            home: self.away,
            away: self.home,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadStats {
    pub total_matches: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
    pub home_goals: u32,
    pub away_goals: u32,
    pub avg_home_goals: f64,
    pub avg_away_goals: f64,
    pub recent_form: SidePair<Vec<FormResult>>,
    /// Home goals minus away goals of the stored pairing.
    pub goal_difference: i32,
    /// Percent of meetings won by each side.
    pub win_percentage: SidePair<f64>,
}

impl HeadToHeadStats {
    /// Zeroed record for callers that prefer an empty history over `None`.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Mirrored for HeadToHeadStats {
    /// Wins, goals, averages and win percentages seen from the other side.
    /// `recent_form` and `goal_difference` are carried over unchanged.
    fn mirrored(self) -> Self {
        Self {
            total_matches: self.total_matches,
            home_wins: self.away_wins,
            away_wins: self.home_wins,
            draws: self.draws,
            home_goals: self.away_goals,
            away_goals: self.home_goals,
            avg_home_goals: self.avg_away_goals,
            avg_away_goals: self.avg_home_goals,
            recent_form: self.recent_form,
            goal_difference: self.goal_difference,
            win_percentage: self.win_percentage.swapped(),
        }
    }
}

pub type HeadToHeadTable = FixtureTable<HeadToHeadStats>;

/// Fixed head-to-head table for the pairings in the reference data.
pub fn builtin() -> HeadToHeadTable {
    use FormResult::{Draw as D, Loss as L, Win as W};

    HeadToHeadTable::new(
        "builtin-head-to-head",
        [
            (
                Fixture::new("Manchester United", "Liverpool"),
                HeadToHeadStats {
                    total_matches: 10,
                    home_wins: 4,
                    away_wins: 3,
                    draws: 3,
                    home_goals: 15,
                    away_goals: 12,
                    avg_home_goals: 1.5,
                    avg_away_goals: 1.2,
                    recent_form: SidePair {
                        home: vec![W, D, L, W, D],
                        away: vec![L, W, D, L, W],
                    },
                    goal_difference: 3,
                    win_percentage: SidePair {
                        home: 40.0,
                        away: 30.0,
                    },
                },
            ),
            (
                Fixture::new("Barcelona", "Real Madrid"),
                HeadToHeadStats {
                    total_matches: 12,
                    home_wins: 5,
                    away_wins: 4,
                    draws: 3,
                    home_goals: 20,
                    away_goals: 18,
                    avg_home_goals: 1.67,
                    avg_away_goals: 1.5,
                    recent_form: SidePair {
                        home: vec![W, W, D, L, W],
                        away: vec![L, D, W, W, L],
                    },
                    goal_difference: 2,
                    win_percentage: SidePair {
                        home: 41.7,
                        away: 33.3,
                    },
                },
            ),
            (
                Fixture::new("Bayern Munich", "Borussia Dortmund"),
                HeadToHeadStats {
                    total_matches: 15,
                    home_wins: 7,
                    away_wins: 4,
                    draws: 4,
                    home_goals: 25,
                    away_goals: 18,
                    avg_home_goals: 1.67,
                    avg_away_goals: 1.2,
                    recent_form: SidePair {
                        home: vec![W, W, W, D, L],
                        away: vec![L, D, W, L, W],
                    },
                    goal_difference: 7,
                    win_percentage: SidePair {
                        home: 46.7,
                        away: 26.7,
                    },
                },
            ),
        ],
    )
}
