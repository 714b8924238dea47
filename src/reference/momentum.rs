//! Recent-form momentum per team.

use serde::{Deserialize, Serialize};

use super::StaticTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormTrend {
    Improving,
    Declining,
    Stable,
}

impl FormTrend {
    pub fn symbol(&self) -> &'static str {
        match self {
            FormTrend::Improving => "↑",
            FormTrend::Declining => "↓",
            FormTrend::Stable => "→",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalDifferenceTrend {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGoals {
    pub scored: Vec<u32>,
    pub conceded: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumData {
    /// Last five results, oldest first.
    pub current_form: Vec<FormResult>,
    pub form_trend: FormTrend,
    pub recent_goals: RecentGoals,
    pub goal_difference_trend: GoalDifferenceTrend,
    pub clean_sheets: u32,
    /// 0–100, higher is better.
    pub momentum_score: u8,
    pub momentum_description: String,
}

impl MomentumData {
    /// Goals scored over the recent window; usable as a scoreline strength signal.
    pub fn goals_scored_total(&self) -> u32 {
        self.recent_goals.scored.iter().sum()
    }

    pub fn goals_conceded_total(&self) -> u32 {
        self.recent_goals.conceded.iter().sum()
    }
}

#[allow(clippy::too_many_arguments)]
fn entry(
    team: &str,
    form: [FormResult; 5],
    form_trend: FormTrend,
    scored: [u32; 5],
    conceded: [u32; 5],
    goal_difference_trend: GoalDifferenceTrend,
    clean_sheets: u32,
    momentum_score: u8,
    description: &str,
) -> (String, MomentumData) {
    (
        team.to_string(),
        MomentumData {
            current_form: form.to_vec(),
            form_trend,
            recent_goals: RecentGoals {
                scored: scored.to_vec(),
                conceded: conceded.to_vec(),
            },
            goal_difference_trend,
            clean_sheets,
            momentum_score,
            momentum_description: description.to_string(),
        },
    )
}

/// Fixed momentum table for the clubs in the reference data.
pub fn builtin() -> StaticTable<MomentumData> {
    use FormResult::{Draw as D, Loss as L, Win as W};

    StaticTable::new(
        "builtin-momentum",
        [
            entry(
                "Manchester United",
                [W, D, W, L, W],
                FormTrend::Improving,
                [2, 1, 3, 0, 2],
                [1, 1, 0, 2, 1],
                GoalDifferenceTrend::Positive,
                2,
                75,
                "Strong recent form with improving momentum",
            ),
            entry(
                "Liverpool",
                [L, L, D, W, W],
                FormTrend::Improving,
                [0, 1, 2, 3, 2],
                [2, 3, 1, 1, 0],
                GoalDifferenceTrend::Positive,
                1,
                65,
                "Recovering form with positive goal difference trend",
            ),
            entry(
                "Manchester City",
                [W, W, W, D, W],
                FormTrend::Stable,
                [3, 2, 4, 1, 3],
                [0, 1, 0, 1, 0],
                GoalDifferenceTrend::Positive,
                3,
                90,
                "Excellent momentum with strong goal difference",
            ),
            entry(
                "Chelsea",
                [D, L, L, D, W],
                FormTrend::Stable,
                [1, 0, 1, 1, 2],
                [1, 2, 2, 1, 1],
                GoalDifferenceTrend::Neutral,
                0,
                50,
                "Inconsistent form with neutral momentum",
            ),
            entry(
                "Arsenal",
                [W, W, L, W, W],
                FormTrend::Improving,
                [2, 3, 1, 2, 3],
                [0, 1, 2, 1, 0],
                GoalDifferenceTrend::Positive,
                2,
                80,
                "Strong form with positive momentum trend",
            ),
            entry(
                "Tottenham",
                [L, W, L, L, D],
                FormTrend::Declining,
                [1, 2, 0, 1, 1],
                [2, 1, 3, 2, 2],
                GoalDifferenceTrend::Negative,
                0,
                35,
                "Declining momentum with negative goal difference",
            ),
        ],
    )
}
