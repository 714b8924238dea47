//! Pre-match scoreline distribution.
//!
//! Builds a probability grid over exact final scores (home goals × away goals)
//! from two strength signals. The model is deliberately simple:
//!
//! - Outcome priors start from a fixed home-advantage baseline and are shifted
//!   by the strength differential, clamped so no side becomes a certainty.
//! - The expected score is half of each strength signal, rounded and clamped
//!   to the grid.
//! - Every cell decays linearly with its Manhattan distance from the expected
//!   score and is then scaled by the prior of the outcome class it belongs to
//!   (home win, away win, draw).
//! - The grid is normalised so the cells sum to 1.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Default upper bound on goals per side.
pub const DEFAULT_MAX_GOALS: u32 = 5;

/// Strength differential that saturates the prior shift.
const STRENGTH_SCALE: f64 = 10.0;
/// Floor weight every scoreline receives before outcome scaling.
const BASE_CELL_WEIGHT: f64 = 0.01;
/// Extra weight the expected scoreline receives.
const PEAK_CELL_WEIGHT: f64 = 0.15;
/// Likelihood lost per goal of distance from the expected scoreline.
const FALLOFF_PER_GOAL: f64 = 0.2;
/// Cap on a single cell's weight before normalisation.
const MAX_CELL_WEIGHT: f64 = 0.3;
/// Confidence of the expected scoreline itself.
const PEAK_CONFIDENCE: f64 = 90.0;
/// Confidence lost per goal of distance from the expected scoreline.
const CONFIDENCE_PER_GOAL: f64 = 10.0;
/// Signals are clamped here so infinities cannot leak NaN into the grid.
const SIGNAL_LIMIT: f64 = 1.0e6;

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Rejected `OutcomePriors` values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriorsError {
    #[error("{0} must be finite")]
    NotFinite(&'static str),
    #[error("{field} = {value} lies outside [0, 1]")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("floor {floor} is above ceiling {ceiling}")]
    InvertedBounds { floor: f64, ceiling: f64 },
}

/// Outcome priors and the bounds of the strength adjustment.
///
/// The draw prior is implied: `1 - home_win - away_win`. Every value is a
/// finite probability and `floor <= ceiling`; deserialisation goes through
/// [`OutcomePriors::new`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PriorsFields")]
pub struct OutcomePriors {
    home_win: f64,
    away_win: f64,
    shift: f64,
    floor: f64,
    ceiling: f64,
}

impl OutcomePriors {
    /// `shift` is how far a saturated strength differential moves each win prior.
    pub fn new(
        home_win: f64,
        away_win: f64,
        shift: f64,
        floor: f64,
        ceiling: f64,
    ) -> Result<Self, PriorsError> {
        for (field, value) in [
            ("homeWin", home_win),
            ("awayWin", away_win),
            ("shift", shift),
            ("floor", floor),
            ("ceiling", ceiling),
        ] {
            if !value.is_finite() {
                return Err(PriorsError::NotFinite(field));
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(PriorsError::OutOfRange { field, value });
            }
        }
        if floor > ceiling {
            return Err(PriorsError::InvertedBounds { floor, ceiling });
        }
        Ok(Self {
            home_win,
            away_win,
            shift,
            floor,
            ceiling,
        })
    }

    pub fn home_win(&self) -> f64 {
        self.home_win
    }

    pub fn away_win(&self) -> f64 {
        self.away_win
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }
}

impl Default for OutcomePriors {
    fn default() -> Self {
        Self {
            home_win: 0.45,
            away_win: 0.35,
            shift: 0.3,
            floor: 0.2,
            ceiling: 0.8,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriorsFields {
    home_win: f64,
    away_win: f64,
    shift: f64,
    floor: f64,
    ceiling: f64,
}

impl TryFrom<PriorsFields> for OutcomePriors {
    type Error = PriorsError;

    fn try_from(f: PriorsFields) -> Result<Self, Self::Error> {
        Self::new(f.home_win, f.away_win, f.shift, f.floor, f.ceiling)
    }
}

/// Two teams and the strength proxies used to bias their scoreline.
///
/// Team names are opaque labels. Strength signals are arbitrary numbers
/// (recent goals scored in the reference data); no range is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSignals {
    pub home_team: String,
    pub away_team: String,
    pub home_strength: f64,
    pub away_strength: f64,
}

impl MatchSignals {
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_strength: f64,
        away_strength: f64,
    ) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_strength,
            away_strength,
        }
    }
}

/// Inclusive goal bounds of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    #[serde(rename = "maxX")]
    pub max_home_goals: u32,
    #[serde(rename = "maxY")]
    pub max_away_goals: u32,
}

impl GridBounds {
    pub fn new(max_home_goals: u32, max_away_goals: u32) -> Self {
        Self {
            max_home_goals,
            max_away_goals,
        }
    }

    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        (self.max_home_goals as usize + 1) * (self.max_away_goals as usize + 1)
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GOALS, DEFAULT_MAX_GOALS)
    }
}

// ── Outputs ──────────────────────────────────────────────────────────────────

/// An exact final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u32,
    pub away: u32,
}

impl Scoreline {
    fn distance(&self, home: u32, away: u32) -> u32 {
        self.home.abs_diff(home) + self.away.abs_diff(away)
    }
}

/// Modelled likelihood of one exact final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorelineCell {
    pub home_goals: u32,
    pub away_goals: u32,
    /// Share of the whole grid (0.0–1.0).
    pub probability: f64,
    /// Confidence in this particular cell (0–100).
    pub confidence: f64,
}

/// Win/draw/loss probabilities after the strength adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeProbabilities {
    pub home_win: f64,
    pub away_win: f64,
    /// Not clamped: negative when both win priors saturate at once.
    pub draw: f64,
}

impl OutcomeProbabilities {
    /// Shift `priors` by the signed strength differential of the two signals.
    ///
    /// `floor <= ceiling` holds for every `OutcomePriors`, so the clamps below
    /// cannot panic.
    pub fn from_signals(priors: &OutcomePriors, home_strength: f64, away_strength: f64) -> Self {
        let adj = strength_adjustment(sanitize(home_strength), sanitize(away_strength));
        let home_win = (priors.home_win + priors.shift * adj).clamp(priors.floor, priors.ceiling);
        let away_win = (priors.away_win - priors.shift * adj).clamp(priors.floor, priors.ceiling);
        Self {
            home_win,
            away_win,
            draw: 1.0 - home_win - away_win,
        }
    }

    /// Sum of the three outcome probabilities; 1 up to rounding.
    pub fn total(&self) -> f64 {
        self.home_win + self.away_win + self.draw
    }

    fn scale_for(&self, home_goals: u32, away_goals: u32) -> f64 {
        if home_goals > away_goals {
            2.0 * self.home_win
        } else if away_goals > home_goals {
            2.0 * self.away_win
        } else {
            2.0 * self.draw
        }
    }
}

/// Normalised scoreline grid plus its outcome aggregates.
///
/// Cells are ordered by home goals, then away goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorelineDistribution {
    pub cells: Vec<ScorelineCell>,
    #[serde(flatten)]
    pub bounds: GridBounds,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub draw_probability: f64,
    pub most_likely_score: Scoreline,
    /// False when the raw weights summed to exactly zero and could not be
    /// scaled; the cells are then left as computed.
    pub normalized: bool,
}

impl ScorelineDistribution {
    /// Cell for an exact score, if it lies inside the grid.
    pub fn cell(&self, home_goals: u32, away_goals: u32) -> Option<&ScorelineCell> {
        if home_goals > self.bounds.max_home_goals || away_goals > self.bounds.max_away_goals {
            return None;
        }
        let idx = home_goals as usize * (self.bounds.max_away_goals as usize + 1)
            + away_goals as usize;
        self.cells.get(idx)
    }

    pub fn total_probability(&self) -> f64 {
        self.cells.iter().map(|c| c.probability).sum()
    }

    /// True when the draw probability went negative because both win
    /// probabilities hit their bounds. The distribution is still returned
    /// as computed.
    pub fn is_degenerate(&self) -> bool {
        self.draw_probability < 0.0
    }
}

// ── Generator ────────────────────────────────────────────────────────────────

/// Build the scoreline distribution with the default home-advantage priors.
pub fn generate(signals: &MatchSignals, bounds: GridBounds) -> ScorelineDistribution {
    generate_with_priors(signals, bounds, &OutcomePriors::default())
}

/// Build the scoreline distribution from explicit priors.
pub fn generate_with_priors(
    signals: &MatchSignals,
    bounds: GridBounds,
    priors: &OutcomePriors,
) -> ScorelineDistribution {
    let outcome =
        OutcomeProbabilities::from_signals(priors, signals.home_strength, signals.away_strength);
    let likely = Scoreline {
        home: expected_goals(signals.home_strength, bounds.max_home_goals),
        away: expected_goals(signals.away_strength, bounds.max_away_goals),
    };

    let mut cells = Vec::with_capacity(bounds.cell_count());
    for home_goals in 0..=bounds.max_home_goals {
        for away_goals in 0..=bounds.max_away_goals {
            let dist = likely.distance(home_goals, away_goals);
            cells.push(ScorelineCell {
                home_goals,
                away_goals,
                probability: raw_cell_weight(home_goals, away_goals, likely, &outcome),
                confidence: cell_confidence(dist),
            });
        }
    }

    let total: f64 = cells.iter().map(|c| c.probability).sum();
    let normalized = total != 0.0;
    if normalized {
        for cell in &mut cells {
            cell.probability /= total;
        }
    } else {
        warn!(
            "{} vs {}: scoreline weights sum to zero, grid left un-normalised",
            signals.home_team, signals.away_team
        );
    }

    ScorelineDistribution {
        cells,
        bounds,
        home_win_probability: outcome.home_win,
        away_win_probability: outcome.away_win,
        draw_probability: outcome.draw,
        most_likely_score: likely,
        normalized,
    }
}

/// Signed strength differential in [-1, 1]; positive favours the home side.
fn strength_adjustment(home: f64, away: f64) -> f64 {
    let diff = ((home - away).abs() / STRENGTH_SCALE).clamp(0.0, 1.0);
    if home > away {
        diff
    } else if home < away {
        -diff
    } else {
        0.0
    }
}

fn expected_goals(signal: f64, max_goals: u32) -> u32 {
    (sanitize(signal) / 2.0).round().clamp(0.0, max_goals as f64) as u32
}

/// Un-normalised weight of one cell, capped at `MAX_CELL_WEIGHT`.
fn raw_cell_weight(
    home_goals: u32,
    away_goals: u32,
    likely: Scoreline,
    outcome: &OutcomeProbabilities,
) -> f64 {
    let dist = likely.distance(home_goals, away_goals) as f64;
    let likelihood = (1.0 - FALLOFF_PER_GOAL * dist).max(0.0);
    let weight = (BASE_CELL_WEIGHT + PEAK_CELL_WEIGHT * likelihood)
        * outcome.scale_for(home_goals, away_goals);
    weight.min(MAX_CELL_WEIGHT)
}

fn cell_confidence(dist: u32) -> f64 {
    (PEAK_CONFIDENCE - CONFIDENCE_PER_GOAL * dist as f64).clamp(0.0, 100.0)
}

fn sanitize(signal: f64) -> f64 {
    if signal.is_nan() {
        0.0
    } else {
        signal.clamp(-SIGNAL_LIMIT, SIGNAL_LIMIT)
    }
}
