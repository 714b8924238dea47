//! Colour and opacity for rendering a scoreline grid as a heatmap.

use serde::Serialize;
use std::fmt;

use crate::engine::ScorelineDistribution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).floor().clamp(0.0, 255.0) as u8
}

/// Blue (unlikely) through green to red (likely).
///
/// Probabilities are stretched ×5 first, so anything at or above 0.2 is full red.
pub fn heat_color(probability: f64) -> Rgb {
    let n = (probability * 5.0).clamp(0.0, 1.0);
    Rgb {
        r: channel(n),
        g: channel(1.0 - (n - 0.5).abs() * 2.0),
        b: channel(1.0 - n),
    }
}

/// Cell opacity from its confidence (0–100), never fainter than 0.3.
pub fn heat_opacity(confidence: f64) -> f64 {
    (confidence / 100.0).clamp(0.3, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub home_goals: u32,
    pub away_goals: u32,
    pub color: String,
    pub opacity: f64,
}

/// Styles for every cell, in the distribution's cell order.
pub fn cell_styles(distribution: &ScorelineDistribution) -> Vec<CellStyle> {
    distribution
        .cells
        .iter()
        .map(|c| CellStyle {
            home_goals: c.home_goals,
            away_goals: c.away_goals,
            color: heat_color(c.probability).to_string(),
            opacity: heat_opacity(c.confidence),
        })
        .collect()
}
