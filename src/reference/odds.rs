//! Bookmaker decimal odds and the market's implied outcome probabilities.
//!
//! Quotes are stored once per pairing. Looking up the reverse fixture swaps
//! the home and away prices so they follow the requested sides.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Fixture, FixtureTable, Mirrored};

/// Decimal odds for the three match outcomes from one bookmaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmakerOdds {
    pub bookmaker: String,
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub last_updated: DateTime<Utc>,
}

impl BookmakerOdds {
    /// All three prices are usable decimal odds.
    pub fn is_priced(&self) -> bool {
        [self.home_win, self.draw, self.away_win]
            .into_iter()
            .all(|odds| implied_probability(odds).is_some())
    }
}

impl Mirrored for Vec<BookmakerOdds> {
    fn mirrored(self) -> Self {
        self.into_iter()
            .map(|q| BookmakerOdds {
                home_win: q.away_win,
                away_win: q.home_win,
                ..q
            })
            .collect()
    }
}

/// Best and average price for one outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeOdds {
    pub best_odds: f64,
    pub best_bookmaker: String,
    /// Rounded to two decimals.
    pub average_odds: f64,
}

/// Percentages (0–100, one decimal) with the bookmaker margin removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsComparison {
    pub home_win: OutcomeOdds,
    pub draw: OutcomeOdds,
    pub away_win: OutcomeOdds,
    pub implied_probabilities: ImpliedProbabilities,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Implied probability of a decimal price as a percentage, one decimal.
///
/// `None` for prices under 1.0 and for non-finite input.
pub fn implied_probability(odds: f64) -> Option<f64> {
    if !odds.is_finite() || odds < 1.0 {
        return None;
    }
    Some(round_to(100.0 / odds, 1))
}

type Price = fn(&BookmakerOdds) -> f64;

fn average(quotes: &[&BookmakerOdds], price: Price) -> f64 {
    quotes.iter().map(|q| price(q)).sum::<f64>() / quotes.len() as f64
}

/// First quote wins ties.
fn best_and_average(quotes: &[&BookmakerOdds], price: Price) -> OutcomeOdds {
    let best = quotes
        .iter()
        .copied()
        .reduce(|best, q| if price(q) > price(best) { q } else { best });
    OutcomeOdds {
        best_odds: best.map(price).unwrap_or_default(),
        best_bookmaker: best.map(|q| q.bookmaker.clone()).unwrap_or_default(),
        average_odds: round_to(average(quotes, price), 2),
    }
}

/// Best price per outcome, average prices and margin-free implied
/// probabilities from the average prices.
///
/// Quotes with an unusable price are skipped. `None` when nothing is left.
pub fn compare_odds(quotes: &[BookmakerOdds]) -> Option<OddsComparison> {
    let priced: Vec<&BookmakerOdds> = quotes.iter().filter(|q| q.is_priced()).collect();
    if priced.len() < quotes.len() {
        debug!(
            "Skipped {} unpriced bookmaker quote(s)",
            quotes.len() - priced.len()
        );
    }
    if priced.is_empty() {
        return None;
    }

    let home_avg = average(&priced, |q| q.home_win);
    let draw_avg = average(&priced, |q| q.draw);
    let away_avg = average(&priced, |q| q.away_win);
    let book = 1.0 / home_avg + 1.0 / draw_avg + 1.0 / away_avg;

    Some(OddsComparison {
        home_win: best_and_average(&priced, |q| q.home_win),
        draw: best_and_average(&priced, |q| q.draw),
        away_win: best_and_average(&priced, |q| q.away_win),
        implied_probabilities: ImpliedProbabilities {
            home_win: round_to(100.0 / home_avg / book, 1),
            draw: round_to(100.0 / draw_avg / book, 1),
            away_win: round_to(100.0 / away_avg / book, 1),
        },
    })
}

pub type OddsTable = FixtureTable<Vec<BookmakerOdds>>;

/// Seconds since the epoch of 2025-11-01T10:00:00Z, when the fixed quotes were taken.
const QUOTED_AT_SECS: i64 = 1_761_991_200;

fn quote(bookmaker: &str, home_win: f64, draw: f64, away_win: f64) -> BookmakerOdds {
    BookmakerOdds {
        bookmaker: bookmaker.to_string(),
        home_win,
        draw,
        away_win,
        last_updated: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(QUOTED_AT_SECS),
    }
}

/// Fixed quotes for the pairings in the reference data.
pub fn builtin() -> OddsTable {
    OddsTable::new(
        "builtin-odds",
        [
            (
                Fixture::new("Manchester United", "Liverpool"),
                vec![
                    quote("Bet365", 2.50, 3.20, 2.80),
                    quote("William Hill", 2.45, 3.25, 2.85),
                    quote("Sky Bet", 2.55, 3.15, 2.75),
                    quote("Ladbrokes", 2.48, 3.22, 2.82),
                ],
            ),
            (
                Fixture::new("Manchester City", "Chelsea"),
                vec![
                    quote("Bet365", 1.45, 4.50, 7.00),
                    quote("William Hill", 1.42, 4.60, 7.20),
                    quote("Sky Bet", 1.48, 4.40, 6.80),
                ],
            ),
            (
                Fixture::new("Arsenal", "Tottenham"),
                vec![
                    quote("Bet365", 2.10, 3.40, 3.50),
                    quote("William Hill", 2.05, 3.45, 3.55),
                ],
            ),
        ],
    )
}
