pub mod palette;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

use crate::engine::{
    advise, assess, calibrate, generate, CalibrationRecord, GridBounds, MatchSignals,
    ScorelineDistribution,
};
use crate::reference::odds::compare_odds;
use crate::reference::weather::weather_impact;
use crate::reference::{
    self, BookmakerOdds, Fixture, HeadToHeadStats, MomentumData, OddsComparison, ReferenceSource,
    WeatherData, WeatherImpact,
};
use palette::{cell_styles, CellStyle};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Reference sources and grid settings shared by every handler.
pub struct AppState {
    pub calibration: Box<dyn ReferenceSource<str, Record = CalibrationRecord>>,
    pub momentum: Box<dyn ReferenceSource<str, Record = MomentumData>>,
    pub head_to_head: Box<dyn ReferenceSource<Fixture, Record = HeadToHeadStats>>,
    pub odds: Box<dyn ReferenceSource<Fixture, Record = Vec<BookmakerOdds>>>,
    pub weather: Box<dyn ReferenceSource<str, Record = WeatherData>>,
    pub bounds: GridBounds,
}

impl AppState {
    /// State backed by the built-in reference tables.
    pub fn with_builtin_tables(bounds: GridBounds) -> Self {
        Self {
            calibration: Box::new(reference::calibration::builtin()),
            momentum: Box::new(reference::momentum::builtin()),
            head_to_head: Box::new(reference::head_to_head::builtin()),
            odds: Box::new(reference::odds::builtin()),
            weather: Box::new(reference::weather::builtin()),
            bounds,
        }
    }
}

/// Build the Axum router for the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/heatmap", get(heatmap_handler))
        .route("/api/calibration/:model", get(calibration_handler))
        .route("/api/calibration/:model/calibrate", get(calibrate_handler))
        .route("/api/momentum/:team", get(momentum_handler))
        .route("/api/head-to-head", get(head_to_head_handler))
        .route("/api/odds", get(odds_handler))
        .route("/api/weather/:venue", get(weather_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn not_found(what: String) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, what)
}

async fn health_handler() -> &'static str {
    "ok"
}

// ── Heatmap ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQuery {
    pub home: String,
    pub away: String,
    pub home_goals: Option<f64>,
    pub away_goals: Option<f64>,
}

/// Where a strength signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    /// Supplied by the caller.
    Explicit,
    /// Recent goals scored, from the momentum table.
    Momentum,
    /// No data; strength defaults to zero.
    Missing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapView {
    pub signals: MatchSignals,
    pub home_signal_source: SignalSource,
    pub away_signal_source: SignalSource,
    #[serde(flatten)]
    pub distribution: ScorelineDistribution,
    pub degenerate: bool,
    pub palette: Vec<CellStyle>,
}

fn strength_signal(state: &AppState, team: &str, explicit: Option<f64>) -> (f64, SignalSource) {
    if let Some(v) = explicit {
        return (v, SignalSource::Explicit);
    }
    match state.momentum.lookup(team) {
        Some(m) => (f64::from(m.goals_scored_total()), SignalSource::Momentum),
        None => (0.0, SignalSource::Missing),
    }
}

/// GET /api/heatmap?home=..&away=..&homeGoals=..&awayGoals=..
async fn heatmap_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HeatmapQuery>,
) -> Json<HeatmapView> {
    let (home_strength, home_signal_source) = strength_signal(&state, &q.home, q.home_goals);
    let (away_strength, away_signal_source) = strength_signal(&state, &q.away, q.away_goals);
    let signals = MatchSignals::new(q.home, q.away, home_strength, away_strength);

    let distribution = generate(&signals, state.bounds);
    let degenerate = distribution.is_degenerate();
    if degenerate {
        warn!(
            "Degenerate outcome priors for {} vs {}: draw probability {:.3}",
            signals.home_team, signals.away_team, distribution.draw_probability
        );
    }
    debug!(
        "Heatmap {} vs {}: most likely {}-{}",
        signals.home_team,
        signals.away_team,
        distribution.most_likely_score.home,
        distribution.most_likely_score.away
    );

    Json(HeatmapView {
        palette: cell_styles(&distribution),
        signals,
        home_signal_source,
        away_signal_source,
        distribution,
        degenerate,
    })
}

// ── Calibration ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationSummary {
    #[serde(flatten)]
    pub record: CalibrationRecord,
    pub status: &'static str,
    pub advice: &'static str,
}

/// GET /api/calibration/:model
async fn calibration_handler(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> ApiResult<CalibrationSummary> {
    let record = state
        .calibration
        .lookup(&model)
        .ok_or_else(|| not_found(format!("no calibration data for model '{}'", model)))?;
    Ok(Json(CalibrationSummary {
        status: assess(record.assessment.calibration_score()).label(),
        advice: advise(&record.assessment),
        record,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CalibrateQuery {
    pub raw: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibratedConfidence {
    pub model_id: String,
    pub raw_confidence: f64,
    pub calibrated_confidence: f64,
    /// False when the model has no curve and the raw value was passed through.
    pub known_model: bool,
}

/// GET /api/calibration/:model/calibrate?raw=72
async fn calibrate_handler(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    Query(q): Query<CalibrateQuery>,
) -> ApiResult<CalibratedConfidence> {
    if !q.raw.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("raw confidence must be a finite number, got {}", q.raw),
        ));
    }
    let known_model = state.calibration.lookup(&model).is_some();
    let calibrated_confidence = calibrate(&*state.calibration, &model, q.raw);
    Ok(Json(CalibratedConfidence {
        model_id: model,
        raw_confidence: q.raw,
        calibrated_confidence,
        known_model,
    }))
}

// ── External lookups ─────────────────────────────────────────────────────────

/// GET /api/momentum/:team
async fn momentum_handler(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
) -> ApiResult<MomentumData> {
    state
        .momentum
        .lookup(&team)
        .map(Json)
        .ok_or_else(|| not_found(format!("no momentum data for '{}'", team)))
}

#[derive(Debug, Deserialize)]
pub struct FixtureQuery {
    pub home: String,
    pub away: String,
}

/// GET /api/head-to-head?home=..&away=..
async fn head_to_head_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FixtureQuery>,
) -> ApiResult<HeadToHeadStats> {
    let fixture = Fixture::new(q.home, q.away);
    state.head_to_head.lookup(&fixture).map(Json).ok_or_else(|| {
        not_found(format!(
            "no head-to-head data for {} vs {}",
            fixture.home, fixture.away
        ))
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsReport {
    pub fixture: Fixture,
    pub quotes: Vec<BookmakerOdds>,
    pub comparison: OddsComparison,
}

/// GET /api/odds?home=..&away=..
async fn odds_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FixtureQuery>,
) -> ApiResult<OddsReport> {
    let fixture = Fixture::new(q.home, q.away);
    let quotes = state.odds.lookup(&fixture).unwrap_or_default();
    match compare_odds(&quotes) {
        Some(comparison) => Ok(Json(OddsReport {
            fixture,
            quotes,
            comparison,
        })),
        None => Err(not_found(format!(
            "no betting odds for {} vs {}",
            fixture.home, fixture.away
        ))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub venue: String,
    pub weather: WeatherData,
    pub impact: WeatherImpact,
}

/// GET /api/weather/:venue
async fn weather_handler(
    State(state): State<Arc<AppState>>,
    Path(venue): Path<String>,
) -> ApiResult<WeatherReport> {
    let weather = state
        .weather
        .lookup(&venue)
        .ok_or_else(|| not_found(format!("no weather data for '{}'", venue)))?;
    Ok(Json(WeatherReport {
        impact: weather_impact(&weather),
        venue,
        weather,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state() -> State<Arc<AppState>> {
        State(Arc::new(AppState::with_builtin_tables(GridBounds::default())))
    }

    fn heatmap_query(home: &str, away: &str, goals: Option<(f64, f64)>) -> Query<HeatmapQuery> {
        Query(HeatmapQuery {
            home: home.into(),
            away: away.into(),
            home_goals: goals.map(|g| g.0),
            away_goals: goals.map(|g| g.1),
        })
    }

    #[tokio::test]
    async fn heatmap_uses_explicit_goals() {
        let query = heatmap_query("TeamA", "TeamB", Some((4.0, 0.0)));
        let Json(view) = heatmap_handler(state(), query).await;
        assert_eq!(view.home_signal_source, SignalSource::Explicit);
        assert_relative_eq!(view.distribution.home_win_probability, 0.57, epsilon = 1e-9);
        assert_eq!(view.palette.len(), 36);
        assert!(!view.degenerate);
        assert!(view.distribution.normalized);
    }

    #[tokio::test]
    async fn heatmap_falls_back_to_momentum_then_zero() {
        let Json(view) =
            heatmap_handler(state(), heatmap_query("Manchester City", "Nowhere FC", None)).await;
        assert_eq!(view.home_signal_source, SignalSource::Momentum);
        assert_eq!(view.away_signal_source, SignalSource::Missing);
        assert_relative_eq!(view.signals.home_strength, 13.0);
        assert_relative_eq!(view.signals.away_strength, 0.0);
        // 13 goals → 6.5 → clamped to the grid edge.
        assert_eq!(view.distribution.most_likely_score.home, 5);
        assert_relative_eq!(view.distribution.total_probability(), 1.0, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn heatmap_view_serializes_flat() {
        let Json(view) = heatmap_handler(state(), heatmap_query("A", "B", Some((2.0, 2.0)))).await;
        let v = serde_json::to_value(&view).expect("serialize");
        assert_eq!(v["maxX"], 5);
        assert_eq!(v["homeSignalSource"], "explicit");
        assert_eq!(v["signals"]["homeTeam"], "A");
        assert!(v["palette"][0]["color"].as_str().unwrap_or_default().starts_with("rgb("));
    }

    #[tokio::test]
    async fn calibration_summary_for_known_model() {
        let Json(summary) =
            calibration_handler(state(), Path("random_forest".to_string())).await.expect("known");
        assert_eq!(summary.status, "Moderately miscalibrated");
        assert!(summary.advice.contains("underconfident"));
    }

    #[tokio::test]
    async fn calibration_summary_for_unknown_model_is_404() {
        let err = calibration_handler(state(), Path("unknown_model_xyz".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn calibrate_known_and_unknown() {
        let Json(known) = calibrate_handler(
            state(),
            Path("logistic_regression".to_string()),
            Query(CalibrateQuery { raw: 72.0 }),
        )
        .await
        .expect("calibrated");
        assert!(known.known_model);
        assert_relative_eq!(known.calibrated_confidence, 80.0);

        let Json(unknown) = calibrate_handler(
            state(),
            Path("unknown_model_xyz".to_string()),
            Query(CalibrateQuery { raw: 73.0 }),
        )
        .await
        .expect("passthrough");
        assert!(!unknown.known_model);
        assert_relative_eq!(unknown.calibrated_confidence, 73.0);
    }

    #[tokio::test]
    async fn calibrate_rejects_non_finite_raw() {
        let err = calibrate_handler(
            state(),
            Path("neural_network".to_string()),
            Query(CalibrateQuery { raw: f64::NAN }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lookups_return_data_or_404() {
        let Json(arsenal) = momentum_handler(state(), Path("Arsenal".to_string()))
            .await
            .expect("arsenal");
        assert_eq!(arsenal.momentum_score, 80);
        assert!(momentum_handler(state(), Path("Everton".to_string())).await.is_err());

        let Json(h2h) = head_to_head_handler(
            state(),
            Query(FixtureQuery {
                home: "Liverpool".into(),
                away: "Manchester United".into(),
            }),
        )
        .await
        .expect("reverse pairing");
        assert_eq!(h2h.home_wins, 3);

        let Json(report) = weather_handler(state(), Path("Allianz Arena".to_string()))
            .await
            .expect("allianz");
        assert!(report.impact.recommendation.starts_with("Moderate"));
        let err = weather_handler(state(), Path("Anfield".to_string())).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn odds_follow_the_requested_sides() {
        let query = |home: &str, away: &str| {
            Query(FixtureQuery {
                home: home.into(),
                away: away.into(),
            })
        };
        let Json(report) = odds_handler(state(), query("Manchester City", "Chelsea"))
            .await
            .expect("stored pairing");
        assert_eq!(report.quotes.len(), 3);
        assert_eq!(report.comparison.home_win.best_bookmaker, "Sky Bet");
        assert_relative_eq!(report.comparison.home_win.best_odds, 1.48);

        let Json(reverse) = odds_handler(state(), query("Chelsea", "Manchester City"))
            .await
            .expect("reverse pairing");
        assert_relative_eq!(reverse.comparison.away_win.best_odds, 1.48);
        assert_relative_eq!(
            reverse.comparison.implied_probabilities.home_win,
            report.comparison.implied_probabilities.away_win
        );

        let err = odds_handler(state(), query("Arsenal", "Chelsea")).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
