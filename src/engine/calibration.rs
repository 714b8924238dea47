//! Confidence calibration against fixed per-model reference curves.
//!
//! A model's self-reported confidence is replaced with the accuracy it
//! historically achieved at the nearest tabulated confidence level. The
//! lookup is a step function: there is no interpolation between levels.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::reference::ReferenceSource;

/// Problems found while building calibration reference data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationDataError {
    #[error("calibration curve has no points")]
    Empty,
    #[error("{levels} confidence levels but {rates} accuracy rates")]
    LengthMismatch { levels: usize, rates: usize },
    #[error("confidence level {0} is outside 0..=100")]
    LevelOutOfRange(u8),
    #[error("accuracy {0} is outside 0..=100")]
    AccuracyOutOfRange(f64),
    #[error("confidence levels must be strictly increasing ({prev} then {next})")]
    NotIncreasing { prev: u8, next: u8 },
    #[error("calibration score {0} must be a non-negative number")]
    InvalidScore(f64),
    #[error("model `{0}` cannot be both over- and under-confident")]
    ConflictingBias(String),
}

/// One tabulated level: stated confidence → observed accuracy (both in percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub confidence: u8,
    pub accuracy: f64,
}

/// Calibration curve for one model, strictly increasing in confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CalibrationCurve {
    points: Vec<CurvePoint>,
}

impl CalibrationCurve {
    /// Pair `levels` with `accuracy_rates`, validating the curve invariants.
    pub fn new(levels: &[u8], accuracy_rates: &[f64]) -> Result<Self, CalibrationDataError> {
        if levels.len() != accuracy_rates.len() {
            return Err(CalibrationDataError::LengthMismatch {
                levels: levels.len(),
                rates: accuracy_rates.len(),
            });
        }
        if levels.is_empty() {
            return Err(CalibrationDataError::Empty);
        }

        let mut points = Vec::with_capacity(levels.len());
        let mut prev: Option<u8> = None;
        for (&confidence, &accuracy) in levels.iter().zip(accuracy_rates) {
            if confidence > 100 {
                return Err(CalibrationDataError::LevelOutOfRange(confidence));
            }
            if !(0.0..=100.0).contains(&accuracy) {
                return Err(CalibrationDataError::AccuracyOutOfRange(accuracy));
            }
            if let Some(prev) = prev {
                if confidence <= prev {
                    return Err(CalibrationDataError::NotIncreasing {
                        prev,
                        next: confidence,
                    });
                }
            }
            prev = Some(confidence);
            points.push(CurvePoint {
                confidence,
                accuracy,
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Level closest to `raw_confidence`. Ties keep the lower (earlier) level.
    pub fn nearest(&self, raw_confidence: f64) -> Option<CurvePoint> {
        self.points.iter().copied().reduce(|best, p| {
            let current = (f64::from(p.confidence) - raw_confidence).abs();
            let closest = (f64::from(best.confidence) - raw_confidence).abs();
            if current < closest {
                p
            } else {
                best
            }
        })
    }
}

/// Static calibration quality of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationAssessment {
    model_id: String,
    calibration_score: f64,
    over_confident: bool,
    under_confident: bool,
}

impl CalibrationAssessment {
    pub fn new(
        model_id: impl Into<String>,
        calibration_score: f64,
        over_confident: bool,
        under_confident: bool,
    ) -> Result<Self, CalibrationDataError> {
        let model_id = model_id.into();
        if !calibration_score.is_finite() || calibration_score < 0.0 {
            return Err(CalibrationDataError::InvalidScore(calibration_score));
        }
        if over_confident && under_confident {
            return Err(CalibrationDataError::ConflictingBias(model_id));
        }
        Ok(Self {
            model_id,
            calibration_score,
            over_confident,
            under_confident,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Lower is better.
    pub fn calibration_score(&self) -> f64 {
        self.calibration_score
    }

    pub fn over_confident(&self) -> bool {
        self.over_confident
    }

    pub fn under_confident(&self) -> bool {
        self.under_confident
    }
}

/// Everything the reference data holds about one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    #[serde(flatten)]
    pub assessment: CalibrationAssessment,
    pub calibration_curve: CalibrationCurve,
}

impl CalibrationRecord {
    pub fn model_id(&self) -> &str {
        self.assessment.model_id()
    }
}

/// Qualitative band of a calibration score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalibrationStatus {
    WellCalibrated,
    ReasonablyCalibrated,
    ModeratelyMiscalibrated,
    PoorlyCalibrated,
}

impl CalibrationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CalibrationStatus::WellCalibrated => "Well calibrated",
            CalibrationStatus::ReasonablyCalibrated => "Reasonably calibrated",
            CalibrationStatus::ModeratelyMiscalibrated => "Moderately miscalibrated",
            CalibrationStatus::PoorlyCalibrated => "Poorly calibrated",
        }
    }
}

impl fmt::Display for CalibrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw confidence (0–100) to the model's empirical accuracy.
///
/// Models missing from `source` pass the raw value through unchanged.
pub fn calibrate<S>(source: &S, model_id: &str, raw_confidence: f64) -> f64
where
    S: ReferenceSource<str, Record = CalibrationRecord> + ?Sized,
{
    match source.lookup(model_id) {
        Some(record) => record
            .calibration_curve
            .nearest(raw_confidence)
            .map_or(raw_confidence, |p| p.accuracy),
        None => {
            debug!(
                "No calibration curve for model '{}' in {}; using raw confidence",
                model_id,
                source.name()
            );
            raw_confidence
        }
    }
}

/// Band a calibration score. Bands are inclusive below, exclusive above.
pub fn assess(calibration_score: f64) -> CalibrationStatus {
    if calibration_score < 0.1 {
        CalibrationStatus::WellCalibrated
    } else if calibration_score < 0.2 {
        CalibrationStatus::ReasonablyCalibrated
    } else if calibration_score < 0.3 {
        CalibrationStatus::ModeratelyMiscalibrated
    } else {
        CalibrationStatus::PoorlyCalibrated
    }
}

/// Guidance for reading a model's confidence, overconfidence taking priority.
pub fn advise(assessment: &CalibrationAssessment) -> &'static str {
    if assessment.over_confident {
        "Model tends to be overconfident. Consider being more conservative with high-confidence predictions."
    } else if assessment.under_confident {
        "Model tends to be underconfident. High-confidence predictions are more reliable than indicated."
    } else {
        "Model confidence is well-calibrated. You can trust the confidence levels as reported."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::calibration::builtin;
    use crate::reference::StaticTable;
    use approx::assert_relative_eq;

    fn curve(levels: &[u8], rates: &[f64]) -> CalibrationCurve {
        CalibrationCurve::new(levels, rates).expect("valid curve")
    }

    fn single_model(levels: &[u8], rates: &[f64]) -> StaticTable<CalibrationRecord> {
        let record = CalibrationRecord {
            assessment: CalibrationAssessment::new("m", 0.1, false, false).expect("valid"),
            calibration_curve: curve(levels, rates),
        };
        StaticTable::new("test", [("m".to_string(), record)])
    }

    // ── calibrate ────────────────────────────────────────────────────────────

    #[test]
    fn unknown_model_passes_raw_confidence_through() {
        let table = builtin();
        assert_eq!(calibrate(&table, "unknown_model_xyz", 73.0), 73.0);
        assert_eq!(calibrate(&table, "", 12.5), 12.5);
    }

    #[test]
    fn nearest_level_accuracy_is_returned() {
        let table = builtin();
        // 72 is 2 from level 70 (→ 80) and 8 from level 80.
        assert_relative_eq!(calibrate(&table, "logistic_regression", 72.0), 80.0);
        assert_relative_eq!(calibrate(&table, "random_forest", 88.0), 85.0);
        assert_relative_eq!(calibrate(&table, "neural_network", 3.0), 15.0);
        assert_relative_eq!(calibrate(&table, "neural_network", 100.0), 98.0);
    }

    #[test]
    fn calibration_is_a_step_function() {
        let table = builtin();
        let a = calibrate(&table, "logistic_regression", 66.0);
        let b = calibrate(&table, "logistic_regression", 74.0);
        assert_relative_eq!(a, 80.0);
        assert_relative_eq!(b, 80.0);
    }

    #[test]
    fn ties_keep_the_lower_level() {
        let table = builtin();
        // 75 is equidistant from 70 and 80.
        assert_relative_eq!(calibrate(&table, "logistic_regression", 75.0), 80.0);
        assert_relative_eq!(calibrate(&table, "random_forest", 45.0), 35.0);

        let uneven = single_model(&[10, 30, 50], &[1.0, 2.0, 3.0]);
        assert_relative_eq!(calibrate(&uneven, "m", 20.0), 1.0);
        assert_relative_eq!(calibrate(&uneven, "m", 40.0), 2.0);
    }

    #[test]
    fn out_of_range_raw_confidence_snaps_to_curve_ends() {
        let table = single_model(&[20, 60], &[25.0, 70.0]);
        assert_relative_eq!(calibrate(&table, "m", -40.0), 25.0);
        assert_relative_eq!(calibrate(&table, "m", 250.0), 70.0);
    }

    #[test]
    fn nan_raw_confidence_keeps_first_level() {
        let table = single_model(&[20, 60], &[25.0, 70.0]);
        assert_relative_eq!(calibrate(&table, "m", f64::NAN), 25.0);
    }

    // ── curve construction ───────────────────────────────────────────────────

    #[test]
    fn curve_rejects_length_mismatch() {
        let err = CalibrationCurve::new(&[10, 20], &[5.0]).unwrap_err();
        assert_eq!(err, CalibrationDataError::LengthMismatch { levels: 2, rates: 1 });
    }

    #[test]
    fn curve_rejects_empty_and_unordered_levels() {
        assert_eq!(CalibrationCurve::new(&[], &[]).unwrap_err(), CalibrationDataError::Empty);
        assert_eq!(
            CalibrationCurve::new(&[10, 10], &[1.0, 2.0]).unwrap_err(),
            CalibrationDataError::NotIncreasing { prev: 10, next: 10 }
        );
        assert_eq!(
            CalibrationCurve::new(&[30, 20], &[1.0, 2.0]).unwrap_err(),
            CalibrationDataError::NotIncreasing { prev: 30, next: 20 }
        );
    }

    #[test]
    fn curve_rejects_out_of_range_values() {
        assert_eq!(
            CalibrationCurve::new(&[101], &[50.0]).unwrap_err(),
            CalibrationDataError::LevelOutOfRange(101)
        );
        assert_eq!(
            CalibrationCurve::new(&[50], &[100.5]).unwrap_err(),
            CalibrationDataError::AccuracyOutOfRange(100.5)
        );
    }

    #[test]
    fn assessment_rejects_conflicting_bias_and_bad_score() {
        assert_eq!(
            CalibrationAssessment::new("x", 0.2, true, true).unwrap_err(),
            CalibrationDataError::ConflictingBias("x".into())
        );
        assert!(matches!(
            CalibrationAssessment::new("x", -0.1, false, false),
            Err(CalibrationDataError::InvalidScore(_))
        ));
        assert!(CalibrationAssessment::new("x", f64::NAN, false, false).is_err());
    }

    // ── assess / advise ──────────────────────────────────────────────────────

    #[test]
    fn assess_bands() {
        assert_eq!(assess(0.08).label(), "Well calibrated");
        assert_eq!(assess(0.15).label(), "Reasonably calibrated");
        assert_eq!(assess(0.25).label(), "Moderately miscalibrated");
        assert_eq!(assess(0.35).label(), "Poorly calibrated");
    }

    #[test]
    fn assess_boundaries_belong_to_upper_band() {
        assert_eq!(assess(0.0), CalibrationStatus::WellCalibrated);
        assert_eq!(assess(0.1), CalibrationStatus::ReasonablyCalibrated);
        assert_eq!(assess(0.2), CalibrationStatus::ModeratelyMiscalibrated);
        assert_eq!(assess(0.3), CalibrationStatus::PoorlyCalibrated);
        assert_eq!(assess(0.3).to_string(), "Poorly calibrated");
    }

    #[test]
    fn advice_prefers_overconfidence() {
        let over = CalibrationAssessment::new("a", 0.3, true, false).expect("valid");
        let under = CalibrationAssessment::new("b", 0.3, false, true).expect("valid");
        let fine = CalibrationAssessment::new("c", 0.05, false, false).expect("valid");
        assert!(advise(&over).contains("overconfident"));
        assert!(advise(&under).contains("underconfident"));
        assert!(advise(&fine).contains("well-calibrated"));
    }

    #[test]
    fn record_serializes_flat() {
        let table = builtin();
        let record = table.lookup("random_forest").expect("builtin model");
        let v = serde_json::to_value(&record).expect("serialize");
        assert_eq!(v["modelId"], "random_forest");
        assert_eq!(v["underConfident"], true);
        assert_eq!(v["calibrationCurve"][0]["confidence"], 10);
        assert_eq!(v["calibrationCurve"][0]["accuracy"], 5.0);
    }
}
