//! Calibration reference table: the built-in curves plus a JSON loader.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use super::StaticTable;
use crate::engine::calibration::{
    CalibrationAssessment, CalibrationCurve, CalibrationDataError, CalibrationRecord,
};

/// Confidence levels shared by every built-in curve.
const LEVELS: [u8; 10] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// One model entry as stored on disk. Field names follow the JSON layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationEntry {
    pub model_id: String,
    pub confidence_levels: Vec<u8>,
    pub accuracy_rates: Vec<f64>,
    pub calibration_score: f64,
    #[serde(default)]
    pub over_confident: bool,
    #[serde(default)]
    pub under_confident: bool,
}

impl TryFrom<CalibrationEntry> for CalibrationRecord {
    type Error = CalibrationDataError;

    fn try_from(entry: CalibrationEntry) -> Result<Self, Self::Error> {
        let calibration_curve =
            CalibrationCurve::new(&entry.confidence_levels, &entry.accuracy_rates)?;
        let assessment = CalibrationAssessment::new(
            entry.model_id,
            entry.calibration_score,
            entry.over_confident,
            entry.under_confident,
        )?;
        Ok(CalibrationRecord {
            assessment,
            calibration_curve,
        })
    }
}

/// Built-in curves for the three registered prediction models.
pub fn builtin() -> StaticTable<CalibrationRecord> {
    let entries = [
        (
            "neural_network",
            [15.0, 25.0, 35.0, 45.0, 55.0, 65.0, 75.0, 85.0, 95.0, 98.0],
            0.15,
            false,
            false,
        ),
        (
            "random_forest",
            [5.0, 15.0, 25.0, 35.0, 45.0, 55.0, 65.0, 75.0, 85.0, 90.0],
            0.25,
            false,
            true,
        ),
        (
            "logistic_regression",
            [20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 95.0, 99.0],
            0.08,
            false,
            false,
        ),
    ];

    let records = entries
        .into_iter()
        .filter_map(|(model_id, rates, score, over, under)| {
            let entry = CalibrationEntry {
                model_id: model_id.to_string(),
                confidence_levels: LEVELS.to_vec(),
                accuracy_rates: rates.to_vec(),
                calibration_score: score,
                over_confident: over,
                under_confident: under,
            };
            match CalibrationRecord::try_from(entry) {
                Ok(record) => Some((model_id.to_string(), record)),
                Err(e) => {
                    warn!("Skipping built-in calibration curve '{}': {}", model_id, e);
                    None
                }
            }
        });
    StaticTable::new("builtin-calibration", records)
}

/// Parse a JSON array of [`CalibrationEntry`] into a table.
pub fn parse_table(name: &str, json: &str) -> Result<StaticTable<CalibrationRecord>> {
    let entries: Vec<CalibrationEntry> =
        serde_json::from_str(json).context("calibration table is not valid JSON")?;
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let model_id = entry.model_id.clone();
        let record = CalibrationRecord::try_from(entry)
            .with_context(|| format!("invalid calibration data for model '{}'", model_id))?;
        records.push((model_id, record));
    }
    Ok(StaticTable::new(name, records))
}

/// Load a calibration table from a JSON file.
pub fn load_table(path: &Path) -> Result<StaticTable<CalibrationRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read calibration table {}", path.display()))?;
    parse_table(&path.display().to_string(), &json)
}
