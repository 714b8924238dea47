pub mod calibration;
pub mod scoreline;

pub use calibration::{
    advise, assess, calibrate, CalibrationAssessment, CalibrationCurve, CalibrationDataError,
    CalibrationRecord, CalibrationStatus, CurvePoint,
};
pub use scoreline::{
    generate, generate_with_priors, GridBounds, MatchSignals, OutcomePriors, PriorsError,
    Scoreline, ScorelineCell, ScorelineDistribution,
};
