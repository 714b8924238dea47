use clap::Parser;
use std::path::PathBuf;

use crate::engine::GridBounds;

/// Largest goal bound the service will build a grid for.
pub const MAX_GRID_GOALS: u32 = 10;

/// Scoreline distribution and confidence calibration service
#[derive(Parser, Debug, Clone)]
#[command(name = "scoreline-engine", version, about)]
pub struct Config {
    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Highest home goal count on the scoreline grid
    #[arg(long, env = "MAX_HOME_GOALS", default_value = "5")]
    pub max_home_goals: u32,

    /// Highest away goal count on the scoreline grid
    #[arg(long, env = "MAX_AWAY_GOALS", default_value = "5")]
    pub max_away_goals: u32,

    /// JSON file replacing the built-in calibration curves
    #[arg(long, env = "CALIBRATION_TABLE")]
    pub calibration_table: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_GRID_GOALS).contains(&self.max_home_goals) {
            anyhow::bail!("max_home_goals must be between 1 and {}", MAX_GRID_GOALS);
        }
        if !(1..=MAX_GRID_GOALS).contains(&self.max_away_goals) {
            anyhow::bail!("max_away_goals must be between 1 and {}", MAX_GRID_GOALS);
        }
        if let Some(path) = &self.calibration_table {
            if !path.is_file() {
                anyhow::bail!("calibration table {} does not exist", path.display());
            }
        }
        Ok(())
    }

    pub fn grid_bounds(&self) -> GridBounds {
        GridBounds::new(self.max_home_goals, self.max_away_goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("scoreline-engine").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn defaults_are_valid() {
        let config = parse(&[]);
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_bounds(), GridBounds::default());
        assert!(config.calibration_table.is_none());
    }

    #[test]
    fn grid_bounds_are_capped() {
        assert!(parse(&["--max-home-goals", "11"]).validate().is_err());
        assert!(parse(&["--max-away-goals", "0"]).validate().is_err());
        let wide = parse(&["--max-home-goals", "10", "--max-away-goals", "7"]);
        assert!(wide.validate().is_ok());
        assert_eq!(wide.grid_bounds(), GridBounds::new(10, 7));
    }

    #[test]
    fn missing_calibration_table_is_rejected() {
        let config = parse(&["--calibration-table", "/nonexistent/curves.json"]);
        assert!(config.validate().is_err());
    }
}
