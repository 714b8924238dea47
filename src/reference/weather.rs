//! Venue weather and its expected effect on match quality.

use serde::{Deserialize, Serialize};

use super::StaticTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Celsius.
    pub temperature: f64,
    /// Percent.
    pub humidity: f64,
    /// km/h.
    pub wind_speed: f64,
    /// mm.
    pub precipitation: f64,
    pub weather_condition: WeatherCondition,
    /// hPa.
    pub pressure: f64,
}

/// Impacts range over [-1, 1]; negative means a disadvantage or lower match quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherImpact {
    pub home_team_impact: f64,
    pub away_team_impact: f64,
    pub overall_impact: f64,
    pub recommendation: String,
}

/// Penalty applied to both sides for the given conditions.
fn shared_penalty(weather: &WeatherData) -> f64 {
    let mut penalty = 0.0;

    if weather.temperature < 5.0 {
        penalty += 0.1;
    } else if weather.temperature > 25.0 {
        penalty += 0.05;
    }

    if weather.wind_speed > 20.0 {
        penalty += 0.15;
    } else if weather.wind_speed > 10.0 {
        penalty += 0.05;
    }

    penalty += match weather.weather_condition {
        WeatherCondition::Rainy => 0.2,
        WeatherCondition::Stormy => 0.3,
        WeatherCondition::Snowy => 0.35,
        WeatherCondition::Sunny | WeatherCondition::Cloudy => 0.0,
    };

    // Stamina
    if weather.humidity > 85.0 {
        penalty += 0.1;
    }
    // Ball flight
    if weather.pressure < 1000.0 {
        penalty += 0.05;
    }

    penalty
}

fn recommendation(overall: f64) -> &'static str {
    if overall < -0.3 {
        "Significant weather impact expected. Match quality may be reduced."
    } else if overall < -0.1 {
        "Moderate weather impact. Some effect on play expected."
    } else if overall > 0.1 {
        "Favorable weather conditions. Good match quality expected."
    } else {
        "Neutral weather conditions. Normal match quality expected."
    }
}

/// Estimate how the conditions affect each side and the match overall.
pub fn weather_impact(weather: &WeatherData) -> WeatherImpact {
    let penalty = shared_penalty(weather);
    let home = -penalty;
    let away = -penalty;
    let overall = (home + away) / 2.0;
    WeatherImpact {
        home_team_impact: home,
        away_team_impact: away,
        overall_impact: overall,
        recommendation: recommendation(overall).to_string(),
    }
}

fn venue(
    name: &str,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    precipitation: f64,
    weather_condition: WeatherCondition,
    pressure: f64,
) -> (String, WeatherData) {
    (
        name.to_string(),
        WeatherData {
            temperature,
            humidity,
            wind_speed,
            precipitation,
            weather_condition,
            pressure,
        },
    )
}

/// Fixed weather table for the venues in the reference data.
pub fn builtin() -> StaticTable<WeatherData> {
    use WeatherCondition::{Cloudy, Rainy, Sunny};

    StaticTable::new(
        "builtin-weather",
        [
            venue("Old Trafford", 15.0, 75.0, 12.0, 2.5, Cloudy, 1013.0),
            venue("Wembley Stadium", 18.0, 65.0, 8.0, 0.0, Sunny, 1015.0),
            venue("Camp Nou", 22.0, 60.0, 5.0, 0.0, Sunny, 1018.0),
            venue("Santiago Bernabeu", 20.0, 55.0, 7.0, 0.0, Sunny, 1016.0),
            venue("Allianz Arena", 12.0, 80.0, 15.0, 5.2, Rainy, 1008.0),
            venue("Signal Iduna Park", 14.0, 70.0, 10.0, 1.0, Cloudy, 1012.0),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceSource;
    use approx::assert_relative_eq;

    fn conditions(
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        weather_condition: WeatherCondition,
        pressure: f64,
    ) -> WeatherData {
        WeatherData {
            temperature,
            humidity,
            wind_speed,
            precipitation: 0.0,
            weather_condition,
            pressure,
        }
    }

    #[test]
    fn calm_sunny_day_is_neutral() {
        let wembley = builtin().lookup("Wembley Stadium").expect("wembley");
        let impact = weather_impact(&wembley);
        assert_relative_eq!(impact.overall_impact, 0.0);
        assert!(impact.recommendation.starts_with("Neutral"));
    }

    #[test]
    fn rain_and_wind_is_moderate() {
        let allianz = builtin().lookup("Allianz Arena").expect("allianz");
        let impact = weather_impact(&allianz);
        assert_relative_eq!(impact.home_team_impact, -0.25, epsilon = 1e-12);
        assert_relative_eq!(impact.away_team_impact, -0.25, epsilon = 1e-12);
        assert_relative_eq!(impact.overall_impact, -0.25, epsilon = 1e-12);
        assert!(impact.recommendation.starts_with("Moderate"));
    }

    #[test]
    fn snowstorm_conditions_stack() {
        // Cold, gale, snow, humid, low pressure.
        let w = conditions(-2.0, 90.0, 30.0, WeatherCondition::Snowy, 990.0);
        let impact = weather_impact(&w);
        assert_relative_eq!(impact.overall_impact, -0.75, epsilon = 1e-12);
        assert!(impact.recommendation.starts_with("Significant"));
    }

    #[test]
    fn heat_and_breeze_stay_neutral() {
        let w = conditions(30.0, 50.0, 12.0, WeatherCondition::Sunny, 1015.0);
        assert_relative_eq!(weather_impact(&w).overall_impact, -0.1, epsilon = 1e-12);
        // -0.1 is not below -0.1
        assert!(weather_impact(&w).recommendation.starts_with("Neutral"));
    }

    #[test]
    fn unknown_venue_is_no_data() {
        assert!(builtin().lookup("Anfield").is_none());
    }
}
