//! Core data types shared by the predictor, the field simulator and the UI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid position used when a driver has no F2 championship result.
pub const DEFAULT_BASE_POSITION: u32 = 10;

/// Track conditions the simulator treats as neutral for temperature.
pub const REFERENCE_TEMPERATURE: f64 = 25.0;

/// A junior-series driver record, created from an upload or the sample set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub team: String,
    pub f2_position: Option<u32>,
    pub f3_position: Option<u32>,
    pub wins: u32,
    pub podiums: u32,
    pub poles: u32,
    pub avg_finish: f64,
    /// 0.0 ..= 1.0
    pub consistency: f64,
    /// 0.0 ..= 1.0
    pub crash_rate: f64,
}

impl Driver {
    /// Championship position the formulas start from.
    pub fn base_position(&self) -> u32 {
        self.f2_position.unwrap_or(DEFAULT_BASE_POSITION)
    }

    /// Multiplier applied to circuit sector times for this driver.
    pub fn pace_factor(&self) -> f64 {
        1.0 + self.avg_finish / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub id: String,
    pub name: String,
    pub country: String,
    pub length_km: f64,
    pub corners: u32,
    pub top_speed_kph: u32,
    /// Base sector times in seconds.
    pub sector_times: [f64; 3],
}

impl Circuit {
    fn new(
        id: &str,
        name: &str,
        country: &str,
        length_km: f64,
        corners: u32,
        top_speed_kph: u32,
        sector_times: [f64; 3],
    ) -> Self {
        Circuit {
            id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            length_km,
            corners,
            top_speed_kph,
            sector_times,
        }
    }

    /// Sum of the three base sector times.
    pub fn base_lap_time(&self) -> f64 {
        self.sector_times.iter().sum()
    }

    pub fn circuit_factor(&self) -> f64 {
        self.corners as f64 / 20.0
    }
}

/// The fixed circuit catalog offered to the user.
pub fn circuit_catalog() -> Vec<Circuit> {
    vec![
        Circuit::new(
            "bahrain",
            "Bahrain International Circuit",
            "Bahrain",
            5.412,
            15,
            322,
            [28.5, 35.2, 27.8],
        ),
        Circuit::new(
            "monaco",
            "Circuit de Monaco",
            "Monaco",
            3.337,
            19,
            290,
            [26.1, 31.4, 25.2],
        ),
        Circuit::new(
            "silverstone",
            "Silverstone Circuit",
            "United Kingdom",
            5.891,
            18,
            332,
            [30.2, 38.5, 29.1],
        ),
        Circuit::new(
            "monza",
            "Autodromo Nazionale di Monza",
            "Italy",
            5.793,
            11,
            360,
            [27.8, 36.9, 28.3],
        ),
        Circuit::new(
            "spa",
            "Circuit de Spa-Francorchamps",
            "Belgium",
            7.004,
            19,
            340,
            [35.2, 42.1, 34.7],
        ),
    ]
}

/// User-adjustable weather on race day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackConditions {
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// km/h, negative values are a headwind
    pub wind_speed: f64,
}

impl Default for TrackConditions {
    fn default() -> Self {
        TrackConditions {
            temperature: 25.0,
            humidity: 50.0,
            wind_speed: 5.0,
        }
    }
}

impl TrackConditions {
    pub fn temperature_factor(&self) -> f64 {
        (self.temperature - REFERENCE_TEMPERATURE).abs() / 50.0
    }

    pub fn humidity_factor(&self) -> f64 {
        self.humidity / 200.0
    }

    pub fn wind_factor(&self) -> f64 {
        self.wind_speed.abs() / 20.0
    }

    /// Combined slowdown from all three weather terms.
    pub fn weather_impact(&self) -> f64 {
        self.temperature_factor() + self.humidity_factor() + self.wind_factor()
    }
}

/// Weather sampled by the single-driver predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub driver_id: String,
    pub circuit_id: String,
    pub predicted_position: u32,
    pub qualifying_position: u32,
    pub predicted_points: f64,
    pub confidence: f64,
    pub lap_time: f64,
    pub sector_times: [f64; 3],
    pub weather: WeatherSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceStatus {
    Finished,
    #[serde(rename = "DNF")]
    Dnf,
    #[serde(rename = "DSQ")]
    Dsq,
}

impl RaceStatus {
    pub fn is_finished(self) -> bool {
        self == RaceStatus::Finished
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceStatus::Finished => write!(f, "Finished"),
            RaceStatus::Dnf => write!(f, "DNF"),
            RaceStatus::Dsq => write!(f, "DSQ"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub driver: Driver,
    pub position: u32,
    pub points: u32,
    pub lap_time: f64,
    pub gap_to_leader: f64,
    pub status: RaceStatus,
}

/// Round half toward positive infinity, then clamp onto a 20-car grid.
pub(crate) fn clamp_grid_position(raw: f64) -> u32 {
    (raw + 0.5).floor().clamp(1.0, 20.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_five_distinct_circuits() {
        let catalog = circuit_catalog();
        assert_eq!(catalog.len(), 5);
        let mut ids: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn base_lap_time_sums_sectors() {
        let monza = circuit_catalog()
            .into_iter()
            .find(|c| c.id == "monza")
            .unwrap();
        assert!((monza.base_lap_time() - 93.0).abs() < 1e-9);
    }

    #[test]
    fn neutral_conditions_only_carry_humidity_and_wind() {
        let conditions = TrackConditions::default();
        assert_eq!(conditions.temperature_factor(), 0.0);
        assert!((conditions.weather_impact() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn grid_position_rounds_half_up_and_clamps() {
        assert_eq!(clamp_grid_position(0.15), 1);
        assert_eq!(clamp_grid_position(-3.0), 1);
        assert_eq!(clamp_grid_position(2.5), 3);
        assert_eq!(clamp_grid_position(7.49), 7);
        assert_eq!(clamp_grid_position(42.0), 20);
    }

    #[test]
    fn status_serializes_with_short_codes() {
        assert_eq!(serde_json::to_string(&RaceStatus::Dnf).unwrap(), "\"DNF\"");
        assert_eq!(RaceStatus::Dsq.to_string(), "DSQ");
    }
}
