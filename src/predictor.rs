//! Single-driver race prediction.
//!
//! The estimate is a fixed formula over the driver's junior-series record and
//! the circuit layout. Only the qualifying offset and the weather snapshot are
//! random, so the random source is passed in and tests can seed it.

use crate::model::{clamp_grid_position, Circuit, Driver, PredictionResult, WeatherSnapshot};
use rand::Rng;

pub const MAX_CONFIDENCE: f64 = 95.0;
const BASE_CONFIDENCE: f64 = 70.0;

/// Position score before weather and jitter: lower is better.
pub(crate) fn base_score(driver: &Driver, circuit: &Circuit) -> f64 {
    driver.base_position() as f64 - driver.consistency * 2.0 + driver.crash_rate * 10.0
        + circuit.circuit_factor()
}

/// Points estimate shown alongside a single prediction.
pub fn estimated_points(predicted_position: u32) -> f64 {
    (26.0 - predicted_position as f64 * 1.3).max(0.0)
}

pub fn confidence(driver: &Driver) -> f64 {
    (BASE_CONFIDENCE + driver.consistency * 25.0).min(MAX_CONFIDENCE)
}

/// Predict race and qualifying outcome for one driver on one circuit.
pub fn predict_driver<R: Rng + ?Sized>(
    driver: &Driver,
    circuit: &Circuit,
    rng: &mut R,
) -> PredictionResult {
    let predicted_position = clamp_grid_position(base_score(driver, circuit));

    // One of -1, 0, +1 places either side of the race prediction.
    let offset = (rng.random::<f64>() * 3.0 - 1.0).floor() as i64;
    let qualifying_position = (predicted_position as i64 + offset).max(1) as u32;

    let pace = driver.pace_factor();
    let sector_times = circuit.sector_times.map(|s| s * pace);
    let lap_time = circuit.base_lap_time() * pace;

    let weather = WeatherSnapshot {
        temperature: rng.random_range(20.0..35.0),
        humidity: rng.random_range(40.0..80.0),
        wind: rng.random_range(0.0..20.0),
    };

    PredictionResult {
        driver_id: driver.id.clone(),
        circuit_id: circuit.id.clone(),
        predicted_position,
        qualifying_position,
        predicted_points: estimated_points(predicted_position),
        confidence: confidence(driver),
        lap_time,
        sector_times,
        weather,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::circuit_catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn driver(f2: Option<u32>, consistency: f64, crash_rate: f64) -> Driver {
        Driver {
            id: "d1".to_string(),
            name: "Test Driver".to_string(),
            team: "Test Team".to_string(),
            f2_position: f2,
            f3_position: None,
            wins: 0,
            podiums: 0,
            poles: 0,
            avg_finish: 10.0,
            consistency,
            crash_rate,
        }
    }

    fn circuit_with_corners(corners: u32) -> Circuit {
        let mut circuit = circuit_catalog().remove(0);
        circuit.corners = corners;
        circuit
    }

    #[test]
    fn championship_leader_predicted_on_pole() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = predict_driver(
            &driver(Some(1), 0.9, 0.02),
            &circuit_with_corners(15),
            &mut rng,
        );
        assert_eq!(result.predicted_position, 1);
        assert!(result.qualifying_position >= 1 && result.qualifying_position <= 2);
    }

    #[test]
    fn missing_f2_position_starts_from_tenth() {
        let mut rng = StdRng::seed_from_u64(1);
        // 10 - 1.5 + 0.5 + 0.75 = 9.75
        let result = predict_driver(&driver(None, 0.75, 0.05), &circuit_with_corners(15), &mut rng);
        assert_eq!(result.predicted_position, 10);
    }

    #[test]
    fn position_stays_on_grid_for_extreme_inputs() {
        let mut rng = StdRng::seed_from_u64(3);
        let worst = predict_driver(&driver(Some(20), 0.0, 1.0), &circuit_with_corners(20), &mut rng);
        assert_eq!(worst.predicted_position, 20);
        let best = predict_driver(&driver(Some(1), 1.0, 0.0), &circuit_with_corners(0), &mut rng);
        assert_eq!(best.predicted_position, 1);
    }

    #[test]
    fn qualifying_is_within_one_place() {
        let mut rng = StdRng::seed_from_u64(99);
        let d = driver(Some(8), 0.5, 0.1);
        let c = circuit_with_corners(15);
        for _ in 0..200 {
            let result = predict_driver(&d, &c, &mut rng);
            let diff = result.qualifying_position as i64 - result.predicted_position as i64;
            assert!((-1..=1).contains(&diff));
        }
    }

    #[test]
    fn lap_and_sectors_scale_with_average_finish() {
        let mut rng = StdRng::seed_from_u64(5);
        let c = circuit_with_corners(15);
        let result = predict_driver(&driver(Some(3), 0.8, 0.05), &c, &mut rng);
        let expected_lap = c.base_lap_time() * 1.1;
        assert!((result.lap_time - expected_lap).abs() < 1e-9);
        let sector_sum: f64 = result.sector_times.iter().sum();
        assert!((sector_sum - result.lap_time).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_capped() {
        assert_eq!(confidence(&driver(None, 1.0, 0.0)), 95.0);
        assert!((confidence(&driver(None, 0.4, 0.0)) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn weather_is_sampled_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let d = driver(Some(4), 0.7, 0.1);
        let c = circuit_with_corners(12);
        for _ in 0..100 {
            let w = predict_driver(&d, &c, &mut rng).weather;
            assert!((20.0..35.0).contains(&w.temperature));
            assert!((40.0..80.0).contains(&w.humidity));
            assert!((0.0..20.0).contains(&w.wind));
        }
    }

    #[test]
    fn points_estimate_never_negative() {
        assert!((estimated_points(1) - 24.7).abs() < 1e-9);
        assert_eq!(estimated_points(20), 0.0);
    }
}
