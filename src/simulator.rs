//! Full-field race simulation.

use crate::model::{clamp_grid_position, Circuit, Driver, RaceResult, RaceStatus, TrackConditions};
use crate::predictor::base_score;
use log::debug;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Championship points for finishing ranks 1..=10.
pub const POINTS_TABLE: [u32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];

/// Default calculation parameters
pub mod defaults {
    pub const NON_FINISH_RATE: f64 = 0.05;
    pub const DSQ_SHARE: f64 = 0.5;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    NoDrivers,
    InvalidProbability { name: &'static str, value: f64 },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::NoDrivers => write!(f, "No drivers loaded, upload driver data first"),
            SimulationError::InvalidProbability { name, value } => {
                write!(f, "{} must be between 0 and 1, got {}", name, value)
            }
        }
    }
}

impl std::error::Error for SimulationError {}

/// Tunables for the race outcome model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Probability a driver does not finish at all.
    pub non_finish_rate: f64,
    /// Share of non-finishers classified DSQ rather than DNF.
    pub dsq_share: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            non_finish_rate: defaults::NON_FINISH_RATE,
            dsq_share: defaults::DSQ_SHARE,
        }
    }
}

/// Points for a finisher at 1-based `rank`.
pub fn points_for_rank(rank: usize) -> u32 {
    rank.checked_sub(1)
        .and_then(|i| POINTS_TABLE.get(i))
        .copied()
        .unwrap_or(0)
}

struct Entry<'a> {
    driver: &'a Driver,
    predicted_position: u32,
    lap_time: f64,
    status: RaceStatus,
}

fn probability(name: &'static str, value: f64) -> Result<Bernoulli, SimulationError> {
    Bernoulli::new(value).map_err(|_| SimulationError::InvalidProbability { name, value })
}

/// Simulate one race for the whole field.
///
/// Finishers are ranked by their jittered predicted position. Equal positions
/// keep the order the drivers were given in. Non-finishers follow in input
/// order with no points and a zero gap.
pub fn simulate_race<R: Rng + ?Sized>(
    drivers: &[Driver],
    circuit: &Circuit,
    conditions: &TrackConditions,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Vec<RaceResult>, SimulationError> {
    if drivers.is_empty() {
        return Err(SimulationError::NoDrivers);
    }
    let retires = probability("Non-finish rate", config.non_finish_rate)?;
    let disqualified = probability("DSQ share", config.dsq_share)?;

    let weather = conditions.weather_impact();
    let weather_lap_factor = 1.0 + weather;

    let entries: Vec<Entry> = drivers
        .iter()
        .map(|driver| {
            let jitter = rng.random_range(-1.0..1.0);
            let predicted_position = clamp_grid_position(base_score(driver, circuit) + weather + jitter);
            let lap_time = circuit.base_lap_time() * driver.pace_factor() * weather_lap_factor;
            let status = if retires.sample(rng) {
                if disqualified.sample(rng) {
                    RaceStatus::Dsq
                } else {
                    RaceStatus::Dnf
                }
            } else {
                RaceStatus::Finished
            };
            Entry {
                driver,
                predicted_position,
                lap_time,
                status,
            }
        })
        .collect();

    let (mut finishers, retired): (Vec<Entry>, Vec<Entry>) =
        entries.into_iter().partition(|e| e.status.is_finished());
    // stable: ties stay in input order
    finishers.sort_by_key(|e| e.predicted_position);

    let leader_time = finishers.first().map(|e| e.lap_time);
    debug!(
        "Simulated {} drivers on {}: {} finished, {} retired",
        drivers.len(),
        circuit.name,
        finishers.len(),
        retired.len()
    );

    let results = finishers
        .into_iter()
        .chain(retired)
        .enumerate()
        .map(|(idx, e)| {
            let rank = idx + 1;
            let (points, gap_to_leader) = match (e.status, leader_time) {
                (RaceStatus::Finished, Some(leader)) => (points_for_rank(rank), e.lap_time - leader),
                _ => (0, 0.0),
            };
            RaceResult {
                driver: e.driver.clone(),
                position: rank as u32,
                points,
                lap_time: e.lap_time,
                gap_to_leader,
                status: e.status,
            }
        })
        .collect();

    Ok(results)
}

/// Headline figures for a finished race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceSummary {
    pub fastest_lap_driver: String,
    pub fastest_lap: f64,
    pub average_gap: f64,
    /// Finisher whose gap is closest to the average gap.
    pub most_consistent: Driver,
    pub finished: usize,
    pub dnf: usize,
    pub dsq: usize,
    /// (driver name, points) in finishing order.
    pub points_scorers: Vec<(String, u32)>,
}

/// Returns `None` when nobody finished.
pub fn summarize(results: &[RaceResult]) -> Option<RaceSummary> {
    let finishers: Vec<&RaceResult> = results.iter().filter(|r| r.status.is_finished()).collect();
    let fastest = finishers
        .iter()
        .copied()
        .min_by(|a, b| a.lap_time.total_cmp(&b.lap_time))?;

    let average_gap =
        finishers.iter().map(|r| r.gap_to_leader).sum::<f64>() / finishers.len() as f64;
    let most_consistent = finishers.iter().copied().fold(finishers[0], |best, current| {
        if (current.gap_to_leader - average_gap).abs() < (best.gap_to_leader - average_gap).abs() {
            current
        } else {
            best
        }
    });

    let count = |status: RaceStatus| results.iter().filter(|r| r.status == status).count();

    Some(RaceSummary {
        fastest_lap_driver: fastest.driver.name.clone(),
        fastest_lap: fastest.lap_time,
        average_gap,
        most_consistent: most_consistent.driver.clone(),
        finished: finishers.len(),
        dnf: count(RaceStatus::Dnf),
        dsq: count(RaceStatus::Dsq),
        points_scorers: results
            .iter()
            .filter(|r| r.points > 0)
            .map(|r| (r.driver.name.clone(), r.points))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::circuit_catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(n: usize) -> Vec<Driver> {
        (0..n)
            .map(|i| Driver {
                id: format!("driver-{}", i),
                name: format!("Driver {}", i),
                team: "Independent".to_string(),
                f2_position: Some((i % 20) as u32 + 1),
                f3_position: None,
                wins: 0,
                podiums: 0,
                poles: 0,
                avg_finish: 2.0 + i as f64,
                consistency: 0.75,
                crash_rate: 0.05,
            })
            .collect()
    }

    fn run(drivers: &[Driver], seed: u64, config: &SimulationConfig) -> Vec<RaceResult> {
        let circuit = &circuit_catalog()[0];
        let mut rng = StdRng::seed_from_u64(seed);
        simulate_race(drivers, circuit, &TrackConditions::default(), config, &mut rng).unwrap()
    }

    #[test]
    fn empty_field_is_rejected() {
        let circuit = &circuit_catalog()[0];
        let mut rng = StdRng::seed_from_u64(0);
        let err = simulate_race(
            &[],
            circuit,
            &TrackConditions::default(),
            &SimulationConfig::default(),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, SimulationError::NoDrivers);
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let circuit = &circuit_catalog()[0];
        let mut rng = StdRng::seed_from_u64(0);
        let config = SimulationConfig {
            non_finish_rate: 1.5,
            ..SimulationConfig::default()
        };
        let err = simulate_race(&field(3), circuit, &TrackConditions::default(), &config, &mut rng);
        assert!(matches!(err, Err(SimulationError::InvalidProbability { .. })));
    }

    #[test]
    fn positions_are_a_permutation_and_finishers_lead() {
        let drivers = field(24);
        for seed in 0..50 {
            let results = run(&drivers, seed, &SimulationConfig::default());
            assert_eq!(results.len(), drivers.len());
            let mut positions: Vec<u32> = results.iter().map(|r| r.position).collect();
            positions.sort();
            assert_eq!(positions, (1..=24).collect::<Vec<u32>>());

            let first_retired = results.iter().position(|r| !r.status.is_finished());
            if let Some(idx) = first_retired {
                assert!(results[idx..].iter().all(|r| !r.status.is_finished()));
            }
        }
    }

    #[test]
    fn points_follow_table_and_leader_has_no_gap() {
        let drivers = field(14);
        let config = SimulationConfig {
            non_finish_rate: 0.0,
            ..SimulationConfig::default()
        };
        let results = run(&drivers, 42, &config);
        let points: Vec<u32> = results.iter().map(|r| r.points).collect();
        assert_eq!(points, vec![25, 18, 15, 12, 10, 8, 6, 4, 2, 1, 0, 0, 0, 0]);
        assert_eq!(results[0].position, 1);
        assert_eq!(results[0].gap_to_leader, 0.0);
        for r in &results {
            assert!((r.gap_to_leader - (r.lap_time - results[0].lap_time)).abs() < 1e-9);
        }
    }

    #[test]
    fn non_finishers_score_nothing() {
        let drivers = field(10);
        let config = SimulationConfig {
            non_finish_rate: 1.0,
            ..SimulationConfig::default()
        };
        let results = run(&drivers, 3, &config);
        assert!(results.iter().all(|r| !r.status.is_finished()));
        assert!(results.iter().all(|r| r.points == 0 && r.gap_to_leader == 0.0));
        // retirements keep input order
        let ids: Vec<&str> = results.iter().map(|r| r.driver.id.as_str()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("driver-{}", i)).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(summarize(&results).is_none());
    }

    #[test]
    fn equal_drivers_keep_input_order() {
        // All drivers clamp to P20 whatever the jitter.
        let mut drivers = field(6);
        for d in &mut drivers {
            d.f2_position = Some(20);
            d.crash_rate = 1.0;
            d.consistency = 0.0;
        }
        let config = SimulationConfig {
            non_finish_rate: 0.0,
            ..SimulationConfig::default()
        };
        let results = run(&drivers, 17, &config);
        let ids: Vec<&str> = results.iter().map(|r| r.driver.id.as_str()).collect();
        assert_eq!(ids, vec!["driver-0", "driver-1", "driver-2", "driver-3", "driver-4", "driver-5"]);
    }

    #[test]
    fn same_seed_gives_same_race() {
        let drivers = field(20);
        let a = run(&drivers, 1234, &SimulationConfig::default());
        let b = run(&drivers, 1234, &SimulationConfig::default());
        assert_eq!(a, b);
    }

    #[test]
    fn weather_slows_every_lap() {
        let drivers = field(1);
        let circuit = &circuit_catalog()[1];
        let mut rng = StdRng::seed_from_u64(8);
        let config = SimulationConfig {
            non_finish_rate: 0.0,
            ..SimulationConfig::default()
        };
        let harsh = TrackConditions {
            temperature: 40.0,
            humidity: 100.0,
            wind_speed: -10.0,
        };
        let result = simulate_race(&drivers, circuit, &harsh, &config, &mut rng).unwrap();
        // 0.3 + 0.5 + 0.5
        let expected = circuit.base_lap_time() * drivers[0].pace_factor() * 2.3;
        assert!((result[0].lap_time - expected).abs() < 1e-9);
    }

    #[test]
    fn non_finish_rate_is_about_five_percent() {
        let drivers = field(20);
        let mut rng = StdRng::seed_from_u64(2024);
        let circuit = &circuit_catalog()[2];
        let config = SimulationConfig::default();
        let mut retired = 0usize;
        let mut total = 0usize;
        for _ in 0..2_000 {
            let results =
                simulate_race(&drivers, circuit, &TrackConditions::default(), &config, &mut rng)
                    .unwrap();
            retired += results.iter().filter(|r| !r.status.is_finished()).count();
            total += results.len();
        }
        let rate = retired as f64 / total as f64;
        assert!((0.04..0.06).contains(&rate), "non-finish rate {}", rate);
    }

    #[test]
    fn points_lookup_outside_table_is_zero() {
        assert_eq!(points_for_rank(0), 0);
        assert_eq!(points_for_rank(1), 25);
        assert_eq!(points_for_rank(10), 1);
        assert_eq!(points_for_rank(11), 0);
    }

    #[test]
    fn summary_reports_fastest_and_counts() {
        let drivers = field(5);
        let config = SimulationConfig {
            non_finish_rate: 0.0,
            ..SimulationConfig::default()
        };
        let results = run(&drivers, 9, &config);
        let summary = summarize(&results).unwrap();
        assert_eq!(summary.finished, 5);
        assert_eq!(summary.dnf + summary.dsq, 0);
        // lowest avg_finish gives the quickest lap
        assert_eq!(summary.fastest_lap_driver, "Driver 0");
        assert_eq!(summary.points_scorers.len(), 5);
        assert_eq!(summary.points_scorers[0].1, 25);
    }
}
