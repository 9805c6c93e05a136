//! Web Worker agent that runs the field simulation off the UI thread.

use crate::model::{Circuit, Driver, RaceResult, TrackConditions};
use crate::simulator::{simulate_race, SimulationConfig};
use futures::sink::SinkExt;
use futures::StreamExt;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use yew_agent::reactor::{reactor, ReactorScope};

/// Everything one race needs, sent from the UI to the worker.
#[derive(Serialize, Deserialize, Clone)]
pub struct SimulationArgs {
    pub drivers: Vec<Driver>,
    pub circuit: Circuit,
    pub conditions: TrackConditions,
    pub config: SimulationConfig,
    /// Same seed and inputs give the same race.
    pub seed: u64,
}

pub type SimulationOutput = Result<Vec<RaceResult>, String>;

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Run one simulation request; used by the reactor and callable directly.
pub fn run_simulation(args: &SimulationArgs) -> SimulationOutput {
    let start = now_ms();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let results = simulate_race(
        &args.drivers,
        &args.circuit,
        &args.conditions,
        &args.config,
        &mut rng,
    )
    .map_err(|e| e.to_string())?;
    info!(
        "Race on {} with seed {} simulated in {:.1} ms",
        args.circuit.name,
        args.seed,
        now_ms() - start
    );
    Ok(results)
}

/// Worker reactor that answers each `SimulationArgs` with a full result list.
#[reactor]
pub async fn SimulationTask(mut scope: ReactorScope<SimulationArgs, SimulationOutput>) {
    while let Some(args) = scope.next().await {
        let res = run_simulation(&args);

        // abort loop if all bridges dropped
        if scope.send(res).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::sample_drivers;
    use crate::model::circuit_catalog;

    fn args(drivers: Vec<Driver>, seed: u64) -> SimulationArgs {
        SimulationArgs {
            drivers,
            circuit: circuit_catalog().remove(3),
            conditions: TrackConditions::default(),
            config: SimulationConfig::default(),
            seed,
        }
    }

    #[test]
    fn seeded_runs_repeat() {
        let a = run_simulation(&args(sample_drivers(), 77)).unwrap();
        let b = run_simulation(&args(sample_drivers(), 77)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn errors_become_messages() {
        let err = run_simulation(&args(Vec::new(), 1)).unwrap_err();
        assert!(err.contains("No drivers"));
    }
}
