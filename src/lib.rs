//! Mock race predictions for junior-series drivers.
//!
//! Drivers come from an uploaded CSV, circuits from a fixed catalog. The
//! single-driver predictor and the field simulator are plain functions over
//! that data with an injected random source; the Yew front end in `main.rs`
//! only wires them to state and views.

pub mod ingest;
pub mod model;
pub mod persistence;
pub mod predictor;
pub mod simulator;
pub mod store;
pub mod worker_agent;

pub use ingest::{read_drivers_from_csv_string, sample_drivers, CsvUpload, IngestError};
pub use model::{
    circuit_catalog, Circuit, Driver, PredictionResult, RaceResult, RaceStatus, TrackConditions,
    WeatherSnapshot,
};
pub use predictor::predict_driver;
pub use simulator::{simulate_race, summarize, RaceSummary, SimulationConfig, SimulationError};
pub use store::{AppStore, RunKind, StoreAction, StoreError};
