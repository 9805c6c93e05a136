//! Application state container.
//!
//! All UI state lives in one [`AppStore`] value owned by the root component
//! through `use_reducer`. Each result type has a single writer: a run must be
//! started with [`AppStore::begin_run`] and only the matching `complete_*`
//! call can store its output and release the latch.

use crate::ingest::CsvUpload;
use crate::model::{circuit_catalog, Circuit, Driver, PredictionResult, RaceResult, TrackConditions};
use crate::persistence::{MemoryStore, PredictionStore};
use log::{info, warn};
use std::fmt;
use std::rc::Rc;
use yew::Reducible;

pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 40.0);
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);
pub const WIND_SPEED_RANGE: (f64, f64) = (-10.0, 10.0);

/// Predictions kept in the in-memory history.
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Prediction,
    Race,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Prediction => write!(f, "prediction"),
            RunKind::Race => write!(f, "race simulation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    RunInFlight(RunKind),
    MissingSelection,
    MissingCircuit,
    NoDrivers,
    UnknownDriver(String),
    UnknownCircuit(String),
    NotRunning(RunKind),
}

impl StoreError {
    /// Short heading for a user notification.
    pub fn title(&self) -> &'static str {
        match self {
            StoreError::RunInFlight(_) => "Busy",
            StoreError::MissingSelection => "Selection Required",
            StoreError::MissingCircuit => "Circuit Required",
            StoreError::NoDrivers => "No Drivers",
            StoreError::UnknownDriver(_) | StoreError::UnknownCircuit(_) => "Unknown Selection",
            StoreError::NotRunning(_) => "Run Not Active",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::RunInFlight(kind) => write!(f, "A {} is already running", kind),
            StoreError::MissingSelection => write!(f, "Please select both a driver and a circuit"),
            StoreError::MissingCircuit => write!(f, "Please select a circuit first"),
            StoreError::NoDrivers => write!(f, "Please upload driver data first"),
            StoreError::UnknownDriver(id) => write!(f, "No driver with id '{}'", id),
            StoreError::UnknownCircuit(id) => write!(f, "No circuit with id '{}'", id),
            StoreError::NotRunning(kind) => write!(f, "No {} is in progress", kind),
        }
    }
}

impl std::error::Error for StoreError {}

fn clamp_to((min, max): (f64, f64), value: f64) -> f64 {
    value.clamp(min, max)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppStore {
    drivers: Vec<Driver>,
    circuits: Vec<Circuit>,
    selected_driver: Option<String>,
    selected_circuit: Option<String>,
    track_conditions: TrackConditions,
    prediction: Option<PredictionResult>,
    race_results: Vec<RaceResult>,
    upload: Option<CsvUpload>,
    running: Option<RunKind>,
    history: Rc<MemoryStore>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    pub fn new() -> Self {
        AppStore {
            drivers: Vec::new(),
            circuits: circuit_catalog(),
            selected_driver: None,
            selected_circuit: None,
            track_conditions: TrackConditions::default(),
            prediction: None,
            race_results: Vec::new(),
            upload: None,
            running: None,
            history: Rc::default(),
        }
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    pub fn selected_driver(&self) -> Option<&Driver> {
        let id = self.selected_driver.as_deref()?;
        self.drivers.iter().find(|d| d.id == id)
    }

    pub fn selected_circuit(&self) -> Option<&Circuit> {
        let id = self.selected_circuit.as_deref()?;
        self.circuits.iter().find(|c| c.id == id)
    }

    pub fn track_conditions(&self) -> TrackConditions {
        self.track_conditions
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    pub fn race_results(&self) -> &[RaceResult] {
        &self.race_results
    }

    pub fn upload(&self) -> Option<&CsvUpload> {
        self.upload.as_ref()
    }

    pub fn running(&self) -> Option<RunKind> {
        self.running
    }

    pub fn is_computing(&self) -> bool {
        self.running.is_some()
    }

    pub fn history(&self) -> &MemoryStore {
        &self.history
    }

    /// Replace the driver list. A selected driver that is no longer present is
    /// deselected.
    pub fn set_drivers(&mut self, drivers: Vec<Driver>, upload: Option<CsvUpload>) {
        let stale = self
            .selected_driver
            .as_ref()
            .is_some_and(|id| !drivers.iter().any(|d| &d.id == id));
        if stale {
            self.selected_driver = None;
        }
        info!("Driver list replaced with {} drivers", drivers.len());
        self.drivers = drivers;
        self.upload = upload;
    }

    pub fn clear_preview(&mut self) {
        self.upload = None;
    }

    pub fn select_driver(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.drivers.iter().any(|d| d.id == id) {
            return Err(StoreError::UnknownDriver(id.to_string()));
        }
        self.selected_driver = Some(id.to_string());
        Ok(())
    }

    pub fn select_circuit(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.circuits.iter().any(|c| c.id == id) {
            return Err(StoreError::UnknownCircuit(id.to_string()));
        }
        self.selected_circuit = Some(id.to_string());
        Ok(())
    }

    /// Store new conditions, clamped onto the slider ranges.
    pub fn set_track_conditions(&mut self, conditions: TrackConditions) {
        self.track_conditions = TrackConditions {
            temperature: clamp_to(TEMPERATURE_RANGE, conditions.temperature),
            humidity: clamp_to(HUMIDITY_RANGE, conditions.humidity),
            wind_speed: clamp_to(WIND_SPEED_RANGE, conditions.wind_speed),
        };
    }

    /// Check that a run of `kind` could start now, without starting it.
    pub fn check_run(&self, kind: RunKind) -> Result<(), StoreError> {
        if let Some(active) = self.running {
            return Err(StoreError::RunInFlight(active));
        }
        match kind {
            RunKind::Prediction => {
                if self.selected_driver().is_none() || self.selected_circuit().is_none() {
                    return Err(StoreError::MissingSelection);
                }
            }
            RunKind::Race => {
                if self.selected_circuit().is_none() {
                    return Err(StoreError::MissingCircuit);
                }
                if self.drivers.is_empty() {
                    return Err(StoreError::NoDrivers);
                }
            }
        }
        Ok(())
    }

    /// Latch the store as computing. Fails without touching state when a run
    /// is already active or its inputs are missing.
    pub fn begin_run(&mut self, kind: RunKind) -> Result<(), StoreError> {
        self.check_run(kind)?;
        self.running = Some(kind);
        Ok(())
    }

    fn finish(&mut self, kind: RunKind) -> Result<(), StoreError> {
        if self.running != Some(kind) {
            return Err(StoreError::NotRunning(kind));
        }
        self.running = None;
        Ok(())
    }

    pub fn complete_prediction(&mut self, result: PredictionResult) -> Result<(), StoreError> {
        self.finish(RunKind::Prediction)?;
        let history = Rc::make_mut(&mut self.history);
        match history.insert_prediction(result.clone()) {
            Ok(_) => history.prune_predictions(HISTORY_LIMIT),
            Err(e) => warn!("Prediction not added to history: {}", e),
        }
        self.prediction = Some(result);
        Ok(())
    }

    /// Replace the race results wholesale.
    pub fn complete_race(&mut self, results: Vec<RaceResult>) -> Result<(), StoreError> {
        self.finish(RunKind::Race)?;
        self.race_results = results;
        Ok(())
    }

    /// Release the latch without storing anything.
    pub fn abort_run(&mut self) {
        self.running = None;
    }

    pub fn apply(&mut self, action: StoreAction) -> Result<(), StoreError> {
        match action {
            StoreAction::SetDrivers { drivers, upload } => self.set_drivers(drivers, upload),
            StoreAction::ClearPreview => self.clear_preview(),
            StoreAction::SelectDriver(id) => self.select_driver(&id)?,
            StoreAction::SelectCircuit(id) => self.select_circuit(&id)?,
            StoreAction::SetTrackConditions(conditions) => self.set_track_conditions(conditions),
            StoreAction::BeginRun(kind) => self.begin_run(kind)?,
            StoreAction::CompletePrediction(result) => self.complete_prediction(result)?,
            StoreAction::CompleteRace(results) => self.complete_race(results)?,
            StoreAction::AbortRun => self.abort_run(),
        }
        Ok(())
    }
}

/// State transitions dispatched from the UI.
#[derive(Debug, Clone)]
pub enum StoreAction {
    SetDrivers {
        drivers: Vec<Driver>,
        upload: Option<CsvUpload>,
    },
    ClearPreview,
    SelectDriver(String),
    SelectCircuit(String),
    SetTrackConditions(TrackConditions),
    BeginRun(RunKind),
    CompletePrediction(PredictionResult),
    CompleteRace(Vec<RaceResult>),
    AbortRun,
}

impl Reducible for AppStore {
    type Action = StoreAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match next.apply(action) {
            Ok(()) => Rc::new(next),
            Err(e) => {
                warn!("Store action rejected: {}", e);
                self
            }
        }
    }
}
