//! Optional storage for drivers, circuits and predictions.
//!
//! Nothing in the prediction code depends on this module. The UI keeps a
//! [`MemoryStore`] as prediction history, and a snapshot of it can be moved in
//! and out as JSON.

use crate::model::{Circuit, Driver, PredictionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug)]
pub enum PersistenceError {
    MissingId(&'static str),
    Json(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::MissingId(kind) => write!(f, "Cannot store a {} without an id", kind),
            PersistenceError::Json(e) => write!(f, "Invalid snapshot: {}", e),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Json(e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub id: u64,
    pub prediction: PredictionResult,
}

/// CRUD-shaped access to a prediction datastore.
pub trait PredictionStore {
    fn upsert_driver(&mut self, driver: Driver) -> Result<(), PersistenceError>;
    fn list_drivers(&self) -> Vec<Driver>;
    fn upsert_circuit(&mut self, circuit: Circuit) -> Result<(), PersistenceError>;
    fn list_circuits(&self) -> Vec<Circuit>;
    /// Returns the id assigned to the stored prediction.
    fn insert_prediction(&mut self, prediction: PredictionResult) -> Result<u64, PersistenceError>;
    /// Newest first, optionally for one driver only.
    fn list_predictions(&self, driver_id: Option<&str>, limit: usize) -> Vec<StoredPrediction>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    drivers: BTreeMap<String, Driver>,
    circuits: BTreeMap<String, Circuit>,
    predictions: Vec<StoredPrediction>,
    next_prediction_id: u64,
}

impl MemoryStore {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn prediction_count(&self) -> usize {
        self.predictions.len()
    }

    /// Drop all but the `keep` newest predictions.
    pub fn prune_predictions(&mut self, keep: usize) {
        let excess = self.predictions.len().saturating_sub(keep);
        self.predictions.drain(..excess);
    }
}

impl PredictionStore for MemoryStore {
    fn upsert_driver(&mut self, driver: Driver) -> Result<(), PersistenceError> {
        if driver.id.is_empty() {
            return Err(PersistenceError::MissingId("driver"));
        }
        self.drivers.insert(driver.id.clone(), driver);
        Ok(())
    }

    fn list_drivers(&self) -> Vec<Driver> {
        self.drivers.values().cloned().collect()
    }

    fn upsert_circuit(&mut self, circuit: Circuit) -> Result<(), PersistenceError> {
        if circuit.id.is_empty() {
            return Err(PersistenceError::MissingId("circuit"));
        }
        self.circuits.insert(circuit.id.clone(), circuit);
        Ok(())
    }

    fn list_circuits(&self) -> Vec<Circuit> {
        self.circuits.values().cloned().collect()
    }

    fn insert_prediction(&mut self, prediction: PredictionResult) -> Result<u64, PersistenceError> {
        if prediction.driver_id.is_empty() {
            return Err(PersistenceError::MissingId("prediction driver"));
        }
        let id = self.next_prediction_id;
        self.next_prediction_id += 1;
        self.predictions.push(StoredPrediction { id, prediction });
        Ok(id)
    }

    fn list_predictions(&self, driver_id: Option<&str>, limit: usize) -> Vec<StoredPrediction> {
        self.predictions
            .iter()
            .rev()
            .filter(|p| driver_id.map_or(true, |id| p.prediction.driver_id == id))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::sample_drivers;
    use crate::model::{circuit_catalog, WeatherSnapshot};

    fn prediction(driver_id: &str, position: u32) -> PredictionResult {
        PredictionResult {
            driver_id: driver_id.to_string(),
            circuit_id: "monza".to_string(),
            predicted_position: position,
            qualifying_position: position,
            predicted_points: 0.0,
            confidence: 80.0,
            lap_time: 95.0,
            sector_times: [30.0, 35.0, 30.0],
            weather: WeatherSnapshot {
                temperature: 25.0,
                humidity: 50.0,
                wind: 5.0,
            },
        }
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut store = MemoryStore::default();
        let mut driver = sample_drivers().remove(0);
        store.upsert_driver(driver.clone()).unwrap();
        driver.team = "New Team".to_string();
        store.upsert_driver(driver).unwrap();
        let drivers = store.list_drivers();
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].team, "New Team");
    }

    #[test]
    fn records_without_id_are_rejected() {
        let mut store = MemoryStore::default();
        let mut circuit = circuit_catalog().remove(0);
        circuit.id.clear();
        assert!(matches!(
            store.upsert_circuit(circuit),
            Err(PersistenceError::MissingId("circuit"))
        ));
    }

    #[test]
    fn predictions_list_newest_first_with_filter() {
        let mut store = MemoryStore::default();
        store.insert_prediction(prediction("a", 3)).unwrap();
        store.insert_prediction(prediction("b", 5)).unwrap();
        let last = store.insert_prediction(prediction("a", 1)).unwrap();

        let all = store.list_predictions(None, 10);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, last);

        let only_a = store.list_predictions(Some("a"), 10);
        assert_eq!(only_a.len(), 2);
        assert_eq!(only_a[0].prediction.predicted_position, 1);
        assert_eq!(store.list_predictions(None, 1).len(), 1);
    }

    #[test]
    fn pruning_keeps_newest_predictions() {
        let mut store = MemoryStore::default();
        for pos in 1..=4 {
            store.insert_prediction(prediction("a", pos)).unwrap();
        }
        store.prune_predictions(2);
        let kept: Vec<u32> = store
            .list_predictions(None, 10)
            .iter()
            .map(|p| p.prediction.predicted_position)
            .collect();
        assert_eq!(kept, vec![4, 3]);
        assert_eq!(store.insert_prediction(prediction("a", 9)).unwrap(), 4);
    }

    #[test]
    fn snapshot_survives_json() {
        let mut store = MemoryStore::default();
        for circuit in circuit_catalog() {
            store.upsert_circuit(circuit).unwrap();
        }
        store.insert_prediction(prediction("sample-1", 2)).unwrap();
        let restored = MemoryStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.list_circuits().len(), 5);
    }

    #[test]
    fn garbage_snapshot_is_an_error() {
        assert!(matches!(
            MemoryStore::from_json("{not json"),
            Err(PersistenceError::Json(_))
        ));
    }
}
