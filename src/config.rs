//! Application-level configuration constants.

// Presentation pacing before a run is computed; 0 runs on the next tick
pub const PREDICTION_DELAY_MS: u32 = 2_000;
pub const RACE_DELAY_MS: u32 = 3_000;
pub const WORKER_SCRIPT: &str = "worker.js";

// Notifications
pub const NOTIFICATION_TTL_MS: u32 = 4_000;

// Upload
pub const PREVIEW_ROWS: usize = 5;
pub const CSV_EXTENSION: &str = ".csv";

// Results
pub const HISTORY_ROWS: usize = 5;
pub const RESULTS_SELECTOR: &str = ".race-results";
pub const SCROLL_DELAY_MS: u32 = 500;

// Slider steps
pub const CONDITION_STEP: f64 = 1.0;
