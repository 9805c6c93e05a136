//! Pure Yew view components for the race predictor UI.
//!
//! Components render from props only; state changes go back to `Main`
//! through callbacks.

use crate::config::{CONDITION_STEP, CSV_EXTENSION, PREVIEW_ROWS};
use crate::hooks::{Notification, NotificationKind};
use crate::utils::{format_gap, format_position, format_seconds, medal, validate_condition};
use log::warn;
use rookie_predictor::ingest::CsvUpload;
use rookie_predictor::persistence::StoredPrediction;
use rookie_predictor::store::{RunKind, HUMIDITY_RANGE, TEMPERATURE_RANGE, WIND_SPEED_RANGE};
use rookie_predictor::{summarize, Circuit, Driver, PredictionResult, RaceResult, TrackConditions};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct NotificationToastProps {
    pub notification: Option<Notification>,
    pub ondismiss: Callback<()>,
}

#[function_component(NotificationToast)]
pub fn notification_toast(props: &NotificationToastProps) -> Html {
    let Some(n) = &props.notification else {
        return html! {};
    };
    let class = match n.kind {
        NotificationKind::Success => "toast toast-success",
        NotificationKind::Error => "toast toast-error",
    };
    html! {
        <div class={class} role="status">
            <div class="toast-title">{ &n.title }</div>
            <div class="toast-description">{ &n.description }</div>
            <button class="toast-close" onclick={props.ondismiss.reform(|_: MouseEvent| ())}>{ "×" }</button>
        </div>
    }
}

/// File picker, sample-data button and a preview of the uploaded rows.
#[derive(Properties, PartialEq)]
pub struct UploadPanelProps {
    pub upload: Option<CsvUpload>,
    pub onfile: Callback<Event>,
    pub onsample: Callback<MouseEvent>,
    pub onclearpreview: Callback<MouseEvent>,
}

#[function_component(UploadPanel)]
pub fn upload_panel(props: &UploadPanelProps) -> Html {
    html! {
        <section id="upload" class="upload-section">
            <h2>{ "Upload Driver Data" }</h2>
            <p class="subtitle">{ "Import F2/F3 driver statistics in CSV format" }</p>
            <label class="dropzone">
                <input type="file" accept={CSV_EXTENSION} onchange={props.onfile.clone()} />
                <span>{ "Click to browse files" }</span>
                <span class="hint">{ "Supports: .csv format" }</span>
            </label>
            if let Some(upload) = &props.upload {
                { render_preview(upload, props.onclearpreview.clone()) }
            }
            <button class="btn-secondary" onclick={props.onsample.clone()}>
                { "Load Sample Data" }
            </button>
        </section>
    }
}

fn render_preview(upload: &CsvUpload, onclear: Callback<MouseEvent>) -> Html {
    if upload.rows.is_empty() {
        return html! {};
    }
    html! {
        <div class="preview">
            <div class="preview-header">
                <h4>{ "Data Preview" }</h4>
                <button class="btn-ghost small" onclick={onclear}>{ "×" }</button>
            </div>
            <table class="preview-table">
                <thead>
                    <tr>{ for upload.headers.iter().map(|h| html! { <th>{ h }</th> }) }</tr>
                </thead>
                <tbody>
                    { for upload.preview(PREVIEW_ROWS).iter().map(|row| html! {
                        <tr>{ for row.iter().map(|v| html! { <td>{ v }</td> }) }</tr>
                    }) }
                </tbody>
            </table>
            <p class="preview-note">
                { format!("Showing first {} rows. Total rows processed: {}",
                          PREVIEW_ROWS.min(upload.rows.len()), upload.rows.len()) }
            </p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct DriverGridProps {
    pub drivers: Vec<Driver>,
    pub selected: Option<String>,
    pub onselect: Callback<String>,
}

#[function_component(DriverGrid)]
pub fn driver_grid(props: &DriverGridProps) -> Html {
    if props.drivers.is_empty() {
        return html! {};
    }
    html! {
        <section class="driver-selector-section">
            <h2>{ "Select Driver" }</h2>
            <div class="card-grid">
                { for props.drivers.iter().map(|d| {
                    let selected = props.selected.as_deref() == Some(d.id.as_str());
                    let onclick = {
                        let id = d.id.clone();
                        props.onselect.reform(move |_: MouseEvent| id.clone())
                    };
                    html! {
                        <div class={classes!("card", selected.then_some("selected"))} {onclick}>
                            <div class="card-title">{ &d.name }</div>
                            <div class="card-subtitle">{ &d.team }</div>
                            <div class="card-stats">
                                <span>{ format!("F2: {}", d.f2_position.map_or("-".to_string(), format_position)) }</span>
                                <span>{ format!("Wins: {}", d.wins) }</span>
                                <span>{ format!("Podiums: {}", d.podiums) }</span>
                                <span>{ format!("Avg finish: {:.1}", d.avg_finish) }</span>
                            </div>
                        </div>
                    }
                }) }
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
pub struct CircuitGridProps {
    pub circuits: Vec<Circuit>,
    pub selected: Option<String>,
    pub onselect: Callback<String>,
}

#[function_component(CircuitGrid)]
pub fn circuit_grid(props: &CircuitGridProps) -> Html {
    html! {
        <section class="circuit-selector-section">
            <h2>{ "Select Circuit" }</h2>
            <div class="card-grid">
                { for props.circuits.iter().map(|c| {
                    let selected = props.selected.as_deref() == Some(c.id.as_str());
                    let onclick = {
                        let id = c.id.clone();
                        props.onselect.reform(move |_: MouseEvent| id.clone())
                    };
                    let [s1, s2, s3] = c.sector_times;
                    html! {
                        <div class={classes!("card", selected.then_some("selected"))} {onclick}>
                            <div class="card-title">{ &c.name }</div>
                            <div class="card-subtitle">{ &c.country }</div>
                            <div class="card-stats">
                                <span>{ format!("{:.2} km", c.length_km) }</span>
                                <span>{ format!("{} corners", c.corners) }</span>
                                <span>{ format!("{} km/h", c.top_speed_kph) }</span>
                            </div>
                            <div class="card-footer">
                                { format!("Sector Times: S1 {}s • S2 {}s • S3 {}s", s1, s2, s3) }
                            </div>
                        </div>
                    }
                }) }
            </div>
        </section>
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ConditionField {
    Temperature,
    Humidity,
    WindSpeed,
}

impl ConditionField {
    fn label(self) -> &'static str {
        match self {
            ConditionField::Temperature => "Temperature",
            ConditionField::Humidity => "Humidity",
            ConditionField::WindSpeed => "Wind speed",
        }
    }

    fn unit(self) -> &'static str {
        match self {
            ConditionField::Temperature => "°C",
            ConditionField::Humidity => "%",
            ConditionField::WindSpeed => "km/h",
        }
    }

    fn range(self) -> (f64, f64) {
        match self {
            ConditionField::Temperature => TEMPERATURE_RANGE,
            ConditionField::Humidity => HUMIDITY_RANGE,
            ConditionField::WindSpeed => WIND_SPEED_RANGE,
        }
    }

    fn read(self, c: &TrackConditions) -> f64 {
        match self {
            ConditionField::Temperature => c.temperature,
            ConditionField::Humidity => c.humidity,
            ConditionField::WindSpeed => c.wind_speed,
        }
    }

    fn write(self, c: TrackConditions, value: f64) -> TrackConditions {
        match self {
            ConditionField::Temperature => TrackConditions { temperature: value, ..c },
            ConditionField::Humidity => TrackConditions { humidity: value, ..c },
            ConditionField::WindSpeed => TrackConditions { wind_speed: value, ..c },
        }
    }
}

/// Three range sliders for race-day weather.
#[derive(Properties, PartialEq)]
pub struct ConditionsPanelProps {
    pub conditions: TrackConditions,
    pub onchange: Callback<TrackConditions>,
}

#[function_component(ConditionsPanel)]
pub fn conditions_panel(props: &ConditionsPanelProps) -> Html {
    let slider = |field: ConditionField| {
        let (min, max) = field.range();
        let conditions = props.conditions;
        let onchange = props.onchange.clone();
        let oninput = Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            match validate_condition(&input.value(), field.range(), field.label()) {
                Ok(value) => onchange.emit(field.write(conditions, value)),
                Err(err) => warn!("Ignoring slider input: {}", err),
            }
        });
        html! {
            <div class="form-group">
                <label>{ field.label() }</label>
                <div class="slider-with-value">
                    <input type="range"
                        min={min.to_string()}
                        max={max.to_string()}
                        step={CONDITION_STEP.to_string()}
                        value={field.read(&conditions).to_string()}
                        {oninput}
                    />
                    <span class="slider-value">{ format!("{}{}", field.read(&conditions), field.unit()) }</span>
                </div>
            </div>
        }
    };

    html! {
        <section class="conditions-section">
            <h2>{ "Track Conditions" }</h2>
            <p class="subtitle">{ "Drag the sliders to adjust race conditions" }</p>
            { slider(ConditionField::Temperature) }
            { slider(ConditionField::Humidity) }
            { slider(ConditionField::WindSpeed) }
        </section>
    }
}

#[derive(Properties, PartialEq)]
pub struct RunControlsProps {
    pub running: Option<RunKind>,
    pub driver_count: usize,
    pub circuit_name: Option<String>,
    pub onpredict: Callback<MouseEvent>,
    pub onrace: Callback<MouseEvent>,
}

#[function_component(RunControls)]
pub fn run_controls(props: &RunControlsProps) -> Html {
    let busy = props.running.is_some();
    let label = |kind: RunKind, idle: &'static str, active: &'static str| {
        if props.running == Some(kind) {
            active
        } else {
            idle
        }
    };
    html! {
        <section class="run-section">
            <div class="run-context">
                { format!("{} Drivers Loaded", props.driver_count) }
                if let Some(name) = &props.circuit_name {
                    <span class="run-circuit">{ name }</span>
                }
            </div>
            <button class="btn-primary" disabled={busy} onclick={props.onpredict.clone()}>
                { label(RunKind::Prediction, "Start Simulation", "Simulating Race...") }
            </button>
            <button class="btn-primary" disabled={busy} onclick={props.onrace.clone()}>
                { label(RunKind::Race, "Start All-Drivers Race Simulation", "Running Race Simulation...") }
            </button>
            if busy {
                <div class="run-progress">{ "Processing driver predictions with weather conditions..." }</div>
            }
        </section>
    }
}

/// Renders the single-driver prediction panel.
pub fn render_prediction(prediction: &PredictionResult, driver: Option<&Driver>, circuit: Option<&Circuit>) -> Html {
    let [s1, s2, s3] = prediction.sector_times;
    let w = prediction.weather;
    html! {
        <section class="prediction-results">
            <h2>{ "Prediction Results" }</h2>
            <div class="prediction-context">
                { driver.map(|d| d.name.clone()).unwrap_or_else(|| prediction.driver_id.clone()) }
                { " @ " }
                { circuit.map(|c| c.name.clone()).unwrap_or_else(|| prediction.circuit_id.clone()) }
            </div>
            <div class="stat-grid">
                <div class="stat"><span>{ "Race" }</span><strong>{ format_position(prediction.predicted_position) }</strong></div>
                <div class="stat"><span>{ "Qualifying" }</span><strong>{ format_position(prediction.qualifying_position) }</strong></div>
                <div class="stat"><span>{ "Points" }</span><strong>{ format!("{:.1}", prediction.predicted_points) }</strong></div>
                <div class="stat"><span>{ "Confidence" }</span><strong>{ format!("{:.1}%", prediction.confidence) }</strong></div>
            </div>
            <div class="stat-grid">
                <div class="stat"><span>{ "Sector 1" }</span><strong>{ format_seconds(s1) }</strong></div>
                <div class="stat"><span>{ "Sector 2" }</span><strong>{ format_seconds(s2) }</strong></div>
                <div class="stat"><span>{ "Sector 3" }</span><strong>{ format_seconds(s3) }</strong></div>
                <div class="stat"><span>{ "Lap" }</span><strong>{ format_seconds(prediction.lap_time) }</strong></div>
            </div>
            <div class="stat-grid weather">
                <div class="stat"><span>{ "Temperature" }</span><strong>{ format!("{:.1}°C", w.temperature) }</strong></div>
                <div class="stat"><span>{ "Humidity" }</span><strong>{ format!("{:.1}%", w.humidity) }</strong></div>
                <div class="stat"><span>{ "Wind" }</span><strong>{ format!("{:.1} km/h", w.wind) }</strong></div>
            </div>
        </section>
    }
}

/// Renders the full-field classification, race summary and points board.
pub fn render_race_results(results: &[RaceResult], circuit: Option<&Circuit>) -> Html {
    if results.is_empty() {
        return html! {};
    }

    html! {
        <section class="race-results">
            <h2>{ "Race Results" }</h2>
            if let Some(c) = circuit {
                <div class="results-circuit">{ format!("{} • {}", c.name, c.country) }</div>
            }
            <table class="results-table">
                <thead>
                    <tr>
                        <th>{ "Pos" }</th>
                        <th>{ "Driver" }</th>
                        <th>{ "Team" }</th>
                        <th>{ "Lap Time" }</th>
                        <th>{ "Gap" }</th>
                        <th>{ "Points" }</th>
                        <th>{ "Status" }</th>
                    </tr>
                </thead>
                <tbody>
                    { for results.iter().map(render_result_row) }
                </tbody>
            </table>
            { render_summary(results) }
        </section>
    }
}

fn render_result_row(r: &RaceResult) -> Html {
    let status_class = format!("status status-{}", r.status.to_string().to_lowercase());
    html! {
        <tr key={r.driver.id.clone()}>
            <td>{ format!("{} {}", medal(r.position), format_position(r.position)) }</td>
            <td>{ &r.driver.name }</td>
            <td>{ &r.driver.team }</td>
            <td>{ format_seconds(r.lap_time) }</td>
            <td>{ format_gap(r.gap_to_leader) }</td>
            <td>{ r.points }</td>
            <td class={status_class}>{ r.status.to_string() }</td>
        </tr>
    }
}

fn render_summary(results: &[RaceResult]) -> Html {
    let Some(summary) = summarize(results) else {
        return html! {
            <p class="no-results-message">{ "No driver finished the race" }</p>
        };
    };
    html! {
        <div class="race-summary">
            <div class="summary-card">
                <h3>{ "Fastest Lap" }</h3>
                <div>{ &summary.fastest_lap_driver }</div>
                <div>{ format_seconds(summary.fastest_lap) }</div>
            </div>
            <div class="summary-card">
                <h3>{ "Most Consistent" }</h3>
                <div>{ &summary.most_consistent.name }</div>
                <div>{ format!("Consistency: {:.0}%", summary.most_consistent.consistency * 100.0) }</div>
            </div>
            <div class="summary-card">
                <h3>{ "Classification" }</h3>
                <div>{ format!("Finished: {}", summary.finished) }</div>
                <div>{ format!("DNF: {} • DSQ: {}", summary.dnf, summary.dsq) }</div>
                <div>{ format!("Average gap: {}", format_seconds(summary.average_gap)) }</div>
            </div>
            <div class="points-board">
                <h3>{ "Championship Points Summary" }</h3>
                { for summary.points_scorers.iter().map(|(name, points)| html! {
                    <div class="points-entry">
                        <strong>{ *points }</strong>
                        <span>{ name }</span>
                    </div>
                }) }
            </div>
        </div>
    }
}

/// Recent single-driver predictions, newest first.
pub fn render_history(entries: &[StoredPrediction], drivers: &[Driver]) -> Html {
    if entries.is_empty() {
        return html! {};
    }
    let name_of = |id: &str| {
        drivers
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    html! {
        <section class="prediction-history">
            <h3>{ "Recent Predictions" }</h3>
            <ul>
                { for entries.iter().map(|entry| {
                    let p = &entry.prediction;
                    html! {
                        <li key={entry.id.to_string()}>
                            { format!("{} @ {}: {} (quali {}), {:.1}% confidence",
                                      name_of(&p.driver_id), p.circuit_id,
                                      format_position(p.predicted_position),
                                      format_position(p.qualifying_position),
                                      p.confidence) }
                        </li>
                    }
                }) }
            </ul>
        </section>
    }
}
