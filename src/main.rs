//! Main module for the race predictor application using Yew.
//! Wires UI components, the state store, the simulation worker and timers.

use gloo_timers::callback::Timeout;
use log::{info, warn};
use rookie_predictor::persistence::PredictionStore;
use rookie_predictor::{
    predict_driver,
    read_drivers_from_csv_string,
    sample_drivers,
    worker_agent::{SimulationArgs, SimulationTask},
    AppStore,
    RunKind,
    SimulationConfig,
    StoreAction,
    StoreError,
    TrackConditions,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlInputElement, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};
use yew::prelude::*;
use yew_agent::reactor::{use_reactor_subscription, ReactorProvider};

mod components;
mod config;
mod hooks;
mod utils;

use components::{
    render_history, render_prediction, render_race_results, CircuitGrid, ConditionsPanel,
    DriverGrid, NotificationToast, RunControls, UploadPanel,
};
use config::*;
use hooks::{use_notification, Notification};
use utils::is_csv_file;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Run slot shared by the callbacks. It is set synchronously when a run starts
/// so a second click before the next render is still rejected.
type RunSlot = Rc<RefCell<Option<RunKind>>>;

/// Check both the in-flight slot and the store preconditions for `kind`.
fn guard_run(slot: &RunSlot, store: &AppStore, kind: RunKind) -> Result<(), StoreError> {
    if let Some(active) = *slot.borrow() {
        return Err(StoreError::RunInFlight(active));
    }
    store.check_run(kind)
}

fn notify_error(show: &Callback<Notification>, err: &StoreError) {
    show.emit(Notification::error(err.title(), err.to_string()));
}

/// Smoothly scroll the race results into view.
fn scroll_to_results() {
    let element = match gloo_utils::document().query_selector(RESULTS_SELECTOR) {
        Ok(Some(el)) => el,
        _ => return,
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

/// Read an uploaded file and load its drivers into the store.
async fn load_csv_file(
    file: web_sys::File,
    store: UseReducerHandle<AppStore>,
    show: Callback<Notification>,
) {
    let text = match JsFuture::from(file.text()).await {
        Ok(value) => value.as_string().unwrap_or_default(),
        Err(err) => {
            warn!("File read failed: {:?}", err);
            show.emit(Notification::error(
                "Upload Failed",
                "Could not read the selected file.",
            ));
            return;
        }
    };

    match read_drivers_from_csv_string(&text) {
        Ok(upload) => {
            let count = upload.drivers.len();
            store.dispatch(StoreAction::SetDrivers {
                drivers: upload.drivers.clone(),
                upload: Some(upload),
            });
            show.emit(Notification::success(
                "Upload Successful",
                format!("Processed {} drivers from CSV file", count),
            ));
        }
        Err(e) => {
            warn!("CSV upload rejected: {}", e);
            show.emit(Notification::error(
                "Upload Failed",
                format!("{}. Please check the format.", e),
            ));
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────

/// Primary application component wiring state, effects, and UI elements.
#[function_component(Main)]
fn main_component() -> Html {
    let store = use_reducer(AppStore::new);
    let notifications = use_notification();
    let sim_sub = use_reactor_subscription::<SimulationTask>();
    let handled_idx = use_mut_ref(|| 0usize); // number of worker messages already processed
    let run_slot: RunSlot = use_mut_ref(|| None::<RunKind>);
    let delay_timer = use_mut_ref(|| None::<Timeout>);
    let scroll_timer = use_mut_ref(|| None::<Timeout>);

    let on_file = {
        let store = store.clone();
        let show = notifications.show.clone();
        Callback::from(move |e: Event| {
            let Some(input) = e
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            // allow picking the same file again
            input.set_value("");
            if !is_csv_file(&file.name(), &file.type_()) {
                show.emit(Notification::error("Invalid File", "Please upload a CSV file"));
                return;
            }
            info!("Reading {} ({} bytes)", file.name(), file.size());
            wasm_bindgen_futures::spawn_local(load_csv_file(file, store.clone(), show.clone()));
        })
    };

    let on_sample = {
        let store = store.clone();
        let show = notifications.show.clone();
        Callback::from(move |_: MouseEvent| {
            let drivers = sample_drivers();
            let count = drivers.len();
            store.dispatch(StoreAction::SetDrivers {
                drivers,
                upload: None,
            });
            show.emit(Notification::success(
                "Sample Data Loaded",
                format!("Loaded {} sample drivers", count),
            ));
        })
    };

    let on_clear_preview = {
        let store = store.clone();
        Callback::from(move |_: MouseEvent| store.dispatch(StoreAction::ClearPreview))
    };

    let on_select_driver = {
        let store = store.clone();
        Callback::from(move |id: String| store.dispatch(StoreAction::SelectDriver(id)))
    };

    let on_select_circuit = {
        let store = store.clone();
        Callback::from(move |id: String| store.dispatch(StoreAction::SelectCircuit(id)))
    };

    let on_conditions = {
        let store = store.clone();
        Callback::from(move |conditions: TrackConditions| {
            store.dispatch(StoreAction::SetTrackConditions(conditions))
        })
    };

    // Single-driver prediction runs on the UI thread after the pacing delay.
    let on_predict = {
        let store = store.clone();
        let show = notifications.show.clone();
        let run_slot = run_slot.clone();
        let delay_timer = delay_timer.clone();
        Callback::from(move |_: MouseEvent| {
            if let Err(e) = guard_run(&run_slot, &store, RunKind::Prediction) {
                notify_error(&show, &e);
                return;
            }
            let (Some(driver), Some(circuit)) = (
                store.selected_driver().cloned(),
                store.selected_circuit().cloned(),
            ) else {
                return;
            };

            *run_slot.borrow_mut() = Some(RunKind::Prediction);
            store.dispatch(StoreAction::BeginRun(RunKind::Prediction));

            let store = store.clone();
            let show = show.clone();
            let run_slot = run_slot.clone();
            *delay_timer.borrow_mut() = Some(Timeout::new(PREDICTION_DELAY_MS, move || {
                let result = predict_driver(&driver, &circuit, &mut rand::rng());
                let description = format!(
                    "Predicted P{} for {}",
                    result.predicted_position, driver.name
                );
                store.dispatch(StoreAction::CompletePrediction(result));
                run_slot.borrow_mut().take();
                show.emit(Notification::success("Simulation Complete", description));
            }));
        })
    };

    // Field simulation is handed to the worker after the pacing delay.
    let on_race = {
        let store = store.clone();
        let show = notifications.show.clone();
        let run_slot = run_slot.clone();
        let delay_timer = delay_timer.clone();
        let sim_sub = sim_sub.clone();
        Callback::from(move |_: MouseEvent| {
            if let Err(e) = guard_run(&run_slot, &store, RunKind::Race) {
                notify_error(&show, &e);
                return;
            }
            let Some(circuit) = store.selected_circuit().cloned() else {
                return;
            };

            *run_slot.borrow_mut() = Some(RunKind::Race);
            store.dispatch(StoreAction::BeginRun(RunKind::Race));

            let args = SimulationArgs {
                drivers: store.drivers().to_vec(),
                circuit,
                conditions: store.track_conditions(),
                config: SimulationConfig::default(),
                seed: rand::random(),
            };
            info!("Starting race simulation with seed {}", args.seed);
            let sim_sub = sim_sub.clone();
            *delay_timer.borrow_mut() = Some(Timeout::new(RACE_DELAY_MS, move || {
                sim_sub.send(args);
            }));
        })
    };

    // effect that consumes new worker messages
    {
        let sim_sub_consumer = sim_sub.clone();
        let handled_idx = handled_idx.clone();
        let store = store.clone();
        let show = notifications.show.clone();
        let run_slot = run_slot.clone();
        let scroll_timer = scroll_timer.clone();
        use_effect_with(sim_sub.len(), move |_| {
            let all = sim_sub_consumer.iter();
            let new_total = all.len();
            for msg in all.skip(*handled_idx.borrow()) {
                match msg.as_ref() {
                    Ok(results) => {
                        let count = results.len();
                        store.dispatch(StoreAction::CompleteRace(results.clone()));
                        show.emit(Notification::success(
                            "Race Simulation Complete",
                            format!("All {} drivers have completed the race", count),
                        ));
                        *scroll_timer.borrow_mut() =
                            Some(Timeout::new(SCROLL_DELAY_MS, scroll_to_results));
                    }
                    Err(e) => {
                        warn!("Race simulation failed: {}", e);
                        store.dispatch(StoreAction::AbortRun);
                        show.emit(Notification::error("Race Simulation Failed", e.clone()));
                    }
                }
                run_slot.borrow_mut().take();
            }
            *handled_idx.borrow_mut() = new_total;
            || ()
        });
    }

    let history = store.history().list_predictions(None, HISTORY_ROWS);

    html! {
        <div class="container">
            <h1>{ "Rookie Race Predictor" }</h1>

            <NotificationToast
                notification={notifications.current.clone()}
                ondismiss={notifications.dismiss.clone()}
            />

            <UploadPanel
                upload={store.upload().cloned()}
                onfile={on_file}
                onsample={on_sample}
                onclearpreview={on_clear_preview}
            />

            <DriverGrid
                drivers={store.drivers().to_vec()}
                selected={store.selected_driver().map(|d| d.id.clone())}
                onselect={on_select_driver}
            />

            <CircuitGrid
                circuits={store.circuits().to_vec()}
                selected={store.selected_circuit().map(|c| c.id.clone())}
                onselect={on_select_circuit}
            />

            <ConditionsPanel conditions={store.track_conditions()} onchange={on_conditions} />

            <RunControls
                running={store.running()}
                driver_count={store.drivers().len()}
                circuit_name={store.selected_circuit().map(|c| c.name.clone())}
                onpredict={on_predict}
                onrace={on_race}
            />

            <div class="results-area">
                if let Some(prediction) = store.prediction() {
                    { render_prediction(prediction, store.selected_driver(), store.selected_circuit()) }
                }
                { render_history(&history, store.drivers()) }
                { render_race_results(store.race_results(), store.selected_circuit()) }
            </div>
        </div>
    }
}

/// App wrapper providing ReactorProvider for SimulationTask.
#[function_component]
pub fn App() -> Html {
    html! {
        <ReactorProvider<SimulationTask> path={WORKER_SCRIPT}>
            <Main />
        </ReactorProvider<SimulationTask>>
    }
}

/// Entry point: initializes Yew renderer for the App component.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
