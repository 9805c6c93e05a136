use rookie_predictor::worker_agent::SimulationTask;
use yew_agent::Registrable;

fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    SimulationTask::registrar().register();
}
