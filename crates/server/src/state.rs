use aegir_notify::Dispatcher;
use aegir_rules::PolicyEngine;

/// Shared, read-only state for every request.
#[derive(Debug)]
pub struct AppState {
    pub engine: PolicyEngine,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(engine: PolicyEngine, dispatcher: Dispatcher) -> Self {
        Self { engine, dispatcher }
    }
}
