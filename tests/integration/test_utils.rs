//! Shared test utilities for integration tests
//!
//! Record builders and a capturing action so tests can inspect the exact
//! config tree an extension command hands to its action.

use cmdext::extension::{
    Action, ActionError, ActionRegistry, ConfigNode, Provenance, RawRecord, DEFAULT_DATA_KEY,
};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// One store record holding `yaml` under the default data key.
pub fn record(namespace: &str, name: &str, yaml: &str) -> RawRecord {
    let mut data = BTreeMap::new();
    data.insert(DEFAULT_DATA_KEY.to_string(), yaml.to_string());
    RawRecord::new(Provenance::new(namespace, name), data)
}

/// Config trees received by [`capture_registry`] actions, in call order.
pub type Captured = Arc<Mutex<Vec<ConfigNode>>>;

/// Registry where `id` records the config it is run with.
pub fn capture_registry(id: &str) -> (ActionRegistry, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    let registry = ActionRegistry::new().with(id, move || -> Box<dyn Action> {
        let sink = Arc::clone(&sink);
        Box::new(
            move |config: &ConfigNode, _out: &mut dyn Write| -> Result<(), ActionError> {
                sink.lock().unwrap().push(config.clone());
                Ok(())
            },
        )
    });
    (registry, captured)
}
