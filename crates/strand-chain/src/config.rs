use serde::{Deserialize, Serialize};

/// Chain engine settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run push/replace/remove executions on the same handle one at a time
    /// within this engine. Off by default: concurrent mutations of one
    /// handle can then lose updates, since the registry offers no
    /// compare-and-swap on the pointer.
    pub serialize_mutations: bool,
}
