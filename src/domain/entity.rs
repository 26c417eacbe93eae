// Host entity state model
use super::telemetry::TelemetrySnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const TELEMETRY_ATTRIBUTE: &str = "apex_series";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Value,
    #[serde(default)]
    pub last_changed: String,
    #[serde(default)]
    pub last_updated: String,
}

impl EntityState {
    /// Mirrors a truthiness check: `null` and `false` do not count as telemetry.
    pub fn has_telemetry(&self) -> bool {
        !matches!(
            self.attributes.get(TELEMETRY_ATTRIBUTE),
            None | Some(Value::Null) | Some(Value::Bool(false))
        )
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.state.as_str(), "unavailable" | "unknown")
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from_attributes(&self.state, &self.attributes)
    }
}

/// Point-in-time view of the host's entity store, keyed by entity id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostStates {
    states: BTreeMap<String, EntityState>,
}

impl HostStates {
    pub fn new(states: Vec<EntityState>) -> Self {
        Self {
            states: states
                .into_iter()
                .map(|s| (s.entity_id.clone(), s))
                .collect(),
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }

    /// Sensors exposing the telemetry attribute, sorted by id.
    pub fn telemetry_entities(&self) -> Vec<String> {
        self.states
            .values()
            .filter(|s| s.entity_id.starts_with("sensor.") && s.has_telemetry())
            .map(|s| s.entity_id.clone())
            .collect()
    }
}
