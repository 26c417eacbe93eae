// Card render state selection
use crate::domain::display_config::DisplayConfig;
use crate::domain::entity::HostStates;

/// What the card shows, decided before any chart work happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardState {
    /// No entity configured, or the configured one is not in the state store.
    NoEntitySelected { has_candidates: bool },
    /// The integration has not reported yet.
    EntityUnavailable { state: String },
    /// The entity exists but is not a telemetry sensor.
    EntityMissingTelemetry,
    Ready,
}

/// Evaluated in priority order on every config or state update.
pub fn select_state(config: &DisplayConfig, states: &HostStates) -> CardState {
    let Some(entity) = (!config.entity.is_empty())
        .then(|| states.get(&config.entity))
        .flatten()
    else {
        return CardState::NoEntitySelected {
            has_candidates: !states.telemetry_entities().is_empty(),
        };
    };

    if entity.has_telemetry() {
        CardState::Ready
    } else if entity.is_unavailable() {
        CardState::EntityUnavailable {
            state: entity.state.clone(),
        }
    } else {
        CardState::EntityMissingTelemetry
    }
}

/// Identity of the inputs a render depended on; equal fingerprints mean the
/// previous render is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    entity: String,
    state: Option<String>,
    last_updated: Option<String>,
    candidates: usize,
}

impl Fingerprint {
    pub fn capture(config: &DisplayConfig, states: &HostStates) -> Self {
        let entity = states.get(&config.entity);
        Self {
            entity: config.entity.clone(),
            state: entity.map(|e| e.state.clone()),
            last_updated: entity.map(|e| e.last_updated.clone()),
            candidates: states.telemetry_entities().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::fixtures::{entity, telemetry_entity};
    use serde_json::json;

    #[test]
    fn test_empty_entity_prompts() {
        let states = HostStates::new(vec![telemetry_entity("sensor.pack")]);
        assert_eq!(
            select_state(&DisplayConfig::default(), &states),
            CardState::NoEntitySelected {
                has_candidates: true
            }
        );
        assert_eq!(
            select_state(&DisplayConfig::for_entity("sensor.gone"), &HostStates::default()),
            CardState::NoEntitySelected {
                has_candidates: false
            }
        );
    }

    #[test]
    fn test_unavailable_wins_over_missing_telemetry() {
        let states = HostStates::new(vec![entity("sensor.x", "unavailable", json!({}))]);
        assert_eq!(
            select_state(&DisplayConfig::for_entity("sensor.x"), &states),
            CardState::EntityUnavailable {
                state: "unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_entity_gets_guidance() {
        let states = HostStates::new(vec![entity("sensor.x", "21.5", json!({"unit": "C"}))]);
        assert_eq!(
            select_state(&DisplayConfig::for_entity("sensor.x"), &states),
            CardState::EntityMissingTelemetry
        );
    }

    #[test]
    fn test_telemetry_is_ready_even_when_state_unknown() {
        let mut pack = telemetry_entity("sensor.pack");
        pack.state = "unknown".to_string();
        let states = HostStates::new(vec![pack]);
        assert_eq!(
            select_state(&DisplayConfig::for_entity("sensor.pack"), &states),
            CardState::Ready
        );
    }

    #[test]
    fn test_fingerprint_tracks_state_and_update_time() {
        let config = DisplayConfig::for_entity("sensor.pack");
        let mut pack = telemetry_entity("sensor.pack");
        let before = Fingerprint::capture(&config, &HostStates::new(vec![pack.clone()]));

        let unrelated = HostStates::new(vec![
            pack.clone(),
            entity("light.kitchen", "on", json!({})),
        ]);
        assert_eq!(before, Fingerprint::capture(&config, &unrelated));

        pack.last_updated = "2025-06-01T12:05:00Z".to_string();
        assert_ne!(before, Fingerprint::capture(&config, &HostStates::new(vec![pack])));
    }
}
