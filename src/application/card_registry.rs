// Card registry - Custom card metadata the host polls for
use serde::Serialize;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardMeta {
    #[serde(rename = "type")]
    pub card_type: String,
    pub name: String,
    pub preview: bool,
    pub description: String,
    pub editor: String,
}

impl CardMeta {
    fn builtin(card_type: &str, name: &str, preview: bool, description: &str) -> Self {
        Self {
            card_type: card_type.to_string(),
            name: name.to_string(),
            preview,
            description: description.to_string(),
            editor: format!("{}-editor", card_type),
        }
    }
}

pub fn builtin_cards() -> Vec<CardMeta> {
    vec![
        CardMeta::builtin(
            "battery-telemetry-card",
            "Battery Telemetry",
            true,
            "Chart card for battery telemetry history + forecast.",
        ),
        CardMeta::builtin(
            "node-energy-card",
            "Battery Telemetry (Legacy Alias)",
            false,
            "Legacy alias for Battery Telemetry card.",
        ),
    ]
}

/// Process-wide list of card types. Filled at startup and re-asserted each
/// time the host asks for it; registering a known type is a no-op.
#[derive(Debug, Default)]
pub struct CardRegistry {
    entries: RwLock<Vec<CardMeta>>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the entry was added.
    pub fn register_if_absent(&self, meta: CardMeta) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|m| m.card_type == meta.card_type) {
            return false;
        }
        tracing::debug!("Registering card type {}", meta.card_type);
        entries.push(meta);
        true
    }

    pub fn register_builtins(&self) -> usize {
        builtin_cards()
            .into_iter()
            .filter(|meta| self.register_if_absent(meta.clone()))
            .count()
    }

    pub fn contains(&self, card_type: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|m| m.card_type == card_type)
    }

    pub fn entries(&self) -> Vec<CardMeta> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
