// Card editor - Settings form model for the card
use crate::domain::display_config::{DisplayConfig, RawCardConfig, ScaleMode};
use crate::domain::entity::HostStates;
use serde::{Deserialize, Serialize};

/// A single edit coming from the settings form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ConfigPatch {
    Title(String),
    Entity(String),
    ScaleMode(ScaleMode),
    ShowPower(bool),
    ShowSun(bool),
    ShowClear(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigChanged {
    pub config: RawCardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Everything the form needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorModel {
    pub config: DisplayConfig,
    pub entities: Vec<SelectOption>,
    pub scale_modes: Vec<SelectOption>,
}

pub struct CardEditor {
    config: DisplayConfig,
}

impl CardEditor {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Drop an entity that is not a telemetry sensor, then default to the first one.
    pub fn reconcile(&mut self, states: &HostStates) -> EditorModel {
        let valid = states.telemetry_entities();

        if !self.config.entity.is_empty() && !valid.contains(&self.config.entity) {
            tracing::debug!("Editor dropping invalid entity {}", self.config.entity);
            self.config.entity.clear();
        }
        if self.config.entity.is_empty() {
            if let Some(first) = valid.first() {
                self.config.entity = first.clone();
            }
        }

        EditorModel {
            entities: valid
                .iter()
                .map(|id| SelectOption {
                    value: id.clone(),
                    label: id.clone(),
                    selected: *id == self.config.entity,
                })
                .collect(),
            scale_modes: [
                (ScaleMode::HistoryFocus, "history_focus", "History focus"),
                (ScaleMode::Absolute, "absolute", "Absolute SOC (0-100)"),
            ]
            .into_iter()
            .map(|(mode, value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
                selected: mode == self.config.scale_mode,
            })
            .collect(),
            config: self.config.clone(),
        }
    }

    /// Merge one edit and re-normalize; the returned event carries the full config.
    pub fn apply(&mut self, patch: ConfigPatch) -> ConfigChanged {
        let mut raw = self.config.to_raw();
        match patch {
            ConfigPatch::Title(title) => raw.title = Some(title),
            ConfigPatch::Entity(entity) => raw.entity = Some(entity),
            ConfigPatch::ScaleMode(mode) => raw.scale_mode = Some(mode),
            ConfigPatch::ShowPower(on) => raw.show_power = Some(on),
            ConfigPatch::ShowSun(on) => raw.show_sun = Some(on),
            ConfigPatch::ShowClear(on) => raw.show_clear = Some(on),
        }
        self.config = DisplayConfig::normalize(raw);
        ConfigChanged {
            config: self.config.to_raw(),
        }
    }
}
