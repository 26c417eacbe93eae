// Card display configuration
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Battery Telemetry";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// SOC axis fitted to the recorded history.
    #[default]
    HistoryFocus,
    /// SOC axis pinned to 0-100.
    Absolute,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    /// Points are embedded in the chart configuration.
    #[default]
    Literal,
    /// The chart card evaluates `data_generator` expressions against the live entity.
    Generator,
}

/// Card configuration as the host stores it; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCardConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_power: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_sun: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_clear: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<ScaleMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_mode: Option<DataMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayConfig {
    pub entity: String,
    pub title: String,
    pub show_power: bool,
    pub show_sun: bool,
    pub show_clear: bool,
    pub scale_mode: ScaleMode,
    pub data_mode: DataMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::normalize(RawCardConfig::default())
    }
}

impl DisplayConfig {
    /// The only way to build a config: fill every missing field with its default.
    pub fn normalize(raw: RawCardConfig) -> Self {
        Self {
            entity: raw.entity.map(|e| e.trim().to_string()).unwrap_or_default(),
            title: raw.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            show_power: raw.show_power.unwrap_or(false),
            show_sun: raw.show_sun.unwrap_or(false),
            show_clear: raw.show_clear.unwrap_or(false),
            scale_mode: raw.scale_mode.unwrap_or_default(),
            data_mode: raw.data_mode.unwrap_or_default(),
        }
    }

    pub fn to_raw(&self) -> RawCardConfig {
        RawCardConfig {
            entity: Some(self.entity.clone()),
            title: Some(self.title.clone()),
            show_power: Some(self.show_power),
            show_sun: Some(self.show_sun),
            show_clear: Some(self.show_clear),
            scale_mode: Some(self.scale_mode),
            data_mode: Some(self.data_mode),
        }
    }

    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self::normalize(RawCardConfig {
            entity: Some(entity.into()),
            ..Default::default()
        })
    }
}
