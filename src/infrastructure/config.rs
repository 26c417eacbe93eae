use crate::domain::display_config::RawCardConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub home_assistant: HomeAssistantSettings,
    #[serde(default)]
    pub setup: SetupSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistantSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SetupSettings {
    /// File the dashboard YAML is copied to; copying fails without it
    pub export_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CardsConfig {
    #[serde(default)]
    pub cards: Vec<CardEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardEntry {
    pub id: String,
    #[serde(flatten)]
    pub config: RawCardConfig,
}

impl CardsConfig {
    pub fn into_pairs(self) -> Vec<(String, RawCardConfig)> {
        self.cards.into_iter().map(|c| (c.id, c.config)).collect()
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    500
}

/// `BTC_` variables override file values, nested keys joined by `__`
/// (e.g. `BTC_HOME_ASSISTANT__TOKEN`).
fn environment() -> config::Environment {
    config::Environment::with_prefix("BTC")
        .prefix_separator("_")
        .separator("__")
}

fn service_config_from<S>(file: S) -> anyhow::Result<ServiceConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize()?)
}

fn cards_config_from<S>(file: S) -> anyhow::Result<CardsConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder().add_source(file).build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    service_config_from(config::File::with_name("config/service"))
}

/// A missing cards file means no configured cards.
pub fn load_cards_config() -> anyhow::Result<CardsConfig> {
    cards_config_from(config::File::with_name("config/cards").required(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::display_config::ScaleMode;
    use config::{File, FileFormat};

    #[test]
    fn test_service_config_defaults() {
        let toml = r#"
            [home_assistant]
            base_url = "http://ha.local:8123"
            token = "abc"
        "#;
        let cfg = service_config_from(File::from_str(toml, FileFormat::Toml)).unwrap();

        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.server.poll_interval_secs, 30);
        assert_eq!(cfg.home_assistant.max_retries, 3);
        assert!(cfg.setup.export_path.is_none());
    }

    #[test]
    fn test_cards_config_flattens_display_fields() {
        let toml = r#"
            [[cards]]
            id = "shed"
            entity = "sensor.shed_pack"
            show_sun = true
            scale_mode = "absolute"

            [[cards]]
            id = "bare"
        "#;
        let cfg = cards_config_from(File::from_str(toml, FileFormat::Toml)).unwrap();
        let pairs = cfg.into_pairs();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "shed");
        assert_eq!(pairs[0].1.entity.as_deref(), Some("sensor.shed_pack"));
        assert_eq!(pairs[0].1.show_sun, Some(true));
        assert_eq!(pairs[0].1.scale_mode, Some(ScaleMode::Absolute));
        assert_eq!(pairs[1].1, RawCardConfig::default());
    }
}
