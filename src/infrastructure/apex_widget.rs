// ApexCharts card widget - Validates and holds the declarative chart document
use crate::application::chart_widget::{ChartWidget, ChartWidgetFactory, WidgetError};
use crate::domain::apex::{ApexCardConfig, APEX_CARD_TYPE};
use crate::domain::entity::HostStates;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct WidgetDocument {
    config: Option<Value>,
    entities: BTreeSet<String>,
    hass_seen: bool,
}

/// Server-side stand-in for the chart card element: it accepts the same
/// configuration, rejects what the card would reject, and publishes the
/// document once it has both a config and a state store.
#[derive(Default)]
pub struct ApexCardWidget {
    inner: Mutex<WidgetDocument>,
}

impl ApexCardWidget {
    fn lock(&self) -> MutexGuard<'_, WidgetDocument> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate(config: &ApexCardConfig) -> Result<(), WidgetError> {
    if config.series.is_empty() {
        return Err(WidgetError::InvalidConfig("no series".to_string()));
    }
    for axis in &config.apex_config.yaxis {
        if !axis.min.is_finite() || !axis.max.is_finite() || axis.min >= axis.max {
            return Err(WidgetError::InvalidConfig(format!(
                "axis {} has invalid bounds {}..{}",
                axis.id.as_str(),
                axis.min,
                axis.max
            )));
        }
    }
    for series in &config.series {
        if config.axis(series.yaxis_id).is_none() {
            return Err(WidgetError::InvalidConfig(format!(
                "series '{}' references unknown axis {}",
                series.name,
                series.yaxis_id.as_str()
            )));
        }
    }
    Ok(())
}

impl ChartWidget for ApexCardWidget {
    fn set_config(&self, config: &ApexCardConfig) -> Result<(), WidgetError> {
        validate(config)?;
        let document = serde_json::to_value(config)?;

        let mut inner = self.lock();
        inner.entities = config.series.iter().map(|s| s.entity.clone()).collect();
        inner.config = Some(document);
        Ok(())
    }

    fn set_hass(&self, states: &HostStates) {
        let mut inner = self.lock();
        let missing: Vec<&String> = inner
            .entities
            .iter()
            .filter(|id| states.get(id).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::debug!("Chart references entities absent from host: {:?}", missing);
        }
        inner.hass_seen = true;
    }

    fn document(&self) -> Option<Value> {
        let inner = self.lock();
        if !inner.hass_seen {
            return None;
        }
        inner.config.clone()
    }
}

/// Creates widgets for one registered chart card type.
pub struct ApexCardFactory {
    available: BTreeSet<String>,
}

impl ApexCardFactory {
    pub fn new() -> Self {
        Self {
            available: BTreeSet::from([APEX_CARD_TYPE.to_string()]),
        }
    }
}

impl Default for ApexCardFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChartWidgetFactory for ApexCardFactory {
    async fn create(&self, config: &ApexCardConfig) -> Result<Arc<dyn ChartWidget>, WidgetError> {
        if !self.available.contains(&config.card_type) {
            return Err(WidgetError::NotLoaded(format!(
                "no element registered for {}",
                config.card_type
            )));
        }
        let widget = ApexCardWidget::default();
        widget.set_config(config)?;
        Ok(Arc::new(widget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_config_builder::build_card_config;
    use crate::domain::display_config::DisplayConfig;
    use crate::domain::entity::fixtures::telemetry_entity;
    use chrono::{DateTime, Utc};

    fn config() -> ApexCardConfig {
        let pack = telemetry_entity("sensor.pack");
        let now: DateTime<Utc> = DateTime::from_timestamp(1_748_779_200, 0).unwrap();
        build_card_config(&pack.snapshot(), &DisplayConfig::for_entity("sensor.pack"), now)
    }

    #[tokio::test]
    async fn test_document_requires_hass() {
        let widget = ApexCardFactory::new().create(&config()).await.unwrap();
        assert!(widget.document().is_none());

        widget.set_hass(&HostStates::new(vec![telemetry_entity("sensor.pack")]));
        let document = widget.document().unwrap();
        assert_eq!(document["type"], APEX_CARD_TYPE);
    }

    #[tokio::test]
    async fn test_unknown_card_type_is_not_loaded() {
        let mut cfg = config();
        cfg.card_type = "custom:missing-card".to_string();
        let result = ApexCardFactory::new().create(&cfg).await;
        assert!(matches!(result, Err(WidgetError::NotLoaded(_))));
    }

    #[test]
    fn test_rejects_inverted_axis() {
        let mut cfg = config();
        cfg.apex_config.yaxis[0].min = 100.0;
        cfg.apex_config.yaxis[0].max = 0.0;

        let widget = ApexCardWidget::default();
        assert!(matches!(
            widget.set_config(&cfg),
            Err(WidgetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_empty_series() {
        let mut cfg = config();
        cfg.series.clear();
        assert!(ApexCardWidget::default().set_config(&cfg).is_err());
    }
}
