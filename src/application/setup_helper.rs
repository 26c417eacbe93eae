// Setup helper - Dashboard YAML export for a telemetry entity
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

const ENTITY_PLACEHOLDER: &str = "__ENTITY__";

const DASHBOARD_TEMPLATE: &str = r#"title: Battery Telemetry
views:
  - title: Battery
    path: battery
    cards:
      - type: custom:apexcharts-card
        header:
          show: true
          title: Battery Telemetry
        graph_span: 48h
        span:
          offset: +24h
        update_interval: 5min
        now:
          show: true
          label: Now
        yaxis:
          - id: soc
            min: 0
            max: 100
            decimals: 1
          - id: power
            opposite: true
            decimals: 1
        series:
          - entity: __ENTITY__
            name: SOC (history)
            yaxis_id: soc
            data_generator: |
              return (entity.attributes.apex_series?.soc_actual || []).map(p => [new Date(p.x).getTime(), p.y]);
          - entity: __ENTITY__
            name: SOC (projection weather)
            yaxis_id: soc
            stroke_dash: 4
            data_generator: |
              return (entity.attributes.apex_series?.soc_projection_weather || []).map(p => [new Date(p.x).getTime(), p.y]);
          - entity: __ENTITY__
            name: SOC (projection clear sky)
            yaxis_id: soc
            stroke_dash: 6
            data_generator: |
              return (entity.attributes.apex_series?.soc_projection_clear || []).map(p => [new Date(p.x).getTime(), p.y]);
          - entity: __ENTITY__
            name: Net W (observed)
            yaxis_id: power
            data_generator: |
              return (entity.attributes.apex_series?.power_observed || []).map(p => [new Date(p.x).getTime(), p.y]);
          - entity: __ENTITY__
            name: Net W (modeled)
            yaxis_id: power
            stroke_dash: 4
            data_generator: |
              return (entity.attributes.apex_series?.power_modeled || []).map(p => [new Date(p.x).getTime(), p.y]);
          - entity: __ENTITY__
            name: Load W
            yaxis_id: power
            data_generator: |
              return (entity.attributes.apex_series?.power_consumption || []).map(p => [new Date(p.x).getTime(), p.y]);
"#;

/// Fixed one-view dashboard; the entity id is substituted as-is.
pub fn dashboard_yaml(entity_id: &str) -> String {
    DASHBOARD_TEMPLATE.replace(ENTITY_PLACEHOLDER, entity_id)
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SetupStatus {
    Copied(String),
    Failed(String),
}

/// One attempt, no retry; failures become a message for the user.
pub async fn copy_dashboard_yaml(clipboard: &dyn Clipboard, entity_id: &str) -> SetupStatus {
    if entity_id.is_empty() {
        return SetupStatus::Failed("Select a Battery Telemetry entity first.".to_string());
    }
    match clipboard.write_text(&dashboard_yaml(entity_id)).await {
        Ok(()) => SetupStatus::Copied(format!("Dashboard YAML for {} copied.", entity_id)),
        Err(e) => {
            tracing::warn!("Copying dashboard YAML failed: {}", e);
            SetupStatus::Failed(format!("Copy failed: {}", e))
        }
    }
}
