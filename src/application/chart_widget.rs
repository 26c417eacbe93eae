// Chart widget seam - The external chart card the controller drives
use crate::domain::apex::ApexCardConfig;
use crate::domain::entity::HostStates;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("ApexCharts card not loaded: {0}")]
    NotLoaded(String),
    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),
    #[error("chart has not rendered")]
    NotRendered,
    #[error("failed to encode chart configuration: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A live chart instance. Implementations use interior mutability so one
/// instance can be shared between the controller and the renders it spawns.
pub trait ChartWidget: Send + Sync {
    fn set_config(&self, config: &ApexCardConfig) -> Result<(), WidgetError>;

    fn set_hass(&self, states: &HostStates);

    /// What the widget currently displays.
    fn document(&self) -> Option<serde_json::Value>;
}

#[async_trait]
pub trait ChartWidgetFactory: Send + Sync {
    /// Construct and configure a new widget; may need to load the chart card first.
    async fn create(&self, config: &ApexCardConfig) -> Result<Arc<dyn ChartWidget>, WidgetError>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Widget whose document is the serialized chart configuration.
    #[derive(Default)]
    pub struct JsonWidget {
        document: Mutex<Option<serde_json::Value>>,
    }

    impl ChartWidget for JsonWidget {
        fn set_config(&self, config: &ApexCardConfig) -> Result<(), WidgetError> {
            *self.document.lock().unwrap() = Some(serde_json::to_value(config)?);
            Ok(())
        }

        fn set_hass(&self, _states: &HostStates) {}

        fn document(&self) -> Option<serde_json::Value> {
            self.document.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    pub struct JsonWidgetFactory {
        pub created: AtomicUsize,
    }

    #[async_trait]
    impl ChartWidgetFactory for JsonWidgetFactory {
        async fn create(&self, config: &ApexCardConfig) -> Result<Arc<dyn ChartWidget>, WidgetError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            let widget = JsonWidget::default();
            widget.set_config(config)?;
            Ok(Arc::new(widget))
        }
    }
}
