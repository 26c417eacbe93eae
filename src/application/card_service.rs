// Card service - Use cases over the configured cards
use crate::application::card_editor::{CardEditor, ConfigChanged, ConfigPatch, EditorModel};
use crate::application::card_view::CardView;
use crate::application::chart_widget::ChartWidgetFactory;
use crate::application::state_repository::StateRepository;
use crate::application::widget_controller::WidgetController;
use crate::domain::display_config::{DisplayConfig, RawCardConfig};
use crate::domain::entity::HostStates;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Card id used when no cards are configured.
pub const DEFAULT_CARD_ID: &str = "default";

#[derive(Debug, Clone, Serialize)]
pub struct CardListing {
    pub id: String,
    pub config: DisplayConfig,
    pub card_size: u32,
}

pub struct CardService {
    repository: Arc<dyn StateRepository>,
    cards: BTreeMap<String, Arc<WidgetController>>,
}

impl CardService {
    /// Builds one controller per card. Without configured cards a single
    /// default card is created from the first telemetry entity the host has.
    pub async fn new(
        repository: Arc<dyn StateRepository>,
        factory: Arc<dyn ChartWidgetFactory>,
        configs: Vec<(String, RawCardConfig)>,
    ) -> Self {
        let configs = if configs.is_empty() {
            let states = repository.list_states().await.unwrap_or_else(|e| {
                tracing::warn!("Could not read host states for default card: {}", e);
                HostStates::default()
            });
            vec![(
                DEFAULT_CARD_ID.to_string(),
                WidgetController::stub_config(&states).to_raw(),
            )]
        } else {
            configs
        };

        let mut cards = BTreeMap::new();
        for (id, raw) in configs {
            let controller = Arc::new(WidgetController::new(factory.clone()));
            controller.set_config(DisplayConfig::normalize(raw)).await;
            tracing::info!("Configured card {}", id);
            cards.insert(id, controller);
        }

        Self { repository, cards }
    }

    pub fn list_cards(&self) -> Vec<CardListing> {
        self.cards
            .iter()
            .filter_map(|(id, controller)| {
                controller.config().map(|config| CardListing {
                    id: id.clone(),
                    config,
                    card_size: controller.card_size(),
                })
            })
            .collect()
    }

    pub fn controller(&self, id: &str) -> Option<Arc<WidgetController>> {
        self.cards.get(id).cloned()
    }

    pub async fn telemetry_entities(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.repository.list_states().await?.telemetry_entities())
    }

    /// Feed the current host states to one card; `Ok(None)` for an unknown id.
    pub async fn render(&self, id: &str) -> anyhow::Result<Option<CardView>> {
        let Some(controller) = self.controller(id) else {
            return Ok(None);
        };
        let states = Arc::new(self.repository.list_states().await?);
        controller.set_hass(states).await;
        Ok(Some(controller.view()))
    }

    pub async fn editor(&self, id: &str) -> anyhow::Result<Option<EditorModel>> {
        let Some(config) = self.controller(id).and_then(|c| c.config()) else {
            return Ok(None);
        };
        let states = self.repository.list_states().await?;
        Ok(Some(CardEditor::new(config).reconcile(&states)))
    }

    /// Apply one editor change and push the result into the card.
    pub async fn update_config(
        &self,
        id: &str,
        patch: ConfigPatch,
    ) -> anyhow::Result<Option<ConfigChanged>> {
        let Some(controller) = self.controller(id) else {
            return Ok(None);
        };
        let mut editor = CardEditor::new(controller.config().unwrap_or_default());
        let changed = editor.apply(patch);
        controller.set_config(editor.config().clone()).await;
        tracing::debug!("Card {} reconfigured", id);
        Ok(Some(changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_widget::fakes::JsonWidgetFactory;
    use crate::application::state_repository::fakes::MemoryStateRepository;
    use crate::domain::entity::fixtures::{entity, telemetry_entity};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn raw(entity: &str) -> RawCardConfig {
        RawCardConfig {
            entity: Some(entity.to_string()),
            ..Default::default()
        }
    }

    async fn service(
        repository: Arc<MemoryStateRepository>,
        configs: Vec<(String, RawCardConfig)>,
    ) -> (CardService, Arc<JsonWidgetFactory>) {
        let factory = Arc::new(JsonWidgetFactory::default());
        let service = CardService::new(repository, factory.clone(), configs).await;
        (service, factory)
    }

    #[tokio::test]
    async fn test_default_card_uses_first_telemetry_entity() {
        let repository = Arc::new(MemoryStateRepository::new(vec![
            telemetry_entity("sensor.pack"),
            entity("sensor.other", "1", json!({})),
        ]));
        let (service, _) = service(repository, vec![]).await;

        let cards = service.list_cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, DEFAULT_CARD_ID);
        assert_eq!(cards[0].config.entity, "sensor.pack");
        assert_eq!(cards[0].card_size, 8);
    }

    #[tokio::test]
    async fn test_render_produces_chart_and_reuses_widget() {
        let repository = Arc::new(MemoryStateRepository::new(vec![telemetry_entity(
            "sensor.pack",
        )]));
        let (service, factory) =
            service(repository, vec![("pack".to_string(), raw("sensor.pack"))]).await;

        let view = service.render("pack").await.unwrap().unwrap();
        assert!(view.is_chart());
        let again = service.render("pack").await.unwrap().unwrap();
        assert_eq!(view, again);
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);

        assert!(service.render("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_render_propagates_repository_failure() {
        let repository = Arc::new(MemoryStateRepository::new(vec![]));
        let (service, _) =
            service(repository.clone(), vec![("pack".to_string(), raw("sensor.pack"))]).await;
        repository.fail.store(true, Ordering::SeqCst);

        assert!(service.render("pack").await.is_err());
    }

    #[tokio::test]
    async fn test_update_config_reconfigures_card() {
        let repository = Arc::new(MemoryStateRepository::new(vec![telemetry_entity(
            "sensor.pack",
        )]));
        let (service, _) =
            service(repository, vec![("pack".to_string(), raw("sensor.pack"))]).await;

        let changed = service
            .update_config("pack", ConfigPatch::Title("Shed".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed.config.title.as_deref(), Some("Shed"));

        match service.render("pack").await.unwrap().unwrap() {
            CardView::Chart { title, .. } => assert_eq!(title, "Shed"),
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_editor_reconciles_against_host() {
        let repository = Arc::new(MemoryStateRepository::new(vec![telemetry_entity(
            "sensor.pack",
        )]));
        let (service, _) = service(repository, vec![("pack".to_string(), raw(""))]).await;

        let model = service.editor("pack").await.unwrap().unwrap();
        assert_eq!(model.config.entity, "sensor.pack");
        assert!(service.editor("nope").await.unwrap().is_none());
    }
}
