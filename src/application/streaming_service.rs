// Streaming card service - Pushes card re-renders while host telemetry changes
use crate::application::card_service::CardService;
use crate::application::card_view::CardView;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamMessage {
    pub card_id: String,
    pub sequence: u64,
    pub view: CardView,
}

#[derive(Clone)]
pub struct StreamingCardService {
    card_service: Arc<CardService>,
    poll_interval: Duration,
}

impl StreamingCardService {
    pub fn new(card_service: Arc<CardService>, poll_interval: Duration) -> Self {
        Self {
            card_service,
            poll_interval,
        }
    }

    /// `None` for an unknown card. The poller stops once the receiver is dropped.
    pub fn stream_card(&self, card_id: &str) -> Option<mpsc::Receiver<StreamMessage>> {
        self.card_service.controller(card_id)?;

        let (tx, rx) = mpsc::channel(16);
        let card_service = self.card_service.clone();
        let card_id = card_id.to_string();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticks = IntervalStream::new(tokio::time::interval(poll_interval));
            let mut sequence = 0;
            let mut last_sent: Option<CardView> = None;

            // First tick fires immediately
            while ticks.next().await.is_some() {
                let view = match card_service.render(&card_id).await {
                    Ok(Some(view)) => view,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Polling host states for {} failed: {}", card_id, e);
                        continue;
                    }
                };

                // Other callers may have rendered the same change already
                if last_sent.as_ref() == Some(&view) {
                    continue;
                }

                sequence += 1;
                let msg = StreamMessage {
                    card_id: card_id.clone(),
                    sequence,
                    view: view.clone(),
                };
                if tx.send(msg).await.is_err() {
                    break;
                }
                last_sent = Some(view);
            }

            tracing::debug!("Stream for {} closed after {} messages", card_id, sequence);
        });

        Some(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_widget::fakes::JsonWidgetFactory;
    use crate::application::state_repository::fakes::MemoryStateRepository;
    use crate::domain::display_config::RawCardConfig;
    use crate::domain::entity::fixtures::{entity, telemetry_entity};
    use serde_json::json;

    async fn streaming(repository: Arc<MemoryStateRepository>) -> StreamingCardService {
        let card_service = CardService::new(
            repository,
            Arc::new(JsonWidgetFactory::default()),
            vec![(
                "pack".to_string(),
                RawCardConfig {
                    entity: Some("sensor.pack".to_string()),
                    ..Default::default()
                },
            )],
        )
        .await;
        StreamingCardService::new(Arc::new(card_service), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_stream_sends_only_changes() {
        let repository = Arc::new(MemoryStateRepository::new(vec![entity(
            "sensor.pack",
            "unavailable",
            json!({}),
        )]));
        let service = streaming(repository.clone()).await;
        let mut rx = service.stream_card("pack").unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert!(matches!(first.view, CardView::Waiting { .. }));

        repository.replace(vec![telemetry_entity("sensor.pack")]);
        let second = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.sequence, 2);
        assert!(second.view.is_chart());
    }

    #[tokio::test]
    async fn test_unknown_card_has_no_stream() {
        let service = streaming(Arc::new(MemoryStateRepository::default())).await;
        assert!(service.stream_card("nope").is_none());
    }
}
