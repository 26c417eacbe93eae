// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::card_registry::CardRegistry;
use crate::application::card_service::CardService;
use crate::application::streaming_service::StreamingCardService;
use crate::infrastructure::apex_widget::ApexCardFactory;
use crate::infrastructure::clipboard::FileClipboard;
use crate::infrastructure::config::{load_cards_config, load_service_config};
use crate::infrastructure::ha_repository::HaStateRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    copy_setup_yaml, get_card, get_card_html, get_editor, get_setup_yaml, health_check,
    list_cards, list_entities, list_registry, stream_card, update_card_config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let service_config = load_service_config().context("loading config/service")?;
    let cards_config = load_cards_config().context("loading config/cards")?;

    // Host state store (infrastructure layer)
    let ha = &service_config.home_assistant;
    let repository = Arc::new(
        HaStateRepository::new(ha.base_url.clone(), ha.token.clone())?
            .with_retry_config(ha.max_retries, Duration::from_millis(ha.retry_delay_ms)),
    );

    // Registry is filled before any card is built
    let registry = Arc::new(CardRegistry::new());
    registry.register_builtins();

    // Services (application layer)
    let card_service = Arc::new(
        CardService::new(
            repository,
            Arc::new(ApexCardFactory::new()),
            cards_config.into_pairs(),
        )
        .await,
    );
    let streaming_service = StreamingCardService::new(
        card_service.clone(),
        Duration::from_secs(service_config.server.poll_interval_secs.max(1)),
    );

    let state = Arc::new(AppState {
        card_service,
        streaming_service,
        registry,
        clipboard: Arc::new(FileClipboard::new(service_config.setup.export_path.clone())),
    });

    // Compression is applied per response, so no CompressionLayer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/entities", get(list_entities))
        .route("/registry", get(list_registry))
        .route("/cards", get(list_cards))
        .route("/cards/:id", get(get_card))
        .route("/cards/:id/html", get(get_card_html))
        .route("/cards/:id/stream", get(stream_card))
        .route("/cards/:id/editor", get(get_editor))
        .route("/cards/:id/config", post(update_card_config))
        .route("/setup/:entity", get(get_setup_yaml))
        .route("/setup/:entity/copy", post(copy_setup_yaml))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = service_config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", service_config.server.bind))?;
    tracing::info!("Starting battery-telemetry-card service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
