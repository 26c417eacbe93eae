// Application state for HTTP handlers
use crate::application::card_registry::CardRegistry;
use crate::application::card_service::CardService;
use crate::application::setup_helper::Clipboard;
use crate::application::streaming_service::StreamingCardService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub card_service: Arc<CardService>,
    pub streaming_service: StreamingCardService,
    pub registry: Arc<CardRegistry>,
    pub clipboard: Arc<dyn Clipboard>,
}
