// HTTP request handlers
use crate::application::card_editor::ConfigPatch;
use crate::application::setup_helper::{copy_dashboard_yaml, dashboard_yaml, SetupStatus};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response, text_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

async fn respond<T: Serialize>(status: StatusCode, data: &T, compress: bool) -> Response {
    match json_response(status, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn not_found(what: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("unknown {} '{}'", what, id) })),
    )
        .into_response()
}

fn upstream_error(e: anyhow::Error) -> Response {
    tracing::warn!("Home Assistant request failed: {:#}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": format!("{:#}", e) })),
    )
        .into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Sensors exposing battery telemetry
pub async fn list_entities(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.card_service.telemetry_entities().await {
        Ok(entities) => respond(StatusCode::OK, &entities, accepts_brotli(&headers)).await,
        Err(e) => upstream_error(e),
    }
}

/// Custom card registry; built-ins are re-asserted on every poll
pub async fn list_registry(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let added = state.registry.register_builtins();
    if added > 0 {
        tracing::info!("Re-registered {} card types", added);
    }
    respond(StatusCode::OK, &state.registry.entries(), accepts_brotli(&headers)).await
}

pub async fn list_cards(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(
        StatusCode::OK,
        &state.card_service.list_cards(),
        accepts_brotli(&headers),
    )
    .await
}

/// Render one card against the current host states
pub async fn get_card(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.card_service.render(&id).await {
        Ok(Some(view)) => respond(StatusCode::OK, &view, accepts_brotli(&headers)).await,
        Ok(None) => not_found("card", &id),
        Err(e) => upstream_error(e),
    }
}

pub async fn get_card_html(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    match state.card_service.render(&id).await {
        Ok(Some(view)) => match view.to_html() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render card {} HTML: {}", id, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering card").into_response()
            }
        },
        Ok(None) => not_found("card", &id),
        Err(e) => upstream_error(e),
    }
}

/// Stream card re-renders as length-prefixed JSON chunks
pub async fn stream_card(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.streaming_service.stream_card(&id) {
        Some(rx) => stream_from_receiver(rx, accepts_brotli(&headers)).into_response(),
        None => not_found("card", &id),
    }
}

pub async fn get_editor(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.card_service.editor(&id).await {
        Ok(Some(model)) => respond(StatusCode::OK, &model, accepts_brotli(&headers)).await,
        Ok(None) => not_found("card", &id),
        Err(e) => upstream_error(e),
    }
}

pub async fn update_card_config(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ConfigPatch>,
) -> Response {
    match state.card_service.update_config(&id, patch).await {
        Ok(Some(changed)) => respond(StatusCode::OK, &changed, false).await,
        Ok(None) => not_found("card", &id),
        Err(e) => upstream_error(e),
    }
}

pub async fn get_setup_yaml(Path(entity): Path<String>, headers: HeaderMap) -> Response {
    match text_response(dashboard_yaml(&entity), "text/yaml", accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

pub async fn copy_setup_yaml(
    Path(entity): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let status = copy_dashboard_yaml(state.clipboard.as_ref(), &entity).await;
    let code = match status {
        SetupStatus::Copied(_) => StatusCode::OK,
        SetupStatus::Failed(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    respond(code, &status, false).await
}
