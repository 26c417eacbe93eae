// Infrastructure layer - External dependencies and adapters
pub mod apex_widget;
pub mod chunked_json;
pub mod clipboard;
pub mod config;
pub mod ha_repository;
pub mod http_response;
