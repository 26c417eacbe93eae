// Application layer - Use cases, card state machine and seams to the host
pub mod card_editor;
pub mod card_registry;
pub mod card_service;
pub mod card_state;
pub mod card_summary;
pub mod card_view;
pub mod chart_config_builder;
pub mod chart_widget;
pub mod series_assembler;
pub mod setup_helper;
pub mod state_repository;
pub mod streaming_service;
pub mod widget_controller;
