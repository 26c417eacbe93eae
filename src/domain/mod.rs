// Domain layer - Pure telemetry and chart models
pub mod apex;
pub mod display_config;
pub mod entity;
pub mod no_sun;
pub mod series;
pub mod span_window;
pub mod telemetry;
pub mod time_series;
