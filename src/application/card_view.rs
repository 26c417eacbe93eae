// Rendered card output
use crate::application::card_state::CardState;
use crate::application::card_summary::CardSummary;
use crate::domain::display_config::DisplayConfig;
use askama::Template;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CardView {
    /// Nothing rendered yet: config or state store still missing.
    #[default]
    Idle,
    Prompt { title: String, message: String },
    Waiting { title: String, message: String },
    Guidance { title: String, message: String },
    Chart {
        title: String,
        config: serde_json::Value,
        summary: CardSummary,
    },
    Error { title: String, message: String },
}

impl CardView {
    /// Text views for every state except `Ready`, which needs the chart widget.
    pub fn for_state(config: &DisplayConfig, state: &CardState) -> Option<Self> {
        let title = config.title.clone();
        match state {
            CardState::NoEntitySelected { has_candidates } => Some(CardView::Prompt {
                title,
                message: if *has_candidates {
                    "Select a valid Battery Telemetry entity in card settings.".to_string()
                } else {
                    "No valid Battery Telemetry entities found. Configure the integration first."
                        .to_string()
                },
            }),
            CardState::EntityUnavailable { state } => Some(CardView::Waiting {
                title,
                message: format!(
                    "Waiting for {} to report battery telemetry (current state: {}).",
                    config.entity, state
                ),
            }),
            CardState::EntityMissingTelemetry => Some(CardView::Guidance {
                title,
                message: format!(
                    "{} does not expose battery telemetry. Select the Battery Telemetry sensor in card settings.",
                    config.entity
                ),
            }),
            CardState::Ready => None,
        }
    }

    pub fn render_failure(config: &DisplayConfig, reason: impl std::fmt::Display) -> Self {
        CardView::Error {
            title: config.title.clone(),
            message: format!("Failed to render chart card: {}", reason),
        }
    }

    pub fn is_chart(&self) -> bool {
        matches!(self, CardView::Chart { .. })
    }

    /// Host markup for the card. The chart view embeds its configuration as a
    /// JSON data attribute for the chart element.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        match self {
            CardView::Idle => Ok(String::new()),
            CardView::Prompt { title, message }
            | CardView::Waiting { title, message }
            | CardView::Guidance { title, message }
            | CardView::Error { title, message } => TextCardTemplate { title, message }.render(),
            CardView::Chart { config, .. } => ChartCardTemplate {
                config: config.to_string(),
            }
            .render(),
        }
    }
}

#[derive(Template)]
#[template(path = "card.html")]
struct TextCardTemplate<'a> {
    title: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "chart.html")]
struct ChartCardTemplate {
    config: String,
}
