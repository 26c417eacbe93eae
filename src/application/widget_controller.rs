// Widget controller - Card lifecycle, state selection and chart widget ownership
use crate::application::card_state::{select_state, Fingerprint};
use crate::application::card_summary::CardSummary;
use crate::application::card_view::CardView;
use crate::application::chart_config_builder::build_card_config;
use crate::application::chart_widget::{ChartWidget, ChartWidgetFactory, WidgetError};
use crate::domain::display_config::{DisplayConfig, RawCardConfig};
use crate::domain::entity::HostStates;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const CARD_SIZE: u32 = 8;

#[derive(Default)]
struct ControllerState {
    config: Option<DisplayConfig>,
    states: Option<Arc<HostStates>>,
    widget: Option<Arc<dyn ChartWidget>>,
    fingerprint: Option<Fingerprint>,
    generation: u64,
    view: CardView,
}

struct ChartJob {
    generation: u64,
    config: DisplayConfig,
    states: Arc<HostStates>,
    widget: Option<Arc<dyn ChartWidget>>,
}

/// Drives one card. The lock is never held across an await; a render that
/// finishes after a newer one has started is dropped.
pub struct WidgetController {
    factory: Arc<dyn ChartWidgetFactory>,
    clock: fn() -> DateTime<Utc>,
    inner: Mutex<ControllerState>,
}

impl WidgetController {
    pub fn new(factory: Arc<dyn ChartWidgetFactory>) -> Self {
        Self {
            factory,
            clock: Utc::now,
            inner: Mutex::new(ControllerState::default()),
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn card_size(&self) -> u32 {
        CARD_SIZE
    }

    /// Config offered when the card is first added to a dashboard.
    pub fn stub_config(states: &HostStates) -> DisplayConfig {
        DisplayConfig::normalize(RawCardConfig {
            entity: states.telemetry_entities().into_iter().next(),
            ..Default::default()
        })
    }

    pub fn config(&self) -> Option<DisplayConfig> {
        self.lock().config.clone()
    }

    pub fn view(&self) -> CardView {
        self.lock().view.clone()
    }

    /// Always re-renders once a state store has been seen.
    pub async fn set_config(&self, config: DisplayConfig) -> Option<CardView> {
        self.lock().config = Some(config);
        self.render(true).await
    }

    /// Re-renders only when the selected entity changed since the last render.
    pub async fn set_hass(&self, states: Arc<HostStates>) -> Option<CardView> {
        self.lock().states = Some(states);
        self.render(false).await
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn render(&self, force: bool) -> Option<CardView> {
        let job = {
            let mut inner = self.lock();
            let (Some(config), Some(states)) = (inner.config.clone(), inner.states.clone()) else {
                return None;
            };

            let fingerprint = Fingerprint::capture(&config, &states);
            if !force && inner.fingerprint.as_ref() == Some(&fingerprint) {
                tracing::trace!("Skipping render of {}: unchanged", config.entity);
                return None;
            }
            inner.fingerprint = Some(fingerprint);
            inner.generation += 1;

            let state = select_state(&config, &states);
            if let Some(view) = CardView::for_state(&config, &state) {
                tracing::debug!("Card for '{}' shows {:?}", config.entity, state);
                inner.view = view.clone();
                return Some(view);
            }

            ChartJob {
                generation: inner.generation,
                config,
                states,
                widget: inner.widget.clone(),
            }
        };

        let generation = job.generation;
        let config = job.config.clone();
        let outcome = self.render_chart(job).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(
                "Discarding stale render {} of {} (current {})",
                generation,
                config.entity,
                inner.generation
            );
            return None;
        }

        let view = match outcome {
            Ok((widget, view)) => {
                inner.widget = Some(widget);
                view
            }
            Err(e) => {
                tracing::error!("Chart render failed for {}: {}", config.entity, e);
                inner.widget = None;
                inner.fingerprint = None;
                CardView::render_failure(&config, e)
            }
        };
        inner.view = view.clone();
        Some(view)
    }

    async fn render_chart(
        &self,
        job: ChartJob,
    ) -> Result<(Arc<dyn ChartWidget>, CardView), WidgetError> {
        let snapshot = match job.states.get(&job.config.entity) {
            Some(entity) => entity.snapshot(),
            None => return Err(WidgetError::InvalidConfig("entity vanished".to_string())),
        };
        let now = (self.clock)();
        let apex = build_card_config(&snapshot, &job.config, now);

        let widget = match job.widget {
            Some(widget) => {
                widget.set_config(&apex)?;
                widget
            }
            None => {
                tracing::info!("Creating chart widget for {}", job.config.entity);
                self.factory.create(&apex).await?
            }
        };
        widget.set_hass(&job.states);

        let document = widget.document().ok_or(WidgetError::NotRendered)?;
        let view = CardView::Chart {
            title: job.config.title.clone(),
            config: document,
            summary: CardSummary::from_snapshot(&snapshot, now),
        };
        Ok((widget, view))
    }
}
