// Series assembler - Decides which lines the chart plots and in what order
use crate::domain::display_config::DisplayConfig;
use crate::domain::no_sun::no_sun_series;
use crate::domain::series::{AssembledSeries, AxisId};
use crate::domain::telemetry::{SeriesKey, TelemetrySnapshot};
use crate::domain::time_series::dedupe_sort_by_timestamp;

struct SeriesTemplate {
    key: SeriesKey,
    name: &'static str,
    axis: AxisId,
    stroke_dash: Option<u32>,
}

const SOC_HISTORY: SeriesTemplate = SeriesTemplate {
    key: SeriesKey::SocActual,
    name: "SOC (history)",
    axis: AxisId::Soc,
    stroke_dash: None,
};

const SOC_WEATHER: SeriesTemplate = SeriesTemplate {
    key: SeriesKey::SocProjectionWeather,
    name: "SOC (projection weather)",
    axis: AxisId::Soc,
    stroke_dash: Some(4),
};

const SOC_NO_SUN: SeriesTemplate = SeriesTemplate {
    key: SeriesKey::SocProjectionNoSun,
    name: "SOC (projection no sun)",
    axis: AxisId::Soc,
    stroke_dash: Some(2),
};

const SOC_CLEAR: SeriesTemplate = SeriesTemplate {
    key: SeriesKey::SocProjectionClear,
    name: "SOC (projection clear sky)",
    axis: AxisId::Soc,
    stroke_dash: Some(6),
};

const POWER: [SeriesTemplate; 3] = [
    SeriesTemplate {
        key: SeriesKey::PowerObserved,
        name: "Net W (observed)",
        axis: AxisId::Power,
        stroke_dash: None,
    },
    SeriesTemplate {
        key: SeriesKey::PowerModeled,
        name: "Net W (modeled)",
        axis: AxisId::Power,
        stroke_dash: Some(4),
    },
    SeriesTemplate {
        key: SeriesKey::PowerConsumption,
        name: "Load W",
        axis: AxisId::Power,
        stroke_dash: None,
    },
];

const SUN: [SeriesTemplate; 2] = [
    SeriesTemplate {
        key: SeriesKey::SunHistory,
        name: "Sun elevation (history)",
        axis: AxisId::Sun,
        stroke_dash: None,
    },
    SeriesTemplate {
        key: SeriesKey::SunForecast,
        name: "Sun elevation (forecast)",
        axis: AxisId::Sun,
        stroke_dash: Some(6),
    },
];

impl SeriesTemplate {
    fn take(&self, snapshot: &TelemetrySnapshot) -> AssembledSeries {
        AssembledSeries {
            name: self.name,
            axis: self.axis,
            points: dedupe_sort_by_timestamp(snapshot.points(self.key)),
            stroke_dash: self.stroke_dash,
            source: Some(self.key),
        }
    }
}

/// Ordered series for one render: SOC history and weather projection always,
/// the no-sun floor when one could be produced, then the optional families.
pub fn assemble(snapshot: &TelemetrySnapshot, config: &DisplayConfig) -> Vec<AssembledSeries> {
    let mut series = vec![
        SOC_HISTORY.take(snapshot),
        SOC_WEATHER.take(snapshot),
    ];

    let no_sun = no_sun_series(snapshot);
    if !no_sun.is_empty() {
        let precomputed = !snapshot.points(SeriesKey::SocProjectionNoSun).is_empty();
        series.push(AssembledSeries {
            name: SOC_NO_SUN.name,
            axis: SOC_NO_SUN.axis,
            points: no_sun,
            stroke_dash: SOC_NO_SUN.stroke_dash,
            source: precomputed.then_some(SOC_NO_SUN.key),
        });
    }

    if config.show_clear {
        series.push(SOC_CLEAR.take(snapshot));
    }
    if config.show_power {
        series.extend(POWER.iter().map(|t| t.take(snapshot)));
    }
    if config.show_sun {
        series.extend(SUN.iter().map(|t| t.take(snapshot)));
    }

    tracing::debug!(
        "Assembled {} series for {}",
        series.len(),
        if config.entity.is_empty() { "<unset>" } else { config.entity.as_str() }
    );
    series
}
