// Visible time window derived from the telemetry extent
use super::telemetry::{SeriesKey, TelemetrySnapshot};
use chrono::{DateTime, Utc};

const HOUR_MS: i64 = 3_600_000;

/// Series whose timestamps define the window. The no-sun projection is excluded
/// because it only ever covers the forecast timestamps.
const WINDOW_KEYS: [SeriesKey; 8] = [
    SeriesKey::SocActual,
    SeriesKey::SocProjectionWeather,
    SeriesKey::SocProjectionClear,
    SeriesKey::SunHistory,
    SeriesKey::SunForecast,
    SeriesKey::PowerObserved,
    SeriesKey::PowerModeled,
    SeriesKey::PowerConsumption,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanWindow {
    pub span_hours: i64,
    pub future_offset_hours: Option<i64>,
}

impl SpanWindow {
    pub fn graph_span(&self) -> String {
        format!("{}h", self.span_hours)
    }

    pub fn offset(&self) -> Option<String> {
        self.future_offset_hours.map(|h| format!("+{}h", h))
    }
}

/// `None` when no series carries a parsable timestamp; the chart then keeps
/// its own default window. The snapshot's `now` takes precedence over `now`.
pub fn compute_window(snapshot: &TelemetrySnapshot, now: DateTime<Utc>) -> Option<SpanWindow> {
    let (min_ts, max_ts) = WINDOW_KEYS
        .iter()
        .flat_map(|&key| snapshot.points(key))
        .filter_map(|p| p.time_ms)
        .fold(None, |acc: Option<(i64, i64)>, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })?;

    let reference = snapshot.now.unwrap_or(now).timestamp_millis();
    let ahead = max_ts.saturating_sub(reference);

    Some(SpanWindow {
        span_hours: ceil_hours(max_ts.saturating_sub(min_ts)).max(1),
        future_offset_hours: (ahead > 0).then(|| ceil_hours(ahead)),
    })
}

fn ceil_hours(ms: i64) -> i64 {
    ms.saturating_add(HOUR_MS - 1).div_euclid(HOUR_MS)
}
