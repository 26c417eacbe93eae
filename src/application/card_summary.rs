// Header labels shown next to the chart
use crate::domain::no_sun::hours_until_empty;
use crate::domain::telemetry::TelemetrySnapshot;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSummary {
    pub no_sun_runtime: String,
    pub full_charge_eta: String,
}

impl CardSummary {
    /// Any missing or non-finite input renders as "n/a".
    pub fn from_snapshot(snapshot: &TelemetrySnapshot, now: DateTime<Utc>) -> Self {
        let no_sun_runtime = match (
            snapshot.baseline_soc(),
            snapshot.load_w(),
            snapshot.capacity_wh(),
        ) {
            (Some(soc), Some(load), Some(capacity)) => hours_until_empty(soc, load, capacity),
            _ => None,
        }
        .map(format_hours)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            no_sun_runtime,
            full_charge_eta: full_charge_label(snapshot, now),
        }
    }
}

/// The explicit ETA in hours wins; otherwise the absolute `full_charge_at`
/// instant is converted to hours from now.
fn full_charge_label(snapshot: &TelemetrySnapshot, now: DateTime<Utc>) -> String {
    let hours = snapshot.full_charge_eta_hours.filter(|h| *h >= 0.0).or_else(|| {
        snapshot.full_charge_at.and_then(|at| {
            let hours = (at - now).num_seconds() as f64 / 3600.0;
            (hours >= 0.0).then_some(hours)
        })
    });

    match (hours, snapshot.full_charge_at) {
        (Some(h), Some(at)) => format!(
            "{} ({})",
            format_hours(h),
            at.with_timezone(&Local).format("%d %b %H:%M")
        ),
        (Some(h), None) => format_hours(h),
        (None, _) => NOT_AVAILABLE.to_string(),
    }
}

fn format_hours(hours: f64) -> String {
    if hours >= 48.0 {
        format!("{:.1} d", hours / 24.0)
    } else {
        format!("{:.1} h", hours)
    }
}
