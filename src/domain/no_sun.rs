// Zero-solar SOC projection used as a depletion floor
use super::telemetry::{SeriesKey, TelemetrySnapshot};
use super::time_series::dedupe_sort_by_timestamp;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Discharge-only SOC trajectory, one point per distinct forecast timestamp
/// in ascending order.
///
/// The earliest timestamp carries the baseline; every following step subtracts
/// `load * elapsed_hours / capacity * 100` and clamps to `[0, 100]`.
/// Returns an empty sequence when capacity is not positive or load or
/// baseline are not finite, which callers read as "unknown".
pub fn project(
    forecast_times: &[i64],
    baseline_soc: f64,
    load_watts: f64,
    capacity_wh: f64,
) -> Vec<(i64, f64)> {
    if !(capacity_wh.is_finite() && capacity_wh > 0.0)
        || !load_watts.is_finite()
        || !baseline_soc.is_finite()
    {
        return Vec::new();
    }

    let mut times = forecast_times.to_vec();
    times.sort_unstable();
    times.dedup();

    let mut soc = baseline_soc.clamp(0.0, 100.0);
    let mut prev: Option<i64> = None;
    let mut out = Vec::with_capacity(times.len());

    for t in times {
        if let Some(p) = prev {
            let elapsed_hours = t.saturating_sub(p) as f64 / MS_PER_HOUR;
            soc = (soc - load_watts * elapsed_hours / capacity_wh * 100.0).clamp(0.0, 100.0);
        }
        out.push((t, soc));
        prev = Some(t);
    }
    out
}

/// The snapshot's own no-sun series when it has one, otherwise a synthesized one.
pub fn no_sun_series(snapshot: &TelemetrySnapshot) -> Vec<(i64, f64)> {
    let precomputed = snapshot.points(SeriesKey::SocProjectionNoSun);
    if !precomputed.is_empty() {
        return dedupe_sort_by_timestamp(precomputed);
    }

    let (Some(baseline), Some(load), Some(capacity), Some(forecast)) = (
        snapshot.baseline_soc(),
        snapshot.load_w(),
        snapshot.capacity_wh(),
        snapshot.forecast.as_ref(),
    ) else {
        return Vec::new();
    };

    let times: Vec<i64> = forecast.steps().iter().map(|s| s.time_ms).collect();
    project(&times, baseline, load, capacity)
}

/// Hours until an idle battery at `soc` percent runs flat under `load_watts`.
pub fn hours_until_empty(soc: f64, load_watts: f64, capacity_wh: f64) -> Option<f64> {
    if !(soc.is_finite() && load_watts.is_finite() && load_watts > 0.0 && capacity_wh > 0.0) {
        return None;
    }
    let hours = soc.clamp(0.0, 100.0) / 100.0 * capacity_wh / load_watts;
    hours.is_finite().then_some(hours)
}
