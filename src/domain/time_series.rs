// Numeric helpers over raw telemetry points
use super::telemetry::TimePoint;
use serde::Serialize;
use std::collections::HashSet;

pub const SOC_PAD_FRACTION: f64 = 0.08;
pub const POWER_PAD_FRACTION: f64 = 0.14;
pub const SUN_PAD_FRACTION: f64 = 0.08;

/// Closed y-axis interval. Constructed ranges always satisfy `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Intersect with `[lo, hi]`. Returns `None` when nothing of the range survives.
    pub fn clamp_to(self, lo: f64, hi: f64) -> Option<AxisRange> {
        let min = self.min.max(lo);
        let max = self.max.min(hi);
        (min < max).then_some(AxisRange { min, max })
    }
}

pub fn extract_finite_values<'a>(points: impl IntoIterator<Item = &'a TimePoint>) -> Vec<f64> {
    points
        .into_iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .collect()
}

/// Min/max of the finite values, widened by ±1 when collapsed and then padded
/// outward by `pad_fraction` of the span on both ends.
pub fn padded_range<'a>(
    points: impl IntoIterator<Item = &'a TimePoint>,
    fallback_min: f64,
    fallback_max: f64,
    pad_fraction: f64,
) -> AxisRange {
    let values = extract_finite_values(points);
    let Some((mut min, mut max)) = values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
    }) else {
        return AxisRange::new(fallback_min, fallback_max);
    };

    if min == max {
        min -= 1.0;
        max += 1.0;
    }
    let pad = (max - min) * pad_fraction;
    AxisRange::new(min - pad, max + pad)
}

/// Chart-ready `(epoch_ms, value)` pairs: unparsable timestamps and non-finite
/// values dropped, first sample of a repeated timestamp kept, ascending by time.
pub fn dedupe_sort_by_timestamp<'a>(
    points: impl IntoIterator<Item = &'a TimePoint>,
) -> Vec<(i64, f64)> {
    let mut seen = HashSet::new();
    let mut out: Vec<(i64, f64)> = points
        .into_iter()
        .filter(|p| p.value.is_finite())
        .filter_map(|p| {
            let t = p.time_ms?;
            seen.insert(t).then_some((t, p.value))
        })
        .collect();
    out.sort_by_key(|&(t, _)| t);
    out
}
