// Assembled chart series
use super::telemetry::SeriesKey;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisId {
    Soc,
    Power,
    Sun,
}

impl AxisId {
    pub fn as_str(self) -> &'static str {
        match self {
            AxisId::Soc => "soc",
            AxisId::Power => "power",
            AxisId::Sun => "sun",
        }
    }
}

/// One plotted line. Rebuilt on every update, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledSeries {
    pub name: &'static str,
    pub axis: AxisId,
    pub points: Vec<(i64, f64)>,
    pub stroke_dash: Option<u32>,
    /// Attribute key the points came from; `None` for synthesized series.
    pub source: Option<SeriesKey>,
}
