// Declarative configuration consumed by the ApexCharts card
use super::series::AxisId;
use serde::Serialize;

pub const APEX_CARD_TYPE: &str = "custom:apexcharts-card";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApexCardConfig {
    #[serde(rename = "type")]
    pub card_type: String,
    pub header: Header,
    pub update_interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_span: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SpanOffset>,
    pub now: NowMarker,
    pub apex_config: ApexOptions,
    pub series: Vec<SeriesSpec>,
}

impl ApexCardConfig {
    pub fn axis(&self, id: AxisId) -> Option<&YAxis> {
        self.apex_config.yaxis.iter().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub show: bool,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanOffset {
    pub offset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowMarker {
    pub show: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApexOptions {
    pub chart: ChartOptions,
    pub legend: Legend,
    pub data_labels: DataLabels,
    pub tooltip: Tooltip,
    pub xaxis: XAxis,
    pub stroke: Stroke,
    #[serde(skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    pub yaxis: Vec<YAxis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub height: String,
    pub toolbar: Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Toggle {
    pub show: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataLabels {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub show: bool,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub shared: bool,
    pub intersect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    #[serde(rename = "type")]
    pub axis_type: String,
    pub labels: XAxisLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxisLabels {
    #[serde(rename = "datetimeUTC")]
    pub datetime_utc: bool,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub curve: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Annotations {
    pub xaxis: Vec<XAnnotation>,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.xaxis.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAnnotation {
    pub x: i64,
    pub label: AnnotationLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationLabel {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub id: AxisId,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub opposite: bool,
    pub min: f64,
    pub max: f64,
    #[serde(rename = "decimalsInFloat")]
    pub decimals_in_float: u8,
    pub title: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSpec {
    pub entity: String,
    pub name: String,
    pub yaxis_id: AxisId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dash: Option<u32>,
    pub data_generator: String,
}
