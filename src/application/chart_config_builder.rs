// Chart config builder - Composes series, axis ranges and window into the card config
use crate::application::series_assembler::assemble;
use crate::domain::apex::{
    AnnotationLabel, Annotations, ApexCardConfig, ApexOptions, AxisTitle, ChartOptions,
    DataLabels, Header, Legend, NowMarker, SeriesSpec, SpanOffset, Stroke, Toggle, Tooltip,
    XAnnotation, XAxis, XAxisLabels, YAxis, APEX_CARD_TYPE,
};
use crate::domain::display_config::{DataMode, DisplayConfig, ScaleMode};
use crate::domain::series::{AssembledSeries, AxisId};
use crate::domain::span_window::compute_window;
use crate::domain::telemetry::{SeriesKey, TelemetrySnapshot};
use crate::domain::time_series::{
    padded_range, AxisRange, POWER_PAD_FRACTION, SOC_PAD_FRACTION, SUN_PAD_FRACTION,
};
use chrono::{DateTime, Utc};

const CHART_HEIGHT: &str = "520px";
const UPDATE_INTERVAL: &str = "5min";
const X_LABEL_FORMAT: &str = "dd MMM HH:mm";

const SOC_BOUNDS: AxisRange = AxisRange {
    min: 0.0,
    max: 100.0,
};
const POWER_KEYS: [SeriesKey; 3] = [
    SeriesKey::PowerObserved,
    SeriesKey::PowerModeled,
    SeriesKey::PowerConsumption,
];
const SUN_KEYS: [SeriesKey; 2] = [SeriesKey::SunHistory, SeriesKey::SunForecast];

/// Build the full ApexCharts card configuration for one render.
/// Pure: the same snapshot, config and instant always give the same output.
pub fn build_card_config(
    snapshot: &TelemetrySnapshot,
    config: &DisplayConfig,
    now: DateTime<Utc>,
) -> ApexCardConfig {
    let series = assemble(snapshot, config);
    let window = compute_window(snapshot, now);
    let reference_now = snapshot.now.unwrap_or(now);

    ApexCardConfig {
        card_type: APEX_CARD_TYPE.to_string(),
        header: Header {
            show: true,
            title: config.title.clone(),
        },
        update_interval: UPDATE_INTERVAL.to_string(),
        graph_span: window.map(|w| w.graph_span()),
        span: window
            .and_then(|w| w.offset())
            .map(|offset| SpanOffset { offset }),
        now: NowMarker {
            show: true,
            label: "Now".to_string(),
        },
        apex_config: ApexOptions {
            chart: ChartOptions {
                height: CHART_HEIGHT.to_string(),
                toolbar: Toggle { show: true },
            },
            legend: Legend {
                show: true,
                position: "top".to_string(),
            },
            data_labels: DataLabels { enabled: false },
            tooltip: Tooltip {
                shared: true,
                intersect: false,
            },
            xaxis: XAxis {
                axis_type: "datetime".to_string(),
                labels: XAxisLabels {
                    datetime_utc: false,
                    format: X_LABEL_FORMAT.to_string(),
                },
            },
            stroke: Stroke {
                curve: "smooth".to_string(),
            },
            annotations: Annotations {
                xaxis: vec![XAnnotation {
                    x: reference_now.timestamp_millis(),
                    label: AnnotationLabel {
                        text: "Now".to_string(),
                    },
                }],
            },
            yaxis: build_axes(snapshot, config),
        },
        series: series
            .iter()
            .map(|s| series_spec(s, config))
            .collect(),
    }
}

/// SOC axis always; power and sun axes only when their series are shown.
fn build_axes(snapshot: &TelemetrySnapshot, config: &DisplayConfig) -> Vec<YAxis> {
    let mut axes = vec![y_axis(
        AxisId::Soc,
        soc_range(snapshot, config.scale_mode),
        1,
        "SOC %",
    )];

    if config.show_power {
        let range = padded_range(
            POWER_KEYS.iter().flat_map(|&k| snapshot.points(k)),
            -1.0,
            1.0,
            POWER_PAD_FRACTION,
        );
        axes.push(y_axis(AxisId::Power, range, 1, "Power W"));
    }

    if config.show_sun {
        let range = padded_range(
            SUN_KEYS.iter().flat_map(|&k| snapshot.points(k)),
            -90.0,
            90.0,
            SUN_PAD_FRACTION,
        );
        axes.push(y_axis(AxisId::Sun, range, 0, "Sun elev °"));
    }

    axes
}

fn y_axis(id: AxisId, range: AxisRange, decimals_in_float: u8, title: &str) -> YAxis {
    YAxis {
        id,
        opposite: id != AxisId::Soc,
        min: range.min,
        max: range.max,
        decimals_in_float,
        title: AxisTitle {
            text: title.to_string(),
        },
    }
}

/// Padding may overshoot the physical 0-100 bounds; the result is clamped and
/// falls back to the full scale if clamping leaves nothing.
pub fn soc_range(snapshot: &TelemetrySnapshot, scale_mode: ScaleMode) -> AxisRange {
    let padded = match scale_mode {
        ScaleMode::Absolute => SOC_BOUNDS,
        ScaleMode::HistoryFocus => padded_range(
            snapshot.points(SeriesKey::SocActual),
            SOC_BOUNDS.min,
            SOC_BOUNDS.max,
            SOC_PAD_FRACTION,
        ),
    };
    padded
        .clamp_to(SOC_BOUNDS.min, SOC_BOUNDS.max)
        .unwrap_or(SOC_BOUNDS)
}

fn series_spec(series: &AssembledSeries, config: &DisplayConfig) -> SeriesSpec {
    let data_generator = match (config.data_mode, series.source) {
        (DataMode::Generator, Some(key)) => attribute_generator(key),
        _ => literal_generator(&series.points),
    };

    SeriesSpec {
        entity: config.entity.clone(),
        name: series.name.to_string(),
        yaxis_id: series.axis,
        stroke_dash: series.stroke_dash,
        data_generator,
    }
}

/// Expression the chart card evaluates against the live entity.
pub fn attribute_generator(key: SeriesKey) -> String {
    format!(
        "return (entity.attributes.apex_series?.{} || []).map(p => [new Date(p.x).getTime(), p.y]);",
        key.as_str()
    )
}

/// Pre-computed points wrapped so the chart card returns them unchanged.
pub fn literal_generator(points: &[(i64, f64)]) -> String {
    let body = points
        .iter()
        .map(|(t, v)| format!("[{},{}]", t, v))
        .collect::<Vec<_>>()
        .join(",");
    format!("return [{}];", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::display_config::RawCardConfig;
    use crate::domain::entity::fixtures::telemetry_entity;
    use crate::domain::telemetry::TimePoint;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn config(raw: RawCardConfig) -> DisplayConfig {
        DisplayConfig::normalize(RawCardConfig {
            entity: Some("sensor.pack".to_string()),
            ..raw
        })
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_power_axis_omitted_unless_shown() {
        let snapshot = telemetry_entity("sensor.pack").snapshot();
        let card = build_card_config(&snapshot, &config(RawCardConfig::default()), noon());

        assert!(card.axis(AxisId::Power).is_none());
        assert!(card.axis(AxisId::Sun).is_none());
        assert_eq!(card.apex_config.yaxis.len(), 1);

        let card = build_card_config(
            &snapshot,
            &config(RawCardConfig {
                show_power: Some(true),
                ..Default::default()
            }),
            noon(),
        );
        let power = card.axis(AxisId::Power).unwrap();
        assert!(power.opposite);
        assert_relative_eq!(power.min, -3.5 - 7.5 * POWER_PAD_FRACTION);
        assert_relative_eq!(power.max, 4.0 + 7.5 * POWER_PAD_FRACTION);
    }

    #[test]
    fn test_soc_axis_stays_within_bounds() {
        let snapshot = TelemetrySnapshot::default().with_series(
            SeriesKey::SocActual,
            vec![TimePoint::new(0, 1.0), TimePoint::new(1, 99.0)],
        );
        let range = soc_range(&snapshot, ScaleMode::HistoryFocus);
        assert_eq!(range, AxisRange::new(0.0, 100.0));

        let snapshot = TelemetrySnapshot::default()
            .with_series(SeriesKey::SocActual, vec![TimePoint::new(0, 100.0)]);
        let range = soc_range(&snapshot, ScaleMode::HistoryFocus);
        assert_relative_eq!(range.min, 99.0 - 2.0 * SOC_PAD_FRACTION);
        assert_eq!(range.max, 100.0);

        let snapshot = TelemetrySnapshot::default()
            .with_series(SeriesKey::SocActual, vec![TimePoint::new(0, 150.0)]);
        assert_eq!(
            soc_range(&snapshot, ScaleMode::HistoryFocus),
            AxisRange::new(0.0, 100.0)
        );
    }

    #[test]
    fn test_absolute_scale_ignores_history() {
        let snapshot = telemetry_entity("sensor.pack").snapshot();
        assert_eq!(
            soc_range(&snapshot, ScaleMode::Absolute),
            AxisRange::new(0.0, 100.0)
        );
        let focused = soc_range(&snapshot, ScaleMode::HistoryFocus);
        assert!(focused.min > 50.0 && focused.max < 70.0);
    }

    #[test]
    fn test_window_fields_follow_telemetry_extent() {
        let snapshot = telemetry_entity("sensor.pack").snapshot();
        let card = build_card_config(&snapshot, &config(RawCardConfig::default()), noon());

        assert_eq!(card.graph_span.as_deref(), Some("4h"));
        assert_eq!(card.span.as_ref().map(|s| s.offset.as_str()), Some("+2h"));
        assert_eq!(
            card.apex_config.annotations.xaxis[0].x,
            noon().timestamp_millis()
        );

        let empty = TelemetrySnapshot::default();
        let card = build_card_config(&empty, &config(RawCardConfig::default()), noon());
        assert_eq!(card.graph_span, None);
        assert_eq!(card.span, None);
    }

    #[test]
    fn test_generator_mode_emits_attribute_expressions() {
        let snapshot = telemetry_entity("sensor.pack").snapshot();
        let card = build_card_config(
            &snapshot,
            &config(RawCardConfig {
                data_mode: Some(DataMode::Generator),
                ..Default::default()
            }),
            noon(),
        );
        assert_eq!(
            card.series[0].data_generator,
            "return (entity.attributes.apex_series?.soc_actual || []).map(p => [new Date(p.x).getTime(), p.y]);"
        );

        let card = build_card_config(&snapshot, &config(RawCardConfig::default()), noon());
        assert_eq!(
            card.series[1].data_generator,
            "return [[1748779200000,61],[1748786400000,70]];"
        );
        assert_eq!(card.series[0].entity, "sensor.pack");
    }

    #[test]
    fn test_serialized_shape() {
        let snapshot = telemetry_entity("sensor.pack").snapshot();
        let card = build_card_config(
            &snapshot,
            &config(RawCardConfig {
                show_sun: Some(true),
                ..Default::default()
            }),
            noon(),
        );
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["type"], "custom:apexcharts-card");
        assert_eq!(json["apex_config"]["dataLabels"]["enabled"], false);
        assert_eq!(json["apex_config"]["chart"]["toolbar"]["show"], true);
        assert_eq!(json["apex_config"]["xaxis"]["labels"]["datetimeUTC"], false);
        assert_eq!(json["apex_config"]["yaxis"][0]["id"], "soc");
        assert!(json["apex_config"]["yaxis"][0].get("opposite").is_none());
        assert_eq!(json["apex_config"]["yaxis"][1]["decimalsInFloat"], 0);
        assert_eq!(json["series"][0]["yaxis_id"], "soc");
        assert!(json["series"][0].get("stroke_dash").is_none());
    }
}
