// Telemetry data domain models
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Series keys published by the integration inside the `apex_series` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    SocActual,
    SocProjectionWeather,
    SocProjectionClear,
    SocProjectionNoSun,
    SunHistory,
    SunForecast,
    PowerObserved,
    PowerModeled,
    PowerConsumption,
}

impl SeriesKey {
    pub const ALL: [SeriesKey; 9] = [
        SeriesKey::SocActual,
        SeriesKey::SocProjectionWeather,
        SeriesKey::SocProjectionClear,
        SeriesKey::SocProjectionNoSun,
        SeriesKey::SunHistory,
        SeriesKey::SunForecast,
        SeriesKey::PowerObserved,
        SeriesKey::PowerModeled,
        SeriesKey::PowerConsumption,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesKey::SocActual => "soc_actual",
            SeriesKey::SocProjectionWeather => "soc_projection_weather",
            SeriesKey::SocProjectionClear => "soc_projection_clear",
            SeriesKey::SocProjectionNoSun => "soc_projection_no_sun",
            SeriesKey::SunHistory => "sun_history",
            SeriesKey::SunForecast => "sun_forecast",
            SeriesKey::PowerObserved => "power_observed",
            SeriesKey::PowerModeled => "power_modeled",
            SeriesKey::PowerConsumption => "power_consumption",
        }
    }
}

/// One `{x, y}` sample. Timestamps that fail to parse are kept as `None`
/// and values that fail to parse become NaN; consumers filter both.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPoint")]
pub struct TimePoint {
    pub time_ms: Option<i64>,
    pub value: f64,
}

impl TimePoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self {
            time_ms: Some(time_ms),
            value,
        }
    }
}

#[derive(Deserialize)]
struct RawPoint {
    #[serde(default)]
    x: Value,
    #[serde(default)]
    y: Value,
}

impl From<RawPoint> for TimePoint {
    fn from(raw: RawPoint) -> Self {
        Self {
            time_ms: parse_timestamp(&raw.x),
            value: parse_number(&raw.y).unwrap_or(f64::NAN),
        }
    }
}

/// Parse an RFC 3339 string, a naive ISO string (read as UTC) or epoch milliseconds.
/// Epoch values outside chrono's representable range are rejected.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_timestamp_str(s).map(|t| t.timestamp_millis()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .filter(|&ms| DateTime::from_timestamp_millis(ms).is_some()),
        _ => None,
    }
}

pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Numbers and numeric strings; anything else is `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value).filter(|v| v.is_finite()))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatteryMeta {
    #[serde(default, alias = "cells", deserialize_with = "lenient_f64")]
    pub cell_count: Option<f64>,
    #[serde(default, alias = "cell_mah", deserialize_with = "lenient_f64")]
    pub cell_capacity_mah: Option<f64>,
    #[serde(default, alias = "cell_v", deserialize_with = "lenient_f64")]
    pub cell_voltage: Option<f64>,
}

impl BatteryMeta {
    /// Pack energy in Wh. `None` unless every input is present and the product is positive.
    pub fn capacity_wh(&self) -> Option<f64> {
        let wh = self.cell_count? * self.cell_capacity_mah? / 1000.0 * self.cell_voltage?;
        (wh.is_finite() && wh > 0.0).then_some(wh)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoadModel {
    #[serde(default, alias = "load_watts", deserialize_with = "lenient_f64")]
    pub load_w: Option<f64>,
    #[serde(default, alias = "solar_peak_watts", deserialize_with = "lenient_f64")]
    pub solar_peak_w: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ForecastBundle {
    #[serde(default, alias = "times")]
    pub timestamps: Vec<Value>,
    #[serde(default)]
    pub solar_proxy: Vec<Value>,
    #[serde(default, alias = "weather_factors")]
    pub weather_factor: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    pub time_ms: i64,
    pub solar_proxy: Option<f64>,
    pub weather_factor: Option<f64>,
}

impl ForecastBundle {
    /// Zip the parallel arrays by index, skipping steps whose timestamp does not parse.
    pub fn steps(&self) -> Vec<ForecastStep> {
        self.timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                Some(ForecastStep {
                    time_ms: parse_timestamp(ts)?,
                    solar_proxy: self.solar_proxy.get(i).and_then(parse_number),
                    weather_factor: self.weather_factor.get(i).and_then(parse_number),
                })
            })
            .collect()
    }
}

/// Everything the chart pipeline reads from one entity state.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub(crate) series: HashMap<SeriesKey, Vec<TimePoint>>,
    pub now: Option<DateTime<Utc>>,
    pub meta: Option<BatteryMeta>,
    pub model: Option<LoadModel>,
    pub forecast: Option<ForecastBundle>,
    pub sensor_soc: Option<f64>,
    pub full_charge_eta_hours: Option<f64>,
    pub full_charge_at: Option<DateTime<Utc>>,
}

impl TelemetrySnapshot {
    /// Read a snapshot out of an entity's raw state string and attribute map.
    /// Malformed pieces are logged and treated as absent.
    pub fn from_attributes(state: &str, attributes: &Value) -> Self {
        let apex = attributes.get("apex_series").unwrap_or(&Value::Null);

        let mut series = HashMap::new();
        for key in SeriesKey::ALL {
            let Some(raw) = apex.get(key.as_str()) else {
                continue;
            };
            match Vec::<TimePoint>::deserialize(raw) {
                Ok(points) => {
                    series.insert(key, points);
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed series {}: {}", key.as_str(), e);
                }
            }
        }

        let lookup = |name: &str| attributes.get(name).or_else(|| apex.get(name));

        Self {
            series,
            now: lookup("now")
                .and_then(Value::as_str)
                .and_then(parse_timestamp_str),
            meta: lookup("meta").and_then(|v| decode(v, "meta")),
            model: lookup("model").and_then(|v| decode(v, "model")),
            forecast: lookup("forecast").and_then(|v| decode(v, "forecast")),
            sensor_soc: state.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            full_charge_eta_hours: attributes
                .get("full_charge_eta_hours")
                .and_then(parse_number)
                .filter(|v| v.is_finite()),
            full_charge_at: attributes
                .get("full_charge_at")
                .and_then(Value::as_str)
                .and_then(parse_timestamp_str),
        }
    }

    pub fn with_series(mut self, key: SeriesKey, points: Vec<TimePoint>) -> Self {
        self.series.insert(key, points);
        self
    }

    pub fn points(&self, key: SeriesKey) -> &[TimePoint] {
        self.series.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Starting SOC for projections: the first weather-projected value when it is
    /// finite, otherwise the raw sensor reading.
    pub fn baseline_soc(&self) -> Option<f64> {
        self.points(SeriesKey::SocProjectionWeather)
            .first()
            .map(|p| p.value)
            .filter(|v| v.is_finite())
            .or(self.sensor_soc)
    }

    pub fn capacity_wh(&self) -> Option<f64> {
        self.meta.as_ref().and_then(BatteryMeta::capacity_wh)
    }

    pub fn load_w(&self) -> Option<f64> {
        self.model.as_ref().and_then(|m| m.load_w)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(value: &Value, name: &str) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::debug!("Ignoring malformed {} attribute: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_parsing_is_lenient() {
        let points: Vec<TimePoint> = serde_json::from_value(json!([
            {"x": "2025-06-01T10:00:00Z", "y": 42.5},
            {"x": "2025-06-01 11:00:00", "y": "43"},
            {"x": 1748775600000i64, "y": null},
            {"x": "yesterday", "y": 1},
        ]))
        .unwrap();

        assert_eq!(points[0].time_ms, Some(1748772000000));
        assert_eq!(points[0].value, 42.5);
        assert_eq!(points[1].time_ms, Some(1748775600000));
        assert_eq!(points[1].value, 43.0);
        assert!(points[2].value.is_nan());
        assert_eq!(points[3].time_ms, None);
    }

    #[test]
    fn test_out_of_range_epoch_is_rejected() {
        let points: Vec<TimePoint> = serde_json::from_value(json!([
            {"x": -9e18, "y": 1},
            {"x": 9_000_000_000_000_000_000i64, "y": 2},
            {"x": 1748772000000i64, "y": 3},
        ]))
        .unwrap();

        assert_eq!(points[0].time_ms, None);
        assert_eq!(points[1].time_ms, None);
        assert_eq!(points[2].time_ms, Some(1748772000000));
    }

    #[test]
    fn test_snapshot_from_attributes() {
        let attributes = json!({
            "apex_series": {
                "now": "2025-06-01T12:00:00Z",
                "soc_actual": [{"x": "2025-06-01T11:00:00Z", "y": 61}],
                "soc_projection_weather": [{"x": "2025-06-01T12:00:00Z", "y": 60}],
                "sun_history": "not a list"
            },
            "meta": {"cell_count": 4, "cell_capacity_mah": "3000", "cell_voltage": 3.7},
            "model": {"load_w": 2.5},
            "forecast": {"timestamps": ["2025-06-01T13:00:00Z", "bogus"], "solar_proxy": [0.4, 0.1]},
            "full_charge_eta_hours": "3.5"
        });

        let snapshot = TelemetrySnapshot::from_attributes("58", &attributes);

        assert_eq!(snapshot.points(SeriesKey::SocActual).len(), 1);
        assert!(snapshot.points(SeriesKey::SunHistory).is_empty());
        assert_eq!(
            snapshot.now,
            parse_timestamp_str("2025-06-01T12:00:00Z")
        );
        let capacity = snapshot.capacity_wh().unwrap();
        assert!((capacity - 44.4).abs() < 1e-9);
        assert_eq!(snapshot.load_w(), Some(2.5));
        assert_eq!(snapshot.sensor_soc, Some(58.0));
        assert_eq!(snapshot.full_charge_eta_hours, Some(3.5));

        let steps = snapshot.forecast.as_ref().unwrap().steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].solar_proxy, Some(0.4));
        assert_eq!(steps[0].weather_factor, None);
    }

    #[test]
    fn test_baseline_prefers_weather_projection() {
        let snapshot = TelemetrySnapshot {
            sensor_soc: Some(58.0),
            ..Default::default()
        };
        assert_eq!(snapshot.baseline_soc(), Some(58.0));

        let snapshot = snapshot.with_series(
            SeriesKey::SocProjectionWeather,
            vec![TimePoint::new(0, 61.0)],
        );
        assert_eq!(snapshot.baseline_soc(), Some(61.0));

        let snapshot = snapshot.with_series(
            SeriesKey::SocProjectionWeather,
            vec![TimePoint::new(0, f64::NAN)],
        );
        assert_eq!(snapshot.baseline_soc(), Some(58.0));
    }

    #[test]
    fn test_capacity_requires_complete_meta() {
        let meta = BatteryMeta {
            cell_count: Some(4.0),
            cell_capacity_mah: None,
            cell_voltage: Some(3.7),
        };
        assert_eq!(meta.capacity_wh(), None);

        let meta = BatteryMeta {
            cell_capacity_mah: Some(0.0),
            ..meta
        };
        assert_eq!(meta.capacity_wh(), None);
    }
}
