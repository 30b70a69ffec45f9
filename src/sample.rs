//! Raw telemetry samples and the closed sets of resolutions and metrics.
//!
//! A [`Sample`] is one observation as produced by the external ETL step. The
//! metric columns vary between exports, so they are kept as an open map and
//! resolved by name at aggregation time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Minutes in half of a 24-hour light cycle.
pub const HALF_DAY_MINUTES: u32 = 720;

/// Minutes in a day.
pub const DAY_MINUTES: u32 = 1440;

/// One raw observation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    /// Recording day, starting at zero.
    #[serde(deserialize_with = "deserialize_day")]
    pub day: u32,
    /// Position within the day, in units of the resolution.
    #[serde(deserialize_with = "deserialize_integer")]
    pub bin: i64,
    /// Fractional hour of day; `None` when the export left it blank.
    #[serde(default, deserialize_with = "deserialize_optional_float")]
    pub hour: Option<f64>,
    /// Estrus flag supplied by the ETL step.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub estrus: bool,
    /// Every other column, metric values included.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Sample {
    /// Create a sample with no metric values.
    pub fn new(day: u32, bin: i64) -> Self {
        Self {
            day,
            bin,
            hour: None,
            estrus: false,
            fields: BTreeMap::new(),
        }
    }

    /// Set the fractional hour.
    pub fn with_hour(mut self, hour: f64) -> Self {
        self.hour = Some(hour);
        self
    }

    /// Set the estrus flag.
    pub fn with_estrus(mut self, estrus: bool) -> Self {
        self.estrus = estrus;
        self
    }

    /// Set a numeric field.
    pub fn with_value(mut self, field: impl Into<String>, value: f64) -> Self {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.fields.insert(field.into(), value);
        self
    }

    /// Numeric value of a stored field.
    ///
    /// Numeric strings are coerced; missing, null, or non-numeric fields
    /// yield `None` and contribute nothing downstream.
    pub fn value(&self, field: &str) -> Option<f64> {
        let value = match self.fields.get(field)? {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => text.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Value of a display metric, through its storage field.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.value(metric.storage_field())
    }
}

fn deserialize_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    number.ok_or_else(|| D::Error::custom(format!("expected an integer, found {value}")))
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let day = deserialize_integer(deserializer)?;
    u32::try_from(day).map_err(|_| D::Error::custom(format!("day out of range: {day}")))
}

fn deserialize_optional_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_f64(),
        Value::String(text) if text.trim().is_empty() => return Ok(None),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(number) => Ok(number.is_finite().then_some(number)),
        None => Err(D::Error::custom(format!("expected a number, found {value}"))),
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Ok(flag),
        Value::Number(number) => Ok(number.as_f64().is_some_and(|v| v != 0.0)),
        Value::Null => Ok(false),
        Value::String(text) => match text.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            _ => Err(D::Error::custom(format!("expected a boolean flag, found {text:?}"))),
        },
        other => Err(D::Error::custom(format!("expected a boolean flag, found {other}"))),
    }
}

/// Resolution value outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported resolution: {0} min (expected 5, 15, 30 or 60)")]
pub struct UnknownResolution(pub u32);

/// Supported bin sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Resolution {
    /// 5-minute bins.
    Min5,
    /// 15-minute bins.
    Min15,
    /// 30-minute bins.
    Min30,
    /// 60-minute bins.
    Min60,
}

impl Resolution {
    /// Every supported resolution, finest first.
    pub const ALL: [Resolution; 4] = [Self::Min5, Self::Min15, Self::Min30, Self::Min60];

    /// Bin width in minutes.
    pub fn minutes(self) -> u32 {
        match self {
            Self::Min5 => 5,
            Self::Min15 => 15,
            Self::Min30 => 30,
            Self::Min60 => 60,
        }
    }

    /// Parse a bin width in minutes.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|res| res.minutes() == minutes)
    }

    /// Number of bins in a 24-hour day.
    pub fn bins_per_day(self) -> u32 {
        DAY_MINUTES / self.minutes()
    }

    /// Bin index twelve hours after bin zero.
    pub fn half_day_bin(self) -> u32 {
        HALF_DAY_MINUTES / self.minutes()
    }
}

impl TryFrom<u32> for Resolution {
    type Error = UnknownResolution;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes).ok_or(UnknownResolution(minutes))
    }
}

impl From<Resolution> for u32 {
    fn from(resolution: Resolution) -> Self {
        resolution.minutes()
    }
}

impl FromStr for Resolution {
    type Err = UnknownResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches("min").trim();
        let minutes = trimmed.parse::<u32>().map_err(|_| UnknownResolution(0))?;
        Self::try_from(minutes)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}

/// Metric key outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric `{0}` (expected activity_mean, temperature_mean or ratio_mean)")]
pub struct UnknownMetric(pub String);

/// Display metrics selectable on the primary chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Mean activity.
    #[serde(rename = "activity_mean")]
    Activity,
    /// Mean body temperature.
    #[serde(rename = "temperature_mean")]
    Temperature,
    /// Temperature over activity.
    #[serde(rename = "ratio_mean")]
    Ratio,
}

impl Metric {
    /// Every supported metric, in control order.
    pub const ALL: [Metric; 3] = [Self::Activity, Self::Temperature, Self::Ratio];

    /// Key used by the controls.
    pub fn key(self) -> &'static str {
        match self {
            Self::Activity => "activity_mean",
            Self::Temperature => "temperature_mean",
            Self::Ratio => "ratio_mean",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Activity => "Activity",
            Self::Temperature => "Temperature",
            Self::Ratio => "Temp / Activity",
        }
    }

    /// Record field averaged for this metric.
    ///
    /// The ratio metric reads the precomputed per-sample `ratio` column, not
    /// `ratio_mean`; the two hold different values.
    pub fn storage_field(self) -> &'static str {
        match self {
            Self::Activity => "activity_mean",
            Self::Temperature => "temperature_mean",
            Self::Ratio => "ratio",
        }
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.key() == s.trim())
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_export_record() {
        let json = r#"{
            "day": 3, "bin": 12, "hour": 12.5, "estrus": 1,
            "activity_mean": 4.5, "temperature_mean": "36.9",
            "ratio_mean": 8.0, "ratio": 8.2, "note": "x"
        }"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.day, 3);
        assert_eq!(sample.bin, 12);
        assert!(sample.estrus);
        assert_eq!(sample.metric(Metric::Activity), Some(4.5));
        assert_eq!(sample.metric(Metric::Temperature), Some(36.9));
        assert_eq!(sample.metric(Metric::Ratio), Some(8.2));
        assert_eq!(sample.value("note"), None);
    }

    #[test]
    fn missing_optional_columns_default() {
        let sample: Sample = serde_json::from_str(r#"{"day": 0, "bin": 4.0}"#).unwrap();
        assert_eq!(sample.bin, 4);
        assert!(!sample.estrus);
        assert_eq!(sample.metric(Metric::Activity), None);
    }

    #[test]
    fn blank_hour_decodes_as_none() {
        let sample: Sample =
            serde_json::from_str(r#"{"day": 0, "bin": 1, "hour": null}"#).unwrap();
        assert_eq!(sample.hour, None);
        let sample: Sample = serde_json::from_str(r#"{"day": 0, "bin": 1, "hour": ""}"#).unwrap();
        assert_eq!(sample.hour, None);
        let sample: Sample =
            serde_json::from_str(r#"{"day": 0, "bin": 1, "hour": "1.25"}"#).unwrap();
        assert_eq!(sample.hour, Some(1.25));
        assert!(serde_json::from_str::<Sample>(r#"{"day": 0, "bin": 1, "hour": "noon"}"#).is_err());
    }

    #[test]
    fn fractional_bin_is_rejected() {
        let result = serde_json::from_str::<Sample>(r#"{"day": 0, "bin": 4.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn resolution_parsing_and_half_day() {
        assert_eq!("15".parse::<Resolution>(), Ok(Resolution::Min15));
        assert_eq!("30min".parse::<Resolution>(), Ok(Resolution::Min30));
        assert_eq!(Resolution::try_from(7), Err(UnknownResolution(7)));
        assert_eq!(Resolution::Min60.half_day_bin(), 12);
        assert_eq!(Resolution::Min15.half_day_bin(), 48);
        assert_eq!(Resolution::Min5.bins_per_day(), 288);
    }

    #[test]
    fn metric_maps_to_explicit_storage_field() {
        assert_eq!("ratio_mean".parse::<Metric>(), Ok(Metric::Ratio));
        assert_eq!(Metric::Ratio.storage_field(), "ratio");
        assert_eq!(Metric::Activity.storage_field(), Metric::Activity.key());
        assert!("steps".parse::<Metric>().is_err());
    }
}
