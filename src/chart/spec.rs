//! Canonical chart specification
//!
//! A [`Specification`] is only ever produced by [`validate`](super::validate).
//! Its fields are private and exposed through borrowing getters, so the
//! grammar writer and every exporter read the same immutable value.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::types::{ChartKind, ChartType};

/// Default preview width in pixels
pub const DEFAULT_WIDTH: u32 = 400;
/// Default preview height in pixels
pub const DEFAULT_HEIGHT: u32 = 300;

/// One inline data row
pub type Record = Map<String, Value>;

// ============================================================================
// Data
// ============================================================================

/// Where the chart's rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A bare list of records
    Records(Vec<Record>),
    /// A `{"values": [...]}` mapping; any other keys are kept as given
    Values { values: Vec<Record>, extra: Record },
    /// A `{"url": "..."}` mapping; any other keys are kept as given
    Url { url: String, extra: Record },
}

impl DataSource {
    /// Inline rows, empty for URL sources
    pub fn records(&self) -> &[Record] {
        match self {
            DataSource::Records(values) | DataSource::Values { values, .. } => values,
            DataSource::Url { .. } => &[],
        }
    }

    /// The first inline row, used for schema sampling
    pub fn first_record(&self) -> Option<&Record> {
        self.records().first()
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            DataSource::Url { url, .. } => Some(url),
            _ => None,
        }
    }

    /// The data exactly as it was supplied
    pub fn to_value(&self) -> Value {
        match self {
            DataSource::Records(values) => json!(values),
            DataSource::Values { values, extra } => {
                let mut map = extra.clone();
                map.insert("values".to_string(), json!(values));
                Value::Object(map)
            }
            DataSource::Url { url, extra } => {
                let mut map = extra.clone();
                map.insert("url".to_string(), json!(url));
                Value::Object(map)
            }
        }
    }
}

impl Serialize for DataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Semantic type of an encoded field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Nominal,
    Ordinal,
    Quantitative,
    Temporal,
}

impl FieldType {
    /// Parse a canonical type name or one of its aliases
    ///
    /// - `number` -> quantitative
    /// - `string` -> nominal
    /// - `date` -> temporal
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "nominal" | "string" => Some(FieldType::Nominal),
            "ordinal" => Some(FieldType::Ordinal),
            "quantitative" | "number" => Some(FieldType::Quantitative),
            "temporal" | "date" => Some(FieldType::Temporal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Nominal => "nominal",
            FieldType::Ordinal => "ordinal",
            FieldType::Quantitative => "quantitative",
            FieldType::Temporal => "temporal",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A data field bound to a visual channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEncoding {
    pub field: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
}

impl FieldEncoding {
    pub fn new(field: impl Into<String>, field_type: Option<FieldType>) -> Self {
        Self {
            field: field.into(),
            field_type,
            bin: None,
            aggregate: None,
        }
    }
}

/// Channel name -> field binding, ordered by channel name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Encoding(BTreeMap<String, FieldEncoding>);

impl Encoding {
    pub fn get(&self, channel: &str) -> Option<&FieldEncoding> {
        self.0.get(channel)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.0.contains_key(channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEncoding)> {
        self.0.iter().map(|(channel, enc)| (channel.as_str(), enc))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, FieldEncoding)> for Encoding {
    fn from_iter<I: IntoIterator<Item = (String, FieldEncoding)>>(iter: I) -> Self {
        Encoding(iter.into_iter().collect())
    }
}

// ============================================================================
// Options
// ============================================================================

/// Stacking behaviour for bar and area marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    Stack,
    Normalize,
    /// Explicitly disable stacking (`"none"`)
    Off,
}

impl Stacking {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "stack" => Some(Stacking::Stack),
            "normalize" => Some(Stacking::Normalize),
            "none" => Some(Stacking::Off),
            _ => None,
        }
    }
}

/// A constant rule drawn over the chart
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub channel: String,
    pub value: Value,
    pub label: Option<String>,
}

/// Free-form style and behaviour overrides
///
/// The raw mapping is kept as given; typed accessors interpret the keys the
/// writers understand and ignore values of the wrong shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new(map: Map<String, Value>) -> Self {
        Options(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// `innerRadius` for donut marks
    pub fn inner_radius(&self) -> Option<f64> {
        self.0.get("innerRadius").and_then(Value::as_f64)
    }

    /// `stacking`, when it is one of `stack`, `normalize` or `none`
    pub fn stacking(&self) -> Option<Stacking> {
        self.0
            .get("stacking")
            .and_then(Value::as_str)
            .and_then(Stacking::parse)
    }

    /// `referenceLines`
    ///
    /// Returns `None` when the key is absent, not a list, or an empty list.
    /// Otherwise returns the entries that carry a string `channel` and a
    /// non-null `value`; malformed entries are dropped.
    pub fn reference_lines(&self) -> Option<Vec<ReferenceLine>> {
        let entries = self.0.get("referenceLines")?.as_array()?;
        if entries.is_empty() {
            return None;
        }

        let lines = entries
            .iter()
            .filter_map(|entry| {
                let obj = entry.as_object()?;
                let channel = obj.get("channel")?.as_str()?.to_string();
                let value = obj.get("value").filter(|v| !v.is_null())?.clone();
                let label = obj
                    .get("label")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                Some(ReferenceLine {
                    channel,
                    value,
                    label,
                })
            })
            .collect();
        Some(lines)
    }

    pub fn theme(&self) -> Option<&str> {
        self.0.get("theme").and_then(Value::as_str)
    }

    pub fn color_scheme(&self) -> Option<&str> {
        self.0
            .get("colorScheme")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

// ============================================================================
// Specification
// ============================================================================

/// The validated, canonical chart request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Specification {
    #[serde(rename = "type")]
    chart_type: ChartType,
    data: DataSource,
    encoding: Encoding,
    options: Options,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    width: u32,
    height: u32,
}

impl Specification {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        chart_type: ChartType,
        data: DataSource,
        encoding: Encoding,
        options: Options,
        title: Option<String>,
        description: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Self {
        Self {
            chart_type,
            data,
            encoding,
            options,
            title,
            description,
            width: width.unwrap_or(DEFAULT_WIDTH),
            height: height.unwrap_or(DEFAULT_HEIGHT),
        }
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    /// Shorthand for `chart_type().kind()`
    pub fn kind(&self) -> ChartKind {
        self.chart_type.kind()
    }

    pub fn data(&self) -> &DataSource {
        &self.data
    }

    /// Inline rows, empty for URL sources
    pub fn records(&self) -> &[Record] {
        self.data.records()
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The specification as a JSON value, for embedding in artifacts
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(value: Value) -> Options {
        match value {
            Value::Object(map) => Options::new(map),
            _ => panic!("options must be an object"),
        }
    }

    #[test]
    fn test_field_type_aliases() {
        assert_eq!(FieldType::parse("number"), Some(FieldType::Quantitative));
        assert_eq!(FieldType::parse("string"), Some(FieldType::Nominal));
        assert_eq!(FieldType::parse("date"), Some(FieldType::Temporal));
        assert_eq!(FieldType::parse("ordinal"), Some(FieldType::Ordinal));
        assert_eq!(FieldType::parse("geojson"), None);
    }

    #[test]
    fn test_stacking_parse() {
        let opts = options(json!({"stacking": "none"}));
        assert_eq!(opts.stacking(), Some(Stacking::Off));

        let opts = options(json!({"stacking": "normalize"}));
        assert_eq!(opts.stacking(), Some(Stacking::Normalize));

        let opts = options(json!({"stacking": "sideways"}));
        assert_eq!(opts.stacking(), None);

        let opts = options(json!({"stacking": 3}));
        assert_eq!(opts.stacking(), None);
    }

    #[test]
    fn test_reference_lines_drop_malformed_entries() {
        let opts = options(json!({
            "referenceLines": [
                {"channel": "y", "value": 100, "label": "Target"},
                {"channel": "x"},
                "not an object",
                {"channel": "x", "value": "2024-01-01"}
            ]
        }));
        let lines = opts.reference_lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].channel, "y");
        assert_eq!(lines[0].value, json!(100));
        assert_eq!(lines[0].label.as_deref(), Some("Target"));
        assert_eq!(lines[1].label, None);
    }

    #[test]
    fn test_reference_lines_absent_or_empty() {
        assert!(Options::default().reference_lines().is_none());
        assert!(options(json!({"referenceLines": []}))
            .reference_lines()
            .is_none());
        assert!(options(json!({"referenceLines": "y=3"}))
            .reference_lines()
            .is_none());
    }

    #[test]
    fn test_inner_radius_accepts_integers_and_floats() {
        assert_eq!(options(json!({"innerRadius": 80})).inner_radius(), Some(80.0));
        assert_eq!(options(json!({"innerRadius": 12.5})).inner_radius(), Some(12.5));
        assert_eq!(options(json!({"innerRadius": "big"})).inner_radius(), None);
    }

    #[test]
    fn test_data_source_keeps_supplied_shape() {
        let mut extra = Map::new();
        extra.insert("format".to_string(), json!({"type": "csv"}));
        let source = DataSource::Url {
            url: "data/cars.csv".to_string(),
            extra,
        };
        assert_eq!(
            source.to_value(),
            json!({"url": "data/cars.csv", "format": {"type": "csv"}})
        );
        assert!(source.records().is_empty());
        assert_eq!(source.url(), Some("data/cars.csv"));
    }
}
