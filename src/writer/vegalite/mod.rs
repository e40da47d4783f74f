//! Vega-Lite JSON writer implementation
//!
//! Converts validated chart specifications into Vega-Lite v6 documents for
//! interactive previews.
//!
//! # Mapping Strategy
//!
//! - chart kind -> Vega-Lite mark (parameterised for donut and bubble)
//! - encoding channels -> Vega-Lite encoding, with family fallbacks
//! - inline records -> `data.values`; data mappings pass through
//! - reference lines -> layer composition with rule marks
//!
//! Mapping never fails for a validated specification; unknown kinds degrade
//! to a point mark and missing pie or heatmap channels fall back to
//! conventional field names.
//!
//! # Example
//!
//! ```rust,ignore
//! use chartmaker::writer::{VegaLiteWriter, Writer};
//!
//! let writer = VegaLiteWriter::new();
//! let vega_json = writer.write(&spec)?;
//! // Can be rendered in browser with vega-embed
//! ```

mod encoding;
mod mark;

use crate::chart::{DataSource, ReferenceLine, Specification};
use crate::writer::Writer;
use crate::{ChartError, Result};
use serde_json::{json, Map, Value};

use encoding::build_encoding;
use mark::{apply_stacking, build_mark};

/// Color used for reference line rules
const REFERENCE_LINE_COLOR: &str = "#d32f2f";

/// Background applied by the `dark` theme
const DARK_BACKGROUND: &str = "#1e1e1e";

/// Unit-only keys dropped from the top level of a layered composition
const UNIT_KEYS: &[&str] = &["mark", "encoding"];

/// Vega-Lite JSON writer
///
/// Generates Vega-Lite v6 specifications from validated chart requests.
pub struct VegaLiteWriter {
    /// Vega-Lite schema version
    schema: String,
}

impl VegaLiteWriter {
    /// Create a new Vega-Lite writer with default settings
    pub fn new() -> Self {
        Self {
            schema: "https://vega.github.io/schema/vega-lite/v6.json".to_string(),
        }
    }

    /// Schema tag written into every document
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Map a specification to a Vega-Lite document
    pub fn to_grammar(&self, spec: &Specification) -> Value {
        let options = spec.options();

        let mut vl_spec = Map::new();
        vl_spec.insert("$schema".to_string(), json!(self.schema));

        let mut mark = build_mark(spec.kind(), options);
        if let Some(stacking) = options.stacking() {
            apply_stacking(&mut mark, stacking);
        }
        vl_spec.insert("mark".to_string(), mark);

        vl_spec.insert("width".to_string(), json!(spec.width()));
        vl_spec.insert("height".to_string(), json!(spec.height()));

        if let Some(title) = spec.title() {
            vl_spec.insert("title".to_string(), json!(title));
        }
        if let Some(description) = spec.description() {
            vl_spec.insert("description".to_string(), json!(description));
        }

        vl_spec.insert("data".to_string(), data_to_grammar(spec.data()));
        vl_spec.insert(
            "encoding".to_string(),
            Value::Object(build_encoding(spec.kind(), spec.encoding(), options)),
        );

        if let Some(theme) = options.theme() {
            vl_spec.insert("usermeta".to_string(), json!({"theme": theme}));
            if theme.eq_ignore_ascii_case("dark") {
                vl_spec.insert("config".to_string(), json!({"background": DARK_BACKGROUND}));
            }
        }

        match options.reference_lines() {
            Some(lines) => Value::Object(into_layers(vl_spec, &lines)),
            None => Value::Object(vl_spec),
        }
    }
}

impl Default for VegaLiteWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for VegaLiteWriter {
    type Output = String;

    fn write(&self, spec: &Specification) -> Result<String> {
        let vl_spec = self.to_grammar(spec);
        tracing::debug!(chart_type = %spec.chart_type(), "mapped specification to Vega-Lite");

        serde_json::to_string_pretty(&vl_spec).map_err(|e| {
            ChartError::WriterError(format!("Failed to serialize Vega-Lite JSON: {}", e))
        })
    }
}

/// Inline records become `{"values": [...]}`; mappings keep their extra keys
fn data_to_grammar(data: &DataSource) -> Value {
    match data {
        DataSource::Records(records) => json!({"values": records}),
        other => other.to_value(),
    }
}

/// Layer 0 is the whole base chart; rule layers follow, one per line.
///
/// The composition keeps every shared key of the base (data, size, title,
/// theme) so rule layers inherit them, but not `mark` or `encoding`.
fn into_layers(base: Map<String, Value>, lines: &[ReferenceLine]) -> Map<String, Value> {
    let mut composition: Map<String, Value> = base
        .iter()
        .filter(|(key, _)| !UNIT_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut layers = vec![Value::Object(base)];
    layers.extend(lines.iter().filter_map(rule_layer));

    composition.insert("layer".to_string(), Value::Array(layers));
    composition
}

fn rule_layer(line: &ReferenceLine) -> Option<Value> {
    if !matches!(line.channel.as_str(), "x" | "y") || line.value.is_null() {
        return None;
    }

    let mut encoding = Map::new();
    encoding.insert(line.channel.clone(), json!({"datum": line.value}));
    if line.channel == "y" {
        if let Some(label) = &line.label {
            encoding.insert("tooltip".to_string(), json!({"value": label}));
        }
    }

    Some(json!({
        "mark": {"type": "rule", "color": REFERENCE_LINE_COLOR},
        "encoding": encoding,
    }))
}
