//! Encoding channel construction for Vega-Lite output
//!
//! Direct channels are copied with their field, normalised type, bin and
//! aggregate. Pie-like and heatmap-like families get conventional fallback
//! fields so that minimal requests still render.

use crate::chart::{ChartKind, Encoding, FieldEncoding, FieldType, Options};
use serde_json::{json, Map, Value};

/// Channels passed through unchanged from the request
pub(super) const DIRECT_CHANNELS: &[&str] = &["x", "y", "x2", "y2", "color", "size", "shape", "theta"];

/// Conventional field name used when a pie-like chart has no `theta`
pub(super) const FALLBACK_VALUE_FIELD: &str = "value";

/// Conventional field name used when a pie-like chart has no `color`
pub(super) const FALLBACK_CATEGORY_FIELD: &str = "category";

/// Build a single Vega-Lite channel definition
pub(super) fn build_encoding_channel(enc: &FieldEncoding) -> Value {
    let mut channel = Map::new();
    channel.insert("field".to_string(), json!(enc.field));
    if let Some(field_type) = enc.field_type {
        channel.insert("type".to_string(), json!(field_type.name()));
    }
    if let Some(aggregate) = &enc.aggregate {
        channel.insert("aggregate".to_string(), json!(aggregate));
    }
    if let Some(bin) = enc.bin {
        channel.insert("bin".to_string(), json!(bin));
    }
    Value::Object(channel)
}

fn fallback_channel(field: &str, field_type: FieldType) -> Value {
    json!({"field": field, "type": field_type.name()})
}

/// Build the full encoding block for a chart
pub(super) fn build_encoding(kind: ChartKind, encoding: &Encoding, options: &Options) -> Map<String, Value> {
    let mut vl_encoding = Map::new();

    for channel in DIRECT_CHANNELS {
        if let Some(enc) = encoding.get(channel) {
            vl_encoding.insert(channel.to_string(), build_encoding_channel(enc));
        }
    }

    if kind.is_pie_family() {
        vl_encoding
            .entry("theta")
            .or_insert_with(|| fallback_channel(FALLBACK_VALUE_FIELD, FieldType::Quantitative));
        vl_encoding
            .entry("color")
            .or_insert_with(|| fallback_channel(FALLBACK_CATEGORY_FIELD, FieldType::Nominal));
    }

    if kind.is_heatmap_family() {
        vl_encoding
            .entry("color")
            .or_insert_with(|| fallback_channel(FALLBACK_VALUE_FIELD, FieldType::Quantitative));
    }

    if let Some(scheme) = options.color_scheme() {
        if let Some(Value::Object(color)) = vl_encoding.get_mut("color") {
            color.insert("scale".to_string(), json!({"scheme": scheme}));
        }
    }

    vl_encoding
}
