//! Data schema sampling and channel bindings
//!
//! Exporters describe the chart's data to their target tool as a list of typed
//! columns. The schema is sampled from the *first* inline record only; later
//! records are emitted as row data where a format carries it, but never
//! inspected for types. A column that is numeric in the first record and a
//! string further down is still declared numeric.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::chart::Specification;

/// Runtime value kind detected from a sample value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    Date,
    DateTime,
    String,
}

impl ValueKind {
    /// Classify a sample value; nulls and nested values count as strings
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Float,
            Value::String(s) => Self::sniff(s),
            Value::Null | Value::Array(_) | Value::Object(_) => ValueKind::String,
        }
    }

    fn sniff(s: &str) -> Self {
        if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
            ValueKind::Date
        } else if DateTime::parse_from_rfc3339(s).is_ok()
            || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        {
            ValueKind::DateTime
        } else {
            ValueKind::String
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Float)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, ValueKind::Date | ValueKind::DateTime)
    }
}

/// Whether a column is declared as a dimension or a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Dimension,
    Measure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ValueKind,
}

impl Column {
    pub fn role(&self) -> FieldRole {
        if self.kind.is_numeric() {
            FieldRole::Measure
        } else {
            FieldRole::Dimension
        }
    }
}

/// Columns sampled from a chart's inline data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Sample the first inline record. URL-backed data yields an empty schema.
    pub fn sample(spec: &Specification) -> Self {
        let columns = spec
            .data()
            .first_record()
            .map(|record| {
                record
                    .iter()
                    .map(|(name, value)| Column {
                        name: name.clone(),
                        kind: ValueKind::of(value),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.role() == FieldRole::Dimension)
    }

    pub fn measures(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.role() == FieldRole::Measure)
    }
}

/// Platform-neutral role an encoding channel plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingRole {
    Category,
    Value,
    Breakdown,
    SecondaryValue,
}

impl BindingRole {
    pub fn for_channel(channel: &str) -> Option<Self> {
        match channel {
            "x" => Some(BindingRole::Category),
            "y" => Some(BindingRole::Value),
            "color" => Some(BindingRole::Breakdown),
            "size" => Some(BindingRole::SecondaryValue),
            _ => None,
        }
    }

    pub fn is_measure(self) -> bool {
        matches!(self, BindingRole::Value | BindingRole::SecondaryValue)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub role: BindingRole,
    pub channel: String,
    pub field: String,
}

/// Channel to role bindings, ordered by role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    pub fn from_spec(spec: &Specification) -> Self {
        let mut bindings: Vec<Binding> = spec
            .encoding()
            .iter()
            .filter_map(|(channel, enc)| {
                BindingRole::for_channel(channel).map(|role| Binding {
                    role,
                    channel: channel.to_string(),
                    field: enc.field.clone(),
                })
            })
            .collect();
        bindings.sort_by_key(|b| b.role);
        Self(bindings)
    }

    pub fn get(&self, role: BindingRole) -> Option<&Binding> {
        self.0.iter().find(|b| b.role == role)
    }

    pub fn field(&self, role: BindingRole) -> Option<&str> {
        self.get(role).map(|b| b.field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::validate;
    use serde_json::json;

    #[test]
    fn test_value_kinds() {
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!(42)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(-7)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(4.5)), ValueKind::Float);
        assert_eq!(ValueKind::of(&json!("2024-03-01")), ValueKind::Date);
        assert_eq!(ValueKind::of(&json!("2024-03-01T10:30:00")), ValueKind::DateTime);
        assert_eq!(ValueKind::of(&json!("2024-03-01T10:30:00Z")), ValueKind::DateTime);
        assert_eq!(ValueKind::of(&json!("2024-13-45")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!("North")), ValueKind::String);
        assert_eq!(ValueKind::of(&Value::Null), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([1, 2])), ValueKind::String);
    }

    #[test]
    fn test_sample_uses_first_record_only() {
        let spec = validate(&json!({
            "type": "bar",
            "data": [
                {"region": "North", "sales": 10, "day": "2024-01-01"},
                {"region": 5, "sales": "n/a", "extra": true}
            ],
            "encoding": {"x": {"field": "region"}}
        }))
        .unwrap();
        let schema = Schema::sample(&spec);

        assert_eq!(schema.columns().len(), 3);
        assert!(schema.get("extra").is_none());
        assert_eq!(schema.get("region").unwrap().kind, ValueKind::String);
        assert_eq!(schema.get("sales").unwrap().kind, ValueKind::Integer);
        assert_eq!(schema.get("day").unwrap().kind, ValueKind::Date);
        assert_eq!(schema.measures().count(), 1);
        assert_eq!(schema.dimensions().count(), 2);
    }

    #[test]
    fn test_url_data_has_empty_schema() {
        let spec = validate(&json!({
            "type": "line",
            "data": {"url": "https://example.com/series.csv"},
            "encoding": {"x": {"field": "t"}}
        }))
        .unwrap();
        assert!(Schema::sample(&spec).is_empty());
    }

    #[test]
    fn test_bindings_from_encoding() {
        let spec = validate(&json!({
            "type": "bubble",
            "data": [{"a": "x", "b": 1, "c": "k", "d": 2}],
            "encoding": {
                "size": {"field": "d"},
                "color": {"field": "c"},
                "y": {"field": "b"},
                "x": {"field": "a"},
                "shape": {"field": "c"}
            }
        }))
        .unwrap();
        let bindings = Bindings::from_spec(&spec);

        let roles: Vec<BindingRole> = bindings.iter().map(|b| b.role).collect();
        assert_eq!(
            roles,
            vec![
                BindingRole::Category,
                BindingRole::Value,
                BindingRole::Breakdown,
                BindingRole::SecondaryValue
            ]
        );
        assert_eq!(bindings.field(BindingRole::Category), Some("a"));
        assert_eq!(bindings.field(BindingRole::SecondaryValue), Some("d"));
        assert!(BindingRole::SecondaryValue.is_measure());
        assert!(!BindingRole::Breakdown.is_measure());
    }
}
