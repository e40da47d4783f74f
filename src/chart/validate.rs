//! Specification validator
//!
//! Turns a raw, already-parsed JSON structure into a [`Specification`].
//! This is the only place allowed to refuse a chart request; every violation
//! is reported with the offending field and a readable message.
//!
//! Checks run in precedence order:
//!
//! 1. `type` is present and registered
//! 2. `data` is a non-empty list, or a mapping with non-empty `values` or `url`
//! 3. `encoding` is present, and non-empty unless the chart type allows it
//!
//! Unknown top-level keys are ignored.

use serde_json::{Map, Value};

use super::spec::{DataSource, Encoding, FieldEncoding, FieldType, Options, Record, Specification};
use super::types::ChartType;

/// Category of a single validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// The raw input is not a mapping
    NotAnObject,
    /// `type` missing or not in the registry
    UnknownChartType,
    /// `data` missing or an empty list
    EmptyData,
    /// `data` present but of an unusable shape
    InvalidDataShape,
    /// `encoding` missing, or empty for a chart type that needs one
    MissingEncoding,
    /// A channel entry that is not a usable field binding
    InvalidEncoding,
    /// `width`, `height`, `title`, `description` or `options` of the wrong type
    InvalidField,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ViolationKind::NotAnObject => "NotAnObject",
            ViolationKind::UnknownChartType => "UnknownChartType",
            ViolationKind::EmptyData => "EmptyData",
            ViolationKind::InvalidDataShape => "InvalidDataShape",
            ViolationKind::MissingEncoding => "MissingEncoding",
            ViolationKind::InvalidEncoding => "InvalidEncoding",
            ViolationKind::InvalidField => "InvalidField",
        };
        write!(f, "{}", s)
    }
}

/// One offending field
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A rejected chart request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid chart specification: {}", summarize(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// The highest-precedence failure
    pub fn kind(&self) -> ViolationKind {
        self.violations
            .first()
            .map(|v| v.kind)
            .unwrap_or(ViolationKind::NotAnObject)
    }

    /// All failures, in precedence order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any failure is of the given kind
    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// One human-readable line per offending field
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(Violation::to_string).collect()
    }
}

/// Validate a raw chart request and build the canonical [`Specification`]
pub fn validate(raw: &Value) -> Result<Specification, ValidationError> {
    let Some(obj) = raw.as_object() else {
        return Err(ValidationError {
            violations: vec![Violation::new(
                "$",
                ViolationKind::NotAnObject,
                "chart specification must be a JSON object",
            )],
        });
    };

    let mut violations = Vec::new();

    let chart_type = check_type(obj, &mut violations);
    let data = check_data(obj, &mut violations);
    let encoding = check_encoding(obj, chart_type, &mut violations);
    let options = check_options(obj, &mut violations);
    let title = check_text(obj, "title", &mut violations);
    let description = check_text(obj, "description", &mut violations);
    let width = check_dimension(obj, "width", &mut violations);
    let height = check_dimension(obj, "height", &mut violations);

    match (chart_type, data, encoding) {
        (Some(chart_type), Some(data), Some(encoding)) if violations.is_empty() => {
            Ok(Specification::from_parts(
                chart_type,
                data,
                encoding,
                options,
                title,
                description,
                width,
                height,
            ))
        }
        _ => Err(ValidationError { violations }),
    }
}

impl TryFrom<&Value> for Specification {
    type Error = ValidationError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        validate(raw)
    }
}

impl Specification {
    /// Validate a raw chart request; see [`validate`]
    pub fn from_value(raw: &Value) -> Result<Self, ValidationError> {
        validate(raw)
    }
}

fn check_type(obj: &Map<String, Value>, violations: &mut Vec<Violation>) -> Option<ChartType> {
    match obj.get("type") {
        None | Some(Value::Null) => {
            violations.push(Violation::new(
                "type",
                ViolationKind::UnknownChartType,
                "chart type is required",
            ));
            None
        }
        Some(Value::String(id)) => {
            let parsed = ChartType::parse(id);
            if parsed.is_none() {
                violations.push(Violation::new(
                    "type",
                    ViolationKind::UnknownChartType,
                    format!("unsupported chart type '{}'", id),
                ));
            }
            parsed
        }
        Some(other) => {
            violations.push(Violation::new(
                "type",
                ViolationKind::UnknownChartType,
                format!("chart type must be a string, got {}", other),
            ));
            None
        }
    }
}

fn check_data(obj: &Map<String, Value>, violations: &mut Vec<Violation>) -> Option<DataSource> {
    match obj.get("data") {
        None | Some(Value::Null) => {
            violations.push(Violation::new(
                "data",
                ViolationKind::EmptyData,
                "data is required",
            ));
            None
        }
        Some(Value::Array(items)) => {
            if items.is_empty() {
                violations.push(Violation::new(
                    "data",
                    ViolationKind::EmptyData,
                    "data must not be empty",
                ));
                return None;
            }
            records_from(items, "data", violations).map(DataSource::Records)
        }
        Some(Value::Object(map)) => data_from_mapping(map, violations),
        Some(other) => {
            violations.push(Violation::new(
                "data",
                ViolationKind::InvalidDataShape,
                format!("data must be a list of records or a mapping, got {}", other),
            ));
            None
        }
    }
}

fn data_from_mapping(
    map: &Map<String, Value>,
    violations: &mut Vec<Violation>,
) -> Option<DataSource> {
    let extra_without = |key: &str| -> Record {
        map.iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    };

    if let Some(Value::Array(items)) = map.get("values") {
        if !items.is_empty() {
            return records_from(items, "data.values", violations).map(|values| {
                DataSource::Values {
                    values,
                    extra: extra_without("values"),
                }
            });
        }
    }

    if let Some(Value::String(url)) = map.get("url") {
        if !url.trim().is_empty() {
            return Some(DataSource::Url {
                url: url.clone(),
                extra: extra_without("url"),
            });
        }
    }

    violations.push(Violation::new(
        "data",
        ViolationKind::InvalidDataShape,
        "data mapping must contain a non-empty 'values' list or a non-empty 'url'",
    ));
    None
}

fn records_from(
    items: &[Value],
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<Vec<Record>> {
    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match item {
            Value::Object(record) => records.push(record.clone()),
            other => {
                violations.push(Violation::new(
                    format!("{}[{}]", field, idx),
                    ViolationKind::InvalidDataShape,
                    format!("every record must be an object, got {}", other),
                ));
                return None;
            }
        }
    }
    Some(records)
}

fn check_encoding(
    obj: &Map<String, Value>,
    chart_type: Option<ChartType>,
    violations: &mut Vec<Violation>,
) -> Option<Encoding> {
    let map = match obj.get("encoding") {
        Some(Value::Object(map)) => map,
        None | Some(Value::Null) => {
            violations.push(Violation::new(
                "encoding",
                ViolationKind::MissingEncoding,
                "encoding is required",
            ));
            return None;
        }
        Some(other) => {
            violations.push(Violation::new(
                "encoding",
                ViolationKind::MissingEncoding,
                format!("encoding must be a mapping of channels, got {}", other),
            ));
            return None;
        }
    };

    if map.is_empty() {
        let optional = chart_type
            .map(|t| t.kind().is_encoding_optional())
            .unwrap_or(false);
        if !optional {
            let name = chart_type.map(|t| t.id()).unwrap_or("this chart type");
            violations.push(Violation::new(
                "encoding",
                ViolationKind::MissingEncoding,
                format!("encoding must not be empty for {}", name),
            ));
            return None;
        }
    }

    let mut channels = Vec::with_capacity(map.len());
    let mut valid = true;
    for (channel, value) in map {
        match field_encoding_from(channel, value) {
            Ok(enc) => channels.push((channel.clone(), enc)),
            Err(violation) => {
                violations.push(violation);
                valid = false;
            }
        }
    }

    valid.then(|| channels.into_iter().collect())
}

fn field_encoding_from(channel: &str, value: &Value) -> Result<FieldEncoding, Violation> {
    let path = format!("encoding.{}", channel);
    let invalid = |message: String| Violation::new(path.clone(), ViolationKind::InvalidEncoding, message);

    let obj = value
        .as_object()
        .ok_or_else(|| invalid(format!("channel must be a mapping, got {}", value)))?;

    let field = match obj.get("field") {
        Some(Value::String(field)) if !field.is_empty() => field.clone(),
        _ => return Err(invalid("channel requires a non-empty string 'field'".to_string())),
    };

    let field_type = match obj.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(
            FieldType::parse(name)
                .ok_or_else(|| invalid(format!("unknown field type '{}'", name)))?,
        ),
        Some(other) => return Err(invalid(format!("field type must be a string, got {}", other))),
    };

    let bin = match obj.get("bin") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(bin)) => Some(*bin),
        Some(other) => return Err(invalid(format!("'bin' must be a boolean, got {}", other))),
    };

    let aggregate = match obj.get("aggregate") {
        None | Some(Value::Null) => None,
        Some(Value::String(op)) => Some(op.clone()),
        Some(other) => {
            return Err(invalid(format!("'aggregate' must be a string, got {}", other)))
        }
    };

    Ok(FieldEncoding {
        field,
        field_type,
        bin,
        aggregate,
    })
}

fn check_options(obj: &Map<String, Value>, violations: &mut Vec<Violation>) -> Options {
    match obj.get("options") {
        None | Some(Value::Null) => Options::default(),
        Some(Value::Object(map)) => Options::new(map.clone()),
        Some(other) => {
            violations.push(Violation::new(
                "options",
                ViolationKind::InvalidField,
                format!("options must be a mapping, got {}", other),
            ));
            Options::default()
        }
    }
}

fn check_text(
    obj: &Map<String, Value>,
    key: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            violations.push(Violation::new(
                key,
                ViolationKind::InvalidField,
                format!("{} must be a string, got {}", key, other),
            ));
            None
        }
    }
}

fn check_dimension(
    obj: &Map<String, Value>,
    key: &str,
    violations: &mut Vec<Violation>,
) -> Option<u32> {
    let value = obj.get(key)?;
    if value.is_null() {
        return None;
    }
    match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(n) if n > 0 => Some(n),
        _ => {
            violations.push(Violation::new(
                key,
                ViolationKind::InvalidField,
                format!("{} must be a positive integer, got {}", key, value),
            ));
            None
        }
    }
}
