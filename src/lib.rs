/*!
# chartmaker - one chart description, many targets

chartmaker takes a single canonical chart request (chart type, inline data or
a data URL, visual encoding and style options), validates it once, and
translates the validated [`Specification`] into:

- a Vega-Lite document for interactive preview ([`writer::VegaLiteWriter`])
- BI platform artifacts written to disk ([`export`]): a Power BI custom visual
  project, a Tableau workbook, a LookML model and a Looker Studio report config

## Example

```rust,ignore
use chartmaker::writer::{VegaLiteWriter, Writer};
use serde_json::json;

let spec = chartmaker::validate(&json!({
    "type": "bar",
    "data": [{"x": "A", "y": 10}, {"x": "B", "y": 20}],
    "encoding": {
        "x": {"field": "x", "type": "nominal"},
        "y": {"field": "y", "type": "quantitative"}
    }
}))?;

let vega_json = VegaLiteWriter::new().write(&spec)?;
```

## Core Components

- [`chart`] - chart type registry, specification model and validator
- [`writer`] - grammar mapping for previews
- [`export`] - platform exporters
*/

pub mod chart;
pub mod export;
pub mod writer;

// Re-export key types for convenience
pub use chart::{
    all_types, example, is_valid_type, validate, ChartKind, ChartType, DataSource, Encoding,
    FieldEncoding, FieldType, Options, Specification, ValidationError, ViolationKind,
};
pub use export::{ExportError, ExportMode, Exporter, Platform};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Output generation error: {0}")]
    WriterError(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, ChartError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
