//! Chart requests: type registry, canonical model and validation
//!
//! Raw JSON enters through [`validate`], which is the only way to obtain a
//! [`Specification`]. Everything downstream (grammar mapping, exporters)
//! consumes the validated model and never re-checks it.

mod examples;
mod spec;
mod types;
mod validate;

pub use examples::{example, examples};
pub use spec::{
    DataSource, Encoding, FieldEncoding, FieldType, Options, Record, ReferenceLine, Specification,
    Stacking, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use types::{all_types, is_valid_type, ChartKind, ChartType, CHART_TYPES};
pub use validate::{validate, ValidationError, Violation, ViolationKind};
