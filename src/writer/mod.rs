//! Output writers for validated chart specifications
//!
//! A writer turns a [`Specification`] into a renderable document. The only
//! implementation today is [`VegaLiteWriter`], used for interactive previews.

pub mod vegalite;

pub use vegalite::VegaLiteWriter;

use crate::{Result, Specification};

/// Trait implemented by every output format
pub trait Writer {
    /// Rendered output type
    type Output;

    /// Render a validated specification
    fn write(&self, spec: &Specification) -> Result<Self::Output>;
}
