//! BI platform exporters
//!
//! Each exporter turns a validated [`Specification`] into the artifact a BI
//! tool can import:
//!
//! | Platform        | Output                                             |
//! |-----------------|----------------------------------------------------|
//! | Power BI        | custom visual project directory, or a zip of it    |
//! | Tableau         | `.twb` workbook, or `.twbx` with the inline data   |
//! | Looker          | `.lkml` file with a model, explore and view        |
//! | Looker Studio   | JSON report configuration                          |
//!
//! Exporters share no state. [`Exporter::export`] never propagates an error;
//! it logs the cause and reports `false`. Use [`Exporter::try_export`] to get
//! the error value instead.

mod fs;
pub mod looker;
pub mod looker_studio;
pub mod metadata;
pub mod powerbi;
pub mod schema;
pub mod tableau;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::chart::Specification;

pub use looker::LookerExporter;
pub use looker_studio::LookerStudioExporter;
pub use metadata::{ArtifactMetadata, TextLimits};
pub use powerbi::PowerBiExporter;
pub use schema::{Binding, BindingRole, Bindings, Column, FieldRole, Schema, ValueKind};
pub use tableau::TableauExporter;

/// Export failure, naming the platform and the underlying cause
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{platform} export failed writing {}: {source}", .path.display())]
    Io {
        platform: Platform,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{platform} export failed to serialize output: {message}")]
    Serialize { platform: Platform, message: String },

    #[error("{platform} export failed to build archive: {message}")]
    Archive { platform: Platform, message: String },
}

impl ExportError {
    pub fn platform(&self) -> Platform {
        match self {
            ExportError::Io { platform, .. }
            | ExportError::Serialize { platform, .. }
            | ExportError::Archive { platform, .. } => *platform,
        }
    }
}

/// Supported export targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    PowerBi,
    Tableau,
    Looker,
    LookerStudio,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::PowerBi,
        Platform::Tableau,
        Platform::Looker,
        Platform::LookerStudio,
    ];

    /// Registry key, as accepted by [`FromStr`]
    pub fn key(self) -> &'static str {
        match self {
            Platform::PowerBi => "powerbi",
            Platform::Tableau => "tableau",
            Platform::Looker => "looker",
            Platform::LookerStudio => "looker_studio",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::PowerBi => "Power BI",
            Platform::Tableau => "Tableau",
            Platform::Looker => "Looker",
            Platform::LookerStudio => "Looker Studio",
        }
    }

    /// Extension of the single-file artifact (Power BI: the packaged archive)
    pub fn default_extension(self) -> &'static str {
        match self {
            Platform::PowerBi => "pbiviz",
            Platform::Tableau => "twb",
            Platform::Looker => "lkml",
            Platform::LookerStudio => "json",
        }
    }

    /// Length limits for display names and descriptions
    pub fn text_limits(self) -> TextLimits {
        let (name, description) = match self {
            Platform::PowerBi => (50, 200),
            Platform::Tableau => (100, 500),
            Platform::Looker => (255, 1000),
            Platform::LookerStudio => (100, 1000),
        };
        TextLimits { name, description }
    }

    /// Build the exporter for this platform
    pub fn exporter(self, mode: ExportMode) -> Box<dyn Exporter> {
        match self {
            Platform::PowerBi => Box::new(PowerBiExporter::new(mode)),
            Platform::Tableau => Box::new(TableauExporter::new(mode)),
            Platform::Looker => Box::new(LookerExporter::new()),
            Platform::LookerStudio => Box::new(LookerStudioExporter::new()),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| {
                let keys: Vec<&str> = Platform::ALL.iter().map(|p| p.key()).collect();
                format!("unknown platform '{}', expected one of: {}", s, keys.join(", "))
            })
    }
}

/// How multi-file artifacts are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// Loose files (Power BI project directory, plain `.twb`)
    #[default]
    Project,
    /// A single archive bundling every file (and inline data for Tableau)
    Packaged,
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub platform: Platform,
    pub destination: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Common contract for platform exporters
pub trait Exporter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Write the artifact for `spec` at `destination`
    fn try_export(
        &self,
        spec: &Specification,
        destination: &Path,
    ) -> Result<ExportReport, ExportError>;

    /// Write the artifact, logging the outcome; `false` on any failure
    fn export(&self, spec: &Specification, destination: &Path) -> bool {
        match self.try_export(spec, destination) {
            Ok(report) => {
                tracing::info!(
                    platform = %report.platform,
                    destination = %report.destination.display(),
                    files = report.files.len(),
                    "export complete"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    platform = %self.platform(),
                    destination = %destination.display(),
                    "{}",
                    e
                );
                false
            }
        }
    }
}
