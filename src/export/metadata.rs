//! Artifact metadata shared by every exporter

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::chart::Specification;

/// Display name used when a chart has no title
pub const FALLBACK_TITLE: &str = "Untitled Chart";

/// Description used when a chart has none
pub const FALLBACK_DESCRIPTION: &str = "Chart generated by chartmaker";

/// Version stamped into generated artifacts
pub const ARTIFACT_VERSION: &str = "1.0.0.0";

/// Character limits a platform puts on display names and descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLimits {
    pub name: usize,
    pub description: usize,
}

/// Identifier, names and versioning for one generated artifact
///
/// The identifier and timestamp are fresh on every call; everything else is
/// derived from the specification.
#[derive(Debug, Clone)]
pub struct ArtifactMetadata {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub version: &'static str,
    pub generated_at: DateTime<Utc>,
}

impl ArtifactMetadata {
    pub fn new(spec: &Specification, limits: TextLimits) -> Self {
        let name = spec.title().unwrap_or(FALLBACK_TITLE);
        let description = spec.description().unwrap_or(FALLBACK_DESCRIPTION);
        Self {
            id: Uuid::new_v4(),
            name: truncate_chars(name, limits.name),
            description: truncate_chars(description, limits.description),
            version: ARTIFACT_VERSION,
            generated_at: Utc::now(),
        }
    }

    /// Identifier without dashes, upper-cased
    pub fn compact_id(&self) -> String {
        self.id.simple().to_string().to_uppercase()
    }

    /// RFC 3339 generation timestamp, second precision
    pub fn timestamp(&self) -> String {
        self.generated_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}

/// Truncate to at most `max` characters, never splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
