// Types for project persistence

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::sequencer::instrument::InstrumentId;
use crate::sequencer::tempo::DEFAULT_BPM;

/// Project version information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProjectVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// 1.1 added per-instrument mute flags
    pub fn current() -> Self {
        Self::new(1, 1, 0)
    }
}

impl std::fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Project metadata (also stored alone as `manifest.json`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMetadata {
    /// Stable identifier, kept across saves
    pub id: Uuid,
    /// Project name
    pub name: String,
    /// Version of the project format
    pub version: ProjectVersion,
    /// Creation timestamp (RFC 3339)
    pub created: String,
    /// Last modification timestamp (RFC 3339)
    pub modified: String,
    /// Author/creator information
    #[serde(default)]
    pub author: Option<String>,
}

impl ProjectMetadata {
    /// Fresh metadata for a new project
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            version: ProjectVersion::current(),
            created: now.clone(),
            modified: now,
            author: None,
        }
    }

    /// Stamp the modification time
    pub fn touch(&mut self) {
        self.modified = chrono::Utc::now().to_rfc3339();
    }
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self::new("Untitled Project")
    }
}

/// Saved tempo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TempoState {
    pub bpm: f64,
}

/// Saved transport position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TransportStateSerializable {
    pub tick: u64,
}

/// Saved instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentSerializable {
    /// Instrument identifier (1-based, unique within the project)
    pub id: InstrumentId,
    /// Sample file passed to the player
    pub sample: PathBuf,
    /// Mute flag (v1.1+)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    /// Pattern cells as `x`/`.` step notation
    pub steps: String,
}

/// Main project structure
///
/// Selection and other UI state are deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Project metadata
    pub metadata: ProjectMetadata,
    pub tempo: TempoState,
    pub transport: TransportStateSerializable,
    /// Instruments in display order
    pub instruments: Vec<InstrumentSerializable>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            metadata: ProjectMetadata::default(),
            tempo: TempoState { bpm: DEFAULT_BPM },
            transport: TransportStateSerializable::default(),
            instruments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_version() {
        let version = ProjectVersion::new(1, 2, 3);
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 2);
        assert_eq!(version.patch, 3);
        assert_eq!(version.to_string(), "1.2.3");

        assert_eq!(ProjectVersion::current().to_string(), "1.1.0");
    }

    #[test]
    fn test_metadata_defaults() {
        let metadata = ProjectMetadata::new("Groove");
        assert_eq!(metadata.name, "Groove");
        assert_eq!(metadata.version, ProjectVersion::current());
        assert_eq!(metadata.created, metadata.modified);
        assert!(chrono::DateTime::parse_from_rfc3339(&metadata.created).is_ok());
        assert_ne!(metadata.id, ProjectMetadata::new("Groove").id);
    }

    #[test]
    fn test_touch_keeps_identity() {
        let mut metadata = ProjectMetadata {
            modified: "2023-01-01T00:00:00+00:00".to_string(),
            ..ProjectMetadata::new("Groove")
        };
        let id = metadata.id;
        let created = metadata.created.clone();

        metadata.touch();
        assert_eq!(metadata.id, id);
        assert_eq!(metadata.created, created);
        assert_ne!(metadata.modified, "2023-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_default_project() {
        let project = Project::default();
        assert_eq!(project.metadata.name, "Untitled Project");
        assert_eq!(project.tempo.bpm, 120.0);
        assert_eq!(project.transport.tick, 0);
        assert!(project.instruments.is_empty());
    }
}
