// Serialization utilities for project persistence
// Format conversion plus the bridge between live instruments and saved ones

use crate::command::deck::Deck;
use crate::project::ProjectError;
use crate::project::types::*;
use crate::sequencer::instrument::{Instrument, SampleRef};
use ron::ser::PrettyConfig;

/// Serialize project state to RON format
pub fn serialize_to_ron(project: &Project) -> Result<String, ProjectError> {
    ron::ser::to_string_pretty(project, PrettyConfig::default()).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to serialize to RON: {}", e))
    })
}

/// Deserialize project state from RON format
pub fn deserialize_from_ron(ron_data: &str) -> Result<Project, ProjectError> {
    ron::from_str(ron_data).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to deserialize from RON: {}", e))
    })
}

/// Serialize project metadata to JSON format
pub fn serialize_metadata_to_json(metadata: &ProjectMetadata) -> Result<String, ProjectError> {
    serde_json::to_string_pretty(metadata).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to serialize metadata to JSON: {}", e))
    })
}

/// Deserialize project metadata from JSON format
pub fn deserialize_metadata_from_json(json_data: &str) -> Result<ProjectMetadata, ProjectError> {
    serde_json::from_str(json_data).map_err(|e| {
        ProjectError::SerializationError(format!(
            "Failed to deserialize metadata from JSON: {}",
            e
        ))
    })
}

/// Convert a live instrument to its saved form
pub fn instrument_to_serializable(instrument: &Instrument) -> InstrumentSerializable {
    InstrumentSerializable {
        id: instrument.id(),
        sample: instrument.sample().path().to_path_buf(),
        muted: Some(instrument.muted),
        steps: instrument.pattern.to_steps(),
    }
}

/// Rebuild a live instrument; a missing mute flag means muted
pub fn instrument_from_serializable(serializable: &InstrumentSerializable) -> Instrument {
    let mut instrument = Instrument::new(serializable.id, SampleRef::new(&serializable.sample));
    instrument.muted = serializable.muted.unwrap_or(true);
    instrument.set_rhythm(&serializable.steps);
    instrument
}

impl Project {
    /// Snapshot the persistent part of a deck
    pub fn capture(deck: &Deck) -> Self {
        Self {
            metadata: deck.metadata().clone(),
            tempo: TempoState { bpm: deck.bpm() },
            transport: TransportStateSerializable { tick: deck.tick() },
            instruments: deck
                .rack()
                .to_vec()
                .iter()
                .map(instrument_to_serializable)
                .collect(),
        }
    }

    /// Rebuild the live instruments, in order
    pub fn build_instruments(&self) -> Vec<Instrument> {
        self.instruments
            .iter()
            .map(instrument_from_serializable)
            .collect()
    }
}
