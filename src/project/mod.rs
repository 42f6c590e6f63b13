// Project persistence
// Implements a ZIP container format (manifest.json + project.ron) for saving/loading decks

pub mod manager;
pub mod migration;
pub mod serialization;
pub mod types;

pub use manager::{ProjectError, ProjectLoadOptions, ProjectManager};
pub use types::{
    InstrumentSerializable, Project, ProjectMetadata, ProjectVersion, TempoState,
    TransportStateSerializable,
};

use crate::sequencer::instrument::MAX_INSTRUMENT_ID;
use crate::sequencer::pattern::{DIVISIONS, STEP_OFF, STEP_ON};
use crate::sequencer::tempo::{MAX_BPM, MIN_BPM};
use std::collections::HashSet;

/// Check a project before it replaces the live deck
pub fn validate_project_structure(project: &Project) -> Result<(), ProjectError> {
    if project.metadata.name.trim().is_empty() {
        return Err(ProjectError::InvalidStructure(
            "Project name cannot be empty".to_string(),
        ));
    }

    if project.metadata.name.len() > 255 {
        return Err(ProjectError::InvalidStructure(
            "Project name cannot exceed 255 characters".to_string(),
        ));
    }

    if project.metadata.version.major < 1 {
        return Err(ProjectError::InvalidStructure(
            "Invalid project version".to_string(),
        ));
    }

    let bpm = project.tempo.bpm;
    if !bpm.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&bpm) {
        return Err(ProjectError::InvalidStructure(format!(
            "Tempo must be between {} and {} BPM",
            MIN_BPM, MAX_BPM
        )));
    }

    let mut ids = HashSet::new();
    for instrument in &project.instruments {
        if instrument.id == 0 {
            return Err(ProjectError::InvalidStructure(
                "Instrument ids start at 1".to_string(),
            ));
        }

        if instrument.id > MAX_INSTRUMENT_ID {
            return Err(ProjectError::InvalidStructure(format!(
                "Instrument ID {} exceeds {}",
                instrument.id, MAX_INSTRUMENT_ID
            )));
        }

        if !ids.insert(instrument.id) {
            return Err(ProjectError::InvalidStructure(format!(
                "Duplicate instrument ID: {}",
                instrument.id
            )));
        }

        if instrument.sample.as_os_str().is_empty() {
            return Err(ProjectError::InvalidStructure(format!(
                "Instrument {} has no sample",
                instrument.id
            )));
        }

        let steps = instrument.steps.chars().count();
        if steps == 0 || steps % DIVISIONS != 0 {
            return Err(ProjectError::InvalidStructure(format!(
                "Instrument {} pattern length {} is not a whole number of {}-step measures",
                instrument.id, steps, DIVISIONS
            )));
        }

        if let Some(bad) = instrument
            .steps
            .chars()
            .find(|&c| c != STEP_ON && c != STEP_OFF)
        {
            return Err(ProjectError::InvalidStructure(format!(
                "Instrument {} pattern contains invalid step '{}'",
                instrument.id, bad
            )));
        }
    }

    Ok(())
}
