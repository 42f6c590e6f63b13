// Project manager for loading and saving projects

use crate::project::migration::{MigrationResult, ProjectMigrator};
use crate::project::serialization::*;
use crate::project::types::*;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Archive entry holding the metadata alone
const MANIFEST_ENTRY: &str = "manifest.json";

/// Archive entry holding the full project
const PROJECT_ENTRY: &str = "project.ron";

/// Project error types
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("File system error: {0}")]
    FileSystemError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid project structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid project format version")]
    InvalidVersion,

    #[error("Missing required files in project")]
    MissingFiles,

    #[error("Project validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),
}

/// Options for loading a project
#[derive(Debug, Clone)]
pub struct ProjectLoadOptions {
    /// Whether to validate the project structure
    pub validate: bool,
    /// Whether to copy the file aside before migrating an old version
    pub backup_before_migration: bool,
}

impl Default for ProjectLoadOptions {
    fn default() -> Self {
        Self {
            validate: true,
            backup_before_migration: true,
        }
    }
}

/// Project manager - handles saving/loading projects
pub struct ProjectManager {
    /// Tempo for new projects
    default_bpm: f64,
}

impl ProjectManager {
    /// Create a new project manager
    pub fn new(default_bpm: f64) -> Self {
        Self { default_bpm }
    }

    /// Create a new empty project
    pub fn create_new_project(&self, name: String) -> Project {
        Project {
            metadata: ProjectMetadata::new(name),
            tempo: TempoState {
                bpm: self.default_bpm,
            },
            ..Project::default()
        }
    }

    /// Save project to a ZIP file
    ///
    /// The archive is written next to the target and renamed over it, so an
    /// interrupted save never leaves a truncated project behind.
    pub fn save_project<P: AsRef<Path>>(
        &self,
        project: &Project,
        project_path: P,
    ) -> Result<(), ProjectError> {
        let project_path = project_path.as_ref();

        if let Some(project_dir) = project_path.parent() {
            if !project_dir.as_os_str().is_empty() {
                std::fs::create_dir_all(project_dir).map_err(|e| {
                    ProjectError::FileSystemError(format!(
                        "Failed to create project directory: {}",
                        e
                    ))
                })?;
            }
        }

        let manifest_json = serialize_metadata_to_json(&project.metadata)?;
        let project_ron = serialize_to_ron(project)?;

        let temp_path = project_path.with_extension("stepdaw.tmp");
        let zip_file = File::create(&temp_path).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to create ZIP file: {}", e))
        })?;

        let mut zip_writer = ZipWriter::new(zip_file);
        for (name, contents) in [(MANIFEST_ENTRY, &manifest_json), (PROJECT_ENTRY, &project_ron)] {
            let options: FileOptions<()> = FileOptions::default();
            zip_writer.start_file(name, options)?;
            zip_writer.write_all(contents.as_bytes())?;
        }
        zip_writer.finish()?;

        std::fs::rename(&temp_path, project_path).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to replace project file: {}", e))
        })?;

        log::info!(
            "Saved project '{}' to {}",
            project.metadata.name,
            project_path.display()
        );
        Ok(())
    }

    /// Load project from a ZIP file
    pub fn load_project<P: AsRef<Path>>(
        &self,
        project_path: P,
        options: &ProjectLoadOptions,
    ) -> Result<Project, ProjectError> {
        let project_path = project_path.as_ref();

        let zip_file = File::open(project_path).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to open project file: {}", e))
        })?;
        let mut zip_archive = ZipArchive::new(zip_file)?;

        // The manifest is checked first so unsupported files fail fast
        let manifest = deserialize_metadata_from_json(&read_entry(&mut zip_archive, MANIFEST_ENTRY)?)?;
        let compatibility = ProjectMigrator::check_compatibility(&manifest.version);
        if !compatibility.can_load {
            return Err(ProjectError::InvalidVersion);
        }

        let project = deserialize_from_ron(&read_entry(&mut zip_archive, PROJECT_ENTRY)?)?;

        let compatibility = ProjectMigrator::check_compatibility(&project.metadata.version);
        if !compatibility.can_load {
            return Err(ProjectError::InvalidVersion);
        }
        if let Some(warning) = &compatibility.warning {
            log::warn!("{}", warning);
        }

        let migration_result = if compatibility.needs_migration {
            if options.backup_before_migration {
                let backup_path = ProjectMigrator::create_backup(project_path)?;
                log::warn!("Created backup at {}", backup_path.display());
            }
            ProjectMigrator::migrate_to_current(project)?
        } else {
            MigrationResult {
                project,
                migrated: false,
                messages: vec!["No migration needed".to_string()],
            }
        };

        if migration_result.migrated {
            for message in &migration_result.messages {
                log::warn!("Migration: {}", message);
            }
        }

        let project = migration_result.project;

        if options.validate {
            crate::project::validate_project_structure(&project)
                .map_err(|e| ProjectError::ValidationFailed(e.to_string()))?;
        }

        log::info!(
            "Loaded project '{}' from {}",
            project.metadata.name,
            project_path.display()
        );
        Ok(project)
    }

    /// Tempo used for new projects
    pub fn default_bpm(&self) -> f64 {
        self.default_bpm
    }
}

/// Read one archive entry as text
fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String, ProjectError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(ProjectError::MissingFiles),
        Err(e) => return Err(e.into()),
    };

    let mut contents = String::new();
    entry.read_to_string(&mut contents)?;
    Ok(contents)
}
