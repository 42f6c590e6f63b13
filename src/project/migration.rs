// Project format migration system
// Handles version upgrades and backward compatibility

use crate::project::{Project, ProjectError, ProjectVersion};
use std::path::{Path, PathBuf};

/// Migration result
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Migrated project
    pub project: Project,
    /// Whether migration was performed
    pub migrated: bool,
    /// Migration messages/warnings
    pub messages: Vec<String>,
}

/// Compatibility information for project versions
#[derive(Debug, Clone)]
pub struct CompatibilityInfo {
    /// Whether the project can be loaded
    pub can_load: bool,
    /// Whether migration is needed
    pub needs_migration: bool,
    /// Optional warning message
    pub warning: Option<String>,
}

/// Project format migrator
pub struct ProjectMigrator;

impl ProjectMigrator {
    /// Migrate project to current version
    pub fn migrate_to_current(mut project: Project) -> Result<MigrationResult, ProjectError> {
        let current_version = ProjectVersion::current();
        let project_version = project.metadata.version.clone();

        if project_version.major < 1 || project_version.major > current_version.major {
            return Err(ProjectError::InvalidVersion);
        }

        if !is_older(&project_version, &current_version) {
            return Ok(MigrationResult {
                project,
                migrated: false,
                messages: vec!["Project is already at current version".to_string()],
            });
        }

        let mut messages = Vec::new();

        // Version 1.0 -> 1.1: mute flags
        if project_version.minor < 1 {
            messages.push("Migrating from v1.0 to v1.1...".to_string());
            project = Self::migrate_1_0_to_1_1(project);
        }

        project.metadata.version = current_version.clone();
        messages.push(format!("Successfully migrated to v{}", current_version));

        Ok(MigrationResult {
            project,
            migrated: true,
            messages,
        })
    }

    /// Check if project can be loaded (compatibility check)
    pub fn check_compatibility(version: &ProjectVersion) -> CompatibilityInfo {
        let current = ProjectVersion::current();

        if version.major < 1 || version.major > current.major {
            return CompatibilityInfo {
                can_load: false,
                needs_migration: false,
                warning: Some(format!(
                    "Project version v{} is not supported by v{}",
                    version, current
                )),
            };
        }

        if is_older(version, &current) {
            return CompatibilityInfo {
                can_load: true,
                needs_migration: true,
                warning: Some(format!(
                    "Project version v{} will be migrated to v{}",
                    version, current
                )),
            };
        }

        // Same major, same or newer minor: unknown fields are ignored
        let warning = (*version != current).then(|| {
            format!(
                "Project version v{} is newer than v{}; some data may be ignored",
                version, current
            )
        });

        CompatibilityInfo {
            can_load: true,
            needs_migration: false,
            warning,
        }
    }

    /// v1.0 files have no mute flags; instruments start muted
    fn migrate_1_0_to_1_1(mut project: Project) -> Project {
        for instrument in &mut project.instruments {
            instrument.muted.get_or_insert(true);
        }
        project
    }

    /// Copy the project file aside before migrating it
    pub fn create_backup(path: &Path) -> Result<PathBuf, ProjectError> {
        let backup_path = path.with_extension("stepdaw.backup");

        std::fs::copy(path, &backup_path).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to create backup: {}", e))
        })?;

        Ok(backup_path)
    }
}

fn is_older(version: &ProjectVersion, than: &ProjectVersion) -> bool {
    (version.major, version.minor, version.patch) < (than.major, than.minor, than.patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::types::InstrumentSerializable;

    fn v1_0_project() -> Project {
        let mut project = Project::default();
        project.metadata.version = ProjectVersion::new(1, 0, 0);
        project.instruments = vec![
            InstrumentSerializable {
                id: 1,
                sample: "kick.wav".into(),
                muted: None,
                steps: "x".repeat(32),
            },
            InstrumentSerializable {
                id: 2,
                sample: "snare.wav".into(),
                muted: Some(false),
                steps: ".".repeat(32),
            },
        ];
        project
    }

    #[test]
    fn test_version_compatibility_check() {
        let current = ProjectVersion::current();

        let info = ProjectMigrator::check_compatibility(&current);
        assert!(info.can_load);
        assert!(!info.needs_migration);
        assert!(info.warning.is_none());

        let info = ProjectMigrator::check_compatibility(&ProjectVersion::new(1, 0, 0));
        assert!(info.can_load);
        assert!(info.needs_migration);
        assert!(info.warning.is_some());

        let info = ProjectMigrator::check_compatibility(&ProjectVersion::new(1, 7, 0));
        assert!(info.can_load);
        assert!(!info.needs_migration);
        assert!(info.warning.is_some());

        let newer = ProjectVersion::new(current.major + 1, 0, 0);
        let info = ProjectMigrator::check_compatibility(&newer);
        assert!(!info.can_load);
        assert!(!info.needs_migration);

        assert!(!ProjectMigrator::check_compatibility(&ProjectVersion::new(0, 9, 0)).can_load);
    }

    #[test]
    fn test_migration_1_0_to_1_1() {
        let result = ProjectMigrator::migrate_to_current(v1_0_project()).unwrap();

        assert!(result.migrated);
        assert_eq!(result.project.metadata.version, ProjectVersion::current());
        assert_eq!(result.project.instruments[0].muted, Some(true));
        // Existing flags are kept
        assert_eq!(result.project.instruments[1].muted, Some(false));
        assert!(result.messages.last().unwrap().contains("1.1.0"));
    }

    #[test]
    fn test_no_migration_needed() {
        let result = ProjectMigrator::migrate_to_current(Project::default()).unwrap();

        assert!(!result.migrated);
        assert_eq!(result.project.metadata.version, ProjectVersion::current());
    }

    #[test]
    fn test_unsupported_version_refused() {
        let mut project = Project::default();
        project.metadata.version = ProjectVersion::new(2, 0, 0);
        assert!(matches!(
            ProjectMigrator::migrate_to_current(project),
            Err(ProjectError::InvalidVersion)
        ));
    }

    #[test]
    fn test_create_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.stepdaw");
        std::fs::write(&path, b"zip bytes").unwrap();

        let backup = ProjectMigrator::create_backup(&path).unwrap();
        assert_eq!(backup, dir.path().join("song.stepdaw.backup"));
        assert_eq!(std::fs::read(&backup).unwrap(), b"zip bytes");
    }
}
