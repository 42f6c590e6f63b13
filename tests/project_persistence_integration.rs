// Integration test for project persistence
// Tests the complete deck -> file -> deck cycle with realistic data

use std::io::Write;
use stepdaw::config::Config;
use stepdaw::project::{
    InstrumentSerializable, ProjectLoadOptions, ProjectManager, ProjectMetadata, ProjectVersion,
};
use stepdaw::sequencer::DIVISIONS;
use stepdaw::{Action, Deck, DeckError, Project, ProjectError, SampleRef};
use tempfile::tempdir;

fn edited_deck() -> Deck {
    let config = Config::default();
    let mut deck = Deck::new(&config);
    deck.add_instruments(&config.samples);

    // Unmute the kick and give it a third measure with an extra hit
    deck.toggle_mute();
    deck.extend_pattern();
    deck.move_note(70);
    deck.toggle_note();

    // Duplicate the hat
    deck.next_instrument();
    deck.next_instrument();
    deck.duplicate_pattern();

    deck.transport().seek(45, deck.rack());
    deck
}

#[test]
fn test_complete_project_persistence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("song.stepdaw");

    let mut deck = edited_deck().with_project_path(&path);
    assert_eq!(deck.save().unwrap(), path);

    let mut restored = Deck::default().with_project_path(&path);
    restored.apply(Action::Load).unwrap();

    let original = deck.rack().to_vec();
    let loaded = restored.rack().to_vec();
    assert_eq!(loaded.len(), 4);
    for (a, b) in original.iter().zip(&loaded) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.sample(), b.sample());
        assert_eq!(a.muted, b.muted);
        assert_eq!(a.pattern.cells(), b.pattern.cells());
    }
    assert!(loaded[0].pattern.is_active(70));
    assert_eq!(loaded[0].pattern.len(), 3 * DIVISIONS);
    assert_eq!(loaded[2].pattern.len(), 2 * DIVISIONS);

    assert_eq!(restored.tick(), 45);
    assert_eq!(restored.bpm(), deck.bpm());
    assert_eq!(restored.metadata().id, deck.metadata().id);
}

#[test]
fn test_load_resets_selection_and_tap_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("song.stepdaw");
    edited_deck().save_to(&path).unwrap();

    let mut deck = Deck::default();
    deck.add_instrument(SampleRef::new("x.wav"), "");
    deck.add_instrument(SampleRef::new("y.wav"), "");
    deck.next_instrument();
    deck.move_note(7);
    deck.tap_tempo();

    deck.load_from(&path).unwrap();
    assert_eq!(deck.selection().instrument(), 0);
    assert_eq!(deck.selection().note(), 0);
    assert!(deck.tempo().taps().is_empty());

    // New instruments continue after the restored ids
    assert_eq!(deck.add_instrument(SampleRef::new("z.wav"), ""), Some(5));
}

#[test]
fn test_failed_load_leaves_deck_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.stepdaw");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"definitely not a zip")
        .unwrap();

    let mut deck = edited_deck();
    let before = Project::capture(&deck);

    let err = deck.load_from(&path).unwrap_err();
    assert!(matches!(err, DeckError::Project(ProjectError::Zip(_))));
    assert_eq!(Project::capture(&deck), before);
}

#[test]
fn test_legacy_project_loads_muted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.stepdaw");
    let manager = ProjectManager::new(120.0);

    let project = Project {
        metadata: ProjectMetadata {
            version: ProjectVersion::new(1, 0, 0),
            ..ProjectMetadata::new("Legacy")
        },
        instruments: vec![InstrumentSerializable {
            id: 1,
            sample: "samples/kick.wav".into(),
            muted: None,
            steps: "x.......".repeat(4),
        }],
        ..Project::default()
    };
    manager.save_project(&project, &path).unwrap();

    let mut deck = Deck::default();
    deck.load_from(&path).unwrap();
    assert!(deck.rack().to_vec()[0].muted);
    assert_eq!(deck.metadata().version, ProjectVersion::current());

    // Loading without backups leaves no extra file around
    let again = manager
        .load_project(
            &path,
            &ProjectLoadOptions {
                backup_before_migration: false,
                ..ProjectLoadOptions::default()
            },
        )
        .unwrap();
    assert_eq!(again.instruments[0].muted, Some(true));
}

#[test]
fn test_save_and_quit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("quit.stepdaw");

    let mut deck = edited_deck().with_project_path(&path);
    assert_eq!(deck.apply(Action::SaveAndQuit).unwrap(), stepdaw::Flow::Quit);
    assert!(path.exists());
}

#[test]
fn test_out_of_range_id_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("huge_id.stepdaw");
    let manager = ProjectManager::new(120.0);

    let mut project = manager.create_new_project("Huge".to_string());
    project.instruments.push(InstrumentSerializable {
        id: u32::MAX,
        sample: "samples/kick.wav".into(),
        muted: Some(false),
        steps: "x".repeat(DIVISIONS),
    });
    manager.save_project(&project, &path).unwrap();

    let mut deck = edited_deck();
    let before = Project::capture(&deck);
    let err = deck.load_from(&path).unwrap_err();
    assert!(matches!(err, DeckError::Project(ProjectError::ValidationFailed(_))));
    assert_eq!(Project::capture(&deck), before);
}

#[test]
fn test_out_of_range_default_tempo_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fast.stepdaw");

    let config = Config {
        default_bpm: 500.0,
        ..Config::default()
    };
    let mut deck = Deck::new(&config);
    assert_eq!(deck.bpm(), 120.0);

    deck.save_to(&path).unwrap();
    deck.load_from(&path).unwrap();
    assert_eq!(deck.bpm(), 120.0);
}

#[test]
fn test_save_keeps_running() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keep.stepdaw");

    let mut deck = edited_deck().with_project_path(&path);
    assert_eq!(deck.apply(Action::Save).unwrap(), stepdaw::Flow::Continue);
    assert!(path.exists());
}
