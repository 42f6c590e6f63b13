// Quick demonstration of the project persistence system
// Run with: cargo run --bin demo_project_persistence

use stepdaw::config::Config;
use stepdaw::project::{ProjectLoadOptions, ProjectManager};
use stepdaw::{Deck, Project};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("stepdaw - Project Persistence Demo");
    println!("==================================");

    // Build a deck with the default kit and make a few edits
    let config = Config::default();
    let mut deck = Deck::new(&config);
    deck.add_instruments(&config.samples);

    deck.toggle_mute();
    deck.extend_pattern();
    deck.move_note(70);
    deck.toggle_note();
    deck.transport().seek(21, deck.rack());

    println!("Created deck '{}'", deck.metadata().name);
    for instrument in deck.rack().to_vec() {
        println!(
            "   - {} ({} steps{})",
            instrument.name(),
            instrument.pattern.len(),
            if instrument.muted { ", muted" } else { "" }
        );
    }

    // Save project
    let project_path = std::env::temp_dir().join("demo_project.stepdaw");
    deck.save_to(&project_path)?;

    println!("\nSaved project to: {}", project_path.display());
    let metadata = std::fs::metadata(&project_path)?;
    println!("   - File size: {} bytes", metadata.len());

    // Load into a fresh deck
    let mut restored = Deck::new(&config);
    restored.load_from(&project_path)?;

    println!("\nLoaded project successfully:");
    println!("   - Instruments: {}", restored.rack().len());
    println!("   - Tempo: {} BPM", restored.bpm());
    println!("   - Tick: {}", restored.tick());

    // Verify data integrity
    assert_eq!(Project::capture(&deck).instruments, Project::capture(&restored).instruments);
    assert_eq!(deck.tick(), restored.tick());
    println!("\nData integrity verified - all instruments match!");

    // Inspect the raw project without touching a deck
    let manager = ProjectManager::new(config.default_bpm);
    let project = manager.load_project(&project_path, &ProjectLoadOptions::default())?;
    println!(
        "\nProject v{} created {}",
        project.metadata.version, project.metadata.created
    );

    std::fs::remove_file(&project_path)?;
    Ok(())
}
