// Sample players
// Triggering never blocks the clock and never reports failure back to it

use crate::config::PlayerConfig;
use crate::sequencer::instrument::SampleRef;
use std::process::{Command, Stdio};
use std::thread;

/// Plays a sample asynchronously
///
/// Implementations must return immediately; overlapping calls for the same
/// sample are allowed to overlap audibly.
pub trait SamplePlayer: Send + Sync {
    fn play_sample(&self, sample: &SampleRef);
}

/// Silent player (headless runs, benchmarks)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlayer;

impl SamplePlayer for NullPlayer {
    fn play_sample(&self, _sample: &SampleRef) {}
}

/// Plays each sample by spawning an external program (`aplay -q <file>`)
#[derive(Debug, Clone)]
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
}

impl ExternalPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command line for one sample, with all standard streams detached
    fn command(&self, sample: &SampleRef) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(sample.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for ExternalPlayer {
    fn default() -> Self {
        Self::from_config(&PlayerConfig::default())
    }
}

impl SamplePlayer for ExternalPlayer {
    fn play_sample(&self, sample: &SampleRef) {
        match self.command(sample).spawn() {
            Ok(mut child) => {
                // Reap off-thread so finished players don't linger as zombies
                let reaper = thread::Builder::new()
                    .name("sample-reaper".to_string())
                    .spawn(move || {
                        let _ = child.wait();
                    });
                if let Err(e) = reaper {
                    log::debug!("Failed to spawn reaper thread: {}", e);
                }
            }
            Err(e) => {
                log::debug!("Failed to play {} with {}: {}", sample, self.program, e);
            }
        }
    }
}
