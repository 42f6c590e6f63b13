// stepdaw - Library exports for the binary, tests and benchmarks

pub mod command;
pub mod config;
pub mod messaging;
pub mod playback;
pub mod project;
pub mod sequencer;
pub mod ui;

// Re-export commonly used types for convenience
pub use command::{Action, Deck, DeckError, Flow};
pub use config::{Config, ConfigError};
pub use messaging::{
    DeckSnapshot, RenderSink, create_notification_channel, create_snapshot_channel,
};
pub use playback::{ExternalPlayer, NullPlayer, SamplePlayer};
pub use project::{Project, ProjectError, ProjectManager};
pub use sequencer::{
    Clock, ClockLoop, Instrument, InstrumentRack, Pattern, SampleRef, SystemClock, TapTempo,
    Transport, TransportState,
};
