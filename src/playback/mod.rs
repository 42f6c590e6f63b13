// Playback - Fire-and-forget sample triggering

pub mod player;

pub use player::{ExternalPlayer, NullPlayer, SamplePlayer};
