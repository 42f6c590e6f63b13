// Transport - Playback control and the global tick counter
// Shared between the control thread and the clock loop via atomics

use crate::sequencer::instrument::{InstrumentRack, lock_instrument};
use crate::sequencer::tempo::DEFAULT_BPM;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Transport state (play/stop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

impl TransportState {
    /// Check if transport is playing
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }

    /// Check if transport is stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, TransportState::Stopped)
    }
}

/// Shared transport state
/// Thread-safe via atomics for communication with the clock thread
///
/// `generation` identifies a play session: it is bumped on every stop, and a
/// clock loop keeps running only while the generation it was started under is
/// still current. A stop immediately followed by a play therefore never leaves
/// two loops driving the tick.
#[derive(Debug)]
pub struct SharedTransportState {
    playing: AtomicBool,
    tick: AtomicU64,
    bpm_bits: AtomicU64,
    generation: AtomicU64,
}

impl SharedTransportState {
    /// Create new shared transport state
    pub fn new(bpm: f64) -> Arc<Self> {
        Arc::new(Self {
            playing: AtomicBool::new(false),
            tick: AtomicU64::new(0),
            bpm_bits: AtomicU64::new(bpm.to_bits()),
            generation: AtomicU64::new(0),
        })
    }

    /// Get current transport state
    pub fn state(&self) -> TransportState {
        if self.playing.load(Ordering::SeqCst) {
            TransportState::Playing
        } else {
            TransportState::Stopped
        }
    }

    /// Get current tick
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }

    /// Set current tick
    pub fn set_tick(&self, tick: u64) {
        self.tick.store(tick, Ordering::Relaxed);
    }

    /// Advance the tick by one step, returning the new tick
    pub fn advance(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Live tempo
    pub fn bpm(&self) -> f64 {
        f64::from_bits(self.bpm_bits.load(Ordering::Relaxed))
    }

    /// Publish a new tempo; picked up by the clock on its next step
    pub fn set_bpm(&self, bpm: f64) {
        self.bpm_bits.store(bpm.to_bits(), Ordering::Relaxed);
    }

    /// Mark playback as started
    ///
    /// Returns the generation the clock loop must run under, or `None` if the
    /// transport was already playing.
    pub fn start(&self) -> Option<u64> {
        self.playing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(self.generation.load(Ordering::SeqCst))
    }

    /// Mark playback as stopped; returns whether it was playing
    pub fn stop(&self) -> bool {
        let was_playing = self.playing.swap(false, Ordering::SeqCst);
        if was_playing {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        was_playing
    }

    /// Whether a loop started under `generation` should keep running
    pub fn is_current(&self, generation: u64) -> bool {
        self.playing.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }
}

impl Default for SharedTransportState {
    fn default() -> Self {
        Self {
            playing: AtomicBool::new(false),
            tick: AtomicU64::new(0),
            bpm_bits: AtomicU64::new(DEFAULT_BPM.to_bits()),
            generation: AtomicU64::new(0),
        }
    }
}

/// Transport controller
/// Control-thread handle over the shared state
#[derive(Debug, Clone)]
pub struct Transport {
    shared_state: Arc<SharedTransportState>,
}

impl Transport {
    /// Create new transport
    pub fn new(bpm: f64) -> Self {
        Self {
            shared_state: SharedTransportState::new(bpm),
        }
    }

    /// Get shared state (for passing to the clock thread)
    pub fn shared_state(&self) -> Arc<SharedTransportState> {
        Arc::clone(&self.shared_state)
    }

    /// Get current state
    pub fn state(&self) -> TransportState {
        self.shared_state.state()
    }

    /// Get current tick
    pub fn tick(&self) -> u64 {
        self.shared_state.tick()
    }

    /// Get live tempo
    pub fn bpm(&self) -> f64 {
        self.shared_state.bpm()
    }

    /// Set live tempo
    pub fn set_bpm(&self, bpm: f64) {
        self.shared_state.set_bpm(bpm);
    }

    /// Play; see [`SharedTransportState::start`]
    pub fn play(&self) -> Option<u64> {
        self.shared_state.start()
    }

    /// Stop (keeps the tick)
    pub fn stop(&self) -> bool {
        self.shared_state.stop()
    }

    /// Move the tick and broadcast it to every pattern
    pub fn seek(&self, tick: u64, rack: &InstrumentRack) {
        self.shared_state.set_tick(tick);
        for handle in rack.handles() {
            lock_instrument(&handle).pattern.set_position(tick);
        }
    }

    /// Return every playhead to the start
    pub fn reset_playhead(&self, rack: &InstrumentRack) {
        self.seek(0, rack);
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::instrument::{Instrument, SampleRef};

    #[test]
    fn test_transport_state() {
        let state = TransportState::Playing;
        assert!(state.is_playing());
        assert!(!state.is_stopped());

        let state2 = TransportState::Stopped;
        assert!(!state2.is_playing());
        assert!(state2.is_stopped());
        assert_eq!(TransportState::default(), TransportState::Stopped);
    }

    #[test]
    fn test_shared_transport_state() {
        let state = SharedTransportState::new(120.0);

        assert_eq!(state.state(), TransportState::Stopped);
        assert_eq!(state.tick(), 0);
        assert_eq!(state.bpm(), 120.0);

        state.set_bpm(133.0);
        assert_eq!(state.bpm(), 133.0);
    }

    #[test]
    fn test_tick_advance() {
        let state = SharedTransportState::new(120.0);

        assert_eq!(state.advance(), 1);
        assert_eq!(state.advance(), 2);
        assert_eq!(state.tick(), 2);

        state.set_tick(u64::MAX);
        assert_eq!(state.advance(), 0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let state = SharedTransportState::new(120.0);

        let generation = state.start().unwrap();
        assert!(state.start().is_none());
        assert!(state.is_current(generation));
        assert_eq!(state.state(), TransportState::Playing);
    }

    #[test]
    fn test_stop_retires_generation() {
        let state = SharedTransportState::new(120.0);

        let first = state.start().unwrap();
        assert!(state.stop());
        assert!(!state.stop());
        assert!(!state.is_current(first));

        // A restart gets a fresh generation; the old loop stays retired
        let second = state.start().unwrap();
        assert_ne!(first, second);
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
    }

    #[test]
    fn test_reset_playhead() {
        let transport = Transport::default();
        let rack = InstrumentRack::new();
        rack.push(Instrument::new(1, SampleRef::new("kick.wav")));

        transport.seek(37, &rack);
        assert_eq!(transport.tick(), 37);
        assert_eq!(rack.to_vec()[0].pattern.position(), 5);

        transport.reset_playhead(&rack);
        assert_eq!(transport.tick(), 0);
        assert_eq!(rack.to_vec()[0].pattern.position(), 0);
    }

    #[test]
    fn test_transport_control() {
        let transport = Transport::new(100.0);
        assert_eq!(transport.bpm(), 100.0);
        assert_eq!(transport.state(), TransportState::Stopped);

        assert!(transport.play().is_some());
        assert_eq!(transport.state(), TransportState::Playing);

        assert!(transport.stop());
        assert_eq!(transport.state(), TransportState::Stopped);
    }
}
