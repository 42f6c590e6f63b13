// Instrument - A pattern bound to a playable sample
// Also defines the rack shared between the clock loop and the control thread

use crate::sequencer::pattern::Pattern;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Stable instrument identifier (creation order, 1-based)
pub type InstrumentId = u32;

/// Largest id a deck hands out or a project may contain
pub const MAX_INSTRUMENT_ID: InstrumentId = u16::MAX as InstrumentId;

/// Opaque reference to a playable sound, passed through to the player
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleRef(PathBuf);

impl SampleRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Short display name (file name, or the full path if it has none)
    pub fn display_name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl fmt::Display for SampleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A percussion track: one pattern, one sample, one mute flag
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    id: InstrumentId,
    sample: SampleRef,
    pub muted: bool,
    pub pattern: Pattern,
}

impl Instrument {
    /// Create a muted instrument with an empty pattern
    pub fn new(id: InstrumentId, sample: SampleRef) -> Self {
        Self {
            id,
            sample,
            muted: true,
            pattern: Pattern::new(),
        }
    }

    pub fn id(&self) -> InstrumentId {
        self.id
    }

    pub fn sample(&self) -> &SampleRef {
        &self.sample
    }

    /// Display name, e.g. "1. kick.wav"
    pub fn name(&self) -> String {
        format!("{}. {}", self.id, self.sample.display_name())
    }

    /// Install a rhythm from step notation, padded to whole measures
    pub fn set_rhythm(&mut self, steps: &str) {
        self.pattern.set_steps(steps);
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Whether this instrument should sound on the current tick
    pub fn is_triggered_this_tick(&self) -> bool {
        !self.muted && self.pattern.is_active_at_current_position()
    }
}

/// An instrument behind its own lock
pub type SharedInstrument = Arc<Mutex<Instrument>>;

/// Lock an instrument, recovering from a poisoned lock
pub fn lock_instrument(instrument: &SharedInstrument) -> MutexGuard<'_, Instrument> {
    instrument
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Growable list of instruments shared by the clock loop and the control thread
///
/// The list itself is behind a read-write lock (written only when instruments
/// are added or the whole set is replaced); each instrument has its own mutex
/// so a pattern edit and the clock's read of that pattern never interleave.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRack {
    instruments: Arc<RwLock<Vec<SharedInstrument>>>,
}

impl InstrumentRack {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<SharedInstrument>> {
        self.instruments
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<SharedInstrument>> {
        self.instruments
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an instrument, returning its index
    pub fn push(&self, instrument: Instrument) -> usize {
        let mut instruments = self.write();
        instruments.push(Arc::new(Mutex::new(instrument)));
        instruments.len() - 1
    }

    /// Replace the whole set
    pub fn replace(&self, instruments: Vec<Instrument>) {
        *self.write() = instruments
            .into_iter()
            .map(|instrument| Arc::new(Mutex::new(instrument)))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Handle to the instrument at `index`
    pub fn get(&self, index: usize) -> Option<SharedInstrument> {
        self.read().get(index).cloned()
    }

    /// Handles to every instrument, in order
    ///
    /// The list lock is released on return; callers lock each instrument
    /// individually.
    pub fn handles(&self) -> Vec<SharedInstrument> {
        self.read().clone()
    }

    /// Run `f` on the instrument at `index` under its lock
    pub fn with_instrument<R>(&self, index: usize, f: impl FnOnce(&mut Instrument) -> R) -> Option<R> {
        let handle = self.get(index)?;
        let mut instrument = lock_instrument(&handle);
        Some(f(&mut instrument))
    }

    /// Owned copies of every instrument (persistence, tests)
    pub fn to_vec(&self) -> Vec<Instrument> {
        self.handles()
            .iter()
            .map(|handle| lock_instrument(handle).clone())
            .collect()
    }
}
