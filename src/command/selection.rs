// Selection - The editing cursor (instrument row and note column)
// Read by the clock loop for snapshots, written by the control thread

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// Selected instrument index and raw note cursor
///
/// The note cursor is kept unwrapped; it is reduced modulo the selected
/// pattern's length wherever it is used, so it stays valid when the pattern
/// shrinks or the selection moves to a shorter pattern.
#[derive(Debug, Default)]
pub struct Selection {
    instrument: AtomicUsize,
    note: AtomicI64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instrument(&self) -> usize {
        self.instrument.load(Ordering::Relaxed)
    }

    pub fn note(&self) -> i64 {
        self.note.load(Ordering::Relaxed)
    }

    /// Select the next instrument, wrapping over `count`
    pub fn next_instrument(&self, count: usize) {
        if count == 0 {
            return;
        }
        let next = (self.instrument() + 1) % count;
        self.instrument.store(next, Ordering::Relaxed);
    }

    /// Select the previous instrument, wrapping over `count`
    pub fn prev_instrument(&self, count: usize) {
        if count == 0 {
            return;
        }
        let current = self.instrument() % count;
        let prev = (current + count - 1) % count;
        self.instrument.store(prev, Ordering::Relaxed);
    }

    /// Move the note cursor by `delta` steps
    pub fn move_note(&self, delta: i64) {
        self.note.fetch_add(delta, Ordering::Relaxed);
    }

    /// Back to the first instrument and step
    pub fn reset(&self) {
        self.instrument.store(0, Ordering::Relaxed);
        self.note.store(0, Ordering::Relaxed);
    }
}
