// Snapshot - Immutable view of the deck handed to the renderer
// Built once per clock step (or per UI edit) so rendering never touches live patterns

use crate::messaging::channels::SnapshotProducer;
use crate::sequencer::instrument::{Instrument, InstrumentId};
use std::sync::Mutex;

/// One instrument row as the renderer sees it
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentView {
    pub id: InstrumentId,
    pub name: String,
    pub muted: bool,
    pub cells: Vec<bool>,
    pub position: usize,
}

impl InstrumentView {
    /// Copy the displayable state out of a locked instrument
    pub fn from_instrument(instrument: &Instrument) -> Self {
        Self {
            id: instrument.id(),
            name: instrument.name(),
            muted: instrument.muted,
            cells: instrument.pattern.cells().to_vec(),
            position: instrument.pattern.position(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Whole-deck view: transport, selection and every instrument row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeckSnapshot {
    pub tick: u64,
    pub bpm: f64,
    pub playing: bool,
    pub selected_instrument: usize,
    /// Cursor column, already wrapped into the selected instrument's pattern
    pub selected_note: usize,
    pub instruments: Vec<InstrumentView>,
}

impl DeckSnapshot {
    /// Assemble a snapshot; the raw note cursor is wrapped into the selected row
    pub fn new(
        tick: u64,
        bpm: f64,
        playing: bool,
        selected_instrument: usize,
        selected_note: i64,
        instruments: Vec<InstrumentView>,
    ) -> Self {
        let selected_note = instruments
            .get(selected_instrument)
            .filter(|view| !view.is_empty())
            .map(|view| selected_note.rem_euclid(view.len() as i64) as usize)
            .unwrap_or(0);

        Self {
            tick,
            bpm,
            playing,
            selected_instrument,
            selected_note,
            instruments,
        }
    }

    /// Selected row, if the deck has any instrument
    pub fn selected(&self) -> Option<&InstrumentView> {
        self.instruments.get(self.selected_instrument)
    }
}

/// Receives a fresh snapshot after each clock step
pub trait RenderSink: Send + Sync {
    fn present(&self, snapshot: DeckSnapshot);
}

/// Discards every snapshot (headless use)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn present(&self, _snapshot: DeckSnapshot) {}
}

/// Forwards snapshots to the UI thread over a ring buffer
///
/// When the UI falls behind the buffer fills and new snapshots are dropped;
/// the UI always redraws from the newest one it drains.
pub struct ChannelRenderSink {
    producer: Mutex<SnapshotProducer>,
}

impl ChannelRenderSink {
    pub fn new(producer: SnapshotProducer) -> Self {
        Self {
            producer: Mutex::new(producer),
        }
    }
}

impl RenderSink for ChannelRenderSink {
    fn present(&self, snapshot: DeckSnapshot) {
        let mut producer = self
            .producer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if ringbuf::traits::Producer::try_push(&mut *producer, snapshot).is_err() {
            log::trace!("Snapshot channel full, dropping frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::create_snapshot_channel;
    use crate::sequencer::instrument::SampleRef;
    use ringbuf::traits::Consumer;

    fn view(len: usize) -> InstrumentView {
        InstrumentView {
            id: 1,
            name: "1. kick.wav".to_string(),
            muted: false,
            cells: vec![false; len],
            position: 0,
        }
    }

    #[test]
    fn test_selected_note_is_wrapped() {
        let snapshot = DeckSnapshot::new(0, 120.0, false, 0, -1, vec![view(32)]);
        assert_eq!(snapshot.selected_note, 31);

        let snapshot = DeckSnapshot::new(0, 120.0, false, 0, 70, vec![view(64)]);
        assert_eq!(snapshot.selected_note, 6);
    }

    #[test]
    fn test_empty_deck_snapshot() {
        let snapshot = DeckSnapshot::new(3, 120.0, true, 0, 12, Vec::new());
        assert_eq!(snapshot.selected_note, 0);
        assert!(snapshot.selected().is_none());
    }

    #[test]
    fn test_view_from_instrument() {
        let mut instrument = Instrument::new(3, SampleRef::new("samples/hat.wav"));
        instrument.set_rhythm("x x");
        instrument.pattern.set_position(2);

        let view = InstrumentView::from_instrument(&instrument);
        assert_eq!(view.name, "3. hat.wav");
        assert!(view.muted);
        assert_eq!(view.position, 2);
        assert!(view.cells[2]);
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (producer, mut consumer) = create_snapshot_channel(2);
        let sink = ChannelRenderSink::new(producer);

        for tick in 0..5 {
            sink.present(DeckSnapshot::new(tick, 120.0, true, 0, 0, Vec::new()));
        }

        assert_eq!(consumer.try_pop().map(|s| s.tick), Some(0));
        assert_eq!(consumer.try_pop().map(|s| s.tick), Some(1));
        assert!(consumer.try_pop().is_none());
    }
}
