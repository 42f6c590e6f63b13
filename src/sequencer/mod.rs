// Sequencer module
// Patterns, instruments, tempo, transport and the step clock

pub mod clock;
pub mod instrument;
pub mod pattern;
pub mod tempo;
pub mod transport;

pub use clock::{Clock, ClockContext, ClockLoop, StepReport, SystemClock, step_interval};
pub use instrument::{
    Instrument, InstrumentId, InstrumentRack, MAX_INSTRUMENT_ID, SampleRef, SharedInstrument,
};
pub use pattern::{DIVISIONS, Pattern};
pub use tempo::{DEFAULT_BPM, MAX_BPM, MIN_BPM, MIN_TEMPO_TAPS, TapTempo};
pub use transport::{SharedTransportState, Transport, TransportState};
