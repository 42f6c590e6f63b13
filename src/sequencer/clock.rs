// Clock - Wall-clock step scheduler
// Advances the transport once per grid step and triggers the instruments

use crate::command::selection::Selection;
use crate::messaging::snapshot::{DeckSnapshot, InstrumentView, RenderSink};
use crate::playback::player::SamplePlayer;
use crate::sequencer::instrument::{InstrumentRack, lock_instrument};
use crate::sequencer::pattern::DIVISIONS;
use crate::sequencer::tempo::{DEFAULT_BPM, step_interval_seconds};
use crate::sequencer::transport::SharedTransportState;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Monotonic time source with an absolute sleep
///
/// Times are offsets from an arbitrary origin fixed per clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;

    /// Block until `deadline`; returns at once if it has passed
    fn sleep_until(&self, deadline: Duration);
}

/// Real clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}

/// Duration of one grid step at `bpm`
pub fn step_interval(bpm: f64) -> Duration {
    let bpm = if bpm.is_finite() && bpm > 0.0 {
        bpm
    } else {
        DEFAULT_BPM
    };
    Duration::try_from_secs_f64(step_interval_seconds(bpm, DIVISIONS))
        .unwrap_or_else(|_| Duration::from_secs_f64(step_interval_seconds(DEFAULT_BPM, DIVISIONS)))
}

/// Everything a clock loop touches, shared with the control thread
#[derive(Clone)]
pub struct ClockContext {
    pub transport: Arc<SharedTransportState>,
    pub rack: InstrumentRack,
    pub selection: Arc<Selection>,
    pub clock: Arc<dyn Clock>,
    pub player: Arc<dyn SamplePlayer>,
    pub render: Arc<dyn RenderSink>,
}

/// Result of one clock step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub tick: u64,
    pub triggered: usize,
}

/// The step loop of one play session
///
/// Deadlines are accumulated from the loop start (`deadline += interval`), so
/// sleep overshoot and per-step work do not add up over time. When a step
/// overruns a whole interval the schedule is re-anchored to the present: the
/// phase lags instead of firing the missed steps in a burst.
pub struct ClockLoop {
    context: ClockContext,
    generation: u64,
}

impl ClockLoop {
    /// Create a loop for the play session `generation`
    pub fn new(context: ClockContext, generation: u64) -> Self {
        Self {
            context,
            generation,
        }
    }

    /// Run the loop on a dedicated thread
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("clock".to_string())
            .spawn(move || self.run())
    }

    /// Advance one tick: position every pattern, trigger, then present
    ///
    /// Each instrument is locked once; samples are played after its lock is
    /// released.
    pub fn step(&self) -> StepReport {
        let ctx = &self.context;
        let tick = ctx.transport.advance();

        let handles = ctx.rack.handles();
        let mut triggered = Vec::new();
        let mut views = Vec::with_capacity(handles.len());

        for handle in &handles {
            let mut instrument = lock_instrument(handle);
            instrument.pattern.set_position(tick);
            if instrument.is_triggered_this_tick() {
                triggered.push(instrument.sample().clone());
            }
            views.push(InstrumentView::from_instrument(&instrument));
        }

        for sample in &triggered {
            ctx.player.play_sample(sample);
        }

        ctx.render.present(DeckSnapshot::new(
            tick,
            ctx.transport.bpm(),
            ctx.transport.state().is_playing(),
            ctx.selection.instrument(),
            ctx.selection.note(),
            views,
        ));

        StepReport {
            tick,
            triggered: triggered.len(),
        }
    }

    /// Step until the session's generation is retired
    pub fn run(self) {
        let ctx = &self.context;
        let mut next_deadline = ctx.clock.now();
        log::info!(
            "Clock started (generation {}, {} BPM)",
            self.generation,
            ctx.transport.bpm()
        );

        while ctx.transport.is_current(self.generation) {
            self.step();

            // Tempo is re-read every step so changes apply on the next one
            next_deadline = next_deadline.saturating_add(step_interval(ctx.transport.bpm()));

            let now = ctx.clock.now();
            if now >= next_deadline {
                log::debug!("Clock step overran by {:?}", now - next_deadline);
                next_deadline = now;
            }

            ctx.clock.sleep_until(next_deadline);
        }

        log::info!(
            "Clock stopped (generation {}, tick {})",
            self.generation,
            ctx.transport.tick()
        );
    }
}
