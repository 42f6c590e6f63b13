// Deck - Composition root of the sequencer
// Owns the instruments, transport, tempo and selection, and dispatches user actions

use crate::command::action::{Action, Flow};
use crate::command::selection::Selection;
use crate::config::{Config, InstrumentConfig};
use crate::messaging::channels::NotificationProducer;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::messaging::snapshot::{DeckSnapshot, InstrumentView, NullRenderSink, RenderSink};
use crate::playback::player::{NullPlayer, SamplePlayer};
use crate::project::{Project, ProjectError, ProjectLoadOptions, ProjectManager, ProjectMetadata};
use crate::sequencer::clock::{Clock, ClockContext, ClockLoop, SystemClock};
use crate::sequencer::instrument::{
    Instrument, InstrumentId, InstrumentRack, MAX_INSTRUMENT_ID, SampleRef, lock_instrument,
};
use crate::sequencer::tempo::TapTempo;
use crate::sequencer::transport::Transport;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors surfaced by deck actions
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("Failed to start clock thread: {0}")]
    ClockSpawn(#[source] std::io::Error),

    #[error("No project path configured")]
    NoProjectPath,
}

/// The sequencer: instruments, transport, tempo, selection and collaborators
///
/// Runs on the control thread. While playing, a clock thread shares the rack,
/// the transport state and the selection; everything else stays here.
pub struct Deck {
    rack: InstrumentRack,
    transport: Transport,
    tempo: TapTempo,
    selection: Arc<Selection>,
    clock: Arc<dyn Clock>,
    player: Arc<dyn SamplePlayer>,
    render: Arc<dyn RenderSink>,
    notifications: Option<NotificationProducer>,
    metadata: ProjectMetadata,
    project_path: Option<PathBuf>,
    next_instrument_id: InstrumentId,
    default_bpm: f64,
}

impl Deck {
    /// Create an empty, silent deck
    pub fn new(config: &Config) -> Self {
        let tempo = TapTempo::new(config.default_bpm).with_min_taps(config.min_tempo_taps);

        Self {
            rack: InstrumentRack::new(),
            transport: Transport::new(tempo.bpm()),
            default_bpm: tempo.bpm(),
            tempo,
            selection: Arc::new(Selection::new()),
            clock: Arc::new(SystemClock::new()),
            player: Arc::new(NullPlayer),
            render: Arc::new(NullRenderSink),
            notifications: None,
            metadata: ProjectMetadata::default(),
            project_path: None,
            next_instrument_id: 1,
        }
    }

    pub fn with_player(mut self, player: Arc<dyn SamplePlayer>) -> Self {
        self.player = player;
        self
    }

    pub fn with_render_sink(mut self, render: Arc<dyn RenderSink>) -> Self {
        self.render = render;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifications(mut self, notifications: NotificationProducer) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    // ---- Accessors ----

    pub fn rack(&self) -> &InstrumentRack {
        &self.rack
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn tempo(&self) -> &TapTempo {
        &self.tempo
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn bpm(&self) -> f64 {
        self.transport.bpm()
    }

    pub fn tick(&self) -> u64 {
        self.transport.tick()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.state().is_playing()
    }

    // ---- Instruments ----

    /// Add an instrument (muted) with the given rhythm; allowed while playing
    ///
    /// Returns `None` once every id up to [`MAX_INSTRUMENT_ID`] is taken.
    pub fn add_instrument(&mut self, sample: SampleRef, rhythm: &str) -> Option<InstrumentId> {
        let id = self.next_instrument_id;
        if id > MAX_INSTRUMENT_ID {
            log::warn!("Instrument limit reached, {} not added", sample);
            return None;
        }
        self.next_instrument_id = id + 1;

        let mut instrument = Instrument::new(id, sample);
        instrument.set_rhythm(rhythm);
        instrument.pattern.set_position(self.tick());
        log::debug!("Added instrument {}", instrument.name());
        self.rack.push(instrument);
        Some(id)
    }

    /// Add every configured instrument, in order
    pub fn add_instruments(&mut self, samples: &[InstrumentConfig]) {
        for sample in samples {
            self.add_instrument(SampleRef::new(&sample.sample), &sample.rhythm);
        }
    }

    /// Run `f` on the selected instrument
    fn with_selected<R>(&self, f: impl FnOnce(&mut Instrument) -> R) -> Option<R> {
        self.rack.with_instrument(self.selection.instrument(), f)
    }

    /// Run a length-changing edit, then re-derive the playhead from the tick
    fn edit_selected_pattern(&self, f: impl FnOnce(&mut Instrument)) {
        let tick = self.tick();
        self.with_selected(|instrument| {
            f(instrument);
            instrument.pattern.set_position(tick);
        });
    }

    // ---- Transport ----

    /// Start playback; returns false if already playing
    pub fn play(&self) -> Result<bool, DeckError> {
        let Some(generation) = self.transport.play() else {
            return Ok(false);
        };

        if let Err(e) = ClockLoop::new(self.clock_context(), generation).spawn() {
            self.transport.stop();
            return Err(DeckError::ClockSpawn(e));
        }

        log::info!("Playback started at {} BPM", self.bpm());
        Ok(true)
    }

    /// Stop playback without waiting for the clock thread; the tick is kept
    pub fn stop(&self) -> bool {
        let stopped = self.transport.stop();
        if stopped {
            log::info!("Playback stopped at tick {}", self.tick());
        }
        stopped
    }

    pub fn toggle_play(&self) -> Result<(), DeckError> {
        if self.is_playing() {
            self.stop();
        } else {
            self.play()?;
        }
        Ok(())
    }

    pub fn reset_playhead(&self) {
        self.transport.reset_playhead(&self.rack);
    }

    fn clock_context(&self) -> ClockContext {
        ClockContext {
            transport: self.transport.shared_state(),
            rack: self.rack.clone(),
            selection: Arc::clone(&self.selection),
            clock: Arc::clone(&self.clock),
            player: Arc::clone(&self.player),
            render: Arc::clone(&self.render),
        }
    }

    // ---- Tempo ----

    /// Record a tap now; returns the new bpm when the tempo changed
    pub fn tap_tempo(&mut self) -> Option<f64> {
        let now = self.clock.now().as_secs_f64();
        let bpm = self.tempo.tap_at(now)?;

        self.transport.set_bpm(bpm);
        log::info!("Tempo set to {} BPM", bpm);
        self.notify(Notification::info(
            NotificationCategory::Tempo,
            format!("Tempo set to {} BPM", bpm),
        ));
        Some(bpm)
    }

    /// Forget the taps; the tempo is kept
    pub fn reset_tempo(&mut self) {
        self.tempo.reset();
        self.notify(Notification::info(
            NotificationCategory::Tempo,
            "Tempo taps cleared".to_string(),
        ));
    }

    // ---- Selection ----

    pub fn next_instrument(&self) {
        self.selection.next_instrument(self.rack.len());
    }

    pub fn prev_instrument(&self) {
        self.selection.prev_instrument(self.rack.len());
    }

    pub fn move_note(&self, delta: i64) {
        self.selection.move_note(delta);
    }

    // ---- Pattern edits (selected instrument) ----

    pub fn toggle_note(&self) {
        let note = self.selection.note();
        self.with_selected(|instrument| instrument.pattern.toggle(note));
    }

    pub fn duplicate_pattern(&self) {
        self.edit_selected_pattern(|instrument| instrument.pattern.duplicate());
    }

    pub fn extend_pattern(&self) {
        self.edit_selected_pattern(|instrument| instrument.pattern.extend());
    }

    pub fn shorten_pattern(&self) {
        self.edit_selected_pattern(|instrument| instrument.pattern.shorten());
    }

    pub fn reset_pattern(&self) {
        self.edit_selected_pattern(|instrument| instrument.pattern.reset());
    }

    pub fn toggle_mute(&self) {
        self.with_selected(|instrument| instrument.toggle_mute());
    }

    // ---- Persistence ----

    /// Save to the configured project path
    pub fn save(&mut self) -> Result<PathBuf, DeckError> {
        let path = self.project_path.clone().ok_or(DeckError::NoProjectPath)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&mut self, path: &Path) -> Result<(), DeckError> {
        self.metadata.touch();
        let project = Project::capture(self);
        ProjectManager::new(self.default_bpm).save_project(&project, path)?;

        self.notify(Notification::info(
            NotificationCategory::Project,
            format!("Saved {}", path.display()),
        ));
        Ok(())
    }

    /// Load from the configured project path
    pub fn load(&mut self) -> Result<PathBuf, DeckError> {
        let path = self.project_path.clone().ok_or(DeckError::NoProjectPath)?;
        self.load_from(&path)?;
        Ok(path)
    }

    /// Load a project file; on error the deck is left untouched
    pub fn load_from(&mut self, path: &Path) -> Result<(), DeckError> {
        let project = ProjectManager::new(self.default_bpm)
            .load_project(path, &ProjectLoadOptions::default())?;
        self.restore(project);

        self.notify(Notification::info(
            NotificationCategory::Project,
            format!("Loaded {}", path.display()),
        ));
        Ok(())
    }

    /// Replace the live state with a saved project (playback stops)
    pub fn restore(&mut self, project: Project) {
        self.stop();

        let instruments = project.build_instruments();
        let highest_id = instruments.iter().map(Instrument::id).max().unwrap_or(0);
        self.next_instrument_id = highest_id.saturating_add(1);

        self.tempo.reset();
        self.tempo.set_bpm(project.tempo.bpm);
        self.transport.set_bpm(self.tempo.bpm());

        self.rack.replace(instruments);
        self.transport.seek(project.transport.tick, &self.rack);
        self.selection.reset();
        self.metadata = project.metadata;
    }

    // ---- Rendering ----

    /// Immutable view of the current state
    pub fn snapshot(&self) -> DeckSnapshot {
        let views = self
            .rack
            .handles()
            .iter()
            .map(|handle| InstrumentView::from_instrument(&lock_instrument(handle)))
            .collect();

        DeckSnapshot::new(
            self.tick(),
            self.bpm(),
            self.is_playing(),
            self.selection.instrument(),
            self.selection.note(),
            views,
        )
    }

    // ---- Dispatch ----

    /// Apply one user action
    pub fn apply(&mut self, action: Action) -> Result<Flow, DeckError> {
        log::trace!("Action: {}", action.label());

        match action {
            Action::TogglePlay => self.toggle_play()?,
            Action::TapTempo => {
                self.tap_tempo();
            }
            Action::ResetTempo => self.reset_tempo(),
            Action::ResetPlayhead => self.reset_playhead(),
            Action::NextInstrument => self.next_instrument(),
            Action::PrevInstrument => self.prev_instrument(),
            Action::MoveNote(delta) => self.move_note(delta),
            Action::ToggleNote => self.toggle_note(),
            Action::DuplicatePattern => self.duplicate_pattern(),
            Action::ExtendPattern => self.extend_pattern(),
            Action::ShortenPattern => self.shorten_pattern(),
            Action::ResetPattern => self.reset_pattern(),
            Action::ToggleMute => self.toggle_mute(),
            Action::Save => {
                self.save()?;
            }
            Action::Load => {
                self.load()?;
            }
            Action::Quit => {
                self.stop();
                return Ok(Flow::Quit);
            }
            Action::SaveAndQuit => {
                self.save()?;
                self.stop();
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    fn notify(&mut self, notification: Notification) {
        if let Some(producer) = &mut self.notifications {
            if ringbuf::traits::Producer::try_push(producer, notification).is_err() {
                log::trace!("Notification channel full");
            }
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Drop for Deck {
    fn drop(&mut self) {
        // Retire the clock loop; it exits after at most one more step
        self.transport.stop();
    }
}
