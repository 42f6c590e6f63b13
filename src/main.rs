use color_eyre::eyre::Result as EyreResult;
use std::path::PathBuf;
use std::sync::Arc;
use stepdaw::command::Deck;
use stepdaw::config::Config;
use stepdaw::messaging::{ChannelRenderSink, create_notification_channel, create_snapshot_channel};
use stepdaw::playback::ExternalPlayer;
use stepdaw::ui::TerminalApp;

// Ringbuffer capacity constants
// The clock pushes one snapshot per step (up to ~224/s at 420 BPM) and the UI
// drains every frame, so a few frames of slack is plenty
const SNAPSHOT_RINGBUFFER_CAPACITY: usize = 64;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 64;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::load()?;
    let project_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.resolved_project_path());

    let (snapshot_tx, snapshot_rx) = create_snapshot_channel(SNAPSHOT_RINGBUFFER_CAPACITY);
    let (notification_tx, notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);

    let mut deck = Deck::new(&config)
        .with_player(Arc::new(ExternalPlayer::from_config(&config.player)))
        .with_render_sink(Arc::new(ChannelRenderSink::new(snapshot_tx)))
        .with_notifications(notification_tx);
    if let Some(path) = project_path {
        log::info!("Project file: {}", path.display());
        deck = deck.with_project_path(path);
    }
    deck.add_instruments(&config.samples);

    let mut terminal = ratatui::init();
    let result = TerminalApp::new(deck, snapshot_rx, notification_rx).run(&mut terminal);
    ratatui::restore();

    result
}
