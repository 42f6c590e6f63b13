// Terminal application - Event loop, input dispatch and screen layout

use crate::command::action::Flow;
use crate::command::deck::Deck;
use crate::messaging::channels::{NotificationConsumer, SnapshotConsumer};
use crate::messaging::notification::{Notification, NotificationCategory, NotificationLevel};
use crate::messaging::snapshot::DeckSnapshot;
use crate::ui::grid::render_grid;
use crate::ui::keymap::{HELP, action_for_key};
use crate::ui::transport::render_transport;
use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use ringbuf::traits::Consumer;
use std::time::Duration;

/// Input poll timeout (~60 fps)
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How long a status message stays visible
const STATUS_TTL_MS: u64 = 4000;

/// Terminal front-end owning the deck
pub struct TerminalApp {
    deck: Deck,
    snapshot_rx: SnapshotConsumer,
    notification_rx: NotificationConsumer,
    /// Latest snapshot (from the clock, or taken after an edit)
    current: DeckSnapshot,
    status: Option<Notification>,
    should_quit: bool,
}

impl TerminalApp {
    pub fn new(
        deck: Deck,
        snapshot_rx: SnapshotConsumer,
        notification_rx: NotificationConsumer,
    ) -> Self {
        let current = deck.snapshot();
        Self {
            deck,
            snapshot_rx,
            notification_rx,
            current,
            status: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop until quit
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_snapshots();
            self.poll_notifications();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(FRAME_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep only the newest snapshot from the clock
    fn poll_snapshots(&mut self) {
        while let Some(snapshot) = self.snapshot_rx.try_pop() {
            self.current = snapshot;
        }
    }

    fn poll_notifications(&mut self) {
        while let Some(notification) = self.notification_rx.try_pop() {
            self.status = Some(notification);
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let Some(action) = action_for_key(code) else {
            return;
        };

        match self.deck.apply(action) {
            Ok(Flow::Quit) => self.should_quit = true,
            Ok(Flow::Continue) => {}
            Err(e) => {
                log::warn!("{} failed: {}", action.label(), e);
                self.status = Some(Notification::error(
                    NotificationCategory::Generic,
                    format!("{} failed: {}", action.label(), e),
                ));
            }
        }

        // Drop clock snapshots taken before the edit
        self.poll_snapshots();
        self.current = self.deck.snapshot();
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(4),    // Pattern grid
                Constraint::Length(1), // Status line
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_transport(frame, chunks[0], &self.current, &self.deck.metadata().name);

        let grid_block = Block::default().title(" Patterns ").borders(Borders::ALL);
        let grid_inner = grid_block.inner(chunks[1]);
        frame.render_widget(grid_block, chunks[1]);
        render_grid(frame, grid_inner, &self.current);

        if let Some(status) = self.status.as_ref().filter(|s| s.is_recent(STATUS_TTL_MS)) {
            let color = match status.level {
                NotificationLevel::Info => Color::Green,
                NotificationLevel::Warning => Color::Yellow,
                NotificationLevel::Error => Color::Red,
            };
            frame.render_widget(
                Paragraph::new(format!(" {}", status.message)).style(Style::default().fg(color)),
                chunks[2],
            );
        }

        let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
