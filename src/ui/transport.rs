// Transport bar - play state, tempo and position

use crate::messaging::snapshot::DeckSnapshot;
use crate::sequencer::pattern::DIVISIONS;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Steps per beat in 4/4
const STEPS_PER_BEAT: u64 = (DIVISIONS / 4) as u64;

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, snapshot: &DeckSnapshot, title: &str) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL);

    let (symbol, state) = if snapshot.playing {
        ("▶", "Playing")
    } else {
        ("■", "Stopped")
    };

    let measure = snapshot.tick / DIVISIONS as u64 + 1;
    let beat = (snapshot.tick % DIVISIONS as u64) / STEPS_PER_BEAT + 1;

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", symbol, state),
            Style::default().fg(if snapshot.playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("BPM: {:.0}  ", snapshot.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Measure {} | Beat {}  ", measure, beat),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("tick {}", snapshot.tick),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
