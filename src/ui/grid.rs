// Pattern grid - one block per instrument, one line per measure

use crate::messaging::snapshot::{DeckSnapshot, InstrumentView};
use crate::sequencer::pattern::DIVISIONS;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const CELL_ON: &str = "■";
const CELL_OFF: &str = "·";

/// Cells per visual group inside a measure (one beat)
const GROUP: usize = DIVISIONS / 4;

/// Render every instrument of the snapshot
pub fn render_grid(frame: &mut Frame, area: Rect, snapshot: &DeckSnapshot) {
    frame.render_widget(Paragraph::new(grid_lines(snapshot)), area);
}

/// Build the grid as styled lines
pub fn grid_lines(snapshot: &DeckSnapshot) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (row, view) in snapshot.instruments.iter().enumerate() {
        let selected = row == snapshot.selected_instrument;
        lines.push(header_line(view, selected));

        let cursor = selected.then_some(snapshot.selected_note);
        for measure in 0..view.len().div_ceil(DIVISIONS) {
            lines.push(measure_line(view, measure, cursor));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            " No instruments",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

fn header_line(view: &InstrumentView, selected: bool) -> Line<'static> {
    let mut style = Style::default().fg(if view.muted {
        Color::DarkGray
    } else {
        Color::White
    });
    if selected {
        style = style.add_modifier(Modifier::BOLD);
    }

    let marker = if selected { "> " } else { "  " };
    let mut spans = vec![Span::styled(format!("{}{}", marker, view.name), style)];
    if view.muted {
        spans.push(Span::styled(" [muted]", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn measure_line(view: &InstrumentView, measure: usize, cursor: Option<usize>) -> Line<'static> {
    let start = measure * DIVISIONS;
    let end = (start + DIVISIONS).min(view.len());
    let mut spans = vec![Span::raw("    ")];

    for index in start..end {
        if index > start && (index - start) % GROUP == 0 {
            spans.push(Span::raw(" "));
        }

        let on = view.cells[index];
        let mut style = Style::default().fg(match (on, view.muted) {
            (true, false) => Color::Cyan,
            (true, true) => Color::Gray,
            (false, _) => Color::DarkGray,
        });
        if index == view.position {
            style = style.bg(Color::Yellow).fg(Color::Black);
        }
        if cursor == Some(index) {
            style = style.add_modifier(Modifier::REVERSED);
        }

        spans.push(Span::styled(if on { CELL_ON } else { CELL_OFF }, style));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(name: &str, cells: Vec<bool>, muted: bool) -> InstrumentView {
        InstrumentView {
            id: 1,
            name: name.to_string(),
            muted,
            cells,
            position: 0,
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_one_line_per_measure() {
        let mut long = vec![false; 3 * DIVISIONS];
        long[0] = true;
        let snapshot = DeckSnapshot::new(
            0,
            120.0,
            false,
            0,
            0,
            vec![view("1. kick.wav", long, false), view("2. hat.wav", vec![false; DIVISIONS], true)],
        );

        let lines = grid_lines(&snapshot);
        // header + 3 measures, header + 1 measure
        assert_eq!(lines.len(), 6);
        assert_eq!(text(&lines[0]), "> 1. kick.wav");
        assert_eq!(text(&lines[4]), "  2. hat.wav [muted]");
        assert!(text(&lines[1]).trim_start().starts_with(CELL_ON));
    }

    #[test]
    fn test_measure_layout() {
        let snapshot = DeckSnapshot::new(
            0,
            120.0,
            false,
            0,
            0,
            vec![view("1. kick.wav", vec![false; DIVISIONS], false)],
        );
        let line = text(&grid_lines(&snapshot)[1]);

        // Four beat groups separated by single spaces
        assert_eq!(line.trim().split(' ').count(), 4);
        assert_eq!(line.matches(CELL_OFF).count(), DIVISIONS);
    }

    #[test]
    fn test_cursor_only_on_selected_row() {
        let snapshot = DeckSnapshot::new(
            0,
            120.0,
            false,
            1,
            3,
            vec![
                view("1. kick.wav", vec![false; DIVISIONS], false),
                view("2. snare.wav", vec![false; DIVISIONS], false),
            ],
        );
        let lines = grid_lines(&snapshot);

        let reversed = |line: &Line| {
            line.spans
                .iter()
                .filter(|span| span.style.add_modifier.contains(Modifier::REVERSED))
                .count()
        };
        assert_eq!(reversed(&lines[1]), 0);
        assert_eq!(reversed(&lines[3]), 1);
    }

    #[test]
    fn test_empty_deck() {
        let lines = grid_lines(&DeckSnapshot::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(text(&lines[0]), " No instruments");
    }
}
