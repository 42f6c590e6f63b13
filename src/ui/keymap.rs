// Key bindings - Maps terminal keys to deck actions

use crate::command::action::Action;
use crossterm::event::KeyCode;

/// Steps moved by the word-jump keys (`b`/`w`)
const JUMP_STEPS: i64 = 4;

/// One-line help shown at the bottom of the screen
pub const HELP: &str = " [Space] Play  [t/T] Tap/Reset tempo  [r] Rewind  [j/k] Instrument  \
[h/l b/w] Move  [i] Toggle  [m] Mute  [d/e/s/R] Dup/Ext/Short/Reset  [f] Load  [q] Save  [Q] Save+Quit  [Esc] Quit";

/// Action bound to `code`, if any
pub fn action_for_key(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char(' ') => Action::TogglePlay,
        KeyCode::Char('t') => Action::TapTempo,
        KeyCode::Char('T') => Action::ResetTempo,
        KeyCode::Char('r') => Action::ResetPlayhead,
        KeyCode::Char('j') | KeyCode::Down => Action::NextInstrument,
        KeyCode::Char('k') | KeyCode::Up => Action::PrevInstrument,
        KeyCode::Char('h') | KeyCode::Left => Action::MoveNote(-1),
        KeyCode::Char('l') | KeyCode::Right => Action::MoveNote(1),
        KeyCode::Char('b') => Action::MoveNote(-JUMP_STEPS),
        KeyCode::Char('w') => Action::MoveNote(JUMP_STEPS),
        KeyCode::Char('i') | KeyCode::Enter => Action::ToggleNote,
        KeyCode::Char('m') => Action::ToggleMute,
        KeyCode::Char('d') => Action::DuplicatePattern,
        KeyCode::Char('e') => Action::ExtendPattern,
        KeyCode::Char('s') => Action::ShortenPattern,
        KeyCode::Char('R') => Action::ResetPattern,
        KeyCode::Char('f') => Action::Load,
        KeyCode::Char('q') => Action::Save,
        KeyCode::Char('Q') => Action::SaveAndQuit,
        KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}
