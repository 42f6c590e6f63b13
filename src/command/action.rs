// Action - Every user intent the deck understands

/// A user action, independent of how it was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePlay,
    TapTempo,
    ResetTempo,
    ResetPlayhead,
    NextInstrument,
    PrevInstrument,
    /// Move the note cursor by a number of steps (negative = left)
    MoveNote(i64),
    ToggleNote,
    DuplicatePattern,
    ExtendPattern,
    ShortenPattern,
    ResetPattern,
    ToggleMute,
    Save,
    Load,
    Quit,
    SaveAndQuit,
}

impl Action {
    /// Short human-readable label (help line, logs)
    pub fn label(&self) -> &'static str {
        match self {
            Action::TogglePlay => "play/stop",
            Action::TapTempo => "tap tempo",
            Action::ResetTempo => "reset tempo",
            Action::ResetPlayhead => "reset playhead",
            Action::NextInstrument => "next instrument",
            Action::PrevInstrument => "previous instrument",
            Action::MoveNote(delta) if *delta < 0 => "move left",
            Action::MoveNote(_) => "move right",
            Action::ToggleNote => "toggle note",
            Action::DuplicatePattern => "duplicate pattern",
            Action::ExtendPattern => "extend pattern",
            Action::ShortenPattern => "shorten pattern",
            Action::ResetPattern => "reset pattern",
            Action::ToggleMute => "mute",
            Action::Save => "save",
            Action::Load => "load",
            Action::Quit => "quit",
            Action::SaveAndQuit => "save and quit",
        }
    }
}

/// What the caller should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}
