// Terminal user interface (ratatui + crossterm)

pub mod app;
pub mod grid;
pub mod keymap;
pub mod transport;

pub use app::TerminalApp;
pub use keymap::action_for_key;
