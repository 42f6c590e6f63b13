// Command layer - User actions and the deck that executes them
//
// The UI translates input into an `Action`; `Deck::apply` dispatches it on the
// control thread. The clock thread only sees the rack, the transport state and
// the selection, all of which are shared through locks or atomics.

pub mod action;
pub mod deck;
pub mod selection;

pub use action::{Action, Flow};
pub use deck::{Deck, DeckError};
pub use selection::Selection;
