//! Scratch-card game engine for a single player
//!
//! A session draws a hidden prize, debits the entry cost, tracks how much of
//! the card has been scratched off, reveals the prize once enough of it is
//! uncovered, and settles the prize into the player's balance on completion.

pub mod catalog;
pub mod error;
pub mod game;
pub mod ledger;
pub mod resolver;
pub mod session;
pub mod surface;

pub use catalog::PrizeCatalog;
pub use error::{GameError, Result};
pub use game::{ScratchGame, ScratchUpdate};
pub use ledger::{HistoryStats, Ledger, Settlement};
pub use resolver::{resolve, simulate, RandomSource, RngSource, SequenceSource};
pub use session::{GameSession, SessionState, SessionView};
pub use surface::{ScratchOutcome, SurfaceTracker};
