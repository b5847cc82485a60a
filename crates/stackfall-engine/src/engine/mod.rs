//! Game rules on top of the core data structures.
//!
//! - [`ActivePiece`] - The falling piece: movement, rotation, lock delay
//! - [`DropQueue`] - Shuffled permutations of the seven kinds
//! - [`GameSession`] - Gravity, spawning, hold, game over and reset
//! - [`GameSnapshot`] - Owned view of a session for renderers
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`], optionally with a [`QueueSeed`]
//! 2. Feed it elapsed time with [`GameSession::on_tick`]
//! 3. Feed it player commands with [`GameSession::on_input`]
//! 4. Locked pieces clear rows, advance the level, and spawn the next piece
//! 5. A piece settling in the hidden rows ends the game until a reset

pub use self::{active_piece::*, command::*, drop_queue::*, game_session::*, snapshot::*};

mod active_piece;
mod command;
mod drop_queue;
mod game_session;
mod snapshot;
