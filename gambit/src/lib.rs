/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#![doc = include_str!("../README.md")]

pub use gambit_types::*;

/// An 8x8 mailbox of pieces, with move application and check detection.
mod board;
/// Error types for illegal moves, corrupt boards and bad snapshots.
mod error;
/// Turn order, legality, game status, history and undo.
mod game;
/// Pseudo-legal move generation for every kind of piece.
mod movegen;
/// Records of played moves and UCI move parsing.
mod moves;
/// Utility function for performance testing.
mod perft;
/// A chess piece on a square.
mod piece;
/// Saving and loading games as portable snapshots.
mod snapshot;

pub use board::*;
pub use error::*;
pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use snapshot::*;

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::board::*;
    pub use crate::error::*;
    pub use crate::game::*;
    pub use crate::movegen::*;
    pub use crate::moves::*;
    pub use crate::perft::*;
    pub use crate::piece::*;
    pub use crate::snapshot::*;
    pub use gambit_types::*;
}
