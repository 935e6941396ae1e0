/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use super::{Color, Square};

/// Reasons a move can be rejected by [`Game::make_move_checked`](crate::Game::make_move_checked).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("there is no piece on {0}")]
    NoPiece(Square),

    #[error("the piece on {square} is {color}, but it is not {color}'s turn")]
    WrongTurn { square: Square, color: Color },

    #[error("the piece on {from} cannot reach {to}")]
    Unreachable { from: Square, to: Square },

    /// Only raised under [`CastlingRule::Strict`](crate::CastlingRule::Strict).
    #[error("the {0} king may not castle while in check or across an attacked square")]
    CastlingThroughCheck(Color),

    #[error("the move would leave the {0} king in check")]
    SelfCheck(Color),
}

/// Domain errors surfaced by the board and game.
///
/// Ordinary move and undo failures are not errors; those operations report success as a `bool`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The board has no King of the given color, so check cannot be evaluated.
    ///
    /// Only a corrupted board (e.g. one built by hand or from a bad FEN) can end up here.
    #[error("the board has no {0} king")]
    MissingKing(Color),

    /// A [`SavedGame`](crate::SavedGame) could not be imported. The game it was loaded into is unchanged.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidSnapshot(err.to_string())
    }
}
