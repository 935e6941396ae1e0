/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Number of rows (and columns) on a chessboard.
pub const BOARD_SIZE: u8 = 8;

/// FEN string for the starting position of chess.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A position with both sides free to castle on either wing.
pub const FEN_CASTLING: &str = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";

/// An empty board. Not playable on its own, since it has no kings.
pub const FEN_EMPTY: &str = "8/8/8/8/8/8/8/8 w - - 0 1";
