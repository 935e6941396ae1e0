/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{game::ImportedPosition, Board, Color, Game, GameError, GameStatus, MoveRecord, Piece, Square};

/// Pieces captured by each side.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct CapturedPieces {
    /// Pieces White has captured.
    pub white: Vec<Piece>,
    /// Pieces Black has captured.
    pub black: Vec<Piece>,
}

impl From<[Vec<Piece>; Color::COUNT]> for CapturedPieces {
    fn from([white, black]: [Vec<Piece>; Color::COUNT]) -> Self {
        Self { white, black }
    }
}

impl From<CapturedPieces> for [Vec<Piece>; Color::COUNT] {
    fn from(captured: CapturedPieces) -> Self {
        [captured.white, captured.black]
    }
}

/// A portable snapshot of a [`Game`], produced by [`Game::save`] and consumed by [`Game::load`].
///
/// In JSON, this is an object with the fields `board` (8 rows of 8 piece descriptors or `null`),
/// `currentTurn`, `moveHistory`, `capturedPieces` (`{"white": [...], "black": [...]}`), `status` and
/// `timestamp` (RFC 3339). The optional `halfmoveClock` and `fullmoveNumber` carry the FEN move counters;
/// snapshots without them still load, with the counters derived from the history instead.
///
/// The move history is informational only. Loading rebuilds the board from `board` and never replays moves.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub board: [[Option<Piece>; 8]; 8],
    pub current_turn: Color,
    pub move_history: Vec<MoveRecord>,
    pub captured_pieces: CapturedPieces,
    pub status: GameStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halfmove_clock: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullmove_number: Option<usize>,
}

impl SavedGame {
    /// Encodes this snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot from JSON. Only the shape is checked here; [`Game::load`] validates the contents.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks that every descriptor sits on the square it claims and that each side has exactly one King.
    pub fn validate(&self) -> Result<(), GameError> {
        let mut kings = [0usize; Color::COUNT];

        for (row, cells) in self.board.iter().enumerate() {
            for (col, piece) in cells.iter().enumerate() {
                let Some(piece) = piece else {
                    continue;
                };

                let square = Square::new(row as u8, col as u8);
                if piece.square() != square {
                    return Err(GameError::InvalidSnapshot(format!(
                        "{} {} stored on {square} claims to stand on {}",
                        piece.color(),
                        piece.kind(),
                        piece.square()
                    )));
                }

                if piece.is_king() {
                    kings[piece.color()] += 1;
                }
            }
        }

        for color in Color::all() {
            if kings[color] != 1 {
                return Err(GameError::InvalidSnapshot(format!(
                    "expected exactly one {color} king, found {}",
                    kings[color]
                )));
            }
        }

        Ok(())
    }
}

impl Game {
    /// Exports the current state as a [`SavedGame`].
    ///
    /// A game that was itself loaded keeps its original timestamp; any other game is stamped with the current time.
    pub fn save(&self) -> SavedGame {
        SavedGame {
            board: self.board().grid(),
            current_turn: self.side_to_move(),
            move_history: self.history().to_vec(),
            captured_pieces: self.captured_pieces().clone().into(),
            status: self.status(),
            timestamp: self.created_at().unwrap_or_else(Utc::now),
            halfmove_clock: Some(self.halfmove()),
            fullmove_number: Some(self.fullmove()),
        }
    }

    /// Replaces the current state with the one in `saved`.
    ///
    /// The snapshot is validated in full first; if it is malformed, this returns [`GameError::InvalidSnapshot`]
    /// and the game is left exactly as it was. On success, the undo stack is cleared and the options are kept.
    ///
    /// # Example
    /// ```
    /// # use gambit::Game;
    /// let mut game = Game::default();
    /// game.make_uci_move("e2e4").unwrap();
    /// let saved = game.save();
    ///
    /// let mut restored = Game::default();
    /// restored.load(&saved).unwrap();
    /// assert_eq!(restored.board(), game.board());
    /// assert_eq!(restored.side_to_move(), game.side_to_move());
    /// assert!(!restored.can_undo());
    /// ```
    pub fn load(&mut self, saved: &SavedGame) -> Result<(), GameError> {
        saved.validate()?;

        self.reset();
        self.replace_position(ImportedPosition {
            board: Board::from(saved.board),
            side_to_move: saved.current_turn,
            captured: saved.captured_pieces.clone().into(),
            status: saved.status,
            history: saved.move_history.clone(),
            halfmove: saved.halfmove_clock,
            fullmove: saved.fullmove_number,
            created_at: saved.timestamp,
        });

        debug!(
            "Loaded game saved at {} ({} moves, {} to move, status {})",
            saved.timestamp,
            saved.move_history.len(),
            saved.current_turn,
            saved.status
        );
        Ok(())
    }
}

impl TryFrom<&SavedGame> for Game {
    type Error = GameError;

    fn try_from(saved: &SavedGame) -> Result<Self, Self::Error> {
        let mut game = Self::default();
        game.load(saved)?;
        Ok(game)
    }
}
