/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::{Color, PieceKind, Square};

/// A chess piece standing on a [`Square`].
///
/// Besides its [`Color`] and [`PieceKind`] (both fixed at creation), a piece remembers where it stands
/// and whether it has ever moved. The latter gates castling and is reported in snapshots.
///
/// Pieces hold no reference to the board they stand on; move generation takes the board as a parameter.
/// [`Piece`] is `Copy`, so every copy (and every copied [`Board`](crate::Board)) is fully independent.
///
/// Serialized, a piece is the snapshot's piece descriptor:
/// `{"type": "rook", "color": "white", "hasMoved": false, "position": {"row": 7, "col": 0}}`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    #[serde(rename = "type")]
    kind: PieceKind,
    color: Color,
    has_moved: bool,
    #[serde(rename = "position")]
    square: Square,
}

impl Piece {
    /// Creates a new, unmoved [`Piece`].
    ///
    /// # Example
    /// ```
    /// # use gambit::{Color, Piece, PieceKind, Square};
    /// let knight = Piece::new(Color::White, PieceKind::Knight, Square::new(7, 1));
    /// assert_eq!(knight.char(), 'N');
    /// assert!(!knight.has_moved());
    /// ```
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind, square: Square) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
            square,
        }
    }

    /// Returns a copy of this piece with its has-moved flag set to `has_moved`.
    #[inline(always)]
    pub const fn with_moved(mut self, has_moved: bool) -> Self {
        self.has_moved = has_moved;
        self
    }

    /// Creates a [`Piece`] from a FEN letter: uppercase for White, lowercase for Black.
    pub fn from_uci(piece: char, square: Square) -> Result<Self> {
        if !piece.is_ascii_alphabetic() {
            bail!("Invalid piece char {piece:?}");
        }
        let color = if piece.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self::new(color, PieceKind::from_uci(piece)?, square))
    }

    /// The [`Color`] of this piece.
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// The [`PieceKind`] of this piece.
    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// The [`Square`] this piece currently stands on.
    #[inline(always)]
    pub const fn square(&self) -> Square {
        self.square
    }

    /// Returns `true` once this piece has made a move (or been moved by castling).
    #[inline(always)]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    #[inline(always)]
    pub const fn is_pawn(&self) -> bool {
        matches!(self.kind, PieceKind::Pawn)
    }

    #[inline(always)]
    pub const fn is_rook(&self) -> bool {
        matches!(self.kind, PieceKind::Rook)
    }

    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// Returns `true` if `other` belongs to the opposing side.
    #[inline(always)]
    pub fn is_enemy_of(&self, other: &Self) -> bool {
        self.color != other.color
    }

    /// Returns the piece this one becomes when promoted to `kind`, standing on the same square.
    ///
    /// Promoted pieces always count as moved.
    #[inline(always)]
    pub const fn promoted(self, kind: PieceKind) -> Self {
        Self {
            kind,
            has_moved: true,
            ..self
        }
    }

    #[inline(always)]
    pub(crate) fn set_square(&mut self, square: Square) {
        self.square = square;
    }

    #[inline(always)]
    pub(crate) fn mark_moved(&mut self) {
        self.has_moved = true;
    }

    /// FEN letter of this piece: uppercase for White, lowercase for Black.
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind.char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Unicode chess glyph of this piece, for display.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Color, Piece, PieceKind, Square};
    /// let king = Piece::new(Color::Black, PieceKind::King, Square::new(0, 4));
    /// assert_eq!(king.symbol(), '♚');
    /// ```
    pub const fn symbol(&self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::King) => '♔',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::Black, PieceKind::King) => '♚',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Pawn) => '♟',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}
