/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::{Piece, PieceKind, Square};

/// Classification of a committed move, for callers that react differently to captures, castles, etc.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MoveKind {
    Quiet,
    Capture,
    ShortCastle,
    LongCastle,
    EnPassantCapture,
    Promotion,
    CaptureAndPromotion,
}

impl MoveKind {
    /// Returns `true` if a piece was removed from the board by this move.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        matches!(
            self,
            Self::Capture | Self::EnPassantCapture | Self::CaptureAndPromotion
        )
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        matches!(self, Self::ShortCastle | Self::LongCastle)
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        matches!(self, Self::Promotion | Self::CaptureAndPromotion)
    }
}

/// A single entry of a game's move history.
///
/// Records are immutable once appended to the history. Serialized, they use the snapshot's field names:
/// `from`, `to`, `piece`, `capturedPiece`, `isEnPassant`, `isCastling` and `promotedTo`. Only `from` and `to`
/// are required; the rest are omitted when absent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    from: Square,
    to: Square,

    /// Kind of the piece that moved, before any promotion. Unknown for records imported without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    piece: Option<PieceKind>,

    /// The piece removed from the board by this move, as it stood before being captured.
    #[serde(rename = "capturedPiece", default, skip_serializing_if = "Option::is_none")]
    captured: Option<Piece>,

    #[serde(rename = "isEnPassant", default, skip_serializing_if = "is_false")]
    en_passant: bool,

    #[serde(rename = "isCastling", default, skip_serializing_if = "is_false")]
    castling: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    promoted_to: Option<PieceKind>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl MoveRecord {
    /// Creates a record for a plain move of a `piece` from `from` to `to`.
    #[inline(always)]
    pub const fn new(from: Square, to: Square, piece: PieceKind) -> Self {
        Self {
            from,
            to,
            piece: Some(piece),
            captured: None,
            en_passant: false,
            castling: false,
            promoted_to: None,
        }
    }

    #[inline(always)]
    pub const fn with_capture(mut self, captured: Option<Piece>) -> Self {
        self.captured = captured;
        self
    }

    #[inline(always)]
    pub const fn with_en_passant(mut self, en_passant: bool) -> Self {
        self.en_passant = en_passant;
        self
    }

    #[inline(always)]
    pub const fn with_castling(mut self, castling: bool) -> Self {
        self.castling = castling;
        self
    }

    #[inline(always)]
    pub const fn with_promotion(mut self, promoted_to: Option<PieceKind>) -> Self {
        self.promoted_to = promoted_to;
        self
    }

    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Kind of the piece that made this move, if known.
    #[inline(always)]
    pub const fn piece(&self) -> Option<PieceKind> {
        self.piece
    }

    #[inline(always)]
    pub const fn captured(&self) -> Option<Piece> {
        self.captured
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        self.en_passant
    }

    #[inline(always)]
    pub const fn is_castling(&self) -> bool {
        self.castling
    }

    #[inline(always)]
    pub const fn promoted_to(&self) -> Option<PieceKind> {
        self.promoted_to
    }

    /// Classifies this move.
    pub const fn kind(&self) -> MoveKind {
        if self.castling {
            if self.to.col() > self.from.col() {
                MoveKind::ShortCastle
            } else {
                MoveKind::LongCastle
            }
        } else if self.en_passant {
            MoveKind::EnPassantCapture
        } else if self.promoted_to.is_some() {
            if self.captured.is_some() {
                MoveKind::CaptureAndPromotion
            } else {
                MoveKind::Promotion
            }
        } else if self.captured.is_some() {
            MoveKind::Capture
        } else {
            MoveKind::Quiet
        }
    }

    /// Whether this move reset the fifty-move counter (a Pawn moved or a piece was captured).
    ///
    /// A record that does not know its piece counts as a Pawn move if it promoted or captured en passant.
    #[inline(always)]
    pub const fn is_irreversible(&self) -> bool {
        matches!(self.piece, Some(PieceKind::Pawn))
            || self.captured.is_some()
            || self.en_passant
            || self.promoted_to.is_some()
    }

    /// Converts this move to UCI notation, such as `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> String {
        match self.promoted_to {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// Splits a UCI move string, such as `e2e4`, into its origin and destination.
///
/// A trailing promotion letter is accepted but must be `q`, since Pawns always promote to a Queen.
///
/// # Example
/// ```
/// # use gambit::{parse_uci_move, Square};
/// let (from, to) = parse_uci_move("g1f3").unwrap();
/// assert_eq!(from, Square::from_uci("g1").unwrap());
/// assert_eq!(to, Square::from_uci("f3").unwrap());
/// assert!(parse_uci_move("e7e8n").is_err());
/// ```
pub fn parse_uci_move(uci: &str) -> Result<(Square, Square)> {
    let uci = uci.trim();
    if !(4..=5).contains(&uci.len()) || !uci.is_ascii() {
        bail!("Invalid UCI move {uci:?}: must be 4 or 5 ascii characters");
    }

    let from = Square::from_uci(&uci[0..2])?;
    let to = Square::from_uci(&uci[2..4])?;

    if let Some(promotion) = uci.chars().nth(4) {
        if PieceKind::from_uci(promotion)? != PieceKind::Queen {
            bail!("Invalid UCI move {uci:?}: pawns may only promote to a queen");
        }
    }

    Ok((from, to))
}
