/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::Index,
};

use anyhow::{bail, Result};
use log::warn;

use super::{Color, GameError, MoveRecord, Piece, PieceKind, Square, BOARD_SIZE, KING_HOME_COL};

/// Piece kinds of a back rank, from the A-file to the H-file.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Represents all pieces and their locations on a chess board.
///
/// An 8x8 mailbox of optional occupants. Each square owns at most one [`Piece`], and every piece's
/// [`Piece::square`] matches the square holding it.
///
/// Has no knowledge of whose turn it is, move history, or game status. If you need those, see [`Game`](crate::Game).
///
/// Copying a [`Board`] is a deep copy: pieces are plain values and nothing is shared between copies.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    mailbox: [Option<Piece>; Square::COUNT],
}

impl Board {
    /// Creates a new, empty [`Board`] containing no pieces.
    ///
    /// # Example
    /// ```
    /// # use gambit::Board;
    /// let board = Board::new();
    /// assert_eq!(board.to_fen(), "8/8/8/8/8/8/8/8");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mailbox: [None; Square::COUNT],
        }
    }

    /// Creates the standard starting position: Black on rows `0` and `1`, White on rows `6` and `7`.
    pub fn starting_position() -> Self {
        let mut board = Self::new();

        for color in Color::all() {
            for (col, kind) in BACK_RANK.into_iter().enumerate() {
                let square = Square::new(color.back_row(), col as u8);
                board.place(Piece::new(color, kind, square), square);

                let square = Square::new(color.pawn_start_row(), col as u8);
                board.place(Piece::new(color, PieceKind::Pawn, square), square);
            }
        }

        board
    }

    /// Constructs a [`Board`] from the placement field of a FEN string, ignoring everything after it.
    ///
    /// Since FEN does not record which pieces have moved, has-moved flags are inferred:
    /// Pawns off their starting row and Kings/Rooks off their home squares count as moved.
    /// [`Game::from_fen`](crate::Game::from_fen) refines this with the castling field.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut board = Self::new();

        // If this FEN string contains more than just the initial placements, extract the placements
        let placements = fen.split_whitespace().next().unwrap_or_default();

        // Check if the placements string is the correct length
        if placements.matches('/').count() != 7 {
            bail!("Missing placements for all 8 ranks in {fen:?}");
        }

        // FEN lists rank 8 first, which is row 0
        for (row, placements) in placements.split('/').enumerate() {
            let mut col = 0u8;

            for piece_char in placements.chars() {
                if col >= BOARD_SIZE {
                    bail!("Rank {placements:?} describes more than 8 files");
                }

                if let Some(empty) = piece_char.to_digit(10) {
                    if !(1..=8).contains(&empty) {
                        bail!("Invalid empty-square count {piece_char:?} when parsing FEN");
                    }
                    col += empty as u8;
                    continue;
                }

                let square = Square::new(row as u8, col);
                let piece = Piece::from_uci(piece_char, square)?;
                board.place(piece.with_moved(!Self::is_home_square(&piece)), square);
                col += 1;
            }

            if col != BOARD_SIZE {
                bail!("Rank {placements:?} must describe exactly 8 files");
            }
        }

        Ok(board)
    }

    /// Whether `piece` stands where an unmoved piece of its kind could stand.
    fn is_home_square(piece: &Piece) -> bool {
        let square = piece.square();
        let back_row = piece.color().back_row();
        match piece.kind() {
            PieceKind::Pawn => square.row() == piece.color().pawn_start_row(),
            PieceKind::King => square == Square::new(back_row, KING_HOME_COL),
            PieceKind::Rook => square.row() == back_row && (square.col() == 0 || square.col() == 7),
            _ => true,
        }
    }

    /// Generates the placement field of a [FEN](https://www.chess.com/terms/fen-chess) string of this [`Board`].
    pub fn to_fen(&self) -> String {
        let mut placements: [String; 8] = Default::default();

        for (row, placement) in placements.iter_mut().enumerate() {
            let mut empty_spaces = 0;
            for col in 0..BOARD_SIZE {
                if let Some(piece) = self.get(Square::new(row as u8, col)) {
                    if empty_spaces != 0 {
                        *placement += &empty_spaces.to_string();
                        empty_spaces = 0;
                    }
                    placement.push(piece.char());
                } else {
                    empty_spaces += 1;
                }
            }

            if empty_spaces != 0 {
                *placement += &empty_spaces.to_string();
            }
        }

        placements.join("/")
    }

    /// Fetches the [`Piece`] at the provided [`Square`], if there is one.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Board, PieceKind, Color, Square};
    /// let board = Board::default();
    /// let a2 = Square::from_uci("a2").unwrap();
    /// assert_eq!(board.get(a2).unwrap().kind(), PieceKind::Pawn);
    /// assert_eq!(board.get(a2).unwrap().color(), Color::White);
    /// assert!(board.get(Square::from_uci("e4").unwrap()).is_none());
    /// ```
    #[inline(always)]
    pub const fn get(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }

    /// Puts `piece` (or nothing) on `square`, replacing whatever was there.
    ///
    /// A placed piece has its [`Piece::square`] updated to `square`.
    #[inline(always)]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.mailbox[square.index()] = piece.map(|mut piece| {
            piece.set_square(square);
            piece
        });
    }

    /// Places the provided [`Piece`] on the supplied [`Square`], replacing any occupant.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Board, Piece, PieceKind, Color, Square};
    /// let c4 = Square::from_uci("c4").unwrap();
    /// let white_knight = Piece::new(Color::White, PieceKind::Knight, c4);
    /// let mut board = Board::new();
    /// board.place(white_knight, c4);
    /// assert_eq!(board.to_fen(), "8/8/8/8/2N5/8/8/8");
    /// ```
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.set(square, Some(piece));
    }

    /// Takes the [`Piece`] from a given [`Square`], if there is one present.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()].take()
    }

    /// Clears the supplied [`Square`] of any pieces.
    #[inline(always)]
    pub fn clear(&mut self, square: Square) {
        self.take(square);
    }

    /// Clears the entire board, removing all pieces.
    #[inline(always)]
    pub fn clear_all(&mut self) {
        *self = Self::new();
    }

    /// Returns `true` if there is a piece at the given [`Square`], else `false`.
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.mailbox[square.index()].is_some()
    }

    /// Returns `true` if nothing stands on `square`.
    #[inline(always)]
    pub const fn is_empty(&self, square: Square) -> bool {
        !self.has(square)
    }

    /// Returns `true` if `square` holds a piece whose color is not `color`.
    #[inline(always)]
    pub fn is_enemy_of(&self, square: Square, color: Color) -> bool {
        self.get(square).is_some_and(|piece| piece.color() != color)
    }

    /// Fetches the [`Color`] of the piece at the provided [`Square`], if there is one.
    #[inline(always)]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.get(square).map(|piece| piece.color())
    }

    /// Fetches the [`PieceKind`] of the piece at the provided [`Square`], if there is one.
    #[inline(always)]
    pub fn kind_at(&self, square: Square) -> Option<PieceKind> {
        self.get(square).map(|piece| piece.kind())
    }

    /// Applies a pseudo-legal move and all of its side effects, returning the piece it captured, if any.
    ///
    /// Returns `None` if there is no piece on `from`. No legality is enforced.
    /// See [`Board::make_move`] for the full record of what happened.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Board, Square};
    /// let mut board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3").unwrap();
    /// let captured = board.move_piece(Square::from_uci("e4").unwrap(), Square::from_uci("d5").unwrap());
    /// assert_eq!(captured.unwrap().char(), 'p');
    /// assert_eq!(board.to_fen(), "4k3/8/8/3P4/8/8/8/4K3");
    /// ```
    #[inline(always)]
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        self.make_move(from, to).and_then(|record| record.captured())
    }

    /// Applies a pseudo-legal move and all of its side effects, describing them in a [`MoveRecord`].
    ///
    /// - A King moving two columns from the E-file also moves the Rook from its corner to the square it crossed.
    /// - A Pawn moving diagonally onto an empty square captures the enemy Pawn beside it (en passant).
    /// - A Pawn reaching its last row becomes a Queen.
    ///
    /// Returns `None` (and changes nothing) if there is no piece on `from`.
    pub fn make_move(&mut self, from: Square, to: Square) -> Option<MoveRecord> {
        // Remove the piece from its previous location, exiting early if there is no piece there
        let mut piece = self.take(from)?;
        let mut captured = self.take(to);
        let mut record = MoveRecord::new(from, to, piece.kind());

        // Castling: bring the Rook over to the other side of the King
        if piece.is_king() && from.col() == KING_HOME_COL && from.col_distance(to) == 2 {
            let (rook_col, rook_dst_col) = if to.col() > from.col() { (7, 5) } else { (0, 3) };

            if let Some(mut rook) = self.take(Square::new(from.row(), rook_col)) {
                rook.mark_moved();
                self.place(rook, Square::new(from.row(), rook_dst_col));
            }
            record = record.with_castling(true);
        }

        // En passant: the captured Pawn is beside us, not on the destination
        if piece.is_pawn() && from.col() != to.col() && captured.is_none() {
            let passed = Square::new(from.row(), to.col());
            if self.get(passed).is_some_and(|p| p.is_pawn() && p.is_enemy_of(&piece)) {
                captured = self.take(passed);
                record = record.with_en_passant(true);
            }
        }

        piece.mark_moved();

        // Promotion is always to a Queen
        if piece.is_pawn() && to.row() == piece.color().promotion_row() {
            piece = piece.promoted(PieceKind::Queen);
            record = record.with_promotion(Some(PieceKind::Queen));
        }

        self.place(piece, to);

        Some(record.with_capture(captured))
    }

    /// Locates the King of the provided color.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|piece| piece.is_king())
            .map(|king| king.square())
    }

    /// Returns `true` if any piece of color `by` counts `square` among its pseudo-legal destinations.
    ///
    /// Pawn pushes are destinations too, so this is only a true "attack" test for occupied squares.
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        self.pieces_of(by)
            .any(|piece| piece.can_move_to(square, self))
    }

    /// Returns `true` if `color`'s King can be captured by one of the opponent's pseudo-legal moves.
    ///
    /// If `color` has no King the board is corrupt; this logs a warning and conservatively answers `false`.
    /// Use [`Board::try_is_in_check`] to handle that case explicitly.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.try_is_in_check(color).unwrap_or_else(|err| {
            warn!("{err}; treating {color} as not in check");
            false
        })
    }

    /// Like [`Board::is_in_check`], but reports a missing King as [`GameError::MissingKing`].
    ///
    /// # Example
    /// ```
    /// # use gambit::{Board, Color, GameError};
    /// let board = Board::from_fen("4r3/8/8/8/8/8/8/4K3").unwrap();
    /// assert_eq!(board.try_is_in_check(Color::White), Ok(true));
    /// assert_eq!(board.try_is_in_check(Color::Black), Err(GameError::MissingKing(Color::Black)));
    /// ```
    pub fn try_is_in_check(&self, color: Color) -> Result<bool, GameError> {
        let king = self
            .king_square(color)
            .ok_or(GameError::MissingKing(color))?;

        Ok(self.is_attacked(king, color.opponent()))
    }

    /// Iterates over all pieces of `color`, in row-major order starting at A8.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.iter()
            .map(|(_, piece)| piece)
            .filter(move |piece| piece.color() == color)
    }

    /// Creates a [`BoardIter`] to iterate over all occupied [`Square`]s in this [`Board`], row by row.
    #[inline(always)]
    pub const fn iter(&self) -> BoardIter<'_> {
        BoardIter {
            board: self,
            index: 0,
        }
    }

    /// The board as 8 rows of 8 optional occupants; `grid()[row][col]`.
    pub fn grid(&self) -> [[Option<Piece>; 8]; 8] {
        let mut grid = [[None; 8]; 8];
        for (square, piece) in self {
            grid[square.row() as usize][square.col() as usize] = Some(piece);
        }
        grid
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::starting_position()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Allocate just enough capacity
        let mut board = String::with_capacity(198);

        for row in 0..BOARD_SIZE {
            board += &format!("{}| ", BOARD_SIZE - row);

            for col in 0..BOARD_SIZE {
                let occupant = self
                    .get(Square::new(row, col))
                    .map(|piece| piece.char())
                    .unwrap_or('.');

                board.push(occupant);
                board.push(' ');
            }

            board += "\n"
        }
        board += " +";
        for _ in 0..BOARD_SIZE {
            board += "--";
        }
        board += "\n   ";
        for col in 0..BOARD_SIZE {
            board.push((b'a' + col) as char);
            board.push(' ');
        }

        write!(f, "{board}")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}\n\nFEN: {}", self.to_fen())
    }
}

impl From<[[Option<Piece>; 8]; 8]> for Board {
    /// Builds a board from a grid, placing each piece on the square of its cell.
    fn from(grid: [[Option<Piece>; 8]; 8]) -> Self {
        let mut board = Self::new();

        for (row, cells) in grid.into_iter().enumerate() {
            for (col, piece) in cells.into_iter().enumerate() {
                board.set(Square::new(row as u8, col as u8), piece);
            }
        }

        board
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.mailbox[index.index()]
    }
}

impl<'a> IntoIterator for &'a Board {
    type IntoIter = BoardIter<'a>;
    type Item = <BoardIter<'a> as Iterator>::Item;
    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the occupied squares of a [`Board`], in row-major order.
///
/// Calls to [`Iterator::next`] will yield a tuple of a [`Square`] and a [`Piece`].
pub struct BoardIter<'a> {
    /// The board to retrieve pieces from.
    board: &'a Board,

    /// Index of the next square to examine.
    index: usize,
}

impl<'a> Iterator for BoardIter<'a> {
    type Item = (Square, Piece);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < Square::COUNT {
            let index = self.index;
            self.index += 1;

            if let Some(piece) = self.board.mailbox[index] {
                return Some((piece.square(), piece));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    fn sq(s: &str) -> Square {
        Square::from_uci(s).unwrap()
    }

    #[test]
    fn test_starting_position_matches_fen() {
        let board = Board::default();
        assert_eq!(board, Board::from_fen(FEN_STARTPOS).unwrap());
        assert_eq!(board.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert_eq!(board.get(sq("e1")).unwrap().square(), sq("e1"));
        assert!(board.iter().all(|(square, piece)| !piece.has_moved() && piece.square() == square));
    }

    #[test]
    fn test_fen_rejects_garbage() {
        assert!(Board::from_fen("8/8/8").is_err());
        assert!(Board::from_fen("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("ppppppppp/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("x7/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_fen_infers_moved_flags() {
        let board = Board::from_fen("r3k2r/8/8/8/4P3/8/8/1R2K3").unwrap();
        assert!(!board.get(sq("a8")).unwrap().has_moved());
        assert!(!board.get(sq("e8")).unwrap().has_moved());
        assert!(board.get(sq("e4")).unwrap().has_moved());
        assert!(board.get(sq("b1")).unwrap().has_moved());
        assert!(!board.get(sq("e1")).unwrap().has_moved());
    }

    #[test]
    fn test_set_updates_position() {
        let mut board = Board::new();
        let piece = Piece::new(Color::White, PieceKind::Bishop, sq("a1"));
        board.set(sq("d4"), Some(piece));
        assert_eq!(board.get(sq("d4")).unwrap().square(), sq("d4"));
        board.set(sq("d4"), None);
        assert!(board.is_empty(sq("d4")));
    }

    #[test]
    fn test_kingside_castle_moves_rook() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let record = board.make_move(sq("e1"), sq("g1")).unwrap();
        assert!(record.is_castling());
        assert_eq!(record.captured(), None);
        assert_eq!(board.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1");
        assert!(board.get(sq("f1")).unwrap().has_moved());
        assert!(board.get(sq("g1")).unwrap().has_moved());
    }

    #[test]
    fn test_queenside_castle_moves_rook() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        board.move_piece(sq("e8"), sq("c8"));
        assert_eq!(board.to_fen(), "2kr3r/8/8/8/8/8/8/R3K2R");
        assert!(board.get(sq("d8")).unwrap().has_moved());
    }

    #[test]
    fn test_en_passant_removes_passed_pawn() {
        let mut board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        let record = board.make_move(sq("e5"), sq("d6")).unwrap();
        assert!(record.is_en_passant());
        let captured = record.captured().unwrap();
        assert_eq!(captured.kind(), PieceKind::Pawn);
        assert_eq!(captured.color(), Color::Black);
        assert_eq!(captured.square(), sq("d5"));
        assert_eq!(board.to_fen(), "4k3/8/3P4/8/8/8/8/4K3");
    }

    #[test]
    fn test_promotion_to_queen() {
        let mut board = Board::from_fen("1n2k3/P7/8/8/8/8/8/4K3").unwrap();
        let record = board.make_move(sq("a7"), sq("b8")).unwrap();
        assert_eq!(record.promoted_to(), Some(PieceKind::Queen));
        assert_eq!(record.captured().unwrap().kind(), PieceKind::Knight);
        let queen = board.get(sq("b8")).unwrap();
        assert_eq!(queen.kind(), PieceKind::Queen);
        assert_eq!(queen.color(), Color::White);
        assert!(queen.has_moved());
    }

    #[test]
    fn test_king_off_home_file_never_drags_a_rook() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/3K3R").unwrap();
        let record = board.make_move(sq("d1"), sq("f1")).unwrap();
        assert!(!record.is_castling());
        assert_eq!(board.to_fen(), "4k3/8/8/8/8/8/8/5K1R");
        assert!(!board.get(sq("h1")).unwrap().has_moved());
    }

    #[test]
    fn test_move_from_empty_square_does_nothing() {
        let mut board = Board::default();
        let before = board;
        assert!(board.make_move(sq("e4"), sq("e5")).is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn test_rook_on_open_file_gives_check() {
        // Rook on a8 does not see e1
        let board = Board::from_fen("r3k3/8/8/8/8/8/8/4K3").unwrap();
        assert!(!board.is_in_check(Color::White));

        // Rook on e8 down an empty e-file does
        let board = Board::from_fen("4r1k1/8/8/8/8/8/8/4K3").unwrap();
        assert!(board.is_in_check(Color::White));
        assert!(!board.is_in_check(Color::Black));
    }

    #[test]
    fn test_missing_king_is_not_check() {
        let board = Board::from_fen("4r3/8/8/8/8/8/8/8").unwrap();
        assert!(!board.is_in_check(Color::White));
        assert_eq!(
            board.try_is_in_check(Color::White),
            Err(GameError::MissingKing(Color::White))
        );
    }

    #[test]
    fn test_copies_are_deep() {
        let original = Board::default();
        let mut copy = original;
        copy.move_piece(sq("e2"), sq("e4"));
        assert_ne!(copy, original);
        assert!(!original.get(sq("e2")).unwrap().has_moved());
        assert!(original.is_empty(sq("e4")));
    }

    #[test]
    fn test_pieces_of_is_row_major() {
        let board = Board::default();
        let black: Vec<_> = board.pieces_of(Color::Black).map(|p| p.square()).collect();
        assert_eq!(black.len(), 16);
        assert_eq!(black[0], sq("a8"));
        assert_eq!(black[15], sq("h7"));
        assert!(board.pieces_of(Color::White).all(|p| p.color() == Color::White));
    }

    #[test]
    fn test_grid_round_trip() {
        let board = Board::from_fen("r3k2r/8/8/3pP3/8/8/8/R3K2R").unwrap();
        assert_eq!(Board::from(board.grid()), board);
        assert_eq!(board.grid()[3][3].unwrap().char(), 'p');
    }
}
