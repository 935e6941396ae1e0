/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Piece, PieceKind, Square};

/// The most destinations a single piece can ever have: a Queen in the middle of an empty board.
pub const MAX_PIECE_MOBILITY: usize = 27;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_PIECE_MOBILITY`] destination squares.
pub type MoveList = arrayvec::ArrayVec<Square, MAX_PIECE_MOBILITY>;

/// Column a King must stand on to castle.
pub const KING_HOME_COL: u8 = 4;

/// `(row, col)` offsets of a Knight's jumps.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// `(row, col)` offsets of a King's single steps.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Ray directions of a Rook.
pub const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Ray directions of a Bishop.
pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Ray directions of a Queen.
pub const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

impl Piece {
    /// Generates every square this piece could move to on `board`, ignoring whether doing so exposes its own King.
    ///
    /// This is the pseudo-legal move set. [`Game`](crate::Game) filters it down to legal moves.
    ///
    /// The piece is assumed to stand on `board` at [`Piece::square`].
    ///
    /// # Example
    /// ```
    /// # use gambit::{Board, Square};
    /// let board = Board::default();
    /// let knight = board.get(Square::from_uci("b1").unwrap()).unwrap();
    /// let moves = knight.pseudo_legal_moves(&board);
    /// assert_eq!(moves.len(), 2);
    /// assert!(moves.contains(&Square::from_uci("c3").unwrap()));
    /// ```
    pub fn pseudo_legal_moves(&self, board: &Board) -> MoveList {
        let mut moves = MoveList::default();
        match self.kind() {
            PieceKind::Pawn => self.generate_pawn_moves(board, &mut moves),
            PieceKind::Knight => self.generate_step_moves(board, &KNIGHT_OFFSETS, &mut moves),
            PieceKind::Bishop => self.generate_slider_moves(board, &DIAGONALS, &mut moves),
            PieceKind::Rook => self.generate_slider_moves(board, &ORTHOGONALS, &mut moves),
            PieceKind::Queen => self.generate_slider_moves(board, &ALL_DIRECTIONS, &mut moves),
            PieceKind::King => {
                self.generate_step_moves(board, &KING_OFFSETS, &mut moves);
                self.generate_castling_moves(board, &mut moves);
            }
        }
        moves
    }

    /// Returns `true` if `to` is among this piece's pseudo-legal destinations on `board`.
    #[inline(always)]
    pub fn can_move_to(&self, to: Square, board: &Board) -> bool {
        self.pseudo_legal_moves(board).contains(&to)
    }

    /// Returns `true` if `square` holds a piece of the opposing color.
    #[inline(always)]
    fn is_enemy_at(&self, square: Square, board: &Board) -> bool {
        board.is_enemy_of(square, self.color())
    }

    /// Knights and Kings: every offset that lands on an empty or enemy-occupied square.
    fn generate_step_moves(&self, board: &Board, offsets: &[(i8, i8)], moves: &mut MoveList) {
        for &(d_row, d_col) in offsets {
            let Some(to) = self.square().offset(d_row, d_col) else {
                continue;
            };

            if board.is_empty(to) || self.is_enemy_at(to, board) {
                moves.push(to);
            }
        }
    }

    /// Bishops, Rooks and Queens: walk each ray until the edge, a friendly piece, or the first enemy.
    fn generate_slider_moves(&self, board: &Board, directions: &[(i8, i8)], moves: &mut MoveList) {
        for &(d_row, d_col) in directions {
            let mut current = self.square().offset(d_row, d_col);

            while let Some(to) = current {
                if board.is_empty(to) {
                    moves.push(to);
                } else {
                    // Enemies can be captured, friendlies just block
                    if self.is_enemy_at(to, board) {
                        moves.push(to);
                    }
                    break;
                }

                current = to.offset(d_row, d_col);
            }
        }
    }

    fn generate_pawn_moves(&self, board: &Board, moves: &mut MoveList) {
        let color = self.color();
        let from = self.square();
        let forward = color.pawn_direction();

        // Single push, then a double push from the starting row if both squares are clear
        if let Some(one) = from.offset(forward, 0).filter(|&sq| board.is_empty(sq)) {
            moves.push(one);

            if from.row() == color.pawn_start_row() {
                if let Some(two) = from.offset(2 * forward, 0).filter(|&sq| board.is_empty(sq)) {
                    moves.push(two);
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(target) = from.offset(forward, d_col) else {
                continue;
            };

            // Diagonal captures only onto enemies
            if self.is_enemy_at(target, board) {
                moves.push(target);
                continue;
            }

            // En passant: an enemy Pawn right beside us while we stand on the en passant row.
            // Removing that Pawn is the board's job when the move is applied.
            if from.row() == color.en_passant_row() && board.is_empty(target) {
                let beside = from.offset(0, d_col).and_then(|sq| board.get(sq));
                if beside.is_some_and(|p| p.is_pawn() && p.is_enemy_of(self)) {
                    moves.push(target);
                }
            }
        }
    }

    /// Offers a two-column King move towards each unmoved Rook of the same color in the King's corners,
    /// provided every square between them is empty.
    ///
    /// Only an unmoved King on its home square (the E-file of its back rank) can castle.
    /// This does not consider attacked squares; see [`CastlingRule`](crate::CastlingRule).
    fn generate_castling_moves(&self, board: &Board, moves: &mut MoveList) {
        let from = self.square();
        if self.has_moved() || from != Square::new(self.color().back_row(), KING_HOME_COL) {
            return;
        }

        let row = from.row();

        for (rook_col, d_col) in [(7u8, 2i8), (0, -2)] {
            let Some(rook) = board.get(Square::new(row, rook_col)) else {
                continue;
            };
            if !rook.is_rook() || rook.has_moved() || rook.color() != self.color() {
                continue;
            }

            let (low, high) = if rook_col > from.col() {
                (from.col() + 1, rook_col)
            } else {
                (rook_col + 1, from.col())
            };
            let path_is_clear = (low..high).all(|col| board.is_empty(Square::new(row, col)));

            if path_is_clear {
                if let Some(to) = from.offset(0, d_col) {
                    moves.push(to);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Color;

    /// Checks if `moves` and `expected` contain all the same elements, ignoring order
    fn lists_match(moves: &[Square], expected: &[&str]) {
        assert_eq!(
            moves.len(),
            expected.len(),
            "\nMoves: {:?}\nExpected: {:?}",
            moves,
            expected
        );

        for square in expected {
            let square = Square::from_uci(square).unwrap();
            assert!(moves.contains(&square), "{square} not found in {moves:?}");
        }
    }

    fn moves_at(fen: &str, square: &str) -> MoveList {
        let board = Board::from_fen(fen).unwrap();
        let piece = board.get(Square::from_uci(square).unwrap()).unwrap();
        piece.pseudo_legal_moves(&board)
    }

    #[test]
    fn rook_blockers() {
        // . . . . . . . .
        // . . . . . . . .
        // . . . p . . . .
        // . . . . . . . .
        // . . . R . . . .
        // . . . . . . . .
        // . . . P . . . .
        // . . . . . . . .
        let moves = moves_at("8/8/3p4/8/3R4/8/3P4/8", "d4");
        lists_match(
            &moves,
            &["d3", "d5", "d6", "a4", "b4", "c4", "e4", "f4", "g4", "h4"],
        );
    }

    #[test]
    fn bishop_stops_at_first_enemy() {
        let moves = moves_at("8/8/8/8/8/2p5/1B6/8", "b2");
        lists_match(&moves, &["a1", "c1", "a3", "c3"]);
    }

    #[test]
    fn queen_on_empty_board_has_max_mobility() {
        let moves = moves_at("8/8/8/8/3Q4/8/8/8", "d4");
        assert_eq!(moves.len(), MAX_PIECE_MOBILITY);
    }

    #[test]
    fn knight_in_corner() {
        let moves = moves_at("8/8/8/8/8/8/2P5/N7", "a1");
        lists_match(&moves, &["b3"]);
    }

    #[test]
    fn king_steps_avoid_friendlies() {
        let moves = moves_at("8/8/8/8/8/8/3PPP2/3QK3", "e1");
        lists_match(&moves, &["f1"]);
    }

    #[test]
    fn pawn_pushes_from_start() {
        lists_match(&moves_at("8/8/8/8/8/8/4P3/8", "e2"), &["e3", "e4"]);
        lists_match(&moves_at("8/4p3/8/8/8/8/8/8", "e7"), &["e6", "e5"]);
    }

    #[test]
    fn pawn_double_push_needs_both_squares() {
        lists_match(&moves_at("8/8/8/8/4n3/8/4P3/8", "e2"), &["e3"]);
        lists_match(&moves_at("8/8/8/8/8/4n3/4P3/8", "e2"), &[]);
    }

    #[test]
    fn pawn_captures_only_enemies() {
        lists_match(&moves_at("8/8/8/8/8/3p1N2/4P3/8", "e2"), &["e3", "e4", "d3"]);
    }

    #[test]
    fn pawn_en_passant_targets() {
        // White pawn on e5 (row 3) beside a black pawn on d5
        lists_match(&moves_at("8/8/8/3pP3/8/8/8/8", "e5"), &["e6", "d6"]);
        // Black pawn on d4 (row 4) beside a white pawn on e4
        lists_match(&moves_at("8/8/8/8/3pP3/8/8/8", "d4"), &["d3", "e3"]);
        // A knight beside the pawn is not en passant material
        lists_match(&moves_at("8/8/8/3nP3/8/8/8/8", "e5"), &["e6"]);
        // Not on the en passant row
        lists_match(&moves_at("8/8/3pP3/8/8/8/8/8", "e6"), &["e7"]);
    }

    #[test]
    fn en_passant_target_must_be_empty() {
        // A friendly piece on d6 blocks the en passant destination
        lists_match(&moves_at("8/8/3N4/3pP3/8/8/8/8", "e5"), &["e6"]);
    }

    #[test]
    fn castling_offered_with_clear_paths() {
        let moves = moves_at("r3k2r/8/8/8/8/8/8/R3K2R", "e1");
        lists_match(&moves, &["d1", "f1", "d2", "e2", "f2", "g1", "c1"]);
    }

    #[test]
    fn castling_requires_unmoved_pieces_and_clear_path() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R").unwrap();
        let e1 = Square::from_uci("e1").unwrap();
        let king = board.get(e1).unwrap();
        let moves = king.pseudo_legal_moves(&board);
        assert!(moves.contains(&Square::from_uci("g1").unwrap()));
        assert!(!moves.contains(&Square::from_uci("c1").unwrap()));

        // A moved rook cannot castle
        let h1 = Square::from_uci("h1").unwrap();
        let moved_rook = board.get(h1).unwrap().with_moved(true);
        board.set(h1, Some(moved_rook));
        assert!(!king.pseudo_legal_moves(&board).contains(&Square::from_uci("g1").unwrap()));

        // Nor can a moved king
        let moved_king = king.with_moved(true);
        board.set(e1, Some(moved_king));
        let moves = moved_king.pseudo_legal_moves(&board);
        assert!(!moves.contains(&Square::from_uci("c1").unwrap()));
        assert!(!moves.contains(&Square::from_uci("g1").unwrap()));
    }

    #[test]
    fn castling_ignores_enemy_rooks() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K3").unwrap();
        let h1 = Square::from_uci("h1").unwrap();
        board.set(h1, Some(Piece::new(Color::Black, PieceKind::Rook, h1)));
        let king = board.get(Square::from_uci("e1").unwrap()).unwrap().with_moved(false);
        assert!(!king.pseudo_legal_moves(&board).contains(&Square::from_uci("g1").unwrap()));
    }

    #[test]
    fn castling_needs_king_on_home_square() {
        // An unmoved King on f1 must not "castle" onto its own Rook on h1
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/5K1R").unwrap();
        let f1 = Square::from_uci("f1").unwrap();
        let king = board.get(f1).unwrap().with_moved(false);
        board.set(f1, Some(king));
        lists_match(&king.pseudo_legal_moves(&board), &["e1", "g1", "e2", "f2", "g2"]);

        // Nor may an unmoved King on d1 jump two squares towards h1
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/3K3R").unwrap();
        let d1 = Square::from_uci("d1").unwrap();
        let king = board.get(d1).unwrap().with_moved(false);
        board.set(d1, Some(king));
        assert!(!king.pseudo_legal_moves(&board).contains(&Square::from_uci("f1").unwrap()));

        // Nor a King standing on the E-file of the wrong row
        let board = Board::from_fen("4k3/8/8/8/8/8/R3K2R/8").unwrap();
        let e2 = Square::from_uci("e2").unwrap();
        let king = board.get(e2).unwrap().with_moved(false);
        let moves = king.pseudo_legal_moves(&board);
        assert!(!moves.contains(&Square::from_uci("g2").unwrap()));
        assert!(!moves.contains(&Square::from_uci("c2").unwrap()));
    }

    #[test]
    fn moves_stay_on_board() {
        let board = Board::default();
        for (_, piece) in board.iter() {
            for to in piece.pseudo_legal_moves(&board) {
                assert!(to.row() < 8 && to.col() < 8);
            }
        }
    }
}
