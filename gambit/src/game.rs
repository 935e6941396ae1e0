/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};

use super::{
    parse_uci_move, Board, Color, IllegalMove, MoveList, MoveRecord, Piece, Square, KING_HOME_COL,
};

/// Where a game stands, from the point of view of the side to move.
///
/// Never set directly: it is recomputed from the board and turn after every committed move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Playing,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    /// Returns `true` if the side to move has no legal moves.
    #[inline(always)]
    pub const fn is_over(&self) -> bool {
        matches!(self, Self::Checkmate | Self::Stalemate)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Check => "check",
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How strictly castling is validated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastlingRule {
    /// Castling only needs an unmoved King and Rook with nothing between them.
    /// The King may castle out of check or across an attacked square.
    #[default]
    Permissive,

    /// Additionally forbids castling while in check or across an attacked square.
    Strict,
}

/// Rule variations a [`Game`] can be configured with. Options survive [`Game::reset`] and [`Game::load`](crate::Game::load).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub castling: CastlingRule,
}

/// Everything [`Game::undo`] needs to put a game back the way it was before a move.
#[derive(Clone, PartialEq, Eq, Debug)]
struct GameState {
    board: Board,
    side_to_move: Color,
    captured: [Vec<Piece>; Color::COUNT],
    status: GameStatus,
    halfmove: usize,
    fullmove: usize,
}

/// A game of chess: a [`Board`] plus whose turn it is, what has been captured, what has been played, and how to take it back.
///
/// Moves are only committed if they are legal for the side to move. Checkmate and stalemate are not enforced
/// beyond that: once there are no legal moves, every move attempt is simply rejected.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Game {
    board: Board,
    side_to_move: Color,

    /// Pieces captured *by* each color, in the order they were taken.
    captured: [Vec<Piece>; Color::COUNT],
    status: GameStatus,
    history: Vec<MoveRecord>,
    undo_stack: Vec<GameState>,

    /// Plies since the last capture or Pawn move.
    halfmove: usize,

    /// Starts at 1 and increments after every move by Black.
    fullmove: usize,
    options: GameOptions,

    /// When the game was first saved, if it was loaded from a snapshot.
    created_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Creates a new game from the standard starting position, with White to move.
    #[inline(always)]
    pub fn new() -> Self {
        Self::with_options(GameOptions::default())
    }

    /// Creates a new game from the standard starting position, using the provided [`GameOptions`].
    pub fn with_options(options: GameOptions) -> Self {
        Self {
            board: Board::default(),
            side_to_move: Color::White,
            captured: Default::default(),
            status: GameStatus::Playing,
            history: Vec::new(),
            undo_stack: Vec::new(),
            halfmove: 0,
            fullmove: 1,
            options,
            created_at: None,
        }
    }

    /// Creates a new [`Game`] from the provided FEN string.
    ///
    /// Missing fields default to `w KQkq - 0 1`. The castling field decides which Kings and Rooks count as unmoved.
    /// The en passant field is validated but otherwise ignored, since en passant availability here depends only on
    /// where the Pawns stand.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Game, Color, GameStatus};
    /// let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    /// assert_eq!(game.side_to_move(), Color::Black);
    /// assert_eq!(game.status(), GameStatus::Stalemate);
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut split = fen.split_whitespace();
        let placements = split.next().ok_or(anyhow!(
            "Invalid FEN string: FEN string must have piece placements."
        ))?;
        let mut board = Board::from_fen(placements)?;

        for color in Color::all() {
            let kings = board.pieces_of(color).filter(|p| p.is_king()).count();
            if kings != 1 {
                bail!("Invalid FEN string: expected exactly one {color} king, found {kings}");
            }
        }

        let active_color = split.next().unwrap_or("w");
        let side_to_move = Color::from_str(active_color)?;

        let castling = split.next().unwrap_or("KQkq");
        if castling != "-" && !castling.chars().all(|c| "KQkq".contains(c)) {
            bail!("Invalid FEN string: unsupported castling rights {castling:?}");
        }
        Self::apply_castling_rights(&mut board, castling);

        let en_passant_target = split.next().unwrap_or("-");
        if en_passant_target != "-" {
            Square::from_uci(en_passant_target)?;
        }

        let halfmove = split.next().unwrap_or("0");
        let halfmove = halfmove.parse().or(Err(anyhow!(
            "Invalid FEN string: FEN string must have valid halfmove counter. Got {halfmove}"
        )))?;

        let fullmove = split.next().unwrap_or("1");
        let fullmove = fullmove.parse().or(Err(anyhow!(
            "Invalid FEN string: FEN string must have valid fullmove counter. Got {fullmove}"
        )))?;

        let mut game = Self {
            board,
            side_to_move,
            halfmove,
            fullmove,
            ..Self::new()
        };
        game.status = game.compute_status();

        Ok(game)
    }

    /// Marks Kings and Rooks as moved wherever `castling` grants no right to castle with them.
    fn apply_castling_rights(board: &mut Board, castling: &str) {
        for color in Color::all() {
            let row = color.back_row();
            let mut any_rights = false;

            for (col, right) in [(7, 'K'), (0, 'Q')] {
                let right = if color.is_white() {
                    right
                } else {
                    right.to_ascii_lowercase()
                };

                if castling.contains(right) {
                    any_rights = true;
                    continue;
                }

                let square = Square::new(row, col);
                if let Some(rook) = board.get(square).filter(|p| p.is_rook() && p.color() == color) {
                    board.place(rook.with_moved(true), square);
                }
            }

            if !any_rights {
                if let Some(square) = board.king_square(color) {
                    if let Some(king) = board.get(square) {
                        board.place(king.with_moved(true), square);
                    }
                }
            }
        }
    }

    /// Generates a FEN string of the current position.
    ///
    /// Castling rights are derived from which Kings and Rooks have moved. The en passant field is always `-`.
    pub fn to_fen(&self) -> String {
        let placements = self.board.to_fen();
        let active_color = self.side_to_move.to_uci();
        let castling = self.castling_rights_uci();
        let halfmove = self.halfmove;
        let fullmove = self.fullmove;

        format!("{placements} {active_color} {castling} - {halfmove} {fullmove}")
    }

    /// Castling rights in FEN notation, such as `KQkq`, `Kq` or `-`.
    pub fn castling_rights_uci(&self) -> String {
        let mut rights = String::with_capacity(4);

        for color in Color::all() {
            let row = color.back_row();
            let king = self.board.get(Square::new(row, KING_HOME_COL));
            if !king.is_some_and(|k| k.is_king() && k.color() == color && !k.has_moved()) {
                continue;
            }

            for (col, right) in [(7, 'K'), (0, 'Q')] {
                let rook = self.board.get(Square::new(row, col));
                if rook.is_some_and(|r| r.is_rook() && r.color() == color && !r.has_moved()) {
                    rights.push(if color.is_white() {
                        right
                    } else {
                        right.to_ascii_lowercase()
                    });
                }
            }
        }

        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }

    /// The board as it currently stands.
    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the current player as a [`Color`].
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Pieces captured by each color, indexable by [`Color`].
    #[inline(always)]
    pub const fn captured_pieces(&self) -> &[Vec<Piece>; Color::COUNT] {
        &self.captured
    }

    /// Pieces captured by `color`, in the order they were taken.
    #[inline(always)]
    pub fn captured_by(&self, color: Color) -> &[Piece] {
        &self.captured[color]
    }

    /// Every move played so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// The most recently played move, if any.
    #[inline(always)]
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    #[inline(always)]
    pub const fn options(&self) -> GameOptions {
        self.options
    }

    /// Changes the rules this game is played by. The current status is re-evaluated under the new rules.
    pub fn set_options(&mut self, options: GameOptions) {
        self.options = options;
        self.status = self.compute_status();
    }

    /// The timestamp of the snapshot this game was loaded from, if any. [`Game::save`] keeps it.
    #[inline(always)]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Number of plies since the last capture or Pawn move.
    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    /// The current move number, starting at 1.
    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    /// Returns `true` if there is a move to take back.
    #[inline(always)]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Checks whether moving the piece on `from` to `to` is legal. If it is not, returns an `Err` explaining why.
    ///
    /// A legal move moves a piece of the side to move to one of its pseudo-legal destinations,
    /// without leaving that side's King in check afterwards.
    pub fn check_legality_of(&self, from: Square, to: Square) -> Result<(), IllegalMove> {
        // If there's no piece here, illegal move
        let Some(piece) = self.board.get(from) else {
            return Err(IllegalMove::NoPiece(from));
        };

        // If it's not this piece's color's turn, illegal move
        let color = piece.color();
        if color != self.side_to_move {
            return Err(IllegalMove::WrongTurn {
                square: from,
                color,
            });
        }

        if !piece.can_move_to(to, &self.board) {
            return Err(IllegalMove::Unreachable { from, to });
        }

        if self.options.castling == CastlingRule::Strict
            && piece.is_king()
            && from.col_distance(to) == 2
            && !self.is_safe_castle(&piece, to)
        {
            return Err(IllegalMove::CastlingThroughCheck(color));
        }

        // Play it out on a copy and see if our King survives
        let mut simulated = self.board;
        simulated.move_piece(from, to);
        if simulated.is_in_check(color) {
            return Err(IllegalMove::SelfCheck(color));
        }

        Ok(())
    }

    /// Returns `true` if `king` is not in check and would not be in check on the square it crosses on the way to `to`.
    ///
    /// Landing in check is already ruled out for every move.
    fn is_safe_castle(&self, king: &Piece, to: Square) -> bool {
        let color = king.color();
        if self.board.is_in_check(color) {
            return false;
        }

        let from = king.square();
        let step = if to.col() > from.col() { 1 } else { -1 };
        let Some(crossed) = from.offset(0, step) else {
            return false;
        };

        let mut simulated = self.board;
        simulated.clear(from);
        simulated.place(*king, crossed);
        !simulated.is_in_check(color)
    }

    /// Returns `true` if moving the piece on `from` to `to` is legal for the side to move.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Game, Square};
    /// let game = Game::default();
    /// let e2 = Square::from_uci("e2").unwrap();
    /// assert!(game.is_valid_move(e2, Square::from_uci("e4").unwrap()));
    /// assert!(!game.is_valid_move(e2, Square::from_uci("e5").unwrap()));
    /// ```
    #[inline(always)]
    pub fn is_valid_move(&self, from: Square, to: Square) -> bool {
        self.check_legality_of(from, to).is_ok()
    }

    /// Plays the move from `from` to `to` if it is legal, returning whether it was played.
    ///
    /// An illegal move changes nothing. Use [`Game::make_move_checked`] to learn why a move was rejected.
    #[inline(always)]
    pub fn make_move(&mut self, from: Square, to: Square) -> bool {
        self.make_move_checked(from, to).is_ok()
    }

    /// Applies the move, if it is legal to make. If it is not legal, returns an `Err` explaining why.
    ///
    /// On success, returns the [`MoveRecord`] appended to the history.
    pub fn make_move_checked(&mut self, from: Square, to: Square) -> Result<MoveRecord> {
        if let Err(err) = self.check_legality_of(from, to) {
            trace!("Rejected {from}{to}: {err}");
            return Err(err.into());
        }

        let before = self.state();
        let Some(record) = self.board.make_move(from, to) else {
            return Err(IllegalMove::NoPiece(from).into());
        };
        self.undo_stack.push(before);

        let mover = self.side_to_move;
        if let Some(captured) = record.captured() {
            self.captured[mover].push(captured);
        }
        self.history.push(record);

        self.halfmove = if record.is_irreversible() {
            0
        } else {
            self.halfmove + 1
        };
        if mover.is_black() {
            self.fullmove += 1;
        }

        self.side_to_move = mover.opponent();
        self.status = self.compute_status();

        debug!(
            "{mover} played {record} ({:?}); {} to move, status {}",
            record.kind(),
            self.side_to_move,
            self.status
        );

        Ok(record)
    }

    /// Parses a move in UCI notation (such as `e2e4`) and plays it.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Game, GameStatus};
    /// let mut game = Game::default();
    /// for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
    ///     game.make_uci_move(mv).unwrap();
    /// }
    /// assert_eq!(game.status(), GameStatus::Checkmate);
    /// assert!(game.make_uci_move("e1f2").is_err());
    /// ```
    pub fn make_uci_move(&mut self, uci: &str) -> Result<MoveRecord> {
        let (from, to) = parse_uci_move(uci)?;
        self.make_move_checked(from, to)
    }

    /// Copies `self` and returns a [`Game`] after having played the move from `from` to `to`, if it was legal.
    #[inline(always)]
    pub fn with_move_made(&self, from: Square, to: Square) -> Self {
        let mut copied = self.clone();
        copied.make_move(from, to);
        copied
    }

    /// All legal destinations of the piece on `square`.
    ///
    /// Empty if the square is empty or holds a piece of the side not to move.
    pub fn legal_moves_for(&self, square: Square) -> MoveList {
        let Some(piece) = self.board.get(square) else {
            return MoveList::default();
        };
        if piece.color() != self.side_to_move {
            return MoveList::default();
        }

        piece
            .pseudo_legal_moves(&self.board)
            .into_iter()
            .filter(|&to| self.is_valid_move(square, to))
            .collect()
    }

    /// Every legal move for the side to move, as `(from, to)` pairs, in board-scan order.
    pub fn legal_moves(&self) -> Vec<(Square, Square)> {
        self.board
            .pieces_of(self.side_to_move)
            .flat_map(|piece| {
                let from = piece.square();
                self.legal_moves_for(from).into_iter().map(move |to| (from, to))
            })
            .collect()
    }

    /// Returns `true` if the side to move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        self.board.pieces_of(self.side_to_move).any(|piece| {
            piece
                .pseudo_legal_moves(&self.board)
                .into_iter()
                .any(|to| self.is_valid_move(piece.square(), to))
        })
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.board.is_in_check(self.side_to_move)
    }

    /// Derives the status of the side to move from the board.
    pub(crate) fn compute_status(&self) -> GameStatus {
        match (self.is_in_check(), self.has_legal_moves()) {
            (true, false) => GameStatus::Checkmate,
            (true, true) => GameStatus::Check,
            (false, false) => GameStatus::Stalemate,
            (false, true) => GameStatus::Playing,
        }
    }

    /// Takes back the most recent move, returning `false` (and changing nothing) if there is none.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Game, Square};
    /// let mut game = Game::default();
    /// assert!(!game.undo());
    /// game.make_uci_move("g1f3").unwrap();
    /// assert!(game.undo());
    /// assert_eq!(game, Game::default());
    /// ```
    pub fn undo(&mut self) -> bool {
        let Some(state) = self.undo_stack.pop() else {
            trace!("Nothing to undo");
            return false;
        };

        let undone = self.history.pop();
        self.restore(state);

        if let Some(record) = undone {
            debug!("Undid {record}; {} to move", self.side_to_move);
        }
        true
    }

    /// Returns to the starting position with White to move, forgetting all history. Options are kept.
    pub fn reset(&mut self) {
        *self = Self::with_options(self.options);
        debug!("Game reset");
    }

    fn state(&self) -> GameState {
        GameState {
            board: self.board,
            side_to_move: self.side_to_move,
            captured: self.captured.clone(),
            status: self.status,
            halfmove: self.halfmove,
            fullmove: self.fullmove,
        }
    }

    fn restore(&mut self, state: GameState) {
        self.board = state.board;
        self.side_to_move = state.side_to_move;
        self.captured = state.captured;
        self.status = state.status;
        self.halfmove = state.halfmove;
        self.fullmove = state.fullmove;
    }

    /// Overwrites everything but the options and undo stack. Used when importing a snapshot.
    ///
    /// Counters missing from the snapshot are derived from `history`, assuming the game began at move 1 with White.
    pub(crate) fn replace_position(&mut self, position: ImportedPosition) {
        let ImportedPosition {
            board,
            side_to_move,
            captured,
            status,
            history,
            halfmove,
            fullmove,
            created_at,
        } = position;

        self.board = board;
        self.side_to_move = side_to_move;
        self.captured = captured;
        self.status = status;

        self.halfmove = halfmove.unwrap_or_else(|| {
            history
                .iter()
                .rev()
                .take_while(|record| !record.is_irreversible())
                .count()
        });
        self.fullmove = fullmove.unwrap_or(1 + history.len() / 2);
        self.history = history;
        self.created_at = Some(created_at);
    }
}

/// Everything a snapshot import hands to [`Game::replace_position`].
pub(crate) struct ImportedPosition {
    pub board: Board,
    pub side_to_move: Color,
    pub captured: [Vec<Piece>; Color::COUNT],
    pub status: GameStatus,
    pub history: Vec<MoveRecord>,
    pub halfmove: Option<usize>,
    pub fullmove: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl FromStr for Game {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Game {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n", self.board)?;
        write!(
            f,
            "{} to move ({}), move {}",
            self.side_to_move, self.status, self.fullmove
        )
    }
}
