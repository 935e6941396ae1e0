/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gambit::prelude::*;
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

fn sq(s: &str) -> Square {
    Square::from_uci(s).unwrap()
}

fn assert_same_position(actual: &Game, expected: &Game) {
    assert_eq!(actual.board().grid(), expected.board().grid());
    assert_eq!(actual.side_to_move(), expected.side_to_move());
    assert_eq!(actual.status(), expected.status());
    assert_eq!(actual.captured_pieces(), expected.captured_pieces());
}

#[test]
fn rook_check_on_open_file() {
    let mut board = Board::new();
    for (square, piece) in [
        ("e1", Piece::new(Color::White, PieceKind::King, sq("e1"))),
        ("e8", Piece::new(Color::Black, PieceKind::King, sq("e8"))),
        ("a8", Piece::new(Color::Black, PieceKind::Rook, sq("a8"))),
    ] {
        board.set(sq(square), Some(piece));
    }
    assert!(!board.is_in_check(Color::White));

    let mut board = Board::new();
    board.set(sq("e1"), Some(Piece::new(Color::White, PieceKind::King, sq("e1"))));
    board.set(sq("a8"), Some(Piece::new(Color::Black, PieceKind::King, sq("a8"))));
    board.set(sq("e8"), Some(Piece::new(Color::Black, PieceKind::Rook, sq("e8"))));
    assert!(board.is_in_check(Color::White));

    // Anything in between blocks it
    board.set(sq("e4"), Some(Piece::new(Color::White, PieceKind::Knight, sq("e4"))));
    assert!(!board.is_in_check(Color::White));
}

#[test]
fn opening_pawn_push() {
    let mut game = Game::default();
    let record = game
        .make_move_checked(Square::new(6, 4), Square::new(4, 4))
        .unwrap();

    assert_eq!(record.captured(), None);
    assert_eq!(record.kind(), MoveKind::Quiet);
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(game.status(), GameStatus::Playing);
}

#[test]
fn kingside_castle() {
    let mut game = Game::from_fen(FEN_CASTLING).unwrap();
    let e1 = sq("e1");
    let g1 = sq("g1");

    let king = game.board().get(e1).unwrap();
    assert!(king.pseudo_legal_moves(game.board()).contains(&g1));

    let record = game.make_move_checked(e1, g1).unwrap();
    assert_eq!(record.kind(), MoveKind::ShortCastle);

    let king = game.board().get(g1).unwrap();
    let rook = game.board().get(sq("f1")).unwrap();
    assert!(king.is_king() && king.has_moved());
    assert!(rook.is_rook() && rook.has_moved());
    assert!(game.board().is_empty(sq("h1")));
    assert!(game.board().is_empty(e1));
}

#[test]
fn fools_mate() {
    let mut game = Game::default();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        assert!(game.make_move(sq(from), sq(to)), "{from}{to} was rejected");
    }

    assert_eq!(game.status(), GameStatus::Checkmate);
    for piece in game.board().pieces_of(Color::White) {
        assert!(game.legal_moves_for(piece.square()).is_empty());
    }

    // The game is over, so nothing else goes through
    let before = game.clone();
    assert!(!game.make_move(sq("e2"), sq("e4")));
    assert_eq!(game, before);
}

#[test]
fn en_passant_capture() {
    let mut game = Game::default();
    for mv in ["e2e4", "a7a6", "e4e5", "d7d5"] {
        game.make_uci_move(mv).unwrap();
    }

    assert!(game.legal_moves_for(sq("e5")).contains(&sq("d6")));
    let record = game.make_uci_move("e5d6").unwrap();
    assert_eq!(record.kind(), MoveKind::EnPassantCapture);
    assert!(game.board().is_empty(sq("d5")));
    assert_eq!(game.captured_by(Color::White)[0].square(), sq("d5"));

    assert!(game.undo());
    assert_eq!(game.board().kind_at(sq("d5")), Some(PieceKind::Pawn));
    assert!(game.board().is_empty(sq("d6")));
}

#[test]
fn promotion_to_queen() {
    let mut game = Game::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let record = game.make_uci_move("b7b8q").unwrap();
    assert_eq!(record.kind(), MoveKind::Promotion);
    assert_eq!(game.board().kind_at(sq("b8")), Some(PieceKind::Queen));
    assert_eq!(game.status(), GameStatus::Check);
}

#[test]
fn undo_on_fresh_game_fails() {
    let mut game = Game::default();
    assert!(!game.undo());
    assert_eq!(game, Game::default());
}

#[test]
fn save_then_load_through_json() {
    let mut game = Game::default();
    for mv in ["e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6"] {
        game.make_uci_move(mv).unwrap();
    }

    let json = game.save().to_json().unwrap();
    let mut loaded = Game::default();
    loaded.load(&SavedGame::from_json(&json).unwrap()).unwrap();

    assert_same_position(&loaded, &game);
    assert_eq!(loaded.history(), game.history());
}

/// Plays random legal moves from a fixed seed, checking the invariants that must hold after every move.
#[test]
fn random_games_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x6a6d);

    for _ in 0..4 {
        let mut game = Game::default();

        for _ in 0..60 {
            let moves = game.legal_moves();
            let Some(&(from, to)) = moves.choose(&mut rng) else {
                break;
            };

            // Every legal destination stays on the board
            for &(from, to) in &moves {
                assert!(from.row() < 8 && from.col() < 8);
                assert!(to.row() < 8 && to.col() < 8);
            }

            let before = game.clone();
            let mover = game.side_to_move();
            assert!(game.make_move(from, to), "{from}{to} was listed but rejected");
            assert!(!game.board().is_in_check(mover), "{from}{to} left {mover} in check");

            // Every so often, check undo and save/load along the way
            if rng.gen_bool(0.25) {
                let after = game.clone();
                assert!(game.undo());
                assert_same_position(&game, &before);
                assert_eq!(game.history(), before.history());
                assert!(game.make_move(from, to));
                assert_eq!(game, after);
            }

            if rng.gen_bool(0.1) {
                let loaded = Game::try_from(&game.save()).unwrap();
                assert_same_position(&loaded, &game);
            }
        }

        // Unwind everything
        while game.undo() {}
        assert_same_position(&game, &Game::default());
        assert!(game.history().is_empty());
    }
}
