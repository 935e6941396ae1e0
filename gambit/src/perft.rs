/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Game;

/// Counts the number of positions reachable from `game` in exactly `depth` legal moves.
///
/// # Example
/// ```
/// # use gambit::{perft, Game};
/// assert_eq!(perft(&Game::default(), 2), 400);
/// ```
pub fn perft(game: &Game, depth: usize) -> u64 {
    let mut game = game.clone();
    perft_inner(&mut game, depth)
}

/// Like [`perft`], but prints the node count below each legal move from the root, as `e2e4: 20`.
pub fn splitperft(game: &Game, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut game = game.clone();
    let mut total = 0;

    for (from, to) in game.legal_moves() {
        game.make_move(from, to);
        let nodes = perft_inner(&mut game, depth - 1);
        game.undo();

        println!("{from}{to}: {nodes}");
        total += nodes;
    }

    total
}

fn perft_inner(game: &mut Game, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = game.legal_moves();

    // Bulk counting
    if depth == 1 {
        return moves.len() as u64;
    }

    moves.into_iter().fold(0, |nodes, (from, to)| {
        game.make_move(from, to);
        let nodes = nodes + perft_inner(game, depth - 1);
        game.undo();
        nodes
    })
}
