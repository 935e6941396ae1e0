/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;

use gambit::{perft, splitperft, CastlingRule, Game, GameOptions, SavedGame};

/// Count the move sequences reachable from a game, one depth at a time.
#[derive(Debug, Parser)]
struct Cli {
    /// Deepest level to count.
    depth: usize,

    /// UCI moves to play before counting.
    #[arg(required = false)]
    moves: Vec<String>,

    /// Count from this FEN string instead of the standard starting position.
    #[arg(short, long, conflicts_with = "load")]
    fen: Option<String>,

    /// Count from a saved JSON game.
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Fail unless the deepest level reaches exactly this many nodes.
    #[arg(short, long)]
    expect: Option<u64>,

    /// At the deepest level, print the node count below each root move.
    #[arg(short, long, default_value = "false")]
    split: bool,

    /// Forbid castling out of, or across, check.
    #[arg(long, default_value = "false")]
    strict_castling: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let castling = if args.strict_castling {
        CastlingRule::Strict
    } else {
        CastlingRule::Permissive
    };
    let mut game = Game::with_options(GameOptions { castling });

    if let Some(path) = &args.load {
        let json = fs::read_to_string(path).context(format!("Failed to read {path:?}"))?;
        game.load(&SavedGame::from_json(&json)?)?;
    } else if let Some(fen) = &args.fen {
        let options = game.options();
        game = Game::from_fen(fen)?;
        game.set_options(options);
    }

    for mv in &args.moves {
        game.make_uci_move(mv)
            .context(format!("Failed to play {mv:?}"))?;
    }

    println!("{}\n", game.to_fen().dimmed());
    println!("depth {:>12} {:>10} {:>10}", "nodes", "time", "knps");

    let mut total = 0;
    for depth in 1..=args.depth {
        let now = Instant::now();
        let nodes = if args.split && depth == args.depth {
            splitperft(&game, depth)
        } else {
            perft(&game, depth)
        };
        let elapsed = now.elapsed();
        let k_nps = nodes as f32 / elapsed.as_secs_f32().max(f32::EPSILON) / 1_000.0;

        println!("{depth:>5} {nodes:>12} {:>10} {k_nps:>10.1}", format!("{elapsed:.1?}"));
        total = nodes;
    }

    if let Some(expected) = args.expect {
        if total != expected {
            bail!("Expected {expected} nodes at depth {}, found {total}", args.depth);
        }
        println!("{}", format!("{total} nodes, as expected").green());
    }

    Ok(())
}
