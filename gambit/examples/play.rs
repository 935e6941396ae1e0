/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use gambit::{CastlingRule, Color, Game, GameOptions, GameStatus, SavedGame, Square, BOARD_SIZE};

/// Play a sequence of moves, then print the resulting game and optionally save it.
#[derive(Debug, Parser)]
struct Cli {
    /// UCI moves to play, such as `e2e4 e7e5`.
    #[arg(required = false)]
    moves: Vec<String>,

    /// Start from this FEN string instead of the standard starting position.
    #[arg(short, long, conflicts_with = "load")]
    fen: Option<String>,

    /// Start from a game previously written with `--save`.
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Write the final game to this file as JSON.
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Take back this many moves after playing.
    #[arg(short, long, default_value_t = 0)]
    undo: usize,

    /// Forbid castling out of, or across, check.
    #[arg(long, default_value = "false")]
    strict_castling: bool,
}

fn print_board(game: &Game) {
    let highlighted: Vec<Square> = game
        .last_move()
        .map(|mv| vec![mv.from(), mv.to()])
        .unwrap_or_default();

    for row in 0..BOARD_SIZE {
        print!("{} ", BOARD_SIZE - row);
        for col in 0..BOARD_SIZE {
            let square = Square::new(row, col);
            let glyph = game
                .board()
                .get(square)
                .map(|piece| piece.symbol())
                .unwrap_or(' ');
            let cell = format!(" {glyph} ");

            let cell = if highlighted.contains(&square) {
                cell.on_yellow()
            } else if (row + col) % 2 == 0 {
                cell.on_bright_white()
            } else {
                cell.on_bright_black()
            };
            print!("{}", cell.black());
        }
        println!();
    }
    println!("   a  b  c  d  e  f  g  h");
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let castling = if args.strict_castling {
        CastlingRule::Strict
    } else {
        CastlingRule::Permissive
    };
    let options = GameOptions { castling };

    let mut game = if let Some(path) = &args.load {
        let json = fs::read_to_string(path).context(format!("Failed to read {path:?}"))?;
        let mut game = Game::with_options(options);
        game.load(&SavedGame::from_json(&json)?)?;
        game
    } else if let Some(fen) = &args.fen {
        let mut game = Game::from_fen(fen)?;
        game.set_options(options);
        game
    } else {
        Game::with_options(options)
    };

    for mv in &args.moves {
        let record = game
            .make_uci_move(mv)
            .context(format!("Failed to play {mv:?}"))?;
        if let Some(captured) = record.captured() {
            println!("{record} captures {}", captured.symbol());
        }
    }

    for _ in 0..args.undo {
        if !game.undo() {
            println!("{}", "Nothing left to undo".dimmed());
            break;
        }
    }

    print_board(&game);
    println!("\n{}", game.to_fen().dimmed());

    let status = match game.status() {
        GameStatus::Playing => game.status().to_string().normal(),
        GameStatus::Check => game.status().to_string().yellow().bold(),
        GameStatus::Checkmate | GameStatus::Stalemate => game.status().to_string().red().bold(),
    };
    println!("{} to move: {status}", game.side_to_move());

    for color in Color::all() {
        let captured: String = game
            .captured_by(color)
            .iter()
            .map(|piece| piece.symbol())
            .collect();
        println!("{color} captured: {captured}");
    }

    if let Some(path) = &args.save {
        fs::write(path, game.save().to_json()?).context(format!("Failed to write {path:?}"))?;
        println!("Saved to {}", path.display().to_string().green());
    }

    Ok(())
}
