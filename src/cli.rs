/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use chessie::Color;
use clap::{Parser, ValueEnum};
use uci_parser::UciCommand;

use crate::DEFAULT_DEPTH;

/// Command-line arguments of the engine binary.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Number of plies to search when choosing a move.
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// The side played by the human when using `play`.
    #[arg(short, long, value_enum, default_value_t = Side::White)]
    pub player: Side,

    /// Starting position, as a FEN string. Defaults to the standard starting position.
    #[arg(short, long)]
    pub fen: Option<String>,
}

/// One of the two sides, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND> | <UCI COMMAND>")
)]
pub enum EngineCommand {
    /// Run a fixed-depth search on a series of positions and report the node count.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece and every term will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "exit")]
    Quit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Flips the side-to-move without moving a piece.
    Flip,

    /// Shows all legal moves in the current position, or those of the piece on a specific square.
    Moves { square: Option<String> },

    /// Play a move for the human side. The engine replies if it is then its turn.
    Play { mv: String },

    /// Take back the last move, and the engine's reply before it if needed to make it the human's turn again.
    Undo,

    /// Start a new game from the standard starting position, with the human playing White.
    New,

    /// Swap sides with the engine. The engine moves immediately if it is its turn.
    Switch,

    /// Print whether the game is over, and whose turn it is.
    Status,

    /// Wrapper over UCI commands sent to the engine.
    #[command(skip)]
    Uci { cmd: UciCommand },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// If this fails, it will attempt to parse the string as a [`UciCommand`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::try_parse_from(s.split_ascii_whitespace()) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                // If parsing failed, attempt to parse as a UciCommand
                if let Ok(cmd) = UciCommand::new(s) {
                    Ok(Self::Uci { cmd })
                } else {
                    Err(e)
                }
            }
        }
    }
}
