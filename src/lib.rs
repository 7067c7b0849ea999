/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Command-line arguments and the text commands accepted by the engine.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Errors returned by the library API.
mod error;

/// Evaluation of chess positions.
mod eval;

/// A game state with a move stack, and the rules that end a game.
mod position;

/// Piece-Square tables.
pub mod psqt;

/// Evaluation scores and their units.
mod score;

/// Alpha-beta search and root move selection.
mod search;

/// Misc utility constants.
mod utils;

pub use chessie::{Color, Game, Move, PieceKind, Square};

pub use cli::*;
pub use engine::*;
pub use error::*;
pub use eval::*;
pub use position::*;
pub use psqt::Psqt;
pub use score::*;
pub use search::*;
pub use utils::*;
