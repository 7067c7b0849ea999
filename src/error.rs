/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Errors produced by the engine's library API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A move was requested for a position that has no legal moves.
    #[error("no legal moves available in position {fen:?}")]
    NoLegalMoves { fen: String },

    /// A move string did not name a legal move in the current position.
    #[error("{mv:?} is not a legal move in position {fen:?}")]
    IllegalMove { mv: String, fen: String },
}
