/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Instant;

use chessie::{Color, Move};
use log::{debug, info, warn};
use rand::seq::SliceRandom;

use crate::{EngineError, EvaluationWeights, Evaluator, Position, Score};

/// Depth used when none is configured, in plies.
pub const DEFAULT_DEPTH: usize = 3;

/// The result of a search, containing the best move found, its score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    pub bestmove: Move,

    /// Score of the position after `bestmove` is made, as returned by the search.
    pub score: Score,

    /// Whether `bestmove` was picked at random because no move beat the initial bound.
    pub fallback: bool,
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of plies to search, counting the move made at the root.
    ///
    /// Always at least 1.
    pub depth: usize,
}

impl SearchConfig {
    /// Creates a new [`SearchConfig`] searching `depth` plies.
    ///
    /// A depth of 0 is raised to 1, since the root move itself is always searched.
    #[inline(always)]
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
        }
    }
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

/// A fixed-depth alpha-beta searcher.
///
/// Holds the search depth and evaluation parameters, but no board state:
/// every position it is handed is returned in the same state it arrived in.
#[derive(Debug, Clone, Default)]
pub struct Searcher {
    config: SearchConfig,
    weights: EvaluationWeights,
}

impl Searcher {
    /// Constructs a [`Searcher`] that searches `depth` plies with the default evaluation.
    pub fn new(depth: usize) -> Self {
        Self::with_weights(SearchConfig::new(depth), EvaluationWeights::default())
    }

    /// Constructs a [`Searcher`] from an explicit configuration and evaluation parameters.
    pub fn with_weights(config: SearchConfig, weights: EvaluationWeights) -> Self {
        Self { config, weights }
    }

    /// The configuration of this searcher.
    #[inline(always)]
    pub const fn config(&self) -> SearchConfig {
        self.config
    }

    /// The evaluation parameters of this searcher.
    #[inline(always)]
    pub const fn weights(&self) -> &EvaluationWeights {
        &self.weights
    }

    /// Statically evaluates `position`. See [`Evaluator`] for the sign conventions.
    pub fn evaluate(&self, position: &Position) -> Score {
        Evaluator::new(position, &self.weights).eval()
    }

    /// Selects a move to play in `position`.
    ///
    /// Fails only if there are no legal moves.
    pub fn find_best_move(&self, position: &mut Position) -> Result<Move, EngineError> {
        self.search(position).map(|res| res.bestmove)
    }

    /// Searches `position` to the configured depth, returning the chosen move and search statistics.
    pub fn search(&self, position: &mut Position) -> Result<SearchResult, EngineError> {
        Search::new(position, &self.weights, self.config).start()
    }
}

/// Executes a single search on the provided position.
pub struct Search<'a> {
    /// The position to search on.
    ///
    /// Moves are played on it and undone in place, so it is back to its original state whenever control returns to the caller.
    position: &'a mut Position,

    /// Parameters for the static evaluation at the leaves.
    weights: &'a EvaluationWeights,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Number of nodes visited so far.
    nodes: u64,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute on the provided [`Position`].
    #[inline(always)]
    pub fn new(position: &'a mut Position, weights: &'a EvaluationWeights, config: SearchConfig) -> Self {
        Self {
            position,
            weights,
            config,
            nodes: 0,
        }
    }

    /// Start the search, returning the selected move.
    ///
    /// Every root move is searched with a full window. White keeps the highest score and Black the lowest,
    /// with ties going to the move generated first.
    pub fn start(mut self) -> Result<SearchResult, EngineError> {
        let starttime = Instant::now();
        let mover = self.position.side_to_move();

        let mut best_score = if mover.is_white() {
            -Score::INF
        } else {
            Score::INF
        };
        let mut bestmove = None;

        for mv in self.position.legal_moves() {
            self.position.push(mv);
            // Maximize at the first reply exactly when it is Black's turn to reply
            let maximizing = self.position.side_to_move() == Color::Black;
            let score = self.alpha_beta(self.config.depth - 1, -Score::INF, Score::INF, maximizing);
            self.position.pop();

            debug!("root move {mv} scored {score}");

            let improves = if mover.is_white() {
                score > best_score
            } else {
                score < best_score
            };

            if improves {
                best_score = score;
                bestmove = Some(mv);
            }
        }

        let (bestmove, fallback) = match bestmove {
            Some(mv) => (mv, false),
            None => {
                let mv = random_move(self.position)?;
                warn!("no move improved on {best_score}, playing random move {mv}");
                (mv, true)
            }
        };

        info!(
            "depth {} bestmove {bestmove} score {best_score} nodes {} time {}ms",
            self.config.depth,
            self.nodes,
            starttime.elapsed().as_millis()
        );

        Ok(SearchResult {
            nodes: self.nodes,
            bestmove,
            score: best_score,
            fallback,
        })
    }

    /// Depth-limited minimax with [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta).
    ///
    /// Moves are searched in generation order, and the loop stops as soon as `beta <= alpha`.
    /// If a non-terminal node somehow has no moves, the initial bound is returned as-is.
    fn alpha_beta(&mut self, depth: usize, mut alpha: Score, mut beta: Score, maximizing: bool) -> Score {
        self.nodes += 1;

        if depth == 0 || self.position.is_game_over() {
            return Evaluator::new(self.position, self.weights).eval();
        }

        if maximizing {
            let mut best = -Score::INF;

            for mv in self.position.legal_moves() {
                self.position.push(mv);
                let score = self.alpha_beta(depth - 1, alpha, beta, false);
                self.position.pop();

                if score > best {
                    best = score;
                }
                if score > alpha {
                    alpha = score;
                }
                if beta <= alpha {
                    break;
                }
            }

            best
        } else {
            let mut best = Score::INF;

            for mv in self.position.legal_moves() {
                self.position.push(mv);
                let score = self.alpha_beta(depth - 1, alpha, beta, true);
                self.position.pop();

                if score < best {
                    best = score;
                }
                if score < beta {
                    beta = score;
                }
                if beta <= alpha {
                    break;
                }
            }

            best
        }
    }
}

/// Chooses a legal move uniformly at random.
pub fn random_move(position: &Position) -> Result<Move, EngineError> {
    position
        .legal_moves()
        .choose(&mut rand::thread_rng())
        .copied()
        .ok_or_else(|| EngineError::NoLegalMoves {
            fen: position.to_fen(),
        })
}
