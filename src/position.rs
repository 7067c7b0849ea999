/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::Result;
use chessie::{Color, Game, Move, Piece, PieceKind, Square};

use crate::EngineError;

/// Half-moves without a capture or pawn move after which the game is drawn automatically.
const SEVENTYFIVE_MOVE_LIMIT: usize = 150;

/// Number of occurrences of the same position that ends the game automatically.
const FIVEFOLD: usize = 5;

/// The way a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

impl Outcome {
    /// The game result in PGN notation.
    pub fn result(&self) -> &'static str {
        match self {
            Self::Checkmate { winner } if winner.is_white() => "1-0",
            Self::Checkmate { .. } => "0-1",
            _ => "1/2-1/2",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Checkmate { winner } if winner.is_white() => "White wins by checkmate",
            Self::Checkmate { .. } => "Black wins by checkmate",
            Self::Stalemate => "draw by stalemate",
            Self::InsufficientMaterial => "draw by insufficient material",
            Self::SeventyFiveMoves => "draw by the 75-move rule",
            Self::FivefoldRepetition => "draw by fivefold repetition",
        };

        write!(f, "{} ({reason})", self.result())
    }
}

/// A chess position that can be explored by playing and undoing moves in place.
///
/// All rules (move generation, check detection, FEN handling) are delegated to [`chessie`].
/// This type adds the move stack needed to undo moves, and the game-ending conditions
/// the search treats as terminal.
///
/// Every [`Position::push`] must be matched by a [`Position::pop`] before anyone else looks at the position,
/// so that no branch of a search ever observes a move made by another branch.
#[derive(Debug, Clone, Default)]
pub struct Position {
    /// The current state of the game.
    game: Game,

    /// The state before each applied move, oldest first.
    previous: Vec<Game>,

    /// Every move applied since this position was created, oldest first.
    moves: Vec<Move>,
}

impl Position {
    /// Creates a new [`Position`] starting from `game`, with an empty move history.
    #[inline(always)]
    pub fn new(game: Game) -> Self {
        Self {
            game,
            previous: Vec::new(),
            moves: Vec::new(),
        }
    }

    /// Parses a [`Position`] from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Game::from_fen(fen)?))
    }

    /// Generates a FEN string for the current state.
    #[inline(always)]
    pub fn to_fen(&self) -> String {
        self.game.to_fen()
    }

    /// The underlying game state.
    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// The color whose turn it is.
    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.game.side_to_move()
    }

    /// Every move applied so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[Move] {
        &self.moves
    }

    /// All legal moves, in the order the rules engine generates them.
    #[inline(always)]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.game.get_legal_moves().into_iter().collect()
    }

    /// All legal moves of the piece standing on `square`.
    pub fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.game
            .get_legal_moves()
            .into_iter()
            .filter(|mv| mv.from() == square)
            .collect()
    }

    /// Number of legal moves available to the side to move.
    #[inline(always)]
    pub fn mobility(&self) -> usize {
        self.game.get_legal_moves().len()
    }

    /// Looks up the legal move written as `uci` (such as `e2e4` or `e7e8q`).
    pub fn find_move(&self, uci: &str) -> Result<Move, EngineError> {
        self.game
            .get_legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == uci)
            .ok_or_else(|| EngineError::IllegalMove {
                mv: uci.to_string(),
                fen: self.to_fen(),
            })
    }

    /// Plays `mv` in place. It must be legal in the current position.
    #[inline(always)]
    pub fn push(&mut self, mv: Move) {
        self.previous.push(self.game);
        self.moves.push(mv);
        self.game.make_move(mv);
    }

    /// Undoes the most recent [`Position::push`], returning the move that was undone.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<Move> {
        let mv = self.moves.pop()?;
        // Both stacks grow and shrink together
        if let Some(game) = self.previous.pop() {
            self.game = game;
        }
        Some(mv)
    }

    /// Gives the move to the other side without moving a piece.
    ///
    /// The move history is not affected.
    pub fn toggle_side_to_move(&mut self) {
        self.game.toggle_side_to_move();
    }

    /// Returns the piece on `square`, if any.
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.game.piece_at(square)
    }

    /// Every occupied square together with its piece.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.game.board().into_iter()
    }

    /// Every square holding a piece of `kind` and `color`.
    pub fn pieces(&self, kind: PieceKind, color: Color) -> impl Iterator<Item = Square> + '_ {
        self.occupied()
            .filter(move |(_, piece)| piece.kind() == kind && piece.color() == color)
            .map(|(square, _)| square)
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_check(&self) -> bool {
        self.game.is_in_check()
    }

    /// Returns `true` if the side to move is in check and has no legal moves.
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.game.get_legal_moves().is_empty()
    }

    /// Returns `true` if the side to move is not in check but has no legal moves.
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.game.get_legal_moves().is_empty()
    }

    /// Returns `true` if neither side has enough material left to deliver checkmate.
    #[inline(always)]
    pub fn is_insufficient_material(&self) -> bool {
        self.game.can_draw_by_insufficient_material()
    }

    /// Returns `true` if 75 moves by each side have passed without a capture or pawn move.
    ///
    /// Checkmate on the last move takes precedence.
    pub fn is_seventyfive_moves(&self) -> bool {
        self.game.halfmove() >= SEVENTYFIVE_MOVE_LIMIT && !self.game.get_legal_moves().is_empty()
    }

    /// Returns `true` if the current position has occurred at least five times.
    ///
    /// Only positions since the last capture or pawn move are considered,
    /// since earlier ones can never be repeated.
    pub fn is_fivefold_repetition(&self) -> bool {
        // Five occurrences need at least four round trips of four plies each.
        let reversible = self.game.halfmove().min(self.previous.len());
        if reversible < (FIVEFOLD - 1) * 4 {
            return false;
        }

        let key = repetition_key(&self.game);
        let earlier = self
            .previous
            .iter()
            .rev()
            .take(reversible)
            .skip(1)
            .step_by(2)
            .filter(|game| repetition_key(game) == key)
            .count();

        earlier + 1 >= FIVEFOLD
    }

    /// Returns the [`Outcome`] of the game, if it has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.game.get_legal_moves().is_empty() {
            return Some(if self.is_check() {
                Outcome::Checkmate {
                    winner: self.side_to_move().opponent(),
                }
            } else {
                Outcome::Stalemate
            });
        }

        if self.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.game.halfmove() >= SEVENTYFIVE_MOVE_LIMIT {
            Some(Outcome::SeventyFiveMoves)
        } else if self.is_fivefold_repetition() {
            Some(Outcome::FivefoldRepetition)
        } else {
            None
        }
    }

    /// Returns `true` if the game has ended for any reason.
    #[inline(always)]
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// The game result in PGN notation, or `*` if the game is still running.
    pub fn result(&self) -> &'static str {
        self.outcome().map(|o| o.result()).unwrap_or("*")
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.game)
    }
}

/// The parts of a FEN that decide whether two positions are the same for repetition purposes:
/// piece placement, side to move, castling rights, and the en passant square if a pawn can capture onto it.
fn repetition_key(game: &Game) -> String {
    let fen = game.to_fen();
    let mut fields = fen.split_ascii_whitespace();
    let mut key = fields.by_ref().take(3).collect::<Vec<_>>().join(" ");

    let ep_square = fields.next().and_then(|field| field.parse::<Square>().ok());
    match ep_square {
        Some(square) if can_capture_en_passant(game, square) => {
            key.push(' ');
            key.push_str(&square.to_string());
        }
        _ => key.push_str(" -"),
    }

    key
}

/// Returns `true` if a pawn of the side to move can legally move onto `square`.
///
/// The en passant square is always empty and behind an enemy pawn, so any such move is an en passant capture.
fn can_capture_en_passant(game: &Game, square: Square) -> bool {
    game.get_legal_moves().into_iter().any(|mv| {
        mv.to() == square
            && game
                .piece_at(mv.from())
                .is_some_and(|piece| piece.kind() == PieceKind::Pawn)
    })
}
