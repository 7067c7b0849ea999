/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, File, PieceKind, Rank, Square};

use crate::{psqt, Position, Psqt, Score};

/// Number of distinct piece kinds.
const NUM_PIECE_KINDS: usize = 6;

/// Number of files on the board.
const NUM_FILES: usize = 8;

/// The constant parameters of the static evaluation.
///
/// All values are in centipawns except `mobility`, which is already a [`Score`] per legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationWeights {
    /// Material value of each piece kind, indexed Pawn, Knight, Bishop, Rook, Queen, King.
    pub material: [i32; NUM_PIECE_KINDS],

    /// Piece-Square table of each piece kind, in the same order as `material`.
    pub psqt: [Psqt; NUM_PIECE_KINDS],

    /// Penalty for every pawn beyond the first on a single file.
    pub doubled_pawn_penalty: i32,

    /// Bonus for every legal move available to the side to move.
    pub mobility: Score,
}

impl EvaluationWeights {
    /// Material value of `kind`, in centipawns.
    #[inline(always)]
    pub const fn value_of(&self, kind: PieceKind) -> i32 {
        self.material[kind_index(kind)]
    }

    /// Piece-Square table of `kind`.
    #[inline(always)]
    pub const fn psqt_of(&self, kind: PieceKind) -> &Psqt {
        &self.psqt[kind_index(kind)]
    }
}

impl Default for EvaluationWeights {
    /// Values are obtained from here: <https://www.chessprogramming.org/Simplified_Evaluation_Function>
    fn default() -> Self {
        Self {
            material: [100, 320, 330, 500, 900, 20_000],
            psqt: [
                psqt::PAWN,
                psqt::KNIGHT,
                psqt::BISHOP,
                psqt::ROOK,
                psqt::QUEEN,
                psqt::KING,
            ],
            doubled_pawn_penalty: 10,
            mobility: Score::new(1),
        }
    }
}

/// Encapsulates the logic of scoring a chess position.
///
/// The evaluation is built as a White-minus-Black differential and then reported from the side-to-move's perspective,
/// so that a positive number is good for whoever is about to move.
///
/// Checkmates do not follow that rule: they score `-INF` whenever White is to move and `+INF` whenever Black is.
/// The pawn-structure and mobility terms are also flipped by the side to move *before* the final flip,
/// so they end up flipped twice.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The position to evaluate.
    position: &'a Position,

    /// The parameters to evaluate with.
    weights: &'a EvaluationWeights,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for `position`.
    #[inline(always)]
    pub fn new(position: &'a Position, weights: &'a EvaluationWeights) -> Self {
        Self { position, weights }
    }

    /// Evaluate this position.
    ///
    /// Does not modify the position.
    pub fn eval(&self) -> Score {
        let stm = self.position.side_to_move();
        let legal_moves = self.position.mobility();

        if legal_moves == 0 {
            if !self.position.is_check() {
                return Score::DRAW;
            }

            return if stm.is_white() {
                -Score::INF
            } else {
                Score::INF
            };
        }

        if self.position.is_insufficient_material() || self.position.is_seventyfive_moves() {
            return Score::DRAW;
        }

        let raw = self.material()
            + self.positional()
            + self.pawn_structure()
            + self.mobility_of(legal_moves);

        if stm.is_white() {
            raw
        } else {
            -raw
        }
    }

    /// Material balance, White minus Black.
    pub fn material(&self) -> Score {
        let cp = self.position.occupied().fold(0, |acc, (_, piece)| {
            let value = self.weights.value_of(piece.kind());
            if piece.color().is_white() {
                acc + value
            } else {
                acc - value
            }
        });

        Score::from_cp(cp)
    }

    /// Piece-Square table balance, White minus Black.
    ///
    /// Black pieces read their tables at the vertically mirrored square.
    pub fn positional(&self) -> Score {
        let cp = self.position.occupied().fold(0, |acc, (square, piece)| {
            let value = self
                .weights
                .psqt_of(piece.kind())
                .get_relative(square, piece.color());
            if piece.color().is_white() {
                acc + value
            } else {
                acc - value
            }
        });

        Score::from_cp(cp)
    }

    /// Penalty for doubled (or tripled, ...) pawns, White minus Black, then flipped to the side-to-move's view.
    pub fn pawn_structure(&self) -> Score {
        let white = pawns_per_file(self.position, Color::White);
        let black = pawns_per_file(self.position, Color::Black);
        let penalty = self.weights.doubled_pawn_penalty;

        let cp = white.iter().zip(black).fold(0, |acc, (&w, b)| {
            acc - penalty * (w - 1).max(0) + penalty * (b - 1).max(0)
        });

        let score = Score::from_cp(cp);
        if self.position.side_to_move().is_white() {
            score
        } else {
            -score
        }
    }

    /// Bonus for the number of legal moves of the side to move, negated if Black is to move.
    pub fn mobility(&self) -> Score {
        self.mobility_of(self.position.mobility())
    }

    #[inline(always)]
    fn mobility_of(&self, legal_moves: usize) -> Score {
        let bonus = self.weights.mobility * legal_moves as i32;
        if self.position.side_to_move().is_white() {
            bonus
        } else {
            -bonus
        }
    }

    /// Material plus table value of the piece on `square`, positive for White pieces.
    ///
    /// Only used when printing the evaluator
    fn value_at(&self, square: Square) -> Option<Score> {
        self.position.piece_at(square).map(|piece| {
            let cp = self.weights.value_of(piece.kind())
                + self
                    .weights
                    .psqt_of(piece.kind())
                    .get_relative(square, piece.color());

            if piece.color().is_white() {
                Score::from_cp(cp)
            } else {
                -Score::from_cp(cp)
            }
        })
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-------+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;

            // Step 1: Write the piece char
            for file in File::iter() {
                let square = Square::new(file, rank);
                let piece_char = self
                    .position
                    .piece_at(square)
                    .map(|p| p.char())
                    .unwrap_or(' ');
                write!(f, "   {piece_char}   |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for file in File::iter() {
                let square = Square::new(file, rank);
                let contribution = self
                    .value_at(square)
                    .map(|value| value.centipawns().to_string())
                    .unwrap_or_default();
                write!(f, "{contribution:^7}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-------+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "       {file}")?;
        }

        writeln!(f, "\n\nMaterial:       {}", self.material())?;
        writeln!(f, "Positional:     {}", self.positional())?;
        writeln!(f, "Pawn structure: {}", self.pawn_structure())?;
        write!(f, "Mobility:       {}", self.mobility())
    }
}

/// Index of `kind` into the per-kind arrays of [`EvaluationWeights`].
#[inline(always)]
const fn kind_index(kind: PieceKind) -> usize {
    match kind {
        PieceKind::Pawn => 0,
        PieceKind::Knight => 1,
        PieceKind::Bishop => 2,
        PieceKind::Rook => 3,
        PieceKind::Queen => 4,
        PieceKind::King => 5,
    }
}

/// Counts the pawns of `color` on every file.
fn pawns_per_file(position: &Position, color: Color) -> [i32; NUM_FILES] {
    let mut counts = [0; NUM_FILES];
    for square in position.pieces(PieceKind::Pawn, color) {
        counts[square.file().index()] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> Score {
        let position: Position = fen.parse().unwrap();
        Evaluator::new(&position, &EvaluationWeights::default()).eval()
    }

    #[test]
    fn test_startpos_only_scores_mobility() {
        // Twenty legal moves at a tenth of a centipawn each
        let weights = EvaluationWeights::default();
        let mut position = Position::default();
        assert_eq!(Evaluator::new(&position, &weights).eval(), Score::new(20));

        // Black to move: material and tables cancel, and mobility is flipped twice
        position.toggle_side_to_move();
        assert_eq!(Evaluator::new(&position, &weights).eval(), Score::new(20));
    }

    #[test]
    fn test_checkmate_sign_follows_side_to_move() {
        // White is mated
        assert_eq!(
            eval("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
            -Score::INF
        );

        // Black is mated
        assert_eq!(
            eval("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4"),
            Score::INF
        );
    }

    #[test]
    fn test_draws_score_zero() {
        // Stalemate, despite White being a queen up
        assert_eq!(eval("k7/8/KQ6/8/8/8/8/8 b - - 0 1"), Score::DRAW);

        // Insufficient material
        assert_eq!(eval("8/4k3/8/8/3K4/8/5B2/8 w - - 0 1"), Score::DRAW);

        // 75-move rule
        assert_eq!(eval("4k3/8/8/8/8/8/4P3/4K3 w - - 150 120"), Score::DRAW);
    }

    #[test]
    fn test_material_favours_side_to_move() {
        // White is up a queen
        assert!(eval("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1") > Score::from_cp(800));

        // Black is up a queen, and it is Black's turn
        assert!(eval("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR b KQkq - 0 1") > Score::from_cp(800));
    }

    #[test]
    fn test_flipping_turn_negates_static_terms() {
        // Symmetric position without doubled pawns, so the pawn structure term is zero
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p3/4P3/2N2N2/PPPP1PPP/R1BQKB1R w KQkq - 4 4";
        let weights = EvaluationWeights::default();

        let white: Position = fen.parse().unwrap();
        let mut black = white.clone();
        black.toggle_side_to_move();

        let white_eval = Evaluator::new(&white, &weights);
        let black_eval = Evaluator::new(&black, &weights);
        assert_eq!(white_eval.pawn_structure(), Score::DRAW);
        assert_eq!(black_eval.pawn_structure(), Score::DRAW);

        // Mobility ends up positive for the mover either way, so remove it before comparing
        let white_static = white_eval.eval() - white_eval.mobility();
        let black_static = black_eval.eval() + black_eval.mobility();
        assert_eq!(white_static, -black_static);

        // Now break the symmetry with an extra White knight
        let white: Position = "r1bqkb1r/pppp1ppp/2n2n2/4p3/4P3/2N2N2/PPPP1PPP/RNBQKB1R w KQkq - 4 4"
            .parse()
            .unwrap();
        let mut black = white.clone();
        black.toggle_side_to_move();

        let white_eval = Evaluator::new(&white, &weights);
        let black_eval = Evaluator::new(&black, &weights);
        let white_static = white_eval.eval() - white_eval.mobility();
        let black_static = black_eval.eval() + black_eval.mobility();
        assert!(white_static > Score::DRAW);
        assert_eq!(white_static, -black_static);
    }

    #[test]
    fn test_mirrored_knights_cancel() {
        let weights = EvaluationWeights::default();

        // White knight on c3, Black knight on c6, kings on mirrored squares
        let position: Position = "k7/8/2n5/8/8/2N5/8/K7 w - - 0 1".parse().unwrap();
        let evaluator = Evaluator::new(&position, &weights);
        assert_eq!(evaluator.material(), Score::DRAW);
        assert_eq!(evaluator.positional(), Score::DRAW);

        // The White knight alone contributes exactly the opposite of the Black knight alone
        let white: Position = "k7/8/8/8/8/2N5/8/K7 w - - 0 1".parse().unwrap();
        let black: Position = "k7/8/2n5/8/8/8/8/K7 w - - 0 1".parse().unwrap();
        let white_bonus = Evaluator::new(&white, &weights).positional();
        let black_bonus = Evaluator::new(&black, &weights).positional();
        assert_eq!(white_bonus, Score::from_cp(10));
        assert_eq!(white_bonus, -black_bonus);
    }

    #[test]
    fn test_doubled_pawns_score_lower() {
        // Pawns on c3, c4, c5 versus f3, b4, c5; the table values of both sets add up to zero
        let stacked = eval("4k3/8/8/2P5/2P5/2P5/8/4K3 w - - 0 1");
        let spread = eval("4k3/8/8/2P5/1P6/5P2/8/4K3 w - - 0 1");
        assert!(stacked < spread, "{stacked} should be less than {spread}");

        let weights = EvaluationWeights::default();
        let position: Position = "4k3/8/8/2P5/2P5/2P5/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(
            Evaluator::new(&position, &weights).pawn_structure(),
            Score::from_cp(-20)
        );
    }

    #[test]
    fn test_pawn_structure_is_flipped_twice() {
        // Doubled White pawns hurt White's score regardless of whose turn it is
        let weights = EvaluationWeights::default();
        let white: Position = "4k3/8/8/8/2P5/2P5/8/4K3 w - - 0 1".parse().unwrap();
        let mut black = white.clone();
        black.toggle_side_to_move();

        let white_eval = Evaluator::new(&white, &weights);
        let black_eval = Evaluator::new(&black, &weights);
        assert_eq!(white_eval.pawn_structure(), Score::from_cp(-10));
        assert_eq!(black_eval.pawn_structure(), Score::from_cp(10));

        // The final flip turns the Black-to-move helper value back into a White-relative penalty
        let black_static = black_eval.material() + black_eval.positional();
        assert_eq!(
            black_eval.eval(),
            -(black_static + black_eval.pawn_structure() + black_eval.mobility())
        );
        assert_eq!(
            black_eval.eval() + black_static,
            Score::from_cp(-10) - black_eval.mobility()
        );
    }
}
