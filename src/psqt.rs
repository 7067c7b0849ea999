/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, File, PieceKind, Rank, Square};

/// Piece-Square tables from the [Simplified Evaluation Function](https://www.chessprogramming.org/Simplified_Evaluation_Function).
///
/// Written from White's perspective, with A1 first and H8 last.
#[rustfmt::skip]
pub const PAWN: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10, -20, -20,  10,  10,   5,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,   5,  10,  25,  25,  10,   5,   5,
     10,  10,  20,  30,  30,  20,  10,  10,
     50,  50,  50,  50,  50,  50,  50,  50,
      0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
pub const KNIGHT: Psqt = Psqt::new([
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
]);

#[rustfmt::skip]
pub const BISHOP: Psqt = Psqt::new([
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
]);

#[rustfmt::skip]
pub const ROOK: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10,  10,  10,  10,  10,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
]);

#[rustfmt::skip]
pub const QUEEN: Psqt = Psqt::new([
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
]);

#[rustfmt::skip]
pub const KING: Psqt = Psqt::new([
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation, in centipawns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// Creates a new [`Psqt`] from values laid out from White's perspective (A1 first).
    pub const fn new(psqt: [i32; Square::COUNT]) -> Self {
        Self(psqt)
    }

    /// Fetch the default table for the provided [`PieceKind`].
    #[inline(always)]
    pub const fn for_kind(kind: PieceKind) -> &'static Self {
        match kind {
            PieceKind::Pawn => &PAWN,
            PieceKind::Knight => &KNIGHT,
            PieceKind::Bishop => &BISHOP,
            PieceKind::Rook => &ROOK,
            PieceKind::Queen => &QUEEN,
            PieceKind::King => &KING,
        }
    }

    /// Get the value of this PSQT at the provided square, as seen by White.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square, relative to `color`.
    ///
    /// For Black the square is mirrored vertically, so A8 reads the A1 entry.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, color: Color) -> i32 {
        self.get(square.rank_relative_to(color))
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it as a board, rank 8 at the top (White's perspective).
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if f.alternate() {
            Color::Black
        } else {
            Color::White
        };

        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let value = self.get_relative(Square::new(file, rank), color);
                write!(f, "{value:4} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "-----")?;
        }
        write!(f, "\n    ")?;
        for file in File::iter() {
            write!(f, "{file}    ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrored_square_reads_same_entry() {
        for square in Square::iter() {
            for kind in PieceKind::all() {
                let table = Psqt::for_kind(kind);
                let white = table.get_relative(square, Color::White);
                let black = table.get_relative(square.rank_relative_to(Color::Black), Color::Black);

                assert_eq!(white, black, "{kind:?} on {square}: {white} (white) != {black} (black)");
            }
        }
    }

    #[test]
    fn test_tables_are_a1_first() {
        let a1: Square = "a1".parse().unwrap();
        let d2: Square = "d2".parse().unwrap();
        let d7: Square = "d7".parse().unwrap();

        assert_eq!(KING.get(a1), 20);
        assert_eq!(PAWN.get(d2), -20);
        assert_eq!(PAWN.get(d7), 50);

        // A Black pawn on d7 has not moved yet
        assert_eq!(PAWN.get_relative(d7, Color::Black), -20);
    }
}
