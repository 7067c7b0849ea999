/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use uci_parser::UciScore;

/// A numerical evaluation of a position, in tenths of a [centipawn](https://www.chessprogramming.org/Score).
///
/// The finer unit lets the mobility term (a tenth of a centipawn per legal move) stay exact in integer arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub(crate) i32);

impl Score {
    /// Number of internal units in a single centipawn.
    pub const UNITS_PER_CP: i32 = 10;

    /// Sentinel used for checkmates and as the initial search bounds.
    ///
    /// No sum of heuristic terms can reach this magnitude.
    pub const INF: Self = Self(i32::MAX);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Creates a [`Score`] from raw internal units.
    #[inline(always)]
    pub const fn new(units: i32) -> Self {
        Self(units)
    }

    /// Creates a [`Score`] from a value in centipawns.
    #[inline(always)]
    pub const fn from_cp(cp: i32) -> Self {
        Self(cp * Self::UNITS_PER_CP)
    }

    /// Returns this [`Score`] in whole centipawns, rounded toward zero.
    #[inline(always)]
    pub const fn centipawns(&self) -> i32 {
        self.0 / Self::UNITS_PER_CP
    }

    /// Returns `true` if this score is one of the `±INF` sentinels.
    #[inline(always)]
    pub const fn is_sentinel(&self) -> bool {
        self.0 == Self::INF.0 || self.0 == -Self::INF.0
    }

    /// Converts this [`Score`] into a [`UciScore`], if it is a heuristic score.
    ///
    /// Sentinels carry no distance to mate, so they are not reported.
    #[inline(always)]
    pub fn into_uci(self) -> Option<UciScore> {
        (!self.is_sentinel()).then(|| UciScore::cp(self.centipawns()))
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<i32> for Score {
            fn $fn(&mut self, rhs: i32) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl fmt::Display for Score {
    /// Sentinels print as `+inf` / `-inf`, everything else as centipawns with one decimal place.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INF {
            write!(f, "+inf")
        } else if *self == -Self::INF {
            write!(f, "-inf")
        } else {
            let sign = if self.0 < 0 { "-" } else { "" };
            let units = self.0.unsigned_abs();
            let per_cp = Self::UNITS_PER_CP as u32;
            write!(f, "{sign}{}.{}", units / per_cp, units % per_cp)
        }
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({self})")
    }
}
