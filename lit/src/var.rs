use std::ops;

use super::{lit::Lit, pol::Pol};

/// Numeric identifier for a variable.
///
/// Every node of a network defines exactly one variable, so a `Var` doubles as the node's id. The
/// variable with index `0` is reserved for the constant false node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Var(u32);

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            write!(f, "0")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

impl ops::BitXor<Pol> for Var {
    type Output = Lit;

    fn bitxor(self, rhs: Pol) -> Self::Output {
        self.lit(rhs)
    }
}

impl ops::BitXor<bool> for Var {
    type Output = Lit;

    fn bitxor(self, rhs: bool) -> Self::Output {
        self.lit(Pol::neg_if(rhs))
    }
}

impl Var {
    /// The variable representing constant false/0/low.
    pub const FALSE: Self = Var(0);

    /// The largest valid [`index`][`Self::index`] for a variable.
    pub const MAX_INDEX: usize = (u32::MAX >> 1) as usize;

    /// Returns the variable for a given index.
    ///
    /// Panics if `index > Var::MAX_INDEX`.
    #[inline(always)]
    #[track_caller]
    pub fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX_INDEX);
        Var(index as u32)
    }

    /// Returns the index of the variable.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the literal for this variable with the given polarity.
    #[inline(always)]
    pub fn lit(self, pol: Pol) -> Lit {
        Lit::from_code((self.index() << 1) | (pol as usize))
    }

    /// Returns a positive polarity literal for the variable.
    #[inline(always)]
    pub fn as_lit(self) -> Lit {
        self.lit(Pol::Pos)
    }

    /// Returns a negative polarity literal for the variable.
    #[inline(always)]
    pub fn as_neg_lit(self) -> Lit {
        self.lit(Pol::Neg)
    }
}
