//! Polarity of a literal.
use std::ops;

/// Either the identity function on, or negation of Booleans.
///
/// Using a separate type instead of `bool` avoids having to pick whether `true` means "negated" or
/// "kept" at every use site.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Pol {
    /// Positive polarity, represents the identity function.
    #[default]
    Pos = 0,
    /// Negative polarity, represents Boolean negation.
    Neg = 1,
}

impl std::fmt::Debug for Pol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::fmt::Display for Pol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pos => write!(f, "="),
            Self::Neg => write!(f, "!"),
        }
    }
}

impl Pol {
    /// Returns the negative polarity if the given condition is `true` and a positive polarity
    /// otherwise.
    #[inline(always)]
    pub fn neg_if(neg: bool) -> Self {
        if neg {
            Pol::Neg
        } else {
            Pol::Pos
        }
    }

    /// Returns `true` when this is the negative polarity.
    #[inline(always)]
    pub fn is_neg(self) -> bool {
        self == Pol::Neg
    }

    /// Returns `true` when this is the positive polarity.
    #[inline(always)]
    pub fn is_pos(self) -> bool {
        self == Pol::Pos
    }
}

impl ops::BitXor for Pol {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Pol::neg_if(self.is_neg() ^ rhs.is_neg())
    }
}

impl ops::BitXorAssign for Pol {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs
    }
}

impl ops::BitXor<Pol> for bool {
    type Output = bool;

    fn bitxor(self, rhs: Pol) -> Self::Output {
        self ^ rhs.is_neg()
    }
}

impl ops::BitXor<Pol> for u64 {
    type Output = u64;

    fn bitxor(self, rhs: Pol) -> Self::Output {
        self ^ match rhs {
            Pol::Pos => 0,
            Pol::Neg => !0,
        }
    }
}

impl ops::Not for Pol {
    type Output = Self;

    fn not(self) -> Self::Output {
        self ^ Pol::Neg
    }
}

/// Types that can be negated by applying a [`Pol`].
pub trait Negate: ops::BitXor<Pol, Output = Self::Negated> {
    /// Result of applying a polarity.
    type Negated;
}

impl Negate for Pol {
    type Negated = Pol;
}

impl Negate for bool {
    type Negated = bool;
}

impl Negate for u64 {
    type Negated = u64;
}
