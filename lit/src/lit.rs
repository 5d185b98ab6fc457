use std::ops;

use super::{
    pol::{Negate, Pol},
    var::Var,
};

/// Numeric identifier for a Boolean literal.
///
/// A literal consists of a [variable][`Var`] and a [polarity][`Pol`]. Both are combined into a
/// single number, called the [`code`][`Self::code`]: the variable index shifted one bit to the
/// left, with the least significant bit set for negative polarity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Lit(u32);

impl std::fmt::Debug for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::fmt::Display for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.var() == Var::FALSE {
            return match self.pol() {
                Pol::Pos => write!(f, "0"),
                Pol::Neg => write!(f, "1"),
            };
        }
        let prefix = match self.pol() {
            Pol::Pos => "",
            Pol::Neg => "!",
        };
        write!(f, "{}{}", prefix, self.var())
    }
}

impl From<Var> for Lit {
    #[inline(always)]
    fn from(var: Var) -> Self {
        var.as_lit()
    }
}

impl Lit {
    /// The literal representing constant false/0/low.
    pub const FALSE: Self = Lit(0);
    /// The literal representing constant true/1/high.
    pub const TRUE: Self = Lit(1);

    /// The largest valid [`code`][`Self::code`] for a literal.
    pub const MAX_CODE: usize = u32::MAX as usize;

    /// Returns the literal for a given code.
    #[inline(always)]
    #[track_caller]
    pub fn from_code(code: usize) -> Self {
        assert!(code <= Self::MAX_CODE);
        Lit(code as u32)
    }

    /// Returns the variable of the literal.
    #[inline(always)]
    pub fn var(self) -> Var {
        Var::from_index((self.0 >> 1) as usize)
    }

    /// Returns the polarity of the literal.
    #[inline(always)]
    pub fn pol(self) -> Pol {
        Pol::neg_if(self.0 & 1 != 0)
    }

    /// Returns the positive polarity literal with the same variable.
    #[inline(always)]
    pub fn as_pos(self) -> Self {
        Lit(self.0 & !1)
    }

    /// Returns whether this literal has positive polarity.
    #[inline(always)]
    pub fn is_pos(self) -> bool {
        self.pol() == Pol::Pos
    }

    /// Returns whether this literal has negative polarity.
    #[inline(always)]
    pub fn is_neg(self) -> bool {
        self.pol() == Pol::Neg
    }

    /// This is equivalent to `f(self.var()) ^ self.pol()`.
    #[inline(always)]
    pub fn lookup<T: Negate>(self, f: impl FnOnce(Var) -> T) -> T::Negated {
        f(self.var()) ^ self.pol()
    }

    /// Returns the index of the literal's variable.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.var().index()
    }

    /// Returns the literal's code.
    #[inline(always)]
    pub fn code(self) -> usize {
        self.0 as usize
    }

    /// Returns whether this literal is [`Self::FALSE`] or [`Self::TRUE`].
    #[inline(always)]
    pub fn is_const(&self) -> bool {
        self.0 < 2
    }
}

impl ops::BitXor<Pol> for Lit {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Pol) -> Self::Output {
        Lit(self.0 ^ rhs as u32)
    }
}

impl ops::BitXorAssign<Pol> for Lit {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Pol) {
        *self = *self ^ rhs;
    }
}

impl ops::BitXor<bool> for Lit {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self::Output {
        Lit(self.0 ^ rhs as u32)
    }
}

impl ops::Not for Lit {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self::Output {
        Lit(self.0 ^ 1)
    }
}

impl Negate for Lit {
    type Negated = Lit;
}

impl flussab_aiger::Lit for Lit {
    const MAX_CODE: usize = Lit::MAX_CODE;

    #[inline(always)]
    fn from_code(code: usize) -> Self {
        Lit::from_code(code)
    }

    #[inline(always)]
    fn code(self) -> usize {
        Lit::code(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarities() {
        let v = Var::from_index(1);

        let l0 = v.as_lit();
        assert!(l0.is_pos());
        assert!(l0.as_pos().is_pos());
        assert!((!l0).is_neg());
        let l1 = v.as_neg_lit();
        assert!(l1.is_neg());
        assert!(l1.as_pos().is_pos());
        assert_eq!(l1.var(), v);
    }

    #[test]
    fn lookup_applies_polarity() {
        let v = Var::from_index(7);
        assert!(!v.as_neg_lit().lookup(|var| var == v));
        assert_eq!((!v.as_lit()).lookup(|_| 0u64), !0);
        assert_eq!(format!("{}", v.as_neg_lit()), "!v7");
        assert_eq!(format!("{}", Lit::TRUE), "1");
    }
}
