//! Truth tables of cut functions.
//!
//! Variable `i` of a cut function corresponds to the `i`-th leaf of the cut, with the leaves
//! sorted by increasing variable index. Bit `j` of the table holds the value of the function for
//! the assignment where variable `i` has the value of bit `i` of `j`.
use std::{fmt::Debug, hash::Hash};

use cutmap_lit::Pol;

/// Bit patterns of the first six variables within a single word.
pub const VAR_MASKS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// Masks for swapping variable `i` with variable `i + 1` inside a word: the bits that stay in
/// place, the bits that move up and the bits that move down.
const SWAP_MASKS: [[u64; 3]; 5] = [
    [
        0x9999_9999_9999_9999,
        0x2222_2222_2222_2222,
        0x4444_4444_4444_4444,
    ],
    [
        0xC3C3_C3C3_C3C3_C3C3,
        0x0C0C_0C0C_0C0C_0C0C,
        0x3030_3030_3030_3030,
    ],
    [
        0xF00F_F00F_F00F_F00F,
        0x00F0_00F0_00F0_00F0,
        0x0F00_0F00_0F00_0F00,
    ],
    [
        0xFF00_00FF_FF00_00FF,
        0x0000_FF00_0000_FF00,
        0x00FF_0000_00FF_0000,
    ],
    [
        0xFFFF_0000_0000_FFFF,
        0x0000_0000_FFFF_0000,
        0x0000_FFFF_0000_0000,
    ],
];

/// Number of words needed for a truth table over `var_count` variables.
pub fn word_count(var_count: usize) -> usize {
    1 << var_count.saturating_sub(6)
}

/// Storage and manipulation of cut function truth tables.
///
/// Implementors only provide the storage, all operations work on the word representation.
/// Tables over fewer than six variables repeat their pattern within the word, which keeps
/// variables beyond the table's variable count independent.
pub trait CutFunction: Clone + Eq + Hash + Debug {
    /// The constant false function over `var_count` variables.
    fn zero(var_count: usize) -> Self;

    /// The words of the truth table.
    fn words(&self) -> &[u64];

    /// Mutable access to the words of the truth table.
    fn words_mut(&mut self) -> &mut [u64];

    /// The projection onto variable `var`.
    fn var(var_count: usize, var: usize) -> Self {
        let mut table = Self::zero(var_count);
        let words = table.words_mut();
        if var < 6 {
            words.fill(VAR_MASKS[var]);
        } else {
            for (index, word) in words.iter_mut().enumerate() {
                if (index >> (var - 6)) & 1 != 0 {
                    *word = !0;
                }
            }
        }
        table
    }

    /// Complements the function in place.
    fn invert(&mut self) {
        for word in self.words_mut() {
            *word = !*word;
        }
    }

    /// Complements the function if `pol` is negative.
    fn apply_pol(&mut self, pol: Pol) {
        if pol.is_neg() {
            self.invert();
        }
    }

    /// Replaces the function by its conjunction with `other`.
    fn and_assign(&mut self, other: &Self) {
        for (word, &other) in self.words_mut().iter_mut().zip(other.words()) {
            *word &= other;
        }
    }

    /// Replaces the function by its exclusive or with `other`.
    fn xor_assign(&mut self, other: &Self) {
        for (word, &other) in self.words_mut().iter_mut().zip(other.words()) {
            *word ^= other;
        }
    }

    /// Uses the function as select input of a multiplexer between `on_true` and `on_false`.
    fn mux_assign(&mut self, on_true: &Self, on_false: &Self) {
        let words = self.words_mut();
        for ((sel, &t), &e) in words.iter_mut().zip(on_true.words()).zip(on_false.words()) {
            *sel = (*sel & t) | (!*sel & e);
        }
    }

    /// Whether the function depends on variable `var`.
    fn depends_on(&self, var: usize) -> bool {
        words_depend_on(self.words(), var)
    }

    /// Exchanges the variables `var` and `var + 1`.
    fn swap_adjacent(&mut self, var: usize) {
        swap_adjacent_in_words(self.words_mut(), var)
    }

    /// Brings the function into the phase where the all-zero assignment maps to false.
    ///
    /// Returns the polarity that restores the original function.
    fn normalize_phase(&mut self) -> Pol {
        if self.words()[0] & 1 != 0 {
            self.invert();
            Pol::Neg
        } else {
            Pol::Pos
        }
    }
}

fn words_depend_on(words: &[u64], var: usize) -> bool {
    if var < 6 {
        let shift = 1 << var;
        let mask = VAR_MASKS[var];
        words.iter().any(|&word| (word & mask) >> shift != word & !mask)
    } else {
        let step = 1 << (var - 6);
        if step >= words.len() {
            return false;
        }
        words
            .chunks_exact(2 * step)
            .any(|chunk| chunk[..step] != chunk[step..])
    }
}

fn swap_adjacent_in_words(words: &mut [u64], var: usize) {
    match var {
        0..=4 => {
            let [keep, up, down] = SWAP_MASKS[var];
            let shift = 1 << var;
            for word in words {
                *word = (*word & keep) | ((*word & up) << shift) | ((*word & down) >> shift);
            }
        }
        5 => {
            for pair in words.chunks_exact_mut(2) {
                let (lo, hi) = (pair[0], pair[1]);
                pair[0] = (lo & 0x0000_0000_FFFF_FFFF) | (hi << 32);
                pair[1] = (lo >> 32) | (hi & 0xFFFF_FFFF_0000_0000);
            }
        }
        _ => {
            let step = 1 << (var - 6);
            for block in words.chunks_exact_mut(4 * step) {
                let (low, high) = block.split_at_mut(2 * step);
                low[step..].swap_with_slice(&mut high[..step]);
            }
        }
    }
}

/// Truth table of at most six variables stored in a single word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WordTruth(pub u64);

impl CutFunction for WordTruth {
    fn zero(var_count: usize) -> Self {
        assert!(var_count <= 6, "single word truth tables support up to 6 variables");
        WordTruth(0)
    }

    #[inline(always)]
    fn words(&self) -> &[u64] {
        std::slice::from_ref(&self.0)
    }

    #[inline(always)]
    fn words_mut(&mut self) -> &mut [u64] {
        std::slice::from_mut(&mut self.0)
    }

    #[inline]
    fn depends_on(&self, var: usize) -> bool {
        if var >= 6 {
            return false;
        }
        let mask = VAR_MASKS[var];
        (self.0 & mask) >> (1 << var) != self.0 & !mask
    }

    #[inline]
    fn swap_adjacent(&mut self, var: usize) {
        let [keep, up, down] = SWAP_MASKS[var];
        let shift = 1 << var;
        self.0 = (self.0 & keep) | ((self.0 & up) << shift) | ((self.0 & down) >> shift);
    }
}

/// Truth table of any number of variables stored as a sequence of words.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct WideTruth(Vec<u64>);

impl WideTruth {
    /// Wraps the given words, whose count must be a power of two.
    pub fn from_words(words: Vec<u64>) -> Self {
        assert!(words.len().is_power_of_two());
        WideTruth(words)
    }
}

impl CutFunction for WideTruth {
    fn zero(var_count: usize) -> Self {
        WideTruth(vec![0; word_count(var_count)])
    }

    fn words(&self) -> &[u64] {
        &self.0
    }

    fn words_mut(&mut self) -> &mut [u64] {
        &mut self.0
    }
}

/// Re-expresses a function over the leaves `from` as a function over the leaves `to`.
///
/// Both leaf lists are sorted and `from` must be a subset of `to`. The function must be wide
/// enough for `to.len()` variables.
pub fn stretch<F: CutFunction, T: Ord>(function: &mut F, from: &[T], to: &[T]) {
    let mut remaining = from.len();
    for position in (0..to.len()).rev() {
        if remaining == 0 {
            break;
        }
        if from[remaining - 1] == to[position] {
            remaining -= 1;
            for var in remaining..position {
                function.swap_adjacent(var);
            }
        }
    }
    debug_assert_eq!(remaining, 0, "leaves are not a subset of the target leaves");
}

/// Removes the leaves the function does not depend on, compacting the remaining variables.
///
/// The kept leaves are moved to the front of `leaves` in their original order and their number
/// is returned.
pub fn minimize_support<F: CutFunction, T: Copy>(function: &mut F, leaves: &mut [T]) -> usize {
    let mut kept = 0;
    for position in 0..leaves.len() {
        if !function.depends_on(position) {
            continue;
        }
        for var in (kept..position).rev() {
            function.swap_adjacent(var);
        }
        leaves[kept] = leaves[position];
        kept += 1;
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn bit(words: &[u64], index: usize) -> bool {
        (words[index >> 6] >> (index & 63)) & 1 != 0
    }

    fn swap_bits(index: usize, var: usize) -> usize {
        let a = (index >> var) & 1;
        let b = (index >> (var + 1)) & 1;
        if a == b {
            index
        } else {
            index ^ (0b11 << var)
        }
    }

    #[test]
    fn projections_depend_on_their_variable_only() {
        for var_count in [1, 4, 6, 8] {
            for var in 0..var_count {
                let table = WideTruth::var(var_count, var);
                for other in 0..var_count {
                    assert_eq!(table.depends_on(other), other == var);
                }
                for index in 0..1 << var_count {
                    assert_eq!(bit(table.words(), index), (index >> var) & 1 != 0);
                }
            }
        }
    }

    #[test]
    fn swaps_permute_assignments() {
        let mut rng = SmallRng::seed_from_u64(3);
        for var_count in [3, 6, 7, 9] {
            for var in 0..var_count - 1 {
                let words: Vec<u64> = (0..word_count(var_count)).map(|_| rng.gen()).collect();
                let original = WideTruth::from_words(words);
                let mut swapped = original.clone();
                swapped.swap_adjacent(var);
                for index in 0..1 << var_count {
                    assert_eq!(
                        bit(swapped.words(), index),
                        bit(original.words(), swap_bits(index, var)),
                    );
                }
                if var_count <= 6 {
                    let mut word = WordTruth(original.words()[0]);
                    word.swap_adjacent(var);
                    assert_eq!(word.words(), swapped.words());
                }
                swapped.swap_adjacent(var);
                assert_eq!(swapped, original);
            }
        }
    }

    #[test]
    fn word_and_wide_dependency_agree() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..200 {
            // Sparse functions so that some variables are irrelevant.
            let word: u64 = rng.gen::<u64>() & rng.gen::<u64>() & VAR_MASKS[rng.gen_range(0..6)];
            let narrow = WordTruth(word);
            let wide = WideTruth::from_words(vec![word]);
            for var in 0..6 {
                assert_eq!(narrow.depends_on(var), wide.depends_on(var));
            }
        }
    }

    #[test]
    fn stretch_inserts_independent_variables() {
        // a & !b over the leaves [3, 7]
        let mut table = WideTruth::var(4, 0);
        let mut b = WideTruth::var(4, 1);
        b.invert();
        table.and_assign(&b);

        stretch(&mut table, &[3, 7][..], &[1, 3, 5, 7][..]);

        for index in 0..16usize {
            let a = (index >> 1) & 1 != 0;
            let b = (index >> 3) & 1 != 0;
            assert_eq!(bit(table.words(), index), a && !b);
        }
        assert!(!table.depends_on(0));
        assert!(table.depends_on(1));
        assert!(!table.depends_on(2));
        assert!(table.depends_on(3));
    }

    #[test]
    fn minimize_undoes_stretch() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..100 {
            let mut original = WordTruth::zero(3);
            original.xor_assign(&WordTruth::var(3, 0));
            let mut sel = WordTruth::var(3, 1);
            sel.mux_assign(&original, &WordTruth::var(3, 2));
            let original = sel;

            let from = [10u32, 20, 30];
            let mut to = vec![5u32, 10, 15, 20, 25, 30];
            to.retain(|&leaf| from.contains(&leaf) || rng.gen_bool(0.5));

            let mut table = original;
            stretch(&mut table, &from[..], &to[..]);
            let kept = minimize_support(&mut table, &mut to[..]);
            assert_eq!(&to[..kept], &from);
            assert_eq!(table, original);
        }
    }

    #[test]
    fn phase_normalization() {
        let mut table = WordTruth::var(2, 0);
        table.invert();
        assert_eq!(table.normalize_phase(), Pol::Neg);
        assert_eq!(table, WordTruth::var(2, 0));
        assert_eq!(table.normalize_phase(), Pol::Pos);
    }
}
