//! Cuts and their serialized form within the cut arena.
use std::{cmp::Ordering, fmt, ops};

use cutmap_lit::Var;

use crate::{config::MAX_CUT_SIZE, dictionary::FuncRef};

/// A sorted, duplicate free set of at most [`MAX_CUT_SIZE`] leaves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LeafVec {
    len: u8,
    leaves: [Var; MAX_CUT_SIZE],
}

impl LeafVec {
    /// The single leaf set `{var}`.
    pub fn unit(var: Var) -> Self {
        let mut leaves = Self::default();
        leaves.push(var);
        leaves
    }

    /// Creates a leaf set from strictly increasing variables.
    #[track_caller]
    pub fn from_sorted(vars: &[Var]) -> Self {
        assert!(vars.windows(2).all(|pair| pair[0] < pair[1]));
        let mut leaves = Self::default();
        for &var in vars {
            leaves.push(var);
        }
        leaves
    }

    /// Appends a leaf, which must be larger than all present leaves.
    #[inline]
    #[track_caller]
    pub fn push(&mut self, var: Var) {
        assert!((self.len as usize) < MAX_CUT_SIZE, "too many cut leaves");
        debug_assert!(self.last().map_or(true, |&last| last < var));
        self.leaves[self.len as usize] = var;
        self.len += 1;
    }

    /// Keeps only the first `len` leaves.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len < self.len as usize {
            self.leaves[len..self.len as usize].fill(Var::FALSE);
            self.len = len as u8;
        }
    }
}

impl ops::Deref for LeafVec {
    type Target = [Var];

    #[inline(always)]
    fn deref(&self) -> &[Var] {
        &self.leaves[..self.len as usize]
    }
}

impl ops::DerefMut for LeafVec {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [Var] {
        &mut self.leaves[..self.len as usize]
    }
}

impl fmt::Debug for LeafVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Bloom-style signature of a leaf set, one bit per leaf index modulo 64.
///
/// If `a` is a subset of `b`, then `signature(a) & !signature(b) == 0`.
#[inline]
pub fn signature(leaves: &[Var]) -> u64 {
    leaves
        .iter()
        .fold(0, |sig, leaf| sig | 1 << (leaf.index() % 64))
}

/// Sorted union of two leaf sets, or `None` if it has more than `limit` leaves.
///
/// Two sets that are both of size `limit` only merge when they are equal.
pub fn merge_leaves(a: &LeafVec, b: &LeafVec, limit: usize) -> Option<LeafVec> {
    if a.len() == limit && b.len() == limit {
        return (a == b).then_some(*a);
    }
    let mut merged = LeafVec::default();
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) => match x.cmp(&y) {
                Ordering::Less => {
                    i += 1;
                    x
                }
                Ordering::Greater => {
                    j += 1;
                    y
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                    x
                }
            },
            (Some(&x), None) => {
                i += 1;
                x
            }
            (None, Some(&y)) => {
                j += 1;
                y
            }
            (None, None) => unreachable!(),
        };
        if merged.len() == limit {
            return None;
        }
        merged.push(next);
    }
    Some(merged)
}

/// A cut under construction, with the costs used to rank it against the other cuts of its node.
#[derive(Clone, Debug)]
pub struct Cut {
    /// The leaves of the cut.
    pub leaves: LeafVec,
    /// Signature of the leaves.
    pub signature: u64,
    /// The function of the node in terms of the leaves, when function tracking is enabled.
    pub func: Option<FuncRef>,
    /// Arrival time of the node when implemented by this cut.
    pub delay: i32,
    /// Area flow of the node when implemented by this cut.
    pub area_flow: f32,
    /// Whether the function collapsed to at most one leaf.
    pub useless: bool,
}

impl Cut {
    /// Creates a cut without costs.
    pub fn new(leaves: LeafVec, func: Option<FuncRef>) -> Self {
        Self {
            signature: signature(&leaves),
            leaves,
            func,
            delay: 0,
            area_flow: 0.0,
            useless: false,
        }
    }

    /// Number of leaves.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.leaves.len()
    }

    /// Whether every leaf of `self` is a leaf of `other`.
    pub fn is_subset_of(&self, other: &Cut) -> bool {
        if self.size() > other.size() || self.signature & !other.signature != 0 {
            return false;
        }
        let mut others = other.leaves.iter();
        self.leaves
            .iter()
            .all(|leaf| others.any(|other_leaf| other_leaf == leaf))
    }

    /// Ranks cuts: useful before useless, then by delay, area flow and size.
    pub fn quality_cmp(&self, other: &Cut) -> Ordering {
        self.useless
            .cmp(&other.useless)
            .then(self.delay.cmp(&other.delay))
            .then(self.area_flow.total_cmp(&other.area_flow))
            .then(self.size().cmp(&other.size()))
    }
}

/// Number of words of a cut serialized for cuts of at most `cut_size` leaves.
#[inline(always)]
pub fn cut_words(cut_size: usize) -> usize {
    cut_size + 2
}

/// Number of words of a serialized list of `count` cuts.
#[inline(always)]
pub fn cut_list_words(cut_size: usize, count: usize) -> usize {
    1 + count * cut_words(cut_size)
}

const USELESS_FLAG: u32 = 1 << 31;

/// Serializes cuts into `words` as `[count, (size, leaves.., func)*]` with a fixed stride.
///
/// The useless flag is kept in the high bit of the size word and unused leaf slots are zero.
pub fn write_cut_list<'a>(
    words: &mut [u32],
    cut_size: usize,
    cuts: impl IntoIterator<Item = &'a Cut>,
) {
    let stride = cut_words(cut_size);
    let mut count = 0;
    for (cut, chunk) in cuts.into_iter().zip(words[1..].chunks_exact_mut(stride)) {
        chunk[0] = cut.size() as u32 | if cut.useless { USELESS_FLAG } else { 0 };
        for (position, slot) in chunk[1..=cut_size].iter_mut().enumerate() {
            *slot = cut.leaves.get(position).map_or(0, |var| var.index() as u32);
        }
        chunk[cut_size + 1] = FuncRef::encode(cut.func);
        count += 1;
    }
    words[0] = count;
}

/// Read only view of a serialized cut list.
#[derive(Clone, Copy)]
pub struct StoredCuts<'a> {
    words: &'a [u32],
    stride: usize,
}

impl<'a> StoredCuts<'a> {
    /// Views the cut list at the start of `words`.
    pub fn new(words: &'a [u32], cut_size: usize) -> Self {
        let stride = cut_words(cut_size);
        let count = words[0] as usize;
        Self {
            words: &words[1..1 + count * stride],
            stride,
        }
    }

    /// Number of stored cuts.
    pub fn len(&self) -> usize {
        self.words.len() / self.stride
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The cut at position `index`.
    pub fn get(&self, index: usize) -> StoredCut<'a> {
        StoredCut {
            words: &self.words[index * self.stride..(index + 1) * self.stride],
        }
    }

    /// Iterates over the stored cuts in ranking order.
    pub fn iter(&self) -> impl Iterator<Item = StoredCut<'a>> + 'a {
        self.words
            .chunks_exact(self.stride)
            .map(|words| StoredCut { words })
    }
}

impl fmt::Debug for StoredCuts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A single serialized cut.
#[derive(Clone, Copy)]
pub struct StoredCut<'a> {
    words: &'a [u32],
}

impl<'a> StoredCut<'a> {
    /// Number of leaves.
    #[inline(always)]
    pub fn size(&self) -> usize {
        (self.words[0] & !USELESS_FLAG) as usize
    }

    /// Whether the cut's function collapsed to at most one leaf.
    #[inline(always)]
    pub fn is_useless(&self) -> bool {
        self.words[0] & USELESS_FLAG != 0
    }

    /// The leaves in increasing order.
    #[inline]
    pub fn leaves(&self) -> impl Iterator<Item = Var> + 'a {
        self.words[1..=self.size()]
            .iter()
            .map(|&index| Var::from_index(index as usize))
    }

    /// The leaves as an owned set.
    pub fn leaf_vec(&self) -> LeafVec {
        let mut leaves = LeafVec::default();
        for leaf in self.leaves() {
            leaves.push(leaf);
        }
        leaves
    }

    /// The tracked function of the cut.
    #[inline(always)]
    pub fn func(&self) -> Option<FuncRef> {
        FuncRef::decode(self.words[self.words.len() - 1])
    }

    /// Whether this is the trivial cut `{var}` of the node `var`.
    pub fn is_trivial_for(&self, var: Var) -> bool {
        self.size() == 1 && self.words[1] as usize == var.index()
    }
}

impl fmt::Debug for StoredCut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.leaves()).finish()?;
        if let Some(func) = self.func() {
            write!(f, " {func:?}")?;
        }
        if self.is_useless() {
            write!(f, " useless")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(indices: &[usize]) -> LeafVec {
        let vars: Vec<Var> = indices.iter().map(|&i| Var::from_index(i)).collect();
        LeafVec::from_sorted(&vars)
    }

    #[test]
    fn merge_respects_limit() {
        let a = leaves(&[1, 3, 5]);
        let b = leaves(&[2, 3, 6]);
        assert_eq!(merge_leaves(&a, &b, 5), Some(leaves(&[1, 2, 3, 5, 6])));
        assert_eq!(merge_leaves(&a, &b, 4), None);
        assert_eq!(merge_leaves(&a, &a, 3), Some(a));
        assert_eq!(merge_leaves(&a, &leaves(&[1, 3, 6]), 3), None);
        assert_eq!(merge_leaves(&a, &LeafVec::default(), 3), Some(a));
    }

    #[test]
    fn subsets_and_signatures() {
        let small = Cut::new(leaves(&[2, 66]), None);
        let large = Cut::new(leaves(&[1, 2, 40, 66]), None);
        let other = Cut::new(leaves(&[2, 130]), None);

        assert!(small.is_subset_of(&large));
        assert!(!large.is_subset_of(&small));
        assert!(small.is_subset_of(&small));
        // 130 and 2 share a signature bit, so only the exact check rejects this.
        assert_eq!(other.signature & !large.signature, 0);
        assert!(!other.is_subset_of(&large));
        assert_eq!(small.signature & !large.signature, 0);
    }

    #[test]
    fn ranking() {
        let mut fast = Cut::new(leaves(&[1, 2, 3]), None);
        fast.delay = 10;
        fast.area_flow = 3.0;
        let mut small = Cut::new(leaves(&[1, 2]), None);
        small.delay = 20;
        small.area_flow = 1.0;
        let mut useless = Cut::new(leaves(&[1]), None);
        useless.useless = true;

        assert_eq!(fast.quality_cmp(&small), Ordering::Less);
        assert_eq!(useless.quality_cmp(&fast), Ordering::Greater);

        let mut tie = small.clone();
        tie.leaves = leaves(&[1, 2, 4]);
        assert_eq!(small.quality_cmp(&tie), Ordering::Less);
    }

    #[test]
    fn serialized_lists() {
        let mut first = Cut::new(leaves(&[4, 9]), Some(FuncRef::IDENTITY));
        first.useless = true;
        let second = Cut::new(leaves(&[1, 2, 3]), None);

        let mut words = vec![0xdead; cut_list_words(4, 2) + 3];
        write_cut_list(&mut words, 4, [first, second].iter());

        let stored = StoredCuts::new(&words, 4);
        assert_eq!(stored.len(), 2);
        let first = stored.get(0);
        assert_eq!(first.size(), 2);
        assert!(first.is_useless());
        assert_eq!(first.leaf_vec(), leaves(&[4, 9]));
        assert_eq!(first.func(), Some(FuncRef::IDENTITY));
        let second = stored.get(1);
        assert!(!second.is_useless());
        assert_eq!(second.func(), None);
        assert_eq!(format!("{:?}", stored), "[{v4, v9} f1 useless, {v1, v2, v3}]");
        assert!(StoredCuts::new(&[0], 4).is_empty());
    }
}
