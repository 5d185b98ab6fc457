//! Deduplicated storage of cut functions.
use std::{
    fmt,
    hash::{BuildHasher, BuildHasherDefault},
};

use cutmap_lit::Pol;
use hashbrown::HashTable;
use zwohash::ZwoHasher;

use crate::truth::CutFunction;

/// Identifies a truth table stored in a [`TruthDictionary`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FuncId(u32);

impl FuncId {
    /// The constant false function.
    pub const CONST_FALSE: Self = Self(0);
    /// The projection onto the single leaf of a cut.
    pub const IDENTITY: Self = Self(1);

    /// Position of the table within the dictionary.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A stored truth table together with a polarity, representing a cut's function.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncRef(u32);

impl FuncRef {
    /// Encoding used for cuts without a tracked function.
    pub const NONE_CODE: u32 = u32::MAX;

    /// The identity function of a single leaf.
    pub const IDENTITY: Self = Self::new(FuncId::IDENTITY, Pol::Pos);

    /// References the table `id` in the polarity `pol`.
    #[inline(always)]
    pub const fn new(id: FuncId, pol: Pol) -> Self {
        Self((id.0 << 1) | pol as u32)
    }

    /// The referenced table.
    #[inline(always)]
    pub fn id(self) -> FuncId {
        FuncId(self.0 >> 1)
    }

    /// Whether the function is the complement of the referenced table.
    #[inline(always)]
    pub fn pol(self) -> Pol {
        if self.0 & 1 != 0 {
            Pol::Neg
        } else {
            Pol::Pos
        }
    }

    /// Packs an optional function reference into a single word.
    #[inline(always)]
    pub fn encode(func: Option<Self>) -> u32 {
        func.map_or(Self::NONE_CODE, |func| func.0)
    }

    /// Inverse of [`encode`][Self::encode].
    #[inline(always)]
    pub fn decode(code: u32) -> Option<Self> {
        (code != Self::NONE_CODE).then_some(Self(code))
    }
}

impl std::ops::BitXor<Pol> for FuncRef {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, pol: Pol) -> Self {
        Self(self.0 ^ pol as u32)
    }
}

impl fmt::Debug for FuncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pol().is_neg() {
            write!(f, "!f{}", self.id().0)
        } else {
            write!(f, "f{}", self.id().0)
        }
    }
}

fn table_hash(words: &[u64]) -> u64 {
    <BuildHasherDefault<ZwoHasher>>::default().hash_one(words)
}

/// Stores every distinct truth table once and hands out stable ids.
///
/// Tables compare by their exact bits. Callers store phase normalized tables and keep the
/// polarity in the [`FuncRef`].
pub struct TruthDictionary<F> {
    tables: Vec<F>,
    index: HashTable<u32>,
}

impl<F: CutFunction> TruthDictionary<F> {
    /// Creates a dictionary for functions over `var_count` variables.
    ///
    /// The constant false function and the projection onto the first variable are
    /// pre-inserted as [`FuncId::CONST_FALSE`] and [`FuncId::IDENTITY`].
    pub fn new(var_count: usize) -> Self {
        let mut dictionary = Self {
            tables: vec![],
            index: HashTable::new(),
        };
        let const_false = dictionary.insert_or_find(&F::zero(var_count));
        let identity = dictionary.insert_or_find(&F::var(var_count, 0));
        debug_assert_eq!(const_false, FuncId::CONST_FALSE);
        debug_assert_eq!(identity, FuncId::IDENTITY);
        dictionary
    }

    /// Returns the id of `table`, inserting it if it was not stored before.
    pub fn insert_or_find(&mut self, table: &F) -> FuncId {
        let hash = table_hash(table.words());
        let tables = &self.tables;
        if let Some(&id) = self.index.find(hash, |&id| tables[id as usize] == *table) {
            return FuncId(id);
        }
        let id = u32::try_from(self.tables.len())
            .ok()
            .filter(|&id| id <= u32::MAX >> 1)
            .expect("too many distinct cut functions");
        self.tables.push(table.clone());
        let tables = &self.tables;
        self.index
            .insert_unique(hash, id, |&id| table_hash(tables[id as usize].words()));
        FuncId(id)
    }

    /// The table stored for `id`.
    pub fn lookup(&self, id: FuncId) -> &F {
        &self.tables[id.index()]
    }

    /// The function referenced by `func`, with its polarity applied.
    pub fn function(&self, func: FuncRef) -> F {
        let mut table = self.lookup(func.id()).clone();
        table.apply_pol(func.pol());
        table
    }

    /// Number of distinct stored tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the dictionary is empty, which it never is after construction.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth::{WideTruth, WordTruth};

    #[test]
    fn preinserted_functions() {
        let dictionary = TruthDictionary::<WordTruth>::new(6);
        assert_eq!(dictionary.len(), 2);
        assert_eq!(*dictionary.lookup(FuncId::CONST_FALSE), WordTruth(0));
        assert_eq!(
            *dictionary.lookup(FuncId::IDENTITY),
            WordTruth(0xAAAA_AAAA_AAAA_AAAA)
        );
    }

    #[test]
    fn insertion_is_idempotent() {
        let mut dictionary = TruthDictionary::<WideTruth>::new(8);
        let mut table = WideTruth::var(8, 7);
        table.and_assign(&WideTruth::var(8, 2));

        let id = dictionary.insert_or_find(&table);
        assert_eq!(id.index(), 2);
        assert_eq!(dictionary.insert_or_find(&table), id);
        assert_eq!(dictionary.insert_or_find(&WideTruth::var(8, 0)), FuncId::IDENTITY);
        assert_eq!(*dictionary.lookup(id), table);
        assert_eq!(dictionary.len(), 3);
    }

    #[test]
    fn references_carry_polarity() {
        let dictionary = TruthDictionary::<WordTruth>::new(4);
        let func = FuncRef::IDENTITY ^ Pol::Neg;
        assert_eq!(func.id(), FuncId::IDENTITY);
        assert_eq!(func.pol(), Pol::Neg);
        assert_eq!(dictionary.function(func), WordTruth(0x5555_5555_5555_5555));
        assert_eq!(FuncRef::decode(FuncRef::encode(Some(func))), Some(func));
        assert_eq!(FuncRef::decode(FuncRef::encode(None)), None);
        assert_eq!(format!("{func:?}"), "!f1");
    }
}
