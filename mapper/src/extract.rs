//! Flat representation of the final cover.
use cutmap_lit::Var;

use crate::{dictionary::FuncRef, mapper::Mapper};

/// Statistics of a mapping run.
#[derive(Clone, Debug, Default)]
pub struct MappingStats {
    /// Critical delay using fast edges, equal to the primary delay without fast edges.
    pub critical_delay: i32,
    /// Critical delay using only regular edges.
    pub critical_delay_primary: i32,
    /// Number of LUTs, i.e. selected cuts with at least two leaves.
    pub area: usize,
    /// Total number of leaves of the LUTs.
    pub edges: usize,
    /// Number of stored cuts, trivial cuts included.
    pub cut_count: usize,
    /// Number of distinct cut functions.
    pub function_count: usize,
    /// Memory reserved by the cut arena in bytes.
    pub arena_bytes: usize,
    /// Number of completed optimization rounds.
    pub rounds: usize,
}

/// The selected cut of every mapped node.
///
/// Stored as a single word table: one header slot per node holding the offset of the node's
/// entry or zero, followed by the entries `[size, leaves.., node]` in topological order.
#[derive(Clone, Debug)]
pub struct MappingTable {
    words: Vec<u32>,
    node_count: usize,
}

impl MappingTable {
    /// Number of nodes of the mapped network.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// The raw table words.
    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    /// The leaves of the cut implementing `var`, if `var` is mapped.
    pub fn cut(&self, var: Var) -> Option<MappedCut<'_>> {
        let offset = self.words[var.index()] as usize;
        (offset != 0).then(|| self.entry(offset))
    }

    fn entry(&self, offset: usize) -> MappedCut<'_> {
        let size = self.words[offset] as usize;
        MappedCut {
            words: &self.words[offset..offset + size + 2],
        }
    }

    /// Iterates over all mapped nodes in topological order.
    pub fn iter(&self) -> impl Iterator<Item = MappedCut<'_>> + '_ {
        let mut offset = self.node_count;
        std::iter::from_fn(move || {
            (offset < self.words.len()).then(|| {
                let cut = self.entry(offset);
                offset += cut.words.len();
                cut
            })
        })
    }

    /// Number of mapped nodes.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no node is mapped.
    pub fn is_empty(&self) -> bool {
        self.words.len() == self.node_count
    }
}

/// An entry of a [`MappingTable`].
#[derive(Clone, Copy, Debug)]
pub struct MappedCut<'a> {
    words: &'a [u32],
}

impl<'a> MappedCut<'a> {
    /// The node implemented by this cut.
    pub fn node(&self) -> Var {
        Var::from_index(self.words[self.words.len() - 1] as usize)
    }

    /// Number of leaves.
    pub fn size(&self) -> usize {
        self.words.len() - 2
    }

    /// The leaves in increasing order.
    pub fn leaves(&self) -> impl Iterator<Item = Var> + 'a {
        self.words[1..self.words.len() - 1]
            .iter()
            .map(|&leaf| Var::from_index(leaf as usize))
    }
}

/// A referenced gate whose selected cut collapsed to at most one leaf.
///
/// Such a node needs no LUT. Its consumers use `source` directly, or a constant if there is no
/// source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MappedWire {
    /// The gate implemented by the wire.
    pub node: Var,
    /// The single leaf of the selected cut.
    pub source: Option<Var>,
    /// The function of the wire in terms of `source`, when function tracking is enabled.
    pub func: Option<FuncRef>,
}

/// Result of a mapping run.
#[derive(Clone, Debug)]
pub struct Mapping {
    /// The selected cuts that need a LUT.
    pub table: MappingTable,
    /// The referenced gates that are wires or constants of their source.
    pub wires: Vec<MappedWire>,
    /// Statistics of the run.
    pub stats: MappingStats,
}

impl Mapper<'_> {
    /// Builds the mapping table from the selected cuts of all referenced gates.
    ///
    /// Gates whose selected cut is useless get no entry, see [`wires`][Self::wires].
    pub fn extract(&self) -> MappingTable {
        let node_count = self.network.len();
        let capacity = node_count + self.stats.edges + 2 * self.stats.area;
        let mut words = Vec::with_capacity(capacity);
        words.resize(node_count, 0);

        for var in self.selected_gates() {
            let index = self.nodes[var.index()].selected_cut().unwrap_or_default();
            let cut = self.gate_cuts(var).get(index);
            if cut.is_useless() {
                continue;
            }
            words[var.index()] = words.len() as u32;
            words.push(cut.size() as u32);
            words.extend(cut.leaves().map(|leaf| leaf.index() as u32));
            words.push(var.index() as u32);
        }

        assert_eq!(words.len(), capacity, "mapping table size mismatch");
        MappingTable { words, node_count }
    }

    /// The referenced gates whose selected cut is useless, in topological order.
    pub fn wires(&self) -> Vec<MappedWire> {
        self.selected_gates()
            .filter_map(|var| {
                let index = self.nodes[var.index()].selected_cut().unwrap_or_default();
                let cut = self.gate_cuts(var).get(index);
                cut.is_useless().then(|| MappedWire {
                    node: var,
                    source: cut.leaves().next(),
                    func: cut.func(),
                })
            })
            .collect()
    }

    /// The referenced gates, checking that each has a selected cut.
    fn selected_gates(&self) -> impl Iterator<Item = Var> + '_ {
        self.network.nodes().filter_map(|(var, node)| {
            let state = &self.nodes[var.index()];
            if !node.is_gate() || state.refs == 0 {
                return None;
            }
            assert!(
                state.selected_cut().is_some(),
                "referenced gate {var} has no selected cut"
            );
            Some(var)
        })
    }
}
