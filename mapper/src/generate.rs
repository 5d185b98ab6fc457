//! Bottom-up cut enumeration.
//!
//! Every gate merges the stored cuts of its fanins in topological order. The cut set of a node is
//! built in budget levels: level `l` admits at most one new cut, chosen among the candidates that
//! can be formed from the fanin cuts of levels up to `l`, ranked with the provisional costs of
//! level `l`. A node therefore keeps at most `cut_count - 1` subset-minimal cuts, followed by its
//! trivial cut, and the cuts kept for a smaller cut count are always a subset of those kept for a
//! larger one.
use std::cmp::Ordering;

use cutmap_lit::{Lit, Pol, Var};
use cutmap_network::NodeKind;

use crate::{
    config::MapperOptions,
    cut::{cut_list_words, merge_leaves, signature, write_cut_list, Cut, LeafVec, StoredCuts},
    dictionary::{FuncRef, TruthDictionary},
    mapper::Mapper,
    truth::{minimize_support, stretch, CutFunction, WideTruth, WordTruth},
};

/// Storage for cut functions, absent when function tracking is disabled.
pub(crate) enum FunctionStore {
    Disabled,
    Word(TruthDictionary<WordTruth>),
    Wide(TruthDictionary<WideTruth>),
}

impl FunctionStore {
    pub(crate) fn new(options: &MapperOptions) -> Self {
        match (options.enable_function_tracking, options.wide_truth_tables) {
            (false, _) => FunctionStore::Disabled,
            (true, false) => FunctionStore::Word(TruthDictionary::new(options.cut_size)),
            (true, true) => FunctionStore::Wide(TruthDictionary::new(options.cut_size)),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            FunctionStore::Disabled => 0,
            FunctionStore::Word(dictionary) => dictionary.len(),
            FunctionStore::Wide(dictionary) => dictionary.len(),
        }
    }

    pub(crate) fn words(&self, func: FuncRef) -> Option<Vec<u64>> {
        match self {
            FunctionStore::Disabled => None,
            FunctionStore::Word(dictionary) => Some(dictionary.function(func).words().to_vec()),
            FunctionStore::Wide(dictionary) => Some(dictionary.function(func).words().to_vec()),
        }
    }

    /// Function of a single leaf cut.
    fn unit(&self) -> Option<FuncRef> {
        match self {
            FunctionStore::Disabled => None,
            _ => Some(FuncRef::IDENTITY),
        }
    }

    /// Computes the function of a merged cut, removing leaves it does not depend on.
    fn combine(
        &mut self,
        kind: NodeKind,
        cut_size: usize,
        leaves: &mut LeafVec,
        operands: &[Operand],
    ) -> Option<FuncRef> {
        match self {
            FunctionStore::Disabled => None,
            FunctionStore::Word(dictionary) => Some(combine_tables(
                dictionary, cut_size, kind, leaves, operands,
            )),
            FunctionStore::Wide(dictionary) => Some(combine_tables(
                dictionary, cut_size, kind, leaves, operands,
            )),
        }
    }
}

/// A fanin cut taking part in a merge, seen through the polarity of the fanin edge.
#[derive(Clone, Copy)]
struct Operand<'a> {
    cut: &'a Cut,
    pol: Pol,
}

fn combine_tables<F: CutFunction>(
    dictionary: &mut TruthDictionary<F>,
    cut_size: usize,
    kind: NodeKind,
    leaves: &mut LeafVec,
    operands: &[Operand],
) -> FuncRef {
    let mut tables = operands.iter().map(|operand| {
        let func = operand
            .cut
            .func
            .expect("fanin cut without function while tracking functions");
        let mut table = dictionary.function(func);
        table.apply_pol(operand.pol);
        stretch(&mut table, &operand.cut.leaves[..], &leaves[..]);
        table
    });
    let mut result = tables.next().unwrap_or_else(|| F::zero(cut_size));
    match (kind, tables.next(), tables.next()) {
        (NodeKind::And, Some(other), None) => result.and_assign(&other),
        (NodeKind::Xor, Some(other), None) => result.xor_assign(&other),
        (NodeKind::Mux, Some(on_true), Some(on_false)) => result.mux_assign(&on_true, &on_false),
        (kind, ..) => unreachable!("cannot merge cuts of a {} node", kind.name()),
    }

    let kept = minimize_support(&mut result, &mut leaves[..]);
    leaves.truncate(kept);
    let pol = result.normalize_phase();
    FuncRef::new(dictionary.insert_or_find(&result), pol)
}

/// A cut together with the budget level at which it entered its node's cut set.
#[derive(Clone, Debug)]
struct LeveledCut {
    cut: Cut,
    level: u8,
}

/// Ranks cuts by quality, falling back to the leaves so that the order is total.
fn rank(a: &Cut, b: &Cut) -> Ordering {
    a.quality_cmp(b).then_with(|| a.leaves[..].cmp(&b.leaves[..]))
}

/// Provisional costs of all nodes at every budget level, and the levels at which the stored cuts
/// of every gate were admitted.
struct BudgetLevels {
    count: usize,
    arrival: Vec<i32>,
    area_flow: Vec<f32>,
    admitted: Vec<Box<[u8]>>,
}

impl BudgetLevels {
    fn new(node_count: usize, count: usize) -> Self {
        Self {
            count,
            arrival: vec![0; node_count * count],
            area_flow: vec![0.0; node_count * count],
            admitted: vec![Box::default(); node_count],
        }
    }

    #[inline(always)]
    fn slot(&self, var: Var, level: usize) -> usize {
        var.index() * self.count + level
    }

    fn record(&mut self, var: Var, level: usize, arrival: i32, area_flow: f32) {
        let slot = self.slot(var, level);
        self.arrival[slot] = arrival;
        self.area_flow[slot] = area_flow;
    }

    /// Gives `var` the costs of `source` at every level.
    fn forward(&mut self, source: Var, var: Var) {
        for level in 0..self.count {
            let (from, to) = (self.slot(source, level), self.slot(var, level));
            self.arrival[to] = self.arrival[from];
            self.area_flow[to] = self.area_flow[from];
        }
    }

    /// Costs a cut with the provisional leaf costs of `level`.
    fn cost(&self, options: &MapperOptions, cut: &mut Cut, level: usize) {
        let leaf_arrival = cut
            .leaves
            .iter()
            .map(|&leaf| self.arrival[self.slot(leaf, level)])
            .max()
            .unwrap_or(0);
        cut.delay = leaf_arrival + options.lut_delay(cut.size());
        cut.area_flow = cut
            .leaves
            .iter()
            .map(|&leaf| self.area_flow[self.slot(leaf, level)])
            .sum::<f32>()
            + options.cut_area(cut.size());
    }

    /// Loads the stored cuts of `var` with their admission levels, or its unit cut if it has
    /// none.
    fn load_cuts(&self, mapper: &Mapper, var: Var, skip_trivial: bool, cuts: &mut Vec<LeveledCut>) {
        cuts.clear();
        match mapper.cuts(var) {
            Some(stored) => {
                let admitted = &self.admitted[var.index()];
                debug_assert_eq!(admitted.len(), stored.len());
                cuts.extend(
                    stored
                        .iter()
                        .zip(admitted.iter())
                        .filter(|(cut, _)| !(skip_trivial && cut.is_trivial_for(var)))
                        .map(|(stored, &level)| {
                            let mut cut = Cut::new(stored.leaf_vec(), stored.func());
                            cut.useless = stored.is_useless();
                            LeveledCut { cut, level }
                        }),
                )
            }
            None => cuts.push(LeveledCut {
                cut: Cut::new(LeafVec::unit(var), mapper.functions.unit()),
                level: 0,
            }),
        }
    }
}

/// Where a candidate cut comes from.
#[derive(Clone, Copy, Debug)]
enum Origin {
    /// Merge of the fanin cuts with these indices.
    Merge([usize; 3]),
    /// A cut of the structural choice sibling.
    Choice(usize),
}

/// A merged leaf set waiting for its budget level.
#[derive(Clone, Copy, Debug)]
struct Pending {
    level: u8,
    leaves: LeafVec,
    origin: Origin,
}

/// Working set of the cuts of the current node.
///
/// `pool` holds the candidates of the levels seen so far that were not admitted yet, `admitted`
/// the cuts that made it into the cut set. Neither contains two cuts in a subset relation.
#[derive(Default)]
struct CutSetBuilder {
    pool: Vec<Cut>,
    admitted: Vec<LeveledCut>,
}

impl CutSetBuilder {
    fn clear(&mut self) {
        self.pool.clear();
        self.admitted.clear();
    }

    fn len(&self) -> usize {
        self.admitted.len()
    }

    fn iter(&self) -> impl Iterator<Item = &Cut> + '_ {
        self.admitted.iter().map(|leveled| &leveled.cut)
    }

    /// The best admitted cut under the current costs.
    fn best(&self) -> Option<&Cut> {
        self.iter().min_by(|a, b| rank(a, b))
    }

    /// Whether a pooled or admitted cut is a subset of `candidate`.
    fn is_dominated(&self, candidate: &Cut) -> bool {
        self.pool
            .iter()
            .chain(self.iter())
            .any(|cut| cut.is_subset_of(candidate))
    }

    /// Whether `candidate` is a subset of an admitted cut, which cannot be dropped anymore.
    fn is_contained(&self, candidate: &Cut) -> bool {
        self.iter().any(|cut| candidate.is_subset_of(cut))
    }

    /// Whether no admitted cut is a subset of another one.
    fn is_antichain(&self) -> bool {
        self.iter().enumerate().all(|(i, a)| {
            self.iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_subset_of(b))
        })
    }

    /// Adds a candidate to the pool, dropping pooled supersets of it.
    fn offer(&mut self, candidate: Cut) {
        if self.is_dominated(&candidate) || self.is_contained(&candidate) {
            return;
        }
        self.pool.retain(|cut| !candidate.is_subset_of(cut));
        self.pool.push(candidate);
    }

    /// Costs all pooled and admitted cuts for `level`.
    fn cost(&mut self, levels: &BudgetLevels, options: &MapperOptions, level: usize) {
        for cut in self.pool.iter_mut() {
            levels.cost(options, cut, level);
        }
        for leveled in self.admitted.iter_mut() {
            levels.cost(options, &mut leveled.cut, level);
        }
    }

    /// Moves the best pooled cut into the cut set.
    fn admit_best(&mut self, level: usize) -> bool {
        let best = self
            .pool
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| rank(a, b))
            .map(|(index, _)| index);
        let Some(index) = best else {
            return false;
        };
        let cut = self.pool.swap_remove(index);
        self.admitted.push(LeveledCut {
            cut,
            level: level as u8,
        });
        true
    }

    /// Sorts the admitted cuts best first.
    fn sort(&mut self) {
        self.admitted.sort_by(|a, b| rank(&a.cut, &b.cut));
    }
}

/// Rounds an area flow up to a multiple of 1/64.
fn round_area_flow(flow: f32) -> f32 {
    (flow * 64.0).ceil() / 64.0
}

/// Fanin operands of a merge, padded to three entries.
fn operands<'a>(
    fanin_cuts: &'a [Vec<LeveledCut>; 3],
    fanins: &[Lit],
    indices: [usize; 3],
) -> [Operand<'a>; 3] {
    std::array::from_fn(|position| {
        let position = if position < fanins.len() { position } else { 0 };
        Operand {
            cut: &fanin_cuts[position][indices[position]].cut,
            pol: fanins[position].pol(),
        }
    })
}

/// Reusable buffers for cut enumeration.
struct CutGenerator {
    builder: CutSetBuilder,
    levels: BudgetLevels,
    fanin_cuts: [Vec<LeveledCut>; 3],
    sibling_cuts: Vec<LeveledCut>,
    pending: Vec<Pending>,
}

impl CutGenerator {
    fn new(options: &MapperOptions, node_count: usize) -> Self {
        Self {
            builder: CutSetBuilder::default(),
            levels: BudgetLevels::new(node_count, options.cut_count - 1),
            fanin_cuts: Default::default(),
            sibling_cuts: vec![],
            pending: vec![],
        }
    }

    /// Collects all K-feasible merges of the loaded fanin cuts.
    fn enumerate_merges(&mut self, kind: NodeKind, cut_size: usize) {
        let [cuts0, cuts1, cuts2] = &self.fanin_cuts;
        for (i0, c0) in cuts0.iter().enumerate() {
            for (i1, c1) in cuts1.iter().enumerate() {
                let sig01 = c0.cut.signature | c1.cut.signature;
                if sig01.count_ones() as usize > cut_size {
                    continue;
                }
                let Some(leaves01) = merge_leaves(&c0.cut.leaves, &c1.cut.leaves, cut_size) else {
                    continue;
                };
                let level01 = c0.level.max(c1.level);
                if kind != NodeKind::Mux {
                    self.pending.push(Pending {
                        level: level01,
                        leaves: leaves01,
                        origin: Origin::Merge([i0, i1, 0]),
                    });
                    continue;
                }
                for (i2, c2) in cuts2.iter().enumerate() {
                    if (sig01 | c2.cut.signature).count_ones() as usize > cut_size {
                        continue;
                    }
                    let Some(leaves) = merge_leaves(&leaves01, &c2.cut.leaves, cut_size) else {
                        continue;
                    };
                    self.pending.push(Pending {
                        level: level01.max(c2.level),
                        leaves,
                        origin: Origin::Merge([i0, i1, i2]),
                    });
                }
            }
        }
    }

    fn generate_node(&mut self, mapper: &mut Mapper, var: Var) {
        let network = mapper.network;
        let node = network.node(var);
        let kind = node.kind();
        let cut_size = mapper.options.cut_size;
        let fanins = node.fanins();

        self.builder.clear();
        self.pending.clear();
        for (cuts, &fanin) in self.fanin_cuts.iter_mut().zip(fanins) {
            self.levels.load_cuts(mapper, fanin.var(), false, cuts);
        }
        self.enumerate_merges(kind, cut_size);

        let mut choice_pol = None;
        if let Some(choice) = node.choice() {
            self.levels
                .load_cuts(mapper, choice.var(), true, &mut self.sibling_cuts);
            self.pending
                .extend(self.sibling_cuts.iter().enumerate().map(|(index, sibling)| Pending {
                    level: sibling.level,
                    leaves: sibling.cut.leaves,
                    origin: Origin::Choice(index),
                }));
            choice_pol = Some(choice.pol());
        }

        // Candidates with equal leaves yield equal cuts, so this order fixes all decisions.
        self.pending.sort_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then_with(|| a.leaves[..].cmp(&b.leaves[..]))
        });

        let fanout = node.fanout_count().max(1) as f32;
        let mut trivial_level = None;
        let mut next = 0;
        for level in 0..self.levels.count {
            while let Some(pending) = self
                .pending
                .get(next)
                .filter(|pending| pending.level as usize == level)
            {
                next += 1;
                let candidate = match pending.origin {
                    Origin::Merge(indices) => {
                        let mut cut = Cut::new(pending.leaves, None);
                        if self.builder.is_dominated(&cut) {
                            continue;
                        }
                        let operands = operands(&self.fanin_cuts, fanins, indices);
                        cut.func = mapper.functions.combine(
                            kind,
                            cut_size,
                            &mut cut.leaves,
                            &operands[..fanins.len()],
                        );
                        cut.signature = signature(&cut.leaves);
                        cut.useless = cut.size() <= 1;
                        cut
                    }
                    Origin::Choice(index) => {
                        let mut cut = self.sibling_cuts[index].cut.clone();
                        cut.func = cut.func.zip(choice_pol).map(|(func, pol)| func ^ pol);
                        cut
                    }
                };
                self.builder.offer(candidate);
            }

            self.builder.cost(&self.levels, &mapper.options, level);
            self.builder.admit_best(level);
            let Some(best) = self.builder.best() else {
                panic!("no cut found for {var}");
            };
            let (delay, area_flow) = (best.delay, round_area_flow(best.area_flow / fanout));
            self.levels.record(var, level, delay, area_flow);
            let is_wire = self.builder.len() == 1 && best.size() <= 1;
            if trivial_level.is_none() && !is_wire {
                trivial_level = Some(level as u8);
            }
        }
        debug_assert_eq!(next, self.pending.len());

        self.builder.sort();

        let Some(best) = self.builder.best() else {
            panic!("no cut found for {var}");
        };
        assert!(self.builder.len() < mapper.options.cut_count, "cut set of {var} overflows");
        debug_assert!(self.builder.is_antichain(), "cuts of {var} are subset related");
        let state = &mut mapper.nodes[var.index()];
        state.arrival = best.delay;
        state.arrival_fast = best.delay;
        state.area_flow = round_area_flow(best.area_flow / fanout);

        let trivial = trivial_level
            .map(|_| Cut::new(LeafVec::unit(var), mapper.functions.unit()));
        let count = self.builder.len() + trivial.is_some() as usize;

        let handle = mapper.arena.allocate(cut_list_words(cut_size, count));
        write_cut_list(
            mapper.arena.resolve_mut(handle),
            cut_size,
            self.builder.iter().chain(trivial.iter()),
        );
        self.levels.admitted[var.index()] = self
            .builder
            .admitted
            .iter()
            .map(|leveled| leveled.level)
            .chain(trivial_level)
            .collect();
        mapper.nodes[var.index()].cuts = Some(handle);
        mapper.stats.cut_count += count;

        let level = mapper.node_level();
        if log::log_enabled!(level) {
            let stored = StoredCuts::new(mapper.arena.resolve(handle), cut_size);
            log::log!(level, "{var} {}: {stored:?}", kind.name());
        }
    }
}

impl Mapper<'_> {
    /// Enumerates and stores the cuts of all gates in topological order.
    ///
    /// Buffers take part as leaves during enumeration and are afterwards aliased to the cuts and
    /// costs of the node they forward.
    pub fn generate_cuts(&mut self) {
        assert!(!self.generated, "cuts were already generated");
        let network = self.network;
        let mut generator = CutGenerator::new(&self.options, network.len());

        for (var, node) in network.nodes() {
            if node.is_gate() {
                generator.generate_node(self, var);
            } else if node.is_buf() {
                let source_var = node.fanin(0).var();
                generator.levels.forward(source_var, var);
                let source = &self.nodes[source_var.index()];
                let (arrival, area_flow) = (source.arrival, source.area_flow);
                let state = &mut self.nodes[var.index()];
                state.arrival = arrival;
                state.arrival_fast = arrival;
                state.area_flow = area_flow;
            }
        }

        for (var, node) in network.nodes() {
            if node.is_buf() {
                self.nodes[var.index()].cuts = self.nodes[node.fanin(0).index()].cuts;
            }
        }

        self.generated = true;
        self.stats.function_count = self.functions.len();
        self.stats.arena_bytes = self.arena.reserved_bytes();
        log::log!(
            self.summary_level(),
            "cuts: {} stored, {} functions, {} segments",
            self.stats.cut_count,
            self.stats.function_count,
            self.arena.segment_count(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cut(indices: &[usize], delay: i32) -> Cut {
        let vars: Vec<Var> = indices.iter().map(|&index| Var::from_index(index)).collect();
        let mut cut = Cut::new(LeafVec::from_sorted(&vars), None);
        cut.delay = delay;
        cut.area_flow = indices.len() as f32;
        cut.useless = indices.len() <= 1;
        cut
    }

    fn leaf_sets<'a>(cuts: impl Iterator<Item = &'a Cut>) -> Vec<Vec<usize>> {
        cuts.map(|cut| cut.leaves.iter().map(|leaf| leaf.index()).collect())
            .collect()
    }

    #[test]
    fn one_cut_is_admitted_per_level() {
        let mut builder = CutSetBuilder::default();
        builder.offer(cut(&[1, 2], 30));
        builder.offer(cut(&[3, 4], 10));
        builder.offer(cut(&[5, 6], 20));

        assert!(builder.admit_best(0));
        assert_eq!(leaf_sets(builder.iter()), vec![vec![3, 4]]);
        assert!(builder.admit_best(1));
        assert_eq!(leaf_sets(builder.iter()), vec![vec![3, 4], vec![5, 6]]);
        assert_eq!(
            builder.admitted.iter().map(|c| c.level).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(leaf_sets(builder.pool.iter()), vec![vec![1, 2]]);

        builder.clear();
        assert!(!builder.admit_best(0));
        assert_eq!(builder.len(), 0);
    }

    #[test]
    fn ties_are_broken_by_leaves() {
        let mut builder = CutSetBuilder::default();
        builder.offer(cut(&[3, 4], 10));
        builder.offer(cut(&[1, 5], 10));
        builder.admit_best(0);
        assert_eq!(leaf_sets(builder.iter()), vec![vec![1, 5]]);
    }

    #[test]
    fn dominance_covers_pool_and_admitted_cuts() {
        let mut builder = CutSetBuilder::default();
        builder.offer(cut(&[1, 2, 3], 10));
        builder.offer(cut(&[2, 4], 10));
        assert!(builder.is_dominated(&cut(&[1, 2, 3, 5], 10)));
        assert!(builder.is_dominated(&cut(&[2, 4], 10)));
        assert!(!builder.is_dominated(&cut(&[1, 2], 10)));

        // A pooled superset is replaced by its subset.
        builder.offer(cut(&[1, 2], 10));
        assert_eq!(leaf_sets(builder.pool.iter()), vec![vec![2, 4], vec![1, 2]]);

        // An admitted cut stays, so its subsets are rejected.
        builder.admit_best(0);
        assert_eq!(leaf_sets(builder.iter()), vec![vec![1, 2]]);
        builder.offer(cut(&[2], 0));
        assert_eq!(leaf_sets(builder.pool.iter()), vec![vec![2, 4]]);
        assert!(builder.is_antichain());
    }

    #[test]
    fn area_flow_rounds_up() {
        assert_eq!(round_area_flow(1.0), 1.0);
        assert_eq!(round_area_flow(1.0 / 3.0), 22.0 / 64.0);
        assert_eq!(round_area_flow(0.0), 0.0);
    }
}
