//! Iterative delay and area optimization over the stored cuts.
//!
//! A forward pass computes arrival times, a backward pass selects one cut per referenced node
//! under required time constraints while recovering area. The first backward pass ranks cuts by
//! area flow, later passes by the exact area a cut adds to the current cover.
use cutmap_lit::Var;

use crate::{
    config::MAX_CUT_SIZE,
    cut::{LeafVec, StoredCut},
    error::ConfigError,
    mapper::Mapper,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Selection {
    /// The first stored cut, without timing constraints.
    GenerationBest,
    /// Cheapest area flow among the cuts meeting the required time.
    AreaFlow,
    /// Cheapest exact area among the cuts meeting the required time.
    ExactArea,
}

impl Mapper<'_> {
    /// Delay of the node when implemented by `cut` using only regular edges.
    fn cut_delay(&self, cut: StoredCut) -> i32 {
        cut.leaves()
            .map(|leaf| self.nodes[leaf.index()].arrival)
            .max()
            .unwrap_or(0)
            + self.options.lut_delay(cut.size())
    }

    /// Delay of every leaf edge of a cut, giving the fast edges to the latest arriving leaves.
    ///
    /// Wires and constants have no edge delay.
    fn edge_delays(&self, leaves: &LeafVec) -> [i32; MAX_CUT_SIZE] {
        if leaves.len() < 2 {
            return [0; MAX_CUT_SIZE];
        }
        let mut positions = [0, 1, 2, 3, 4, 5];
        let positions = &mut positions[..leaves.len()];
        positions.sort_by_key(|&position| {
            std::cmp::Reverse(self.nodes[leaves[position].index()].arrival_fast)
        });
        let mut delays = [self.options.primary_delay_unit; MAX_CUT_SIZE];
        for &position in positions.iter().take(self.options.fast_edge_count) {
            delays[position] = self.options.secondary_delay_unit;
        }
        delays
    }

    /// Delay of the node when implemented by `cut` with fast edges.
    fn cut_delay_fast(&self, cut: StoredCut) -> i32 {
        let leaves = cut.leaf_vec();
        let edges = self.edge_delays(&leaves);
        leaves
            .iter()
            .zip(edges)
            .map(|(leaf, edge)| self.nodes[leaf.index()].arrival_fast + edge)
            .max()
            .unwrap_or(0)
    }

    fn cut_area_flow(&self, cut: StoredCut) -> f32 {
        cut.leaves()
            .map(|leaf| self.nodes[leaf.index()].area_flow)
            .sum::<f32>()
            + self.options.cut_area(cut.size())
    }

    /// Computes the arrival times of all nodes and returns the critical delay.
    ///
    /// Nodes with a selected cut take that cut's delay, all other gates the best delay among
    /// their stored cuts. The critical delay is the latest fast edge arrival among the output
    /// drivers.
    pub fn forward_pass(&mut self) -> i32 {
        assert!(self.generated, "cuts must be generated before optimizing");
        let network = self.network;

        for (var, node) in network.nodes() {
            let (arrival, arrival_fast) = if node.is_buf() {
                let source = &self.nodes[node.fanin(0).index()];
                (source.arrival, source.arrival_fast)
            } else if node.is_gate() {
                let cuts = self.gate_cuts(var);
                match self.nodes[var.index()].selected_cut() {
                    Some(index) => (
                        self.cut_delay(cuts.get(index)),
                        self.cut_delay_fast(cuts.get(index)),
                    ),
                    None => cuts
                        .iter()
                        .filter(|cut| !cut.is_trivial_for(var))
                        .map(|cut| (self.cut_delay(cut), self.cut_delay_fast(cut)))
                        .fold((i32::MAX, i32::MAX), |(a, b), (x, y)| (a.min(x), b.min(y))),
                }
            } else {
                (0, 0)
            };
            let state = &mut self.nodes[var.index()];
            state.arrival = arrival;
            state.arrival_fast = arrival_fast.min(arrival);
        }

        let (mut critical, mut critical_fast) = (0, 0);
        for &output in network.outputs() {
            let driver = &self.nodes[network.node(output).fanin(0).index()];
            critical = critical.max(driver.arrival);
            critical_fast = critical_fast.max(driver.arrival_fast);
        }
        self.stats.critical_delay = critical_fast;
        self.stats.critical_delay_primary = critical;
        critical_fast
    }

    /// Selects a cut for every referenced node in reverse topological order.
    ///
    /// The first call pins the required time of all output drivers to the delay target, or to
    /// `critical_delay` if no target is configured, and selects by area flow. Later calls
    /// reselect by exact area. Required times only ever decrease.
    pub fn backward_pass(&mut self, critical_delay: i32) -> Result<(), ConfigError> {
        assert!(self.generated, "cuts must be generated before optimizing");
        let selection = if self.refs_seeded {
            Selection::ExactArea
        } else {
            let target = self.options.delay_target.unwrap_or(critical_delay);
            if target < critical_delay {
                return Err(ConfigError::DelayTargetViolated {
                    target,
                    critical: critical_delay,
                });
            }
            self.seed_outputs(Some(target));
            Selection::AreaFlow
        };
        self.cover(selection);
        self.stats.rounds += 1;
        log::log!(
            self.summary_level(),
            "round {}: delay {} area {} edges {}",
            self.stats.rounds,
            critical_delay,
            self.stats.area,
            self.stats.edges,
        );
        Ok(())
    }

    /// Covers the network using the first stored cut of every referenced node.
    pub fn select_generation_best(&mut self) {
        assert!(self.generated, "cuts must be generated before selecting");
        assert!(!self.refs_seeded, "a cover was already selected");
        self.seed_outputs(None);
        self.cover(Selection::GenerationBest);
    }

    fn seed_outputs(&mut self, required: Option<i32>) {
        let network = self.network;
        for &output in network.outputs() {
            let driver = network.node(output).fanin(0).var();
            if let Some(required) = required {
                self.tighten_required(driver, required);
            }
            self.nodes[driver.index()].refs += 1;
        }
        self.refs_seeded = true;
    }

    fn tighten_required(&mut self, var: Var, required: i32) {
        let state = &mut self.nodes[var.index()];
        state.required = state.required.min(required);
    }

    fn cover(&mut self, selection: Selection) {
        let network = self.network;
        let structural = selection != Selection::ExactArea;
        let (mut area, mut edges) = (0, 0);

        for (var, node) in network.nodes().rev() {
            if self.nodes[var.index()].refs == 0 {
                continue;
            }
            if node.is_buf() {
                let source = node.fanin(0).var();
                self.tighten_required(source, self.nodes[var.index()].required);
                if structural {
                    self.nodes[source.index()].refs += 1;
                }
            } else if node.is_gate() {
                let index = self.select_cut(var, selection);
                self.nodes[var.index()].selected = Some(index as u8);

                let cut = self.gate_cuts(var).get(index);
                let (leaves, is_lut) = (cut.leaf_vec(), !cut.is_useless());
                if structural {
                    for leaf in leaves.iter() {
                        self.nodes[leaf.index()].refs += 1;
                    }
                }
                if selection != Selection::GenerationBest {
                    let required = self.nodes[var.index()].required;
                    let edge_delays = self.edge_delays(&leaves);
                    for (&leaf, edge) in leaves.iter().zip(edge_delays) {
                        self.tighten_required(leaf, required - edge);
                    }
                }
                if is_lut {
                    area += 1;
                    edges += leaves.len();
                }
            }
        }

        self.stats.area = area;
        self.stats.edges = edges;
    }

    /// Picks the cut implementing `var` in the current cover.
    ///
    /// For exact area selection the previous choice is dereferenced first and the winner is
    /// referenced again before returning.
    fn select_cut(&mut self, var: Var, selection: Selection) -> usize {
        if selection == Selection::GenerationBest {
            return 0;
        }
        if selection == Selection::ExactArea {
            let previous = self.selected_or_default(var);
            self.dereference_cut(var, previous);
        }

        let required = self.nodes[var.index()].required;
        let mut best: Option<(usize, f32)> = None;
        for index in 0..self.gate_cuts(var).len() {
            let cut = self.gate_cuts(var).get(index);
            if cut.is_trivial_for(var) || self.cut_delay_fast(cut) > required {
                continue;
            }
            let cost = match selection {
                Selection::ExactArea => self.exact_area(var, index),
                _ => self.cut_area_flow(self.gate_cuts(var).get(index)),
            };
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((index, cost));
            }
        }

        let Some((index, _)) = best else {
            panic!("no cut of {var} meets its required time {required}");
        };
        if selection == Selection::ExactArea {
            self.reference_cut(var, index);
        }
        index
    }

    /// The selected cut of a gate, or its first cut if none was selected yet.
    fn selected_or_default(&self, var: Var) -> usize {
        self.nodes[var.index()].selected_cut().unwrap_or(0)
    }

    /// Area added to the cover by implementing `var` with the cut at `index`.
    fn exact_area(&mut self, var: Var, index: usize) -> f32 {
        let added = self.reference_cut(var, index);
        let removed = self.dereference_cut(var, index);
        assert_eq!(added, -removed, "reference walks of {var} disagree");
        added
    }

    /// References the leaves of a cut, returning the area that becomes used.
    pub(crate) fn reference_cut(&mut self, var: Var, index: usize) -> f32 {
        let cut = self.gate_cuts(var).get(index);
        let leaves = cut.leaf_vec();
        let mut area = self.options.cut_area(leaves.len());
        for &leaf in leaves.iter() {
            area += self.reference_node(leaf);
        }
        area
    }

    /// Dereferences the leaves of a cut, returning the negated area that becomes unused.
    pub(crate) fn dereference_cut(&mut self, var: Var, index: usize) -> f32 {
        let cut = self.gate_cuts(var).get(index);
        let leaves = cut.leaf_vec();
        let mut area = -self.options.cut_area(leaves.len());
        for &leaf in leaves.iter() {
            area += self.dereference_node(leaf);
        }
        area
    }

    fn reference_node(&mut self, var: Var) -> f32 {
        let state = &mut self.nodes[var.index()];
        state.refs += 1;
        if state.refs > 1 {
            return 0.0;
        }
        let node = self.network.node(var);
        if node.is_buf() {
            self.reference_node(node.fanin(0).var())
        } else if node.is_gate() {
            let index = self.selected_or_default(var);
            self.reference_cut(var, index)
        } else {
            0.0
        }
    }

    fn dereference_node(&mut self, var: Var) -> f32 {
        let state = &mut self.nodes[var.index()];
        assert!(state.refs > 0, "reference count of {var} underflows");
        state.refs -= 1;
        if state.refs > 0 {
            return 0.0;
        }
        let node = self.network.node(var);
        if node.is_buf() {
            self.dereference_node(node.fanin(0).var())
        } else if node.is_gate() {
            let index = self.selected_or_default(var);
            self.dereference_cut(var, index)
        } else {
            0.0
        }
    }
}
