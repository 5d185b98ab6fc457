//! The mapping engine tying cut generation, optimization and extraction together.
use cutmap_lit::Var;
use cutmap_network::{Network, NodeKind};

use crate::{
    arena::CutArena,
    config::MapperOptions,
    cut::StoredCuts,
    dictionary::FuncRef,
    error::ConfigError,
    extract::{Mapping, MappingStats},
    generate::FunctionStore,
    state::NodeState,
};

/// Maps a network into K-input LUTs.
///
/// Owns all per-node state and the cut arena for the duration of a mapping. The individual
/// phases are exposed for inspection; [`run`][Self::run] performs the complete flow.
pub struct Mapper<'a> {
    pub(crate) network: &'a Network,
    pub(crate) options: MapperOptions,
    pub(crate) arena: CutArena,
    pub(crate) functions: FunctionStore,
    pub(crate) nodes: Vec<NodeState>,
    pub(crate) stats: MappingStats,
    pub(crate) generated: bool,
    pub(crate) refs_seeded: bool,
}

impl<'a> Mapper<'a> {
    /// Creates a mapper after validating the options against the network.
    pub fn new(network: &'a Network, options: MapperOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        if options.cut_size < NodeKind::Mux.arity()
            && network.nodes().any(|(_, node)| node.is_mux())
        {
            return Err(ConfigError::CutSizeBelowMuxArity {
                cut_size: options.cut_size,
            });
        }
        Ok(Self {
            network,
            functions: FunctionStore::new(&options),
            options,
            arena: CutArena::default(),
            nodes: vec![NodeState::default(); network.len()],
            stats: MappingStats::default(),
            generated: false,
            refs_seeded: false,
        })
    }

    /// Runs cut generation, all optimization rounds and extraction.
    pub fn run(mut self) -> Result<Mapping, ConfigError> {
        self.generate_cuts();

        if self.options.rounds == 0 {
            self.forward_pass();
            self.select_generation_best();
        }
        for _ in 0..self.options.rounds {
            let critical = self.forward_pass();
            self.backward_pass(critical)?;
        }
        self.forward_pass();

        let table = self.extract();
        let wires = self.wires();
        log::info!(
            "mapped: delay {} area {} edges {} ({} cuts, {} functions, {} KiB arena)",
            self.stats.critical_delay,
            self.stats.area,
            self.stats.edges,
            self.stats.cut_count,
            self.stats.function_count,
            self.stats.arena_bytes >> 10,
        );
        Ok(Mapping {
            table,
            wires,
            stats: self.stats,
        })
    }

    /// The network being mapped.
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// The validated options.
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> &MappingStats {
        &self.stats
    }

    /// The mapping state of a node.
    pub fn state(&self, var: Var) -> &NodeState {
        &self.nodes[var.index()]
    }

    /// The cuts stored for a node, absent for inputs, the constant and outputs.
    ///
    /// Buffers report the cuts of the node they forward.
    pub fn cuts(&self, var: Var) -> Option<StoredCuts<'_>> {
        let handle = self.nodes[var.index()].cuts?;
        Some(StoredCuts::new(
            self.arena.resolve(handle),
            self.options.cut_size,
        ))
    }

    /// The truth table words of a tracked cut function.
    pub fn function_words(&self, func: FuncRef) -> Option<Vec<u64>> {
        self.functions.words(func)
    }

    pub(crate) fn gate_cuts(&self, var: Var) -> StoredCuts<'_> {
        match self.cuts(var) {
            Some(cuts) => cuts,
            None => panic!("gate {var} has no stored cuts"),
        }
    }

    pub(crate) fn summary_level(&self) -> log::Level {
        if self.options.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }

    pub(crate) fn node_level(&self) -> log::Level {
        if self.options.very_verbose {
            log::Level::Debug
        } else {
            log::Level::Trace
        }
    }
}

/// Maps `network` with the given options.
pub fn map(network: &Network, options: MapperOptions) -> Result<Mapping, ConfigError> {
    Mapper::new(network, options)?.run()
}
