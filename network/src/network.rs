//! Network container and builder.
use cutmap_lit::{Lit, Var};

/// Kind of a network node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum NodeKind {
    /// The constant false node, always [`Var::FALSE`].
    Const,
    /// Primary input.
    Input,
    /// Boolean 'and' of two literals.
    And,
    /// Boolean 'xor' of two literals.
    Xor,
    /// Multiplexer, `fanin(0) ? fanin(1) : fanin(2)`.
    Mux,
    /// Single input buffer, possibly complemented.
    Buf,
    /// Primary output driven by its single fanin.
    Output,
}

impl NodeKind {
    /// Human readable name of the node kind.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Const => "Const",
            NodeKind::Input => "Input",
            NodeKind::And => "And",
            NodeKind::Xor => "Xor",
            NodeKind::Mux => "Mux",
            NodeKind::Buf => "Buf",
            NodeKind::Output => "Output",
        }
    }

    /// Number of fanins of a node of this kind.
    pub fn arity(self) -> usize {
        match self {
            NodeKind::Const | NodeKind::Input => 0,
            NodeKind::Buf | NodeKind::Output => 1,
            NodeKind::And | NodeKind::Xor => 2,
            NodeKind::Mux => 3,
        }
    }

    const ALL: [NodeKind; 7] = [
        NodeKind::Const,
        NodeKind::Input,
        NodeKind::And,
        NodeKind::Xor,
        NodeKind::Mux,
        NodeKind::Buf,
        NodeKind::Output,
    ];
}

/// A single node of a [`Network`].
#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    fanins: [Lit; 3],
    choice: Option<Lit>,
    fanout: u32,
}

impl Node {
    fn new(kind: NodeKind, fanins: &[Lit]) -> Self {
        debug_assert_eq!(fanins.len(), kind.arity());
        let mut padded = [Lit::FALSE; 3];
        padded[..fanins.len()].copy_from_slice(fanins);
        Node {
            kind,
            fanins: padded,
            choice: None,
            fanout: 0,
        }
    }

    /// The kind of this node.
    #[inline(always)]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The fanin literals of this node, in the order given by its kind.
    #[inline(always)]
    pub fn fanins(&self) -> &[Lit] {
        &self.fanins[..self.kind.arity()]
    }

    /// A single fanin literal.
    #[inline(always)]
    #[track_caller]
    pub fn fanin(&self, index: usize) -> Lit {
        self.fanins()[index]
    }

    /// A structurally different but functionally equivalent node, given as a literal such that
    /// this node computes `choice.var() ^ choice.pol()`.
    #[inline(always)]
    pub fn choice(&self) -> Option<Lit> {
        self.choice
    }

    /// Number of fanin references to this node from other nodes, outputs included.
    #[inline(always)]
    pub fn fanout_count(&self) -> u32 {
        self.fanout
    }

    /// Whether this is the constant false node.
    pub fn is_const(&self) -> bool {
        self.kind == NodeKind::Const
    }

    /// Whether this is a primary input.
    pub fn is_input(&self) -> bool {
        self.kind == NodeKind::Input
    }

    /// Whether this is a two-input 'and'.
    pub fn is_and(&self) -> bool {
        self.kind == NodeKind::And
    }

    /// Whether this is a two-input 'xor'.
    pub fn is_xor(&self) -> bool {
        self.kind == NodeKind::Xor
    }

    /// Whether this is a multiplexer.
    pub fn is_mux(&self) -> bool {
        self.kind == NodeKind::Mux
    }

    /// Whether this is a buffer.
    pub fn is_buf(&self) -> bool {
        self.kind == NodeKind::Buf
    }

    /// Whether this is a primary output.
    pub fn is_output(&self) -> bool {
        self.kind == NodeKind::Output
    }

    /// Whether this node is a logic gate that gets covered by the mapper.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, NodeKind::And | NodeKind::Xor | NodeKind::Mux)
    }
}

/// Append-only combinational network.
///
/// Var `0` is always the constant false node. Fanins are checked to refer to existing non-output
/// nodes, so node ids are topologically sorted.
#[derive(Clone, Debug)]
pub struct Network {
    nodes: Vec<Node>,
    inputs: Vec<Var>,
    outputs: Vec<Var>,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Const, &[])],
            inputs: vec![],
            outputs: vec![],
        }
    }
}

impl Network {
    /// Creates a network containing only the constant node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, including the constant node.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` as the constant node is always present.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for a variable.
    #[inline(always)]
    #[track_caller]
    pub fn node(&self, var: Var) -> &Node {
        &self.nodes[var.index()]
    }

    /// Iterates over all variables in topological order.
    pub fn vars(&self) -> impl DoubleEndedIterator<Item = Var> + ExactSizeIterator {
        (0..self.nodes.len()).map(Var::from_index)
    }

    /// Iterates over all nodes in topological order.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = (Var, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (Var::from_index(index), node))
    }

    /// The primary input nodes in creation order.
    pub fn inputs(&self) -> &[Var] {
        &self.inputs
    }

    /// The primary output nodes in creation order.
    pub fn outputs(&self) -> &[Var] {
        &self.outputs
    }

    /// Counts the nodes of every kind, skipping kinds that do not occur.
    pub fn node_kind_stats(&self) -> Vec<(NodeKind, usize)> {
        let mut counts = [0usize; NodeKind::ALL.len()];
        for node in self.nodes.iter() {
            counts[node.kind as usize] += 1;
        }
        NodeKind::ALL
            .into_iter()
            .zip(counts)
            .filter(|&(_, count)| count != 0)
            .collect()
    }

    /// Follows buffers starting at `lit`, accumulating their polarities.
    pub fn resolve_buf(&self, mut lit: Lit) -> Lit {
        loop {
            let node = self.node(lit.var());
            if !node.is_buf() {
                return lit;
            }
            lit = node.fanin(0) ^ lit.pol();
        }
    }

    #[track_caller]
    fn push(&mut self, kind: NodeKind, fanins: &[Lit]) -> Var {
        for &fanin in fanins {
            let fanin_node = &mut self.nodes[fanin.index()];
            assert!(
                !fanin_node.is_output(),
                "output {} used as a fanin",
                fanin.var()
            );
            fanin_node.fanout += 1;
        }
        let var = Var::from_index(self.nodes.len());
        self.nodes.push(Node::new(kind, fanins));
        var
    }

    /// Adds a primary input.
    pub fn add_input(&mut self) -> Lit {
        let var = self.push(NodeKind::Input, &[]);
        self.inputs.push(var);
        var.as_lit()
    }

    /// Adds an 'and' gate.
    #[track_caller]
    pub fn add_and(&mut self, a: Lit, b: Lit) -> Lit {
        self.push(NodeKind::And, &[a, b]).as_lit()
    }

    /// Adds an 'or' gate, represented as a complemented 'and' of complemented inputs.
    #[track_caller]
    pub fn add_or(&mut self, a: Lit, b: Lit) -> Lit {
        !self.add_and(!a, !b)
    }

    /// Adds an 'xor' gate.
    #[track_caller]
    pub fn add_xor(&mut self, a: Lit, b: Lit) -> Lit {
        self.push(NodeKind::Xor, &[a, b]).as_lit()
    }

    /// Adds a multiplexer computing `sel ? if_true : if_false`.
    #[track_caller]
    pub fn add_mux(&mut self, sel: Lit, if_true: Lit, if_false: Lit) -> Lit {
        self.push(NodeKind::Mux, &[sel, if_true, if_false]).as_lit()
    }

    /// Adds a buffer.
    #[track_caller]
    pub fn add_buf(&mut self, input: Lit) -> Lit {
        self.push(NodeKind::Buf, &[input]).as_lit()
    }

    /// Adds a primary output driven by `driver`.
    #[track_caller]
    pub fn add_output(&mut self, driver: Lit) -> Var {
        let var = self.push(NodeKind::Output, &[driver]);
        self.outputs.push(var);
        var
    }

    /// Records `sibling` as a structural choice of the gate `node`.
    ///
    /// The sibling has to be an earlier gate computing `node` up to the given polarity. This is
    /// not checked.
    #[track_caller]
    pub fn set_choice(&mut self, node: Var, sibling: Lit) {
        assert!(sibling.var() < node, "choice {sibling} does not precede {node}");
        assert!(self.node(sibling.var()).is_gate());
        let node = &mut self.nodes[node.index()];
        assert!(node.is_gate());
        assert!(node.choice.is_none());
        node.choice = Some(sibling);
    }

    /// Logs the node statistics at info level.
    pub fn log_stats(&self) {
        for (kind, count) in self.node_kind_stats() {
            log::info!("{}: {}", kind.name(), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fanouts_are_counted() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let ab = network.add_and(a, !b);
        let x = network.add_xor(ab, a);
        network.add_output(x);
        network.add_output(!ab);

        assert_eq!(network.node(a.var()).fanout_count(), 2);
        assert_eq!(network.node(b.var()).fanout_count(), 1);
        assert_eq!(network.node(ab.var()).fanout_count(), 2);
        assert_eq!(network.node(x.var()).fanout_count(), 1);
        assert_eq!(network.outputs().len(), 2);
        assert_eq!(network.node(ab.var()).fanins(), &[a, !b]);
    }

    #[test]
    fn buffers_resolve_with_polarity() {
        let mut network = Network::new();
        let a = network.add_input();
        let b1 = network.add_buf(!a);
        let b2 = network.add_buf(!b1);
        assert_eq!(network.resolve_buf(b2), a);
        assert_eq!(network.resolve_buf(!b2), !a);
        assert_eq!(network.resolve_buf(b1), !a);
    }

    #[test]
    #[should_panic]
    fn outputs_are_not_fanins() {
        let mut network = Network::new();
        let a = network.add_input();
        let o = network.add_output(a);
        network.add_and(o.as_lit(), a);
    }

    #[test]
    fn stats_skip_missing_kinds() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let m = network.add_mux(a, b, !b);
        network.add_output(m);
        assert_eq!(
            network.node_kind_stats(),
            vec![
                (NodeKind::Const, 1),
                (NodeKind::Input, 2),
                (NodeKind::Mux, 1),
                (NodeKind::Output, 1)
            ]
        );
    }
}
