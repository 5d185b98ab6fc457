//! Per-node mapping state.
use crate::arena::CutSetHandle;

/// Required time of nodes that are not constrained by any output.
pub const UNCONSTRAINED: i32 = i32::MAX;

/// Timing, selection and reference state of a single node.
#[derive(Clone, Debug)]
pub struct NodeState {
    pub(crate) cuts: Option<CutSetHandle>,
    pub(crate) selected: Option<u8>,
    pub(crate) arrival: i32,
    pub(crate) arrival_fast: i32,
    pub(crate) required: i32,
    pub(crate) refs: u32,
    pub(crate) area_flow: f32,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            cuts: None,
            selected: None,
            arrival: 0,
            arrival_fast: 0,
            required: UNCONSTRAINED,
            refs: 0,
            area_flow: 0.0,
        }
    }
}

impl NodeState {
    /// Location of the node's stored cuts, absent for inputs, the constant and outputs.
    pub fn cut_set(&self) -> Option<CutSetHandle> {
        self.cuts
    }

    /// Index of the selected cut within the stored cuts.
    pub fn selected_cut(&self) -> Option<usize> {
        self.selected.map(usize::from)
    }

    /// Arrival time using only regular edges.
    pub fn arrival(&self) -> i32 {
        self.arrival
    }

    /// Arrival time when the most critical inputs of every LUT use fast edges.
    ///
    /// Never exceeds [`arrival`][Self::arrival] and equals it without fast edges.
    pub fn arrival_fast(&self) -> i32 {
        self.arrival_fast
    }

    /// Latest permissible arrival time, [`UNCONSTRAINED`] until an output constrains it.
    pub fn required(&self) -> i32 {
        self.required
    }

    /// Number of references from selected cuts, buffers and outputs.
    pub fn refs(&self) -> u32 {
        self.refs
    }

    /// Estimated area of the node shared among its fanouts.
    pub fn area_flow(&self) -> f32 {
        self.area_flow
    }
}
