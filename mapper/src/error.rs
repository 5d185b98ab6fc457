//! Configuration errors reported by the mapper.

/// An invalid combination of options, or options that do not fit the network being mapped.
///
/// These are always reported before any per-node timing or selection state is written.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The cut size is not supported.
    #[error("cut size {0} is outside the supported range 2..=6")]
    CutSize(usize),

    /// The number of cuts per node is not supported.
    #[error("cut count {0} is outside the supported range 2..=32")]
    CutCount(usize),

    /// The network contains multiplexers, which need cuts of at least three leaves.
    #[error("cut size {cut_size} cannot cover the three inputs of a multiplexer")]
    CutSizeBelowMuxArity {
        /// The requested cut size.
        cut_size: usize,
    },

    /// More fast edges than leaves were requested.
    #[error("fast edge count {fast_edge_count} exceeds the cut size {cut_size}")]
    FastEdgeCount {
        /// The requested number of fast edges.
        fast_edge_count: usize,
        /// The requested cut size.
        cut_size: usize,
    },

    /// The delay units are not positive or the secondary unit is slower than the primary unit.
    #[error(
        "delay units must be positive with the secondary unit ({secondary}) not exceeding the \
         primary unit ({primary})"
    )]
    DelayUnits {
        /// Delay of a regular edge.
        primary: i32,
        /// Delay of a fast edge.
        secondary: i32,
    },

    /// A full cut list does not fit into a single arena segment.
    #[error("a cut list of {words} words does not fit into an arena segment of 65536 words")]
    CutListTooLarge {
        /// Size of a full cut list in words.
        words: usize,
    },

    /// The delay target is negative.
    #[error("delay target {0} is negative")]
    NegativeDelayTarget(i32),

    /// The delay target cannot be met by any cover built from the stored cuts.
    #[error("delay target {target} is below the achievable critical delay {critical}")]
    DelayTargetViolated {
        /// The requested delay target.
        target: i32,
        /// The smallest critical delay of the stored cuts.
        critical: i32,
    },
}
