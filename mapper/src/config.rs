//! Mapper configuration.
use crate::{arena::SEGMENT_SIZE, cut::cut_list_words, error::ConfigError};

/// Largest supported cut size.
pub const MAX_CUT_SIZE: usize = 6;

/// Largest supported number of cuts stored per node.
pub const MAX_CUT_COUNT: usize = 32;

/// Options controlling cut enumeration and the delay/area optimization.
///
/// All delays are integers scaled by ten, so the default unit delay of a LUT is `10`.
#[derive(Clone, Debug)]
pub struct MapperOptions {
    /// Maximum number of leaves per cut (K).
    pub cut_size: usize,
    /// Maximum number of cuts stored per node (N), the trivial cut included.
    pub cut_count: usize,
    /// Number of delay/area optimization rounds.
    pub rounds: usize,
    /// Number of the most critical inputs of a LUT that may use the secondary delay.
    pub fast_edge_count: usize,
    /// Delay of a LUT seen through a regular input edge.
    pub primary_delay_unit: i32,
    /// Delay of a LUT seen through a fast input edge.
    pub secondary_delay_unit: i32,
    /// Additional area charged for every LUT.
    pub area_tuner: u32,
    /// Compute, minimize and deduplicate the Boolean function of every cut.
    pub enable_function_tracking: bool,
    /// Use the multi-word truth table implementation for cut functions.
    pub wide_truth_tables: bool,
    /// Required time for all outputs, defaults to the best achievable critical delay.
    pub delay_target: Option<i32>,
    /// Log per-round statistics at info level.
    pub verbose: bool,
    /// Log the stored cuts of every node at debug level.
    pub very_verbose: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            cut_size: 6,
            cut_count: 8,
            rounds: 2,
            fast_edge_count: 0,
            primary_delay_unit: 10,
            secondary_delay_unit: 10,
            area_tuner: 0,
            enable_function_tracking: false,
            wide_truth_tables: false,
            delay_target: None,
            verbose: false,
            very_verbose: false,
        }
    }
}

impl MapperOptions {
    /// Checks the options for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_CUT_SIZE).contains(&self.cut_size) {
            return Err(ConfigError::CutSize(self.cut_size));
        }
        if !(2..=MAX_CUT_COUNT).contains(&self.cut_count) {
            return Err(ConfigError::CutCount(self.cut_count));
        }
        if self.fast_edge_count > self.cut_size {
            return Err(ConfigError::FastEdgeCount {
                fast_edge_count: self.fast_edge_count,
                cut_size: self.cut_size,
            });
        }
        if self.primary_delay_unit <= 0
            || self.secondary_delay_unit <= 0
            || self.secondary_delay_unit > self.primary_delay_unit
        {
            return Err(ConfigError::DelayUnits {
                primary: self.primary_delay_unit,
                secondary: self.secondary_delay_unit,
            });
        }
        let words = cut_list_words(self.cut_size, self.cut_count);
        if words > SEGMENT_SIZE {
            return Err(ConfigError::CutListTooLarge { words });
        }
        if let Some(target) = self.delay_target {
            if target < 0 {
                return Err(ConfigError::NegativeDelayTarget(target));
            }
        }
        Ok(())
    }

    /// Delay added by implementing a node with a cut of the given number of leaves.
    ///
    /// Cuts with fewer than two leaves are wires or constants and add no delay.
    pub fn lut_delay(&self, size: usize) -> i32 {
        if size < 2 {
            0
        } else {
            self.primary_delay_unit
        }
    }

    /// Area charged for a cut with the given number of leaves.
    ///
    /// Cuts with fewer than two leaves are wires or constants and do not need a LUT.
    pub fn cut_area(&self, size: usize) -> f32 {
        if size < 2 {
            0.0
        } else {
            1.0 + self.area_tuner as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(MapperOptions::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_options() {
        let options = MapperOptions {
            cut_size: 7,
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ConfigError::CutSize(7)));

        let options = MapperOptions {
            cut_count: 1,
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ConfigError::CutCount(1)));

        let options = MapperOptions {
            secondary_delay_unit: 12,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::DelayUnits { .. })
        ));

        let options = MapperOptions {
            cut_size: 3,
            fast_edge_count: 4,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::FastEdgeCount { .. })
        ));

        let options = MapperOptions {
            delay_target: Some(-1),
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ConfigError::NegativeDelayTarget(-1)));
    }

    #[test]
    fn wires_cost_nothing() {
        let options = MapperOptions {
            area_tuner: 2,
            primary_delay_unit: 12,
            ..Default::default()
        };
        assert_eq!(options.cut_area(0), 0.0);
        assert_eq!(options.cut_area(1), 0.0);
        assert_eq!(options.cut_area(2), 3.0);
        assert_eq!(options.lut_delay(1), 0);
        assert_eq!(options.lut_delay(4), 12);
    }

    #[test]
    fn largest_cut_lists_fit_a_segment() {
        let options = MapperOptions {
            cut_size: MAX_CUT_SIZE,
            cut_count: MAX_CUT_COUNT,
            ..Default::default()
        };
        assert_eq!(options.validate(), Ok(()));
    }
}
