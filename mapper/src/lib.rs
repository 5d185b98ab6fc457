//! Cut enumeration based technology mapping into K-input lookup tables.
//!
//! The mapper enumerates up to `cut_count` K-feasible cuts per node in a single topological sweep,
//! optionally tracking the Boolean function of every cut. It then alternates between a forward
//! arrival time pass and a backward pass selecting one cut per used node, first minimizing delay
//! and then recovering area under the resulting required times. The final cover is returned as a
//! [`MappingTable`].
//!
//! ```
//! use cutmap::{map, MapperOptions};
//! use cutmap_network::Network;
//!
//! let mut network = Network::new();
//! let a = network.add_input();
//! let b = network.add_input();
//! let c = network.add_input();
//! let ab = network.add_and(a, b);
//! let abc = network.add_xor(ab, c);
//! network.add_output(abc);
//!
//! let mapping = map(&network, MapperOptions::default()).unwrap();
//! assert_eq!(mapping.stats.area, 1);
//! assert_eq!(mapping.stats.critical_delay, 10);
//! ```
pub mod arena;
pub mod config;
pub mod cut;
pub mod dictionary;
pub mod error;
pub mod extract;
pub mod truth;

mod generate;
mod mapper;
mod optimize;
mod state;

#[doc(inline)]
pub use config::MapperOptions;
#[doc(inline)]
pub use error::ConfigError;
#[doc(inline)]
pub use extract::{MappedCut, MappedWire, Mapping, MappingStats, MappingTable};
pub use mapper::{map, Mapper};
pub use state::{NodeState, UNCONSTRAINED};
