//! Numeric identifiers for network nodes and Boolean literals
pub mod lit;
pub mod pol;
pub mod var;

pub use lit::Lit;
pub use pol::{Negate, Pol};
pub use var::Var;
