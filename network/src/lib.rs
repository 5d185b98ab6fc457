//! Combinational gate networks consumed by the cut-based mapper.
//!
//! A [`Network`] is an append-only graph of two-input AND and XOR gates, three-input multiplexers,
//! buffers, primary inputs and outputs. Node ids are [`Var`]s, fanins are [`Lit`]s, and since every
//! fanin must exist before the node using it, the id order is a topological order.
pub mod aiger;
pub mod network;

pub use cutmap_lit::{Lit, Pol, Var};
pub use network::{Network, Node, NodeKind};
