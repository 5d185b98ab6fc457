//! Import of binary AIGER files into a [`Network`].
//!
//! Latches are cut: each latch output becomes a primary input and each next-state function a
//! primary output, so the result is the combinational part of the sequential circuit.
use std::io;

use flussab_aiger::aig::OrderedAig;

use crate::{Lit, Network, Var};

/// Type alias used to indicate which literals use the AIGER numbering as opposed to the network
/// numbering.
pub type AigerLit = Lit;

/// Read the passed data, parse it as a binary AIGER file and import it as a new network.
pub fn import_binary_aiger(binary_aiger: impl io::Read) -> Result<Network, flussab_aiger::ParseError> {
    let parser =
        flussab_aiger::binary::Parser::<AigerLit>::from_read(binary_aiger, Default::default())?;

    let header = parser.header();
    if header.invariant_constraint_count != 0 || header.justice_property_count != 0 {
        log::warn!("AIGER constraints and justice properties will be ignored");
    }

    let aig = parser.parse()?;
    Ok(import_ordered_aig(&aig))
}

/// Import an [`OrderedAig`] (representing a parsed binary AIGER file) as a new network.
///
/// Outputs are created for the AIGER outputs, then the bad state properties, then the latch next
/// state functions.
pub fn import_ordered_aig(aig: &OrderedAig<AigerLit>) -> Network {
    let mut network = Network::new();
    let mut var_map: Vec<Option<Lit>> = vec![None; aig.max_var_index + 1];

    var_map[Var::FALSE.index()] = Some(Lit::FALSE);

    let mut var_pos = 1;

    for _ in 0..aig.input_count + aig.latches.len() {
        var_map[var_pos] = Some(network.add_input());
        var_pos += 1;
    }

    let map_lit = |var_map: &[Option<Lit>], lit: AigerLit| {
        lit.lookup(|var| var_map[var.index()].expect("ordered AIGER defines inputs before use"))
    };

    for aiger_and in aig.and_gates.iter() {
        let [a, b] = aiger_and.inputs.map(|lit| map_lit(&var_map[..], lit));
        var_map[var_pos] = Some(network.add_and(a, b));
        var_pos += 1;
    }

    for &lit in aig.outputs.iter().chain(aig.bad_state_properties.iter()) {
        network.add_output(map_lit(&var_map[..], lit));
    }

    for latch in aig.latches.iter() {
        network.add_output(map_lit(&var_map[..], latch.next_state));
    }

    log::debug!(
        "imported AIGER with {} inputs, {} latches, {} ands",
        aig.input_count,
        aig.latches.len(),
        aig.and_gates.len()
    );

    network
}
