#![allow(missing_docs)] // test only
use cutmap_network::{aiger::import_binary_aiger, Lit, Network, NodeKind};
use rand::{rngs::SmallRng, Rng, SeedableRng};

#[test]
fn random_networks_are_topologically_ordered() {
    let mut rng = SmallRng::seed_from_u64(7);

    for _ in 0..20 {
        let mut network = Network::new();
        let mut lits: Vec<Lit> = (0..6).map(|_| network.add_input()).collect();

        for _ in 0..100 {
            let a = lits[rng.gen_range(0..lits.len())] ^ rng.gen::<bool>();
            let b = lits[rng.gen_range(0..lits.len())] ^ rng.gen::<bool>();
            let c = lits[rng.gen_range(0..lits.len())] ^ rng.gen::<bool>();
            let lit = match rng.gen_range(0..4) {
                0 => network.add_xor(a, b),
                1 => network.add_mux(a, b, c),
                2 => network.add_buf(a),
                _ => network.add_and(a, b),
            };
            lits.push(lit);
        }
        for &lit in lits.iter().rev().take(4) {
            network.add_output(lit);
        }

        let mut fanouts = vec![0u32; network.len()];
        for (var, node) in network.nodes() {
            for fanin in node.fanins() {
                assert!(fanin.var() < var);
                fanouts[fanin.index()] += 1;
            }
        }
        for (var, node) in network.nodes() {
            assert_eq!(node.fanout_count(), fanouts[var.index()]);
        }
    }
}

#[test]
fn import_single_and() {
    // aig M=3 I=2 L=0 O=1 A=1, output 6, and 6 = 4 & 2 encoded as deltas 2, 2
    let mut data = b"aig 3 2 0 1 1\n6\n".to_vec();
    data.extend_from_slice(&[2, 2]);

    let network = import_binary_aiger(&data[..]).unwrap();

    assert_eq!(network.inputs().len(), 2);
    assert_eq!(network.outputs().len(), 1);

    let output = network.node(network.outputs()[0]);
    let driver = output.fanin(0);
    assert!(driver.is_pos());
    let and = network.node(driver.var());
    assert_eq!(and.kind(), NodeKind::And);
    let mut fanins = and.fanins().to_vec();
    fanins.sort();
    assert_eq!(fanins, network.inputs().iter().map(|v| v.as_lit()).collect::<Vec<_>>());
}
