//! SR latch example.
//!
//! Two `INPUT` blocks fed from a seeded bit source drive the S and R pins of
//! a set-priority latch. Every cycle prints the stimulus and the latch
//! outputs, showing hold, set, reset and the set-wins case.
//!
//! Run with: `cargo run --example sr_latch`

use logicnet::{init_logging, BlockDesc, BlockId, Logic, Network, NetworkResult, Simulator};

const CYCLES: u64 = 16;

// -----------------------------------------------------------------------------
// Seeded bit source
// -----------------------------------------------------------------------------

struct BitSource {
    seed: u64,
}

impl BitSource {
    fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn next_bits(&mut self) -> (Logic, Logic) {
        // Xorshift64
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.seed = x;

        (Logic::from(x & 0b01 != 0), Logic::from(x & 0b10 != 0))
    }
}

// -----------------------------------------------------------------------------
// Circuit
// -----------------------------------------------------------------------------

struct LatchCircuit {
    set: BlockId,
    reset: BlockId,
    latch: BlockId,
}

fn build(network: &mut Network) -> NetworkResult<LatchCircuit> {
    let set = network.add_block(BlockDesc::input_pin().with_property("label", "S"))?;
    let reset = network.add_block(BlockDesc::input_pin().with_property("label", "R"))?;
    let latch = network.add_block(BlockDesc::latch("SR-SET"))?;
    let q = network.add_block(BlockDesc::output_pin().with_property("label", "Q"))?;

    network.connect_named(set, "OUT", latch, "S")?;
    network.connect_named(reset, "OUT", latch, "R")?;
    network.connect_named(latch, "Q", q, "IN")?;

    Ok(LatchCircuit { set, reset, latch })
}

fn main() {
    init_logging("warn");

    println!("==== SR latch example ====");
    println!("cycle  S R  Q NQ");

    let mut network = Network::new();
    let circuit = match build(&mut network) {
        Ok(circuit) => circuit,
        Err(e) => {
            eprintln!("failed to build network: {}", e);
            return;
        }
    };

    let mut sim = Simulator::with_default_registry(network)
        .with_stats(true)
        .with_name("sr_latch");
    let mut source = BitSource::new(0x5eed);

    for _ in 0..CYCLES {
        let (s, r) = source.next_bits();
        let net = sim.network_mut();
        if net.set_input(circuit.set, s).is_err() || net.set_input(circuit.reset, r).is_err() {
            eprintln!("stimulus block vanished");
            return;
        }

        let report = match sim.step() {
            Ok(report) => report,
            Err(e) => {
                eprintln!("cycle failed: {}", e);
                return;
            }
        };

        let q = sim.network().state_of(circuit.latch, "Q").unwrap_or_default();
        let nq = sim.network().state_of(circuit.latch, "NQ").unwrap_or_default();
        println!("{:>5}  {} {}  {} {}", report.cycle, s, r, q, nq);
    }

    let stats = sim.finish();
    println!();
    print!("{}", stats.summary());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_source_is_deterministic() {
        let mut a = BitSource::new(7);
        let mut b = BitSource::new(7);
        for _ in 0..8 {
            assert_eq!(a.next_bits(), b.next_bits());
        }
    }

    #[test]
    fn latch_follows_set_and_reset() {
        let mut network = Network::new();
        let circuit = build(&mut network).unwrap();
        let mut sim = Simulator::with_default_registry(network);

        sim.network_mut().set_input(circuit.set, Logic::True).unwrap();
        sim.network_mut().set_input(circuit.reset, Logic::False).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.network().state_of(circuit.latch, "Q").unwrap(), Logic::True);

        sim.network_mut().set_input(circuit.set, Logic::False).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.network().state_of(circuit.latch, "Q").unwrap(), Logic::True);
    }
}
