//! Running many independent networks side by side.
//!
//! `ParallelRunner` owns a set of [`Simulator`]s and advances all of them by
//! one cycle per round. Networks never share state, so each round ticks them
//! concurrently with rayon when the `parallel` feature is enabled and one
//! after the other otherwise. A simulator whose step fails is halted and
//! skipped in later rounds.
//!
//! # Feature Flag
//!
//! ```toml
//! [dependencies]
//! logicnet = { version = "0.1", features = ["parallel"] }
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use parking_lot::RwLock;

use crate::engine::Simulator;
use crate::error::{SimError, SimResult};
use crate::report::CycleReport;

/// Statistics for the parallel runner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParallelRunnerStats {
    /// Rounds executed
    pub rounds: u64,
    /// Successful ticks over all simulators
    pub ticks: u64,
    /// Failed steps over all simulators
    pub failures: u64,
}

struct Slot {
    simulator: Simulator,
    /// Error that stopped this simulator
    halted: Option<SimError>,
}

/// Steps many simulators per round.
///
/// # Example
///
/// ```
/// use logicnet::{BlockDesc, Network, ParallelRunner, Simulator};
///
/// let mut runner = ParallelRunner::new();
/// for _ in 0..4 {
///     let mut network = Network::new();
///     network.add_block(BlockDesc::gate("AND")).unwrap();
///     runner.add(Simulator::with_default_registry(network));
/// }
///
/// runner.run(10);
/// assert_eq!(runner.stats().ticks, 40);
/// ```
pub struct ParallelRunner {
    slots: Vec<Slot>,
    stats: RwLock<ParallelRunnerStats>,
    /// Number of worker threads (0 = auto)
    num_threads: usize,
}

impl Default for ParallelRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelRunner {
    /// Creates an empty runner.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            stats: RwLock::new(ParallelRunnerStats::default()),
            num_threads: 0,
        }
    }

    /// Sets the number of worker threads.
    ///
    /// Pass 0 for automatic detection (uses number of CPUs).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Adds a simulator and returns its index.
    pub fn add(&mut self, simulator: Simulator) -> usize {
        self.slots.push(Slot {
            simulator,
            halted: None,
        });
        self.slots.len() - 1
    }

    /// Number of simulators.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no simulators were added.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns a simulator.
    pub fn get(&self, index: usize) -> Option<&Simulator> {
        self.slots.get(index).map(|s| &s.simulator)
    }

    /// Returns a simulator for edits between rounds.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Simulator> {
        self.slots.get_mut(index).map(|s| &mut s.simulator)
    }

    /// Error that halted a simulator, if any.
    pub fn halted(&self, index: usize) -> Option<&SimError> {
        self.slots.get(index).and_then(|s| s.halted.as_ref())
    }

    /// Advances every running simulator by one cycle.
    ///
    /// Returns one entry per simulator, in insertion order; `None` for
    /// simulators halted in an earlier round.
    pub fn step(&mut self) -> Vec<Option<SimResult<CycleReport>>> {
        #[cfg(feature = "parallel")]
        let results: Vec<_> = self.slots.par_iter_mut().map(step_slot).collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = self.slots.iter_mut().map(step_slot).collect();

        let mut stats = self.stats.write();
        stats.rounds += 1;
        for result in results.iter().flatten() {
            match result {
                Ok(_) => stats.ticks += 1,
                Err(_) => stats.failures += 1,
            }
        }

        results
    }

    /// Runs `rounds` rounds.
    pub fn run(&mut self, rounds: u64) {
        #[cfg(feature = "parallel")]
        if self.num_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.num_threads)
                .build_global()
                .ok(); // Ignore if already configured
        }

        for _ in 0..rounds {
            self.step();
        }
    }

    /// Returns the runner statistics.
    pub fn stats(&self) -> ParallelRunnerStats {
        self.stats.read().clone()
    }

    /// Exports statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        let stats = self.stats.read();
        let simulators: Vec<_> = self
            .slots
            .iter()
            .map(|s| {
                let mut json = s.simulator.export_stats();
                json["halted"] = serde_json::json!(s.halted.as_ref().map(|e| e.to_string()));
                json
            })
            .collect();

        serde_json::json!({
            "runner": {
                "rounds": stats.rounds,
                "ticks": stats.ticks,
                "failures": stats.failures,
                "simulator_count": self.slots.len(),
                "parallel": cfg!(feature = "parallel"),
            },
            "simulators": simulators,
        })
    }

    /// Consumes the runner and returns the simulators.
    pub fn into_simulators(self) -> Vec<Simulator> {
        self.slots.into_iter().map(|s| s.simulator).collect()
    }
}

fn step_slot(slot: &mut Slot) -> Option<SimResult<CycleReport>> {
    if slot.halted.is_some() {
        return None;
    }
    let result = slot.simulator.step();
    if let Err(ref err) = result {
        tracing::warn!(error = %err, "Simulator halted");
        slot.halted = Some(err.clone());
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockDesc;
    use crate::evaluator::EvaluatorConfig;
    use crate::logic::Logic;
    use crate::network::Network;
    use crate::types::BlockId;

    fn inverter_chain(input_level: Logic) -> (Simulator, BlockId) {
        let mut net = Network::new();
        let input = net.add_block(BlockDesc::input_pin()).unwrap();
        let not = net.add_block(BlockDesc::inverter()).unwrap();
        net.connect_named(input, "OUT", not, "IN").unwrap();
        net.set_input(input, input_level).unwrap();
        (Simulator::with_default_registry(net), not)
    }

    #[test]
    fn test_runner_creation() {
        let runner = ParallelRunner::new().with_threads(2);
        assert!(runner.is_empty());
        assert_eq!(runner.stats(), ParallelRunnerStats::default());
    }

    #[test]
    fn test_runner_step() {
        let mut runner = ParallelRunner::new();
        let (a, not_a) = inverter_chain(Logic::True);
        let (b, not_b) = inverter_chain(Logic::False);
        let ia = runner.add(a);
        let ib = runner.add(b);

        let results = runner.step();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(r, Some(Ok(_)))));

        let a = runner.get(ia).unwrap();
        let b = runner.get(ib).unwrap();
        assert_eq!(a.network().state_of(not_a, "OUT").unwrap(), Logic::False);
        assert_eq!(b.network().state_of(not_b, "OUT").unwrap(), Logic::True);
    }

    #[test]
    fn test_runner_halts_failed_simulator() {
        let mut net = Network::new();
        let not = net.add_block(BlockDesc::inverter()).unwrap();
        net.connect_named(not, "OUT", not, "IN").unwrap();
        let pin = net.pin(not, "IN").unwrap();
        net.preset_pin(pin, Logic::True).unwrap();
        let ring = Simulator::with_default_registry(net)
            .with_config(EvaluatorConfig::new().with_oscillation_limit(1));

        let mut runner = ParallelRunner::new();
        let (healthy, _) = inverter_chain(Logic::True);
        runner.add(healthy);
        let ring = runner.add(ring);

        runner.run(3);

        assert!(matches!(
            runner.halted(ring),
            Some(SimError::RepeatedOscillation { cycles: 1 })
        ));
        let stats = runner.stats();
        assert_eq!(stats.rounds, 3);
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.failures, 1);

        let json = runner.export_stats();
        assert_eq!(json["runner"]["simulator_count"], 2);
        assert!(json["simulators"][1]["halted"].is_string());
    }
}
