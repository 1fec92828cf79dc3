//! The simulator: a network bundled with its clock, evaluator and stats.
//!
//! [`Simulator`] is the manual driver of one network. It forwards each step
//! to the [`Evaluator`], keeps the last report, feeds the stats collector and
//! turns a run of oscillating cycles into an error when an oscillation limit
//! is configured.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::evaluator::{CancelToken, Evaluator, EvaluatorConfig};
use crate::network::Network;
use crate::registry::{create_default_registry, SimulationRegistry};
use crate::report::CycleReport;
use crate::stats::{SimulationStats, StatsCollector};
use crate::types::Cycle;

/// Drives one network cycle by cycle.
///
/// # Example
///
/// ```
/// use logicnet::{BlockDesc, Logic, Network, Simulator};
///
/// let mut network = Network::new();
/// let s = network.add_block(BlockDesc::input_pin()).unwrap();
/// let r = network.add_block(BlockDesc::input_pin()).unwrap();
/// let latch = network.add_block(BlockDesc::latch("SR-SET")).unwrap();
/// network.connect_named(s, "OUT", latch, "S").unwrap();
/// network.connect_named(r, "OUT", latch, "R").unwrap();
/// network.set_input(s, Logic::True).unwrap();
/// network.set_input(r, Logic::False).unwrap();
///
/// let mut sim = Simulator::with_default_registry(network);
/// sim.step().unwrap();
/// assert_eq!(sim.network().state_of(latch, "Q").unwrap(), Logic::True);
/// ```
pub struct Simulator {
    network: Network,
    clock: Clock,
    evaluator: Evaluator,
    stats: StatsCollector,
    collect_stats: bool,
    /// Consecutive cycles that did not converge
    oscillating: u32,
    last_report: Option<CycleReport>,
}

impl Simulator {
    /// Creates a simulator with the default clock and evaluator settings.
    pub fn new(network: Network, registry: Arc<SimulationRegistry>) -> Self {
        let mut stats = StatsCollector::new();
        stats.start();
        Self {
            network,
            clock: Clock::default(),
            evaluator: Evaluator::new(registry),
            stats,
            collect_stats: true,
            oscillating: 0,
            last_report: None,
        }
    }

    /// Creates a simulator over the built-in behaviors.
    pub fn with_default_registry(network: Network) -> Self {
        Self::new(network, Arc::new(create_default_registry()))
    }

    /// Creates a simulator configured from a [`SimConfig`].
    pub fn from_config(
        network: Network,
        registry: Arc<SimulationRegistry>,
        config: &SimConfig,
    ) -> Self {
        Self::new(network, registry)
            .with_clock(config.clock())
            .with_config(config.evaluator_config())
            .with_stats(config.simulation.collect_stats)
    }

    /// Replaces the clock. Intended before the first step.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the evaluator configuration.
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.evaluator = self.evaluator.with_config(config);
        self
    }

    /// Enables or disables stats collection.
    pub fn with_stats(mut self, enable: bool) -> Self {
        self.collect_stats = enable;
        self
    }

    /// Names the run in exported stats.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.stats.set_name(name);
        self
    }

    /// Returns the network.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Returns the network for structural edits and stimuli between steps.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Returns the clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Current cycle.
    pub fn cycle(&self) -> Cycle {
        self.clock.cycle()
    }

    /// Returns the evaluator.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Report of the last completed cycle.
    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    /// Runs one cycle.
    pub fn step(&mut self) -> SimResult<CycleReport> {
        let result = self.evaluator.tick(&mut self.network, &mut self.clock);
        self.finish_step(result)
    }

    /// Runs one cycle, abandoning it if `cancel` is raised.
    pub fn step_with_cancel(&mut self, cancel: &CancelToken) -> SimResult<CycleReport> {
        let result = self
            .evaluator
            .tick_with_cancel(&mut self.network, &mut self.clock, cancel);
        self.finish_step(result)
    }

    /// Runs `cycles` cycles and returns their reports.
    ///
    /// Stops at the first error.
    pub fn run(&mut self, cycles: u64) -> SimResult<Vec<CycleReport>> {
        let mut reports = Vec::with_capacity(cycles.min(1024) as usize);
        for _ in 0..cycles {
            reports.push(self.step()?);
        }
        Ok(reports)
    }

    fn finish_step(&mut self, result: SimResult<CycleReport>) -> SimResult<CycleReport> {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                if matches!(err, SimError::Cancelled { .. }) && self.collect_stats {
                    self.stats.record_cancelled();
                }
                return Err(err);
            }
        };

        if self.collect_stats {
            self.stats.record(&report);
        }
        self.oscillating = if report.converged {
            0
        } else {
            self.oscillating + 1
        };
        self.last_report = Some(report.clone());

        if let Some(limit) = self.evaluator.config().oscillation_limit {
            if self.oscillating >= limit {
                tracing::warn!(cycles = self.oscillating, "Oscillation limit reached");
                return Err(SimError::RepeatedOscillation {
                    cycles: self.oscillating,
                });
            }
        }

        Ok(report)
    }

    /// Puts every pin and latch back to power-on state and the clock to 0.
    ///
    /// Structure and stimuli are kept.
    pub fn reset(&mut self) {
        self.network.reset();
        self.clock = Clock::new(self.clock.resolution());
        self.oscillating = 0;
        self.last_report = None;
        let mut stats = StatsCollector::new();
        stats.set_name(self.stats.stats().metadata.name.clone());
        stats.start();
        self.stats = stats;
    }

    /// Stops the timer and returns the collected statistics.
    pub fn finish(&mut self) -> SimulationStats {
        self.stats.stop();
        self.stats.stats().clone()
    }

    /// Returns the collected statistics.
    pub fn stats(&self) -> &SimulationStats {
        self.stats.stats()
    }

    /// Exports the simulator state and statistics.
    pub fn export_stats(&self) -> serde_json::Value {
        let e = &self.stats.stats().evaluation;
        serde_json::json!({
            "simulator": {
                "cycle": self.clock.cycle(),
                "resolution": self.clock.resolution(),
                "budget": self.evaluator.budget(&self.clock),
                "blocks": self.network.block_count(),
                "pins": self.network.pin_count(),
                "wires": self.network.wire_count(),
                "oscillating_streak": self.oscillating,
            },
            "evaluation": {
                "cycles": e.cycles,
                "total_iterations": e.total_iterations,
                "peak_iterations": e.peak_iterations,
                "conflicts": e.conflicts,
                "oscillating_cycles": e.oscillating_cycles,
                "unresolved_blocks": e.unresolved_blocks,
                "cancelled_ticks": e.cancelled_ticks,
            },
        })
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("network", &self.network)
            .field("clock", &self.clock)
            .field("evaluator", &self.evaluator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockDesc;
    use crate::logic::Logic;

    fn inverter_loop() -> (Network, crate::types::PinId) {
        let mut net = Network::new();
        let not = net.add_block(BlockDesc::inverter()).unwrap();
        net.connect_named(not, "OUT", not, "IN").unwrap();
        let input = net.pin(not, "IN").unwrap();
        (net, input)
    }

    #[test]
    fn test_simulator_creation() {
        let sim = Simulator::with_default_registry(Network::new());
        assert_eq!(sim.cycle(), 0);
        assert!(sim.last_report().is_none());
        assert_eq!(sim.clock().resolution(), crate::clock::DEFAULT_RESOLUTION);
    }

    #[test]
    fn test_run() {
        let mut sim = Simulator::with_default_registry(Network::new());
        let reports = sim.run(5).unwrap();

        assert_eq!(reports.len(), 5);
        assert_eq!(reports[4].cycle, 4);
        assert_eq!(sim.cycle(), 5);
        assert_eq!(sim.stats().evaluation.cycles, 5);
        assert_eq!(sim.last_report().map(|r| r.cycle), Some(4));
    }

    #[test]
    fn test_oscillation_limit() {
        let (mut net, input) = inverter_loop();
        net.preset_pin(input, Logic::True).unwrap();

        let mut sim = Simulator::with_default_registry(net)
            .with_clock(Clock::new(8))
            .with_config(EvaluatorConfig::new().with_oscillation_limit(3));

        assert!(sim.step().is_ok());
        assert!(sim.step().is_ok());
        assert_eq!(
            sim.step().unwrap_err(),
            SimError::RepeatedOscillation { cycles: 3 }
        );
        assert_eq!(sim.stats().evaluation.oscillating_cycles, 3);
    }

    #[test]
    fn test_stats_disabled() {
        let mut sim = Simulator::with_default_registry(Network::new()).with_stats(false);
        sim.run(3).unwrap();
        assert_eq!(sim.stats().evaluation.cycles, 0);
        assert_eq!(sim.cycle(), 3);
    }

    #[test]
    fn test_reset() {
        let mut net = Network::new();
        let input = net.add_block(BlockDesc::input_pin()).unwrap();
        net.set_input(input, Logic::True).unwrap();

        let mut sim = Simulator::with_default_registry(net).with_name("reset");
        sim.run(2).unwrap();
        assert_eq!(sim.network().state_of(input, "OUT").unwrap(), Logic::True);

        sim.reset();
        assert_eq!(sim.cycle(), 0);
        assert_eq!(sim.network().state_of(input, "OUT").unwrap(), Logic::Undefined);
        assert_eq!(sim.network().stimulus(input), Some(Logic::True));
        assert_eq!(sim.stats().metadata.name, "reset");
    }

    #[test]
    fn test_export_stats() {
        let mut sim = Simulator::with_default_registry(Network::new());
        sim.run(4).unwrap();

        let json = sim.export_stats();
        assert_eq!(json["simulator"]["cycle"], 4);
        assert_eq!(json["simulator"]["budget"], 64);
        assert_eq!(json["evaluation"]["cycles"], 4);

        let stats = sim.finish();
        assert!(stats.metadata.end_time.is_some());
    }
}
