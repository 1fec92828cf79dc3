//! The network evaluator: advances a network by one clock tick.
//!
//! A tick runs in three steps:
//!
//! 1. **Settle.** Every block, in insertion order, reads the committed states
//!    of its pins and stages drives for its own pins. Every net then resolves
//!    its staged drives with the wire-tie rule and all pins take their net's
//!    state at once. This repeats until no pin changes or the iteration
//!    budget is spent.
//! 2. **Latch.** Every stateful simulation samples its settled pins. Latches
//!    present their old state during step 1, so feedback from an output into
//!    its own inputs is only seen at the next cycle.
//! 3. **Settle again**, if any latch changed state, to propagate the new
//!    outputs.
//!
//! A phase that spends its budget without converging is reported as
//! [`Diagnostic::Oscillation`]; the last computed states are kept. Opposite
//! defined drivers on one net are reported as [`Diagnostic::Conflict`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{SimError, SimResult};
use crate::logic::{Logic, Resolution};
use crate::network::{NetMap, Network, SimSlot};
use crate::registry::SimulationRegistry;
use crate::report::{CycleReport, Diagnostic};
use crate::simulation::{Drives, PinView};
use crate::types::{BlockId, Cycle, PinId};

/// Evaluator settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Settle iterations per phase; the clock resolution when unset
    #[serde(default)]
    pub max_iterations: Option<u32>,
    /// Consecutive oscillating cycles tolerated by the `Simulator`
    #[serde(default)]
    pub oscillation_limit: Option<u32>,
}

impl EvaluatorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the per-phase iteration budget.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Sets the number of consecutive oscillating cycles that abort a run.
    pub fn with_oscillation_limit(mut self, limit: u32) -> Self {
        self.oscillation_limit = Some(limit);
        self
    }
}

/// Cooperative cancellation flag shared with another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the running tick.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears the flag so the token can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Outcome of one settle phase.
#[derive(Debug, Default)]
struct Phase {
    iterations: u32,
    converged: bool,
    /// Nets in conflict: those of the last iteration if the phase
    /// converged, those of every iteration otherwise
    conflicts: BTreeSet<usize>,
}

/// Runs clock ticks over networks.
///
/// The evaluator is stateless between ticks: all state lives in the
/// [`Network`] and the [`Clock`], so one evaluator can drive many networks.
#[derive(Clone, Debug)]
pub struct Evaluator {
    registry: Arc<SimulationRegistry>,
    config: EvaluatorConfig,
}

impl Evaluator {
    /// Creates an evaluator resolving behaviors in `registry`.
    pub fn new(registry: Arc<SimulationRegistry>) -> Self {
        Self {
            registry,
            config: EvaluatorConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<SimulationRegistry> {
        &self.registry
    }

    /// Iteration budget of one phase under `clock`.
    pub fn budget(&self, clock: &Clock) -> u32 {
        self.config
            .max_iterations
            .unwrap_or_else(|| clock.resolution())
            .max(1)
    }

    /// Advances `network` by one cycle.
    ///
    /// Fails only if the network is structurally malformed, in which case
    /// nothing was evaluated.
    pub fn tick(&self, network: &mut Network, clock: &mut Clock) -> SimResult<CycleReport> {
        self.run_tick(network, clock, None)
    }

    /// Advances `network` by one cycle unless `cancel` is raised.
    ///
    /// The token is checked between settle iterations and once more before
    /// the cycle is committed. On cancellation every pin and latch goes back
    /// to its state at the start of the tick and `SimError::Cancelled` is
    /// returned without advancing the clock.
    pub fn tick_with_cancel(
        &self,
        network: &mut Network,
        clock: &mut Clock,
        cancel: &CancelToken,
    ) -> SimResult<CycleReport> {
        self.run_tick(network, clock, Some(cancel))
    }

    fn run_tick(
        &self,
        network: &mut Network,
        clock: &mut Clock,
        cancel: Option<&CancelToken>,
    ) -> SimResult<CycleReport> {
        let cycle = clock.cycle();
        let budget = self.budget(clock);

        let (created, mut diagnostics) = self.instantiate(network);
        if let Err(e) = network.ensure_nets() {
            discard(network, &created);
            return Err(e.into());
        }

        for slot in network.sims.values_mut() {
            if let Some(sim) = slot.as_active_mut() {
                sim.buffer();
            }
        }
        let snapshot = network.snapshot();

        let mut phases = Vec::with_capacity(2);
        match settle(network, budget, cancel) {
            Some(phase) => phases.push(phase),
            None => return Err(rollback(network, &snapshot, &created, cycle)),
        }
        if latch(network) {
            tracing::trace!(cycle, "Latch changed, settling again");
            match settle(network, budget, cancel) {
                Some(phase) => phases.push(phase),
                None => return Err(rollback(network, &snapshot, &created, cycle)),
            }
        }

        if cancel.map_or(false, CancelToken::is_cancelled) {
            return Err(rollback(network, &snapshot, &created, cycle));
        }

        let iterations = phases.iter().map(|p| p.iterations).sum::<u32>();
        let converged = phases.iter().all(|p| p.converged);
        let conflicted: BTreeSet<usize> = phases
            .iter()
            .flat_map(|p| p.conflicts.iter().copied())
            .collect();

        if let Some(nets) = network.nets.as_ref() {
            for net in conflicted {
                let mut pins: Vec<PinId> = nets.nets[net].clone();
                pins.sort_unstable();
                tracing::warn!(cycle, ?pins, "Conflicting drivers");
                diagnostics.push(Diagnostic::Conflict { pins });
            }
        }
        for phase in phases.iter().filter(|p| !p.converged) {
            tracing::warn!(cycle, iterations = phase.iterations, "Network did not settle");
            diagnostics.push(Diagnostic::Oscillation {
                iterations: phase.iterations,
            });
        }

        clock.advance();

        tracing::debug!(
            cycle,
            iterations,
            converged,
            diagnostics = diagnostics.len(),
            "Tick complete"
        );

        Ok(CycleReport {
            cycle,
            states: network.snapshot(),
            converged,
            iterations,
            diagnostics,
        })
    }

    /// Creates simulations for blocks evaluated for the first time.
    ///
    /// Returns the blocks that got a slot and the unresolved behaviors.
    fn instantiate(&self, network: &mut Network) -> (Vec<BlockId>, Vec<Diagnostic>) {
        let mut created = Vec::new();
        let mut diagnostics = Vec::new();

        for id in &network.order {
            if network.sims.contains_key(id) {
                continue;
            }
            let block = match network.blocks.get(id) {
                Some(block) => block,
                None => continue,
            };

            let slot = match self.registry.create(block) {
                Some(mut sim) => {
                    sim.init();
                    tracing::trace!(block = id, sim = sim.name(), "Simulation created");
                    SimSlot::Active(sim)
                }
                None => {
                    tracing::warn!(block = id, key = %block.behavior, "No simulation registered, block is inert");
                    diagnostics.push(Diagnostic::UnresolvedBehavior {
                        block: *id,
                        key: block.behavior.clone(),
                    });
                    SimSlot::Inert
                }
            };
            network.sims.insert(*id, slot);
            created.push(*id);
            // A new tie block changes the net layout.
            network.nets = None;
        }

        (created, diagnostics)
    }
}

/// Runs one settle phase. Returns `None` if cancelled.
fn settle(network: &mut Network, budget: u32, cancel: Option<&CancelToken>) -> Option<Phase> {
    let Network {
        blocks,
        order,
        pins,
        stimuli,
        sims,
        nets,
        ..
    } = network;
    let empty = NetMap::default();
    let nets = nets.as_ref().unwrap_or(&empty);

    let mut staged: Vec<Vec<Logic>> = vec![Vec::new(); nets.len()];
    let mut states = Vec::new();
    let mut slots = Vec::new();
    let mut last = Vec::new();
    let mut phase = Phase::default();

    while phase.iterations < budget {
        if cancel.map_or(false, CancelToken::is_cancelled) {
            return None;
        }
        phase.iterations += 1;

        for id in order.iter() {
            let (block, sim) = match (blocks.get(id), sims.get_mut(id)) {
                (Some(block), Some(slot)) => match slot.as_active_mut() {
                    Some(sim) => (block, sim),
                    None => continue,
                },
                _ => continue,
            };

            states.clear();
            states.extend(
                block
                    .pins
                    .iter()
                    .map(|p| pins.get(p).map_or(Logic::Undefined, |pin| pin.state)),
            );
            slots.clear();
            slots.resize(block.pins.len(), None);

            let view = PinView::new(block, &states, stimuli.get(id).copied());
            sim.evaluate(&view, &mut Drives::new(block, &mut slots));

            for (pin, slot) in block.pins.iter().zip(&slots) {
                if let (Some(level), Some(net)) = (slot, nets.net_of.get(pin)) {
                    staged[*net].push(*level);
                }
            }
        }

        let mut changed = 0usize;
        last.clear();
        for (index, members) in nets.nets.iter().enumerate() {
            let resolution = Resolution::resolve(staged[index].drain(..));
            if resolution.conflict {
                last.push(index);
                phase.conflicts.insert(index);
            }
            for pin_id in members {
                if let Some(pin) = pins.get_mut(pin_id) {
                    if pin.state != resolution.state {
                        pin.state = resolution.state;
                        changed += 1;
                    }
                }
            }
        }

        tracing::trace!(iteration = phase.iterations, changed, "Settle iteration");

        if changed == 0 {
            phase.converged = true;
            phase.conflicts = last.iter().copied().collect();
            break;
        }
    }

    Some(phase)
}

/// Lets every stateful simulation sample its settled pins.
///
/// Returns true if any of them changed state.
fn latch(network: &mut Network) -> bool {
    let Network {
        blocks,
        order,
        pins,
        stimuli,
        sims,
        ..
    } = network;

    let mut changed = false;
    let mut states = Vec::new();
    for id in order.iter() {
        let (block, sim) = match (blocks.get(id), sims.get_mut(id)) {
            (Some(block), Some(slot)) => match slot.as_active_mut() {
                Some(sim) if sim.is_stateful() => (block, sim),
                _ => continue,
            },
            _ => continue,
        };

        states.clear();
        states.extend(
            block
                .pins
                .iter()
                .map(|p| pins.get(p).map_or(Logic::Undefined, |pin| pin.state)),
        );
        let view = PinView::new(block, &states, stimuli.get(id).copied());
        if sim.latch(&view) {
            tracing::trace!(block = id, sim = sim.name(), "Latched new state");
            changed = true;
        }
    }
    changed
}

/// Drops the simulations created by a tick that did not complete, so the
/// next tick instantiates and reports them again.
fn discard(network: &mut Network, created: &[BlockId]) {
    if created.is_empty() {
        return;
    }
    for id in created {
        network.sims.remove(id);
    }
    network.nets = None;
}

/// Restores pins and simulations to the start of the tick.
fn rollback(
    network: &mut Network,
    snapshot: &BTreeMap<PinId, Logic>,
    created: &[BlockId],
    cycle: Cycle,
) -> SimError {
    discard(network, created);
    for (id, state) in snapshot {
        if let Some(pin) = network.pins.get_mut(id) {
            pin.state = *state;
        }
    }
    for slot in network.sims.values_mut() {
        if let Some(sim) = slot.as_active_mut() {
            sim.revert();
        }
    }
    tracing::debug!(cycle, "Tick cancelled, state restored");
    SimError::Cancelled { cycle }
}
