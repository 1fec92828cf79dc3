//! The `BlockSimulation` trait and the views a simulation works through.
//!
//! A block simulation is the evaluation rule attached to one block. The
//! evaluator calls it once per settle iteration with a read-only [`PinView`]
//! of the block's pins and a [`Drives`] buffer in which it stages the levels
//! it presents on its own pins. Nothing a simulation stages is visible to
//! other blocks until the evaluator commits the iteration.

use crate::block::Block;
use crate::logic::Logic;
use crate::pin::PinDirection;
use crate::types::BlockId;

/// Read-only view of a block's pins during one iteration.
#[derive(Clone, Copy, Debug)]
pub struct PinView<'a> {
    block: &'a Block,
    states: &'a [Logic],
    stimulus: Option<Logic>,
}

impl<'a> PinView<'a> {
    /// Creates a view. `states` is parallel to `block.pins`.
    pub fn new(block: &'a Block, states: &'a [Logic], stimulus: Option<Logic>) -> Self {
        Self {
            block,
            states,
            stimulus,
        }
    }

    /// The block being evaluated.
    pub fn block(&self) -> &'a Block {
        self.block
    }

    /// Id of the block being evaluated.
    pub fn block_id(&self) -> BlockId {
        self.block.id
    }

    /// Number of pins.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if the block has no pins.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State of the pin at `index`, `Undefined` if out of range.
    pub fn state(&self, index: usize) -> Logic {
        self.states.get(index).copied().unwrap_or_default()
    }

    /// State of the named pin, `Undefined` if the block has no such pin.
    pub fn state_of(&self, name: &str) -> Logic {
        self.block
            .pin_index(name)
            .map(|i| self.state(i))
            .unwrap_or_default()
    }

    /// Direction of the pin at `index`.
    pub fn direction(&self, index: usize) -> Option<PinDirection> {
        self.block.directions.get(index).copied()
    }

    /// States of the `Input` pins, in pin order.
    pub fn inputs(&self) -> impl Iterator<Item = Logic> + '_ {
        self.block
            .directions
            .iter()
            .zip(self.states)
            .filter(|(d, _)| **d == PinDirection::Input)
            .map(|(_, s)| *s)
    }

    /// Level set by the caller for this block, if any.
    pub fn stimulus(&self) -> Option<Logic> {
        self.stimulus
    }
}

/// Staged drives of one block, one slot per pin.
///
/// A slot left empty means the block does not drive that pin.
#[derive(Debug)]
pub struct Drives<'a> {
    block: &'a Block,
    slots: &'a mut [Option<Logic>],
}

impl<'a> Drives<'a> {
    /// Wraps a slot buffer parallel to `block.pins`.
    pub fn new(block: &'a Block, slots: &'a mut [Option<Logic>]) -> Self {
        Self { block, slots }
    }

    /// Drives the pin at `index`. Out-of-range indices are ignored.
    pub fn drive(&mut self, index: usize, level: Logic) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(level);
        }
    }

    /// Drives the named pin. Returns false if the block has no such pin.
    pub fn drive_named(&mut self, name: &str, level: Logic) -> bool {
        match self.block.pin_index(name) {
            Some(i) => {
                self.drive(i, level);
                true
            }
            None => false,
        }
    }

    /// Drives every `Output` pin with `level`.
    pub fn drive_outputs(&mut self, level: Logic) {
        for (slot, dir) in self.slots.iter_mut().zip(&self.block.directions) {
            if *dir == PinDirection::Output {
                *slot = Some(level);
            }
        }
    }

    /// Drives every pin that is not an `Input` with `level`.
    pub fn drive_writable(&mut self, level: Logic) {
        for (slot, dir) in self.slots.iter_mut().zip(&self.block.directions) {
            if *dir != PinDirection::Input {
                *slot = Some(level);
            }
        }
    }

    /// Level staged for the pin at `index`.
    pub fn staged(&self, index: usize) -> Option<Logic> {
        self.slots.get(index).copied().flatten()
    }
}

/// The evaluation rule of one block.
///
/// One instance exists per block. It is created the first time the block is
/// evaluated and lives as long as the block, so internal memory persists
/// across cycles.
///
/// Combinational simulations only implement [`evaluate`](Self::evaluate).
/// Stateful ones present their state from `evaluate` and update it in
/// [`latch`](Self::latch), which the evaluator calls once per cycle after the
/// network settled.
pub trait BlockSimulation: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Called once, right after instantiation.
    fn init(&mut self) {}

    /// Stages drives from the current pin states.
    ///
    /// Must not depend on anything but `pins` and the simulation's own
    /// latched state: it may run many times per cycle.
    fn evaluate(&mut self, pins: &PinView<'_>, drives: &mut Drives<'_>);

    /// Samples the settled pins and updates internal state.
    ///
    /// Returns true if the presented state changed.
    fn latch(&mut self, _pins: &PinView<'_>) -> bool {
        false
    }

    /// Returns true if the simulation has latched state.
    fn is_stateful(&self) -> bool {
        false
    }

    /// Returns true if all pins of the block are electrically one node.
    fn ties_pins(&self) -> bool {
        false
    }

    /// Saves internal state at the start of a cycle.
    fn buffer(&mut self) {}

    /// Restores the state saved by [`buffer`](Self::buffer).
    fn revert(&mut self) {}

    /// Returns to the power-on state.
    fn reset(&mut self) {}
}
