//! Shortcut: a block whose pins are all one electrical node.
//!
//! The shortcut stages no drives of its own. The evaluator merges its pins
//! into a single net and resolves that net from whatever else drives it, so
//! a conflict between two drivers on different shortcut pins is reported like
//! any wire conflict.

use crate::simulation::{BlockSimulation, Drives, PinView};

/// Wire-tie simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Shortcut;

impl BlockSimulation for Shortcut {
    fn name(&self) -> &str {
        "SHORTCUT"
    }

    fn evaluate(&mut self, _pins: &PinView<'_>, _drives: &mut Drives<'_>) {}

    fn ties_pins(&self) -> bool {
        true
    }
}
