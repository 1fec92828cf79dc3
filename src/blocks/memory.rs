//! SR latches.
//!
//! A latch presents its stored state on `Q` (and the complement on `NQ`
//! when present) throughout the settle phase, then samples `S` and `R` once
//! the network has settled. An `Undefined` set or reset input counts as not
//! asserted.

use serde::{Deserialize, Serialize};

use crate::logic::Logic;
use crate::simulation::{BlockSimulation, Drives, PinView};

/// Which input wins when `S` and `R` are both asserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// `S = R = True` stores `True`.
    Set,
    /// `S = R = True` stores `False`.
    Reset,
}

impl Priority {
    /// Next stored state for the given inputs.
    pub fn next(self, set: bool, reset: bool, current: Logic) -> Logic {
        match (set, reset) {
            (false, false) => current,
            (true, false) => Logic::True,
            (false, true) => Logic::False,
            (true, true) => match self {
                Priority::Set => Logic::True,
                Priority::Reset => Logic::False,
            },
        }
    }
}

/// SR latch with pins `S`, `R`, `Q` and optional `NQ`.
#[derive(Clone, Debug)]
pub struct SrLatch {
    priority: Priority,
    state: Logic,
    buffered: Logic,
}

impl SrLatch {
    /// Creates a latch holding `Undefined`.
    pub fn new(priority: Priority) -> Self {
        Self {
            priority,
            state: Logic::Undefined,
            buffered: Logic::Undefined,
        }
    }

    /// Stored state.
    pub fn state(&self) -> Logic {
        self.state
    }

    /// Priority rule.
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl BlockSimulation for SrLatch {
    fn name(&self) -> &str {
        match self.priority {
            Priority::Set => "SR-SET",
            Priority::Reset => "SR-RESET-V",
        }
    }

    fn evaluate(&mut self, _pins: &PinView<'_>, drives: &mut Drives<'_>) {
        drives.drive_named("Q", self.state);
        drives.drive_named("NQ", !self.state);
    }

    fn latch(&mut self, pins: &PinView<'_>) -> bool {
        let set = pins.state_of("S").is_true();
        let reset = pins.state_of("R").is_true();
        let next = self.priority.next(set, reset, self.state);
        let changed = next != self.state;
        self.state = next;
        changed
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn buffer(&mut self) {
        self.buffered = self.state;
    }

    fn revert(&mut self) {
        self.state = self.buffered;
    }

    fn reset(&mut self) {
        self.state = Logic::Undefined;
        self.buffered = Logic::Undefined;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockDesc};
    use crate::logic::Logic::{False as F, True as T, Undefined as U};
    use std::collections::HashMap;

    fn block() -> Block {
        let desc = BlockDesc::latch("SR-SET");
        Block {
            id: 1,
            behavior: desc.behavior.clone(),
            pins: vec![1, 2, 3, 4],
            directions: desc.pins.iter().map(|p| p.direction).collect(),
            pin_names: desc.pins.iter().map(|p| p.name.clone()).collect(),
            properties: HashMap::new(),
        }
    }

    fn sample(latch: &mut SrLatch, s: Logic, r: Logic) -> Logic {
        let block = block();
        let states = [s, r, latch.state(), !latch.state()];
        latch.latch(&PinView::new(&block, &states, None));
        latch.state()
    }

    #[test]
    fn test_priority_rows() {
        // (S, R, set-priority, reset-priority) starting from Undefined
        let rows = [(T, F, T, T), (F, T, F, F), (T, T, T, F)];
        for (s, r, set_wins, reset_wins) in rows {
            assert_eq!(sample(&mut SrLatch::new(Priority::Set), s, r), set_wins);
            assert_eq!(sample(&mut SrLatch::new(Priority::Reset), s, r), reset_wins);
        }
    }

    #[test]
    fn test_hold() {
        let mut latch = SrLatch::new(Priority::Set);
        assert_eq!(sample(&mut latch, F, F), U);

        sample(&mut latch, T, F);
        for _ in 0..5 {
            assert_eq!(sample(&mut latch, F, F), T);
        }
        sample(&mut latch, F, T);
        assert_eq!(sample(&mut latch, F, F), F);
    }

    #[test]
    fn test_undefined_inputs_not_asserted() {
        let mut latch = SrLatch::new(Priority::Reset);
        sample(&mut latch, T, F);
        assert_eq!(sample(&mut latch, U, U), T);
        assert_eq!(sample(&mut latch, U, T), F);
        assert_eq!(sample(&mut latch, T, U), T);
    }

    #[test]
    fn test_latch_reports_change() {
        let block = block();
        let mut latch = SrLatch::new(Priority::Set);
        let set = [T, F, U, U];
        assert!(latch.latch(&PinView::new(&block, &set, None)));
        assert!(!latch.latch(&PinView::new(&block, &set, None)));
    }

    #[test]
    fn test_presents_state() {
        let block = block();
        let mut latch = SrLatch::new(Priority::Set);
        sample(&mut latch, T, F);

        let states = [F; 4];
        let mut slots = vec![None; 4];
        latch.evaluate(
            &PinView::new(&block, &states, None),
            &mut Drives::new(&block, &mut slots),
        );
        assert_eq!(slots, vec![None, None, Some(T), Some(F)]);
    }

    #[test]
    fn test_buffer_revert_reset() {
        let mut latch = SrLatch::new(Priority::Set);
        sample(&mut latch, T, F);
        latch.buffer();
        sample(&mut latch, F, T);
        assert_eq!(latch.state(), F);

        latch.revert();
        assert_eq!(latch.state(), T);

        latch.reset();
        assert_eq!(latch.state(), U);
    }
}
