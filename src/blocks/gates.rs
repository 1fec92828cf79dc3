//! Combinational gates.
//!
//! Each gate is a pure function of the states of its block's `Input` pins,
//! read in pin order. The result drives every `Output` pin.

use serde::{Deserialize, Serialize};

use crate::logic::Logic;
use crate::simulation::{BlockSimulation, Drives, PinView};

/// Kind of combinational gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    /// Complement of the first input; further inputs are ignored.
    Not,
}

impl Gate {
    /// Evaluates the gate. No inputs yields `Undefined`.
    pub fn evaluate(self, inputs: &[Logic]) -> Logic {
        match self {
            Gate::And => and(inputs),
            Gate::Or => or(inputs),
            Gate::Nand => !and(inputs),
            Gate::Nor => !or(inputs),
            Gate::Xor => xor(inputs),
            Gate::Not => inputs.first().map_or(Logic::Undefined, |l| !*l),
        }
    }

    /// Behavior key the gate is registered under.
    pub fn key(self) -> &'static str {
        match self {
            Gate::And => "AND",
            Gate::Or => "OR",
            Gate::Nand => "NAND",
            Gate::Nor => "NOR",
            Gate::Xor => "XOR",
            Gate::Not => "NOT",
        }
    }
}

/// AND over any number of inputs: `False` dominates, then `Undefined`.
pub fn and(inputs: &[Logic]) -> Logic {
    match inputs.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, l| acc.and(*l)),
        None => Logic::Undefined,
    }
}

/// OR over any number of inputs: `True` dominates, then `Undefined`.
pub fn or(inputs: &[Logic]) -> Logic {
    match inputs.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, l| acc.or(*l)),
        None => Logic::Undefined,
    }
}

/// Odd parity, `Undefined` as soon as one input is.
pub fn xor(inputs: &[Logic]) -> Logic {
    match inputs.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, l| acc.xor(*l)),
        None => Logic::Undefined,
    }
}

/// Block simulation wrapping a [`Gate`].
#[derive(Debug)]
pub struct GateSimulation {
    gate: Gate,
    scratch: Vec<Logic>,
}

impl GateSimulation {
    /// Creates a new gate simulation.
    pub fn new(gate: Gate) -> Self {
        Self {
            gate,
            scratch: Vec::new(),
        }
    }

    /// The wrapped gate.
    pub fn gate(&self) -> Gate {
        self.gate
    }
}

impl BlockSimulation for GateSimulation {
    fn name(&self) -> &str {
        self.gate.key()
    }

    fn evaluate(&mut self, pins: &PinView<'_>, drives: &mut Drives<'_>) {
        self.scratch.clear();
        self.scratch.extend(pins.inputs());
        drives.drive_outputs(self.gate.evaluate(&self.scratch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Logic::{False as F, True as T, Undefined as U};

    #[test]
    fn test_and_truth_table() {
        let table = [
            (F, F, F),
            (F, T, F),
            (F, U, F),
            (T, F, F),
            (T, T, T),
            (T, U, U),
            (U, F, F),
            (U, T, U),
            (U, U, U),
        ];
        for (l, r, expected) in table {
            assert_eq!(Gate::And.evaluate(&[l, r]), expected, "{} AND {}", l, r);
        }
    }

    #[test]
    fn test_or_truth_table() {
        let table = [
            (F, F, F),
            (F, T, T),
            (F, U, U),
            (T, F, T),
            (T, T, T),
            (T, U, T),
            (U, F, U),
            (U, T, T),
            (U, U, U),
        ];
        for (l, r, expected) in table {
            assert_eq!(Gate::Or.evaluate(&[l, r]), expected, "{} OR {}", l, r);
        }
    }

    #[test]
    fn test_not() {
        assert_eq!(Gate::Not.evaluate(&[T]), F);
        assert_eq!(Gate::Not.evaluate(&[F]), T);
        assert_eq!(Gate::Not.evaluate(&[U]), U);
    }

    #[test]
    fn test_dominance_many_inputs() {
        assert_eq!(and(&[T, U, T, F]), F);
        assert_eq!(and(&[T, U, T, T]), U);
        assert_eq!(and(&[T, T, T, T]), T);
        assert_eq!(or(&[F, U, F, T]), T);
        assert_eq!(or(&[F, U, F, F]), U);
        assert_eq!(or(&[F, F, F]), F);
    }

    #[test]
    fn test_negated_and_parity() {
        assert_eq!(Gate::Nand.evaluate(&[T, T]), F);
        assert_eq!(Gate::Nand.evaluate(&[F, U]), T);
        assert_eq!(Gate::Nor.evaluate(&[F, F]), T);
        assert_eq!(Gate::Nor.evaluate(&[F, U]), U);
        assert_eq!(Gate::Xor.evaluate(&[T, T, T]), T);
        assert_eq!(Gate::Xor.evaluate(&[T, F]), T);
        assert_eq!(Gate::Xor.evaluate(&[T, U]), U);
    }

    #[test]
    fn test_no_inputs() {
        for gate in [Gate::And, Gate::Or, Gate::Nand, Gate::Nor, Gate::Xor, Gate::Not] {
            assert_eq!(gate.evaluate(&[]), U, "{:?}", gate);
        }
    }
}
