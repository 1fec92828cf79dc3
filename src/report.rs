//! Per-cycle reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::logic::Logic;
use crate::types::{BehaviorKey, BlockId, Cycle, PinId};

/// A non-fatal condition observed during one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Drivers presented `True` and `False` on the same net; every pin of the
    /// net was set to `Undefined`.
    Conflict { pins: Vec<PinId> },
    /// A settle phase hit its iteration cap without converging.
    Oscillation { iterations: u32 },
    /// The block's behavior key is not registered; the block is inert.
    UnresolvedBehavior { block: BlockId, key: BehaviorKey },
}

/// Outcome of one clock tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// The cycle this report describes (the clock value before the tick)
    pub cycle: Cycle,
    /// Committed state of every pin
    pub states: BTreeMap<PinId, Logic>,
    /// True if every settle phase converged
    pub converged: bool,
    /// Settle iterations across all phases
    pub iterations: u32,
    /// Conditions observed during the cycle
    pub diagnostics: Vec<Diagnostic>,
}

impl CycleReport {
    /// Committed state of `pin`.
    pub fn state(&self, pin: PinId) -> Option<Logic> {
        self.states.get(&pin).copied()
    }

    /// Pin groups that were in conflict.
    pub fn conflicts(&self) -> impl Iterator<Item = &[PinId]> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::Conflict { pins } => Some(pins.as_slice()),
            _ => None,
        })
    }

    /// Returns true if `pin` took part in a conflict.
    pub fn has_conflict_on(&self, pin: PinId) -> bool {
        self.conflicts().any(|pins| pins.contains(&pin))
    }

    /// Number of conflicting nets.
    pub fn conflict_count(&self) -> usize {
        self.conflicts().count()
    }

    /// Returns true if a settle phase hit its cap.
    pub fn oscillated(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::Oscillation { .. }))
    }

    /// Blocks found inert in this cycle.
    pub fn unresolved(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::UnresolvedBehavior { block, .. } => Some(*block),
            _ => None,
        })
    }

    /// Renders the report as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> CycleReport {
        CycleReport {
            cycle: 3,
            states: [(1, Logic::True), (2, Logic::Undefined)].into_iter().collect(),
            converged: false,
            iterations: 70,
            diagnostics: vec![
                Diagnostic::UnresolvedBehavior {
                    block: 5,
                    key: "FLIPFLOP".to_string(),
                },
                Diagnostic::Conflict { pins: vec![2, 4] },
                Diagnostic::Oscillation { iterations: 64 },
            ],
        }
    }

    #[test]
    fn test_queries() {
        let report = report();
        assert_eq!(report.state(1), Some(Logic::True));
        assert_eq!(report.state(9), None);
        assert!(report.has_conflict_on(4));
        assert!(!report.has_conflict_on(1));
        assert_eq!(report.conflict_count(), 1);
        assert!(report.oscillated());
        assert_eq!(report.unresolved().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_json() {
        let json = report().to_json();
        assert_eq!(json["cycle"], 3);
        assert_eq!(json["diagnostics"][1]["kind"], "conflict");
        assert_eq!(json["diagnostics"][2]["iterations"], 64);
        assert_eq!(json["states"]["1"], "True");
    }
}
