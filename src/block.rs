//! Block definitions.
//!
//! A block is a typed unit with a fixed, ordered set of pins. Its behavior
//! key selects the simulation rule the evaluator attaches to it; properties
//! are free-form and never read by the evaluator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::pin::{PinDesc, PinDirection};
use crate::types::{BehaviorKey, BlockId, PinId};

/// Static description of a block, handed to [`Network::add_block`].
///
/// [`Network::add_block`]: crate::network::Network::add_block
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDesc {
    /// Behavior key resolved in the simulation registry
    pub behavior: BehaviorKey,
    /// Pins in declaration order
    pub pins: Vec<PinDesc>,
    /// Cosmetic properties (label text, counters, ...)
    pub properties: HashMap<String, String>,
}

impl BlockDesc {
    /// Creates a new `BlockDesc` without pins.
    pub fn new(behavior: impl Into<BehaviorKey>) -> Self {
        Self {
            behavior: behavior.into(),
            pins: Vec::new(),
            properties: HashMap::new(),
        }
    }

    /// Adds a pin.
    pub fn with_pin(mut self, pin: PinDesc) -> Self {
        self.pins.push(pin);
        self
    }

    /// Adds an input pin.
    pub fn with_input(self, name: impl Into<String>) -> Self {
        self.with_pin(PinDesc::input(name))
    }

    /// Adds an output pin.
    pub fn with_output(self, name: impl Into<String>) -> Self {
        self.with_pin(PinDesc::output(name))
    }

    /// Adds an undirected pin.
    pub fn with_undirected(self, name: impl Into<String>) -> Self {
        self.with_pin(PinDesc::undirected(name))
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Two-input gate with pins `L`, `R` and output `OUT`.
    pub fn gate(behavior: impl Into<BehaviorKey>) -> Self {
        Self::new(behavior)
            .with_input("L")
            .with_input("R")
            .with_output("OUT")
    }

    /// Gate with `inputs` input pins named `I0..In` and output `OUT`.
    pub fn gate_n(behavior: impl Into<BehaviorKey>, inputs: usize) -> Self {
        (0..inputs)
            .fold(Self::new(behavior), |desc, i| desc.with_input(format!("I{}", i)))
            .with_output("OUT")
    }

    /// Inverter with input `IN` and output `OUT`.
    pub fn inverter() -> Self {
        Self::new("NOT").with_input("IN").with_output("OUT")
    }

    /// SR latch with inputs `S`, `R` and outputs `Q`, `NQ`.
    pub fn latch(behavior: impl Into<BehaviorKey>) -> Self {
        Self::new(behavior)
            .with_input("S")
            .with_input("R")
            .with_output("Q")
            .with_output("NQ")
    }

    /// Shortcut with `points` undirected pins named `T0..Tn`.
    pub fn shortcut(points: usize) -> Self {
        (0..points).fold(Self::new("SHORTCUT"), |desc, i| {
            desc.with_undirected(format!("T{}", i))
        })
    }

    /// Input pin block with a single output `OUT`.
    pub fn input_pin() -> Self {
        Self::new("INPUT").with_output("OUT")
    }

    /// Output pin block with a single input `IN`.
    pub fn output_pin() -> Self {
        Self::new("OUTPUT").with_input("IN")
    }
}

/// A block living in a network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    /// Network-wide identifier
    pub id: BlockId,
    /// Behavior key
    pub behavior: BehaviorKey,
    /// Pin ids in declaration order
    pub pins: Vec<PinId>,
    /// Pin directions, parallel to `pins`
    pub directions: Vec<PinDirection>,
    /// Pin names, parallel to `pins`
    pub pin_names: Vec<String>,
    /// Cosmetic properties
    pub properties: HashMap<String, String>,
}

impl Block {
    /// Returns the position of the named pin in this block's pin order.
    pub fn pin_index(&self, name: &str) -> Option<usize> {
        self.pin_names.iter().position(|n| n == name)
    }

    /// Returns the id of the named pin.
    pub fn pin_id(&self, name: &str) -> Option<PinId> {
        self.pin_index(name).map(|i| self.pins[i])
    }

    /// Returns the number of pins.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Returns a property value.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_desc() {
        let desc = BlockDesc::new("AND")
            .with_input("L")
            .with_input("R")
            .with_output("OUT")
            .with_property("label", "carry");

        assert_eq!(desc.behavior, "AND");
        assert_eq!(desc.pins.len(), 3);
        assert_eq!(desc.properties.get("label"), Some(&"carry".to_string()));
    }

    #[test]
    fn test_presets() {
        assert_eq!(BlockDesc::gate("OR").pins.len(), 3);
        assert_eq!(BlockDesc::gate_n("AND", 4).pins.len(), 5);
        assert_eq!(BlockDesc::gate_n("AND", 4).pins[3].name, "I3");
        assert_eq!(BlockDesc::latch("SR-SET").pins[3].name, "NQ");
        assert!(BlockDesc::shortcut(3)
            .pins
            .iter()
            .all(|p| p.direction == PinDirection::Undirected));
        assert_eq!(BlockDesc::inverter().behavior, "NOT");
    }

    #[test]
    fn test_block_lookup() {
        let block = Block {
            id: 1,
            behavior: "NOT".to_string(),
            pins: vec![10, 11],
            directions: vec![PinDirection::Input, PinDirection::Output],
            pin_names: vec!["IN".to_string(), "OUT".to_string()],
            properties: HashMap::new(),
        };

        assert_eq!(block.pin_index("OUT"), Some(1));
        assert_eq!(block.pin_id("IN"), Some(10));
        assert_eq!(block.pin_id("Q"), None);
        assert_eq!(block.pin_count(), 2);
        assert_eq!(block.property("label"), None);
    }
}
