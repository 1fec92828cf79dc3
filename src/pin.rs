//! Pins: the named connection points of a block.

use serde::{Deserialize, Serialize};

use crate::logic::Logic;
use crate::types::{BlockId, PinId};

/// Direction of a pin relative to its block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Read by the block's simulation.
    Input,
    /// Driven by the block's simulation.
    Output,
    /// Both read and possibly driven (tie points, bidirectional I/O).
    Undirected,
}

impl PinDirection {
    /// Returns true for `Input` and `Undirected` pins.
    pub fn is_readable(self) -> bool {
        matches!(self, PinDirection::Input | PinDirection::Undirected)
    }
}

/// Describes a pin to be created with a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDesc {
    /// Name of the pin, unique within its block (e.g. `"S"`, `"Q"`)
    pub name: String,
    /// Direction of the pin
    pub direction: PinDirection,
}

impl PinDesc {
    /// Creates a new `PinDesc`.
    pub fn new(name: impl Into<String>, direction: PinDirection) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    /// Shorthand for an input pin.
    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, PinDirection::Input)
    }

    /// Shorthand for an output pin.
    pub fn output(name: impl Into<String>) -> Self {
        Self::new(name, PinDirection::Output)
    }

    /// Shorthand for an undirected pin.
    pub fn undirected(name: impl Into<String>) -> Self {
        Self::new(name, PinDirection::Undirected)
    }
}

/// A pin living in a network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pin {
    /// Network-wide identifier
    pub id: PinId,
    /// Name, unique within the owning block
    pub name: String,
    /// Direction
    pub direction: PinDirection,
    /// Committed state of the last cycle
    pub state: Logic,
    /// Owning block
    pub block: BlockId,
    /// Peer pins joined to this one by wires
    pub connections: Vec<PinId>,
}

impl Pin {
    pub(crate) fn new(id: PinId, block: BlockId, desc: &PinDesc) -> Self {
        Self {
            id,
            name: desc.name.clone(),
            direction: desc.direction,
            state: Logic::Undefined,
            block,
            connections: Vec::new(),
        }
    }

    /// Returns true if at least one wire ends on this pin.
    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }
}
