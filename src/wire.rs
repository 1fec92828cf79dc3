//! Wires: undirected links between two pins.

use serde::{Deserialize, Serialize};

use crate::types::{PinId, WireId};

/// An unordered pair of pins whose states are kept equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    /// Network-wide identifier
    pub id: WireId,
    /// One end
    pub a: PinId,
    /// The other end
    pub b: PinId,
}

impl Wire {
    /// Creates a new wire.
    pub fn new(id: WireId, a: PinId, b: PinId) -> Self {
        Self { id, a, b }
    }

    /// Returns true if the wire ends on `pin`.
    pub fn touches(&self, pin: PinId) -> bool {
        self.a == pin || self.b == pin
    }

    /// Returns the end opposite to `pin`, if `pin` is an end.
    pub fn other(&self, pin: PinId) -> Option<PinId> {
        if self.a == pin {
            Some(self.b)
        } else if self.b == pin {
            Some(self.a)
        } else {
            None
        }
    }

    /// Returns true if both ends are the same pin.
    pub fn is_self_loop(&self) -> bool {
        self.a == self.b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ends() {
        let wire = Wire::new(1, 10, 20);
        assert!(wire.touches(10));
        assert!(wire.touches(20));
        assert!(!wire.touches(30));
        assert_eq!(wire.other(10), Some(20));
        assert_eq!(wire.other(20), Some(10));
        assert_eq!(wire.other(30), None);
        assert!(!wire.is_self_loop());
        assert!(Wire::new(2, 5, 5).is_self_loop());
    }
}
