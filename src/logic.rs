//! Tri-valued logic levels.
//!
//! Every pin carries a [`Logic`] level. `Undefined` models an unpowered,
//! floating or contended signal and propagates through gates following
//! Kleene's strong three-valued logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tri-valued logic level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logic {
    /// Logic low.
    False,
    /// Logic high.
    True,
    /// Unknown, floating or contended.
    #[default]
    Undefined,
}

impl Logic {
    /// Returns true if the level is `True` or `False`.
    pub fn is_defined(self) -> bool {
        !matches!(self, Logic::Undefined)
    }

    /// Returns true only for `True`.
    ///
    /// Used wherever an input has to be *asserted*: `Undefined` does not count.
    pub fn is_true(self) -> bool {
        matches!(self, Logic::True)
    }

    /// Converts to `bool`, `None` for `Undefined`.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Logic::False => Some(false),
            Logic::True => Some(true),
            Logic::Undefined => None,
        }
    }

    /// Three-valued AND: `False` dominates, then `Undefined`, then `True`.
    pub fn and(self, other: Logic) -> Logic {
        match (self, other) {
            (Logic::False, _) | (_, Logic::False) => Logic::False,
            (Logic::True, Logic::True) => Logic::True,
            _ => Logic::Undefined,
        }
    }

    /// Three-valued OR: `True` dominates, then `Undefined`, then `False`.
    pub fn or(self, other: Logic) -> Logic {
        match (self, other) {
            (Logic::True, _) | (_, Logic::True) => Logic::True,
            (Logic::False, Logic::False) => Logic::False,
            _ => Logic::Undefined,
        }
    }

    /// Three-valued XOR: `Undefined` whenever either side is.
    pub fn xor(self, other: Logic) -> Logic {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => Logic::from(a ^ b),
            _ => Logic::Undefined,
        }
    }

    /// Single character used in traces and tables.
    pub fn symbol(self) -> char {
        match self {
            Logic::False => '0',
            Logic::True => '1',
            Logic::Undefined => 'X',
        }
    }
}

impl std::ops::Not for Logic {
    type Output = Logic;

    fn not(self) -> Logic {
        match self {
            Logic::False => Logic::True,
            Logic::True => Logic::False,
            Logic::Undefined => Logic::Undefined,
        }
    }
}

impl From<bool> for Logic {
    fn from(value: bool) -> Self {
        if value {
            Logic::True
        } else {
            Logic::False
        }
    }
}

impl From<Option<bool>> for Logic {
    fn from(value: Option<bool>) -> Self {
        value.map(Logic::from).unwrap_or(Logic::Undefined)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Outcome of resolving the levels presented by several drivers on one net.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// The level every pin of the net takes.
    pub state: Logic,
    /// True when one driver presented `True` and another `False`.
    pub conflict: bool,
}

impl Resolution {
    /// Resolves driver levels with the wire-tie rule.
    ///
    /// `True` wins if some driver presents `True` and none presents `False`,
    /// and symmetrically for `False`. `Undefined` drivers give way to defined
    /// ones. Opposite defined drivers are a conflict resolving to `Undefined`.
    /// No drivers at all resolve to `Undefined`.
    pub fn resolve<I>(drivers: I) -> Resolution
    where
        I: IntoIterator<Item = Logic>,
    {
        let mut high = false;
        let mut low = false;
        for level in drivers {
            match level {
                Logic::True => high = true,
                Logic::False => low = true,
                Logic::Undefined => {}
            }
        }

        match (high, low) {
            (true, true) => Resolution {
                state: Logic::Undefined,
                conflict: true,
            },
            (true, false) => Resolution {
                state: Logic::True,
                conflict: false,
            },
            (false, true) => Resolution {
                state: Logic::False,
                conflict: false,
            },
            (false, false) => Resolution {
                state: Logic::Undefined,
                conflict: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Logic; 3] = [Logic::False, Logic::True, Logic::Undefined];

    #[test]
    fn test_default_is_undefined() {
        assert_eq!(Logic::default(), Logic::Undefined);
    }

    #[test]
    fn test_not() {
        assert_eq!(!Logic::True, Logic::False);
        assert_eq!(!Logic::False, Logic::True);
        assert_eq!(!Logic::Undefined, Logic::Undefined);
    }

    #[test]
    fn test_and_or_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.and(b), b.and(a));
                assert_eq!(a.or(b), b.or(a));
            }
        }
    }

    #[test]
    fn test_xor() {
        assert_eq!(Logic::True.xor(Logic::False), Logic::True);
        assert_eq!(Logic::True.xor(Logic::True), Logic::False);
        assert_eq!(Logic::Undefined.xor(Logic::False), Logic::Undefined);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Logic::from(true), Logic::True);
        assert_eq!(Logic::from(None), Logic::Undefined);
        assert_eq!(Logic::True.to_bool(), Some(true));
        assert_eq!(Logic::Undefined.to_bool(), None);
        assert_eq!(Logic::Undefined.to_string(), "X");
    }

    #[test]
    fn test_resolve() {
        let r = Resolution::resolve([Logic::True, Logic::Undefined]);
        assert_eq!(r.state, Logic::True);
        assert!(!r.conflict);

        let r = Resolution::resolve([Logic::False, Logic::False]);
        assert_eq!(r.state, Logic::False);
        assert!(!r.conflict);

        let r = Resolution::resolve([Logic::True, Logic::False]);
        assert_eq!(r.state, Logic::Undefined);
        assert!(r.conflict);

        let r = Resolution::resolve(std::iter::empty());
        assert_eq!(r.state, Logic::Undefined);
        assert!(!r.conflict);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Logic::True).unwrap();
        let back: Logic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Logic::True);
    }
}
