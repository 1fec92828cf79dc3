//! Logical clock.

use serde::{Deserialize, Serialize};

use crate::types::Cycle;

/// Default number of settle iterations allowed per phase.
pub const DEFAULT_RESOLUTION: u32 = 64;

/// Monotonic cycle counter.
///
/// `resolution` bounds how many settle iterations one phase of a tick may
/// take before the network is declared oscillating. It is fixed for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ClockState")]
pub struct Clock {
    cycle: Cycle,
    resolution: u32,
}

/// Serialized form of a [`Clock`], checked on the way in.
#[derive(Deserialize)]
struct ClockState {
    cycle: Cycle,
    resolution: u32,
}

impl From<ClockState> for Clock {
    fn from(state: ClockState) -> Self {
        Self {
            cycle: state.cycle,
            resolution: state.resolution.max(1),
        }
    }
}

impl Clock {
    /// Creates a clock at cycle 0. A zero resolution is raised to 1.
    pub fn new(resolution: u32) -> Self {
        Self {
            cycle: 0,
            resolution: resolution.max(1),
        }
    }

    /// Current cycle, i.e. the number of completed ticks.
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Settle iteration budget per phase.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Advances to the next cycle.
    pub(crate) fn advance(&mut self) -> Cycle {
        self.cycle += 1;
        self.cycle
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        let mut clock = Clock::default();
        assert_eq!(clock.cycle(), 0);
        assert_eq!(clock.resolution(), DEFAULT_RESOLUTION);

        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.cycle(), 2);
    }

    #[test]
    fn test_zero_resolution() {
        assert_eq!(Clock::new(0).resolution(), 1);
    }

    #[test]
    fn test_deserialize_keeps_resolution_positive() {
        let clock: Clock = serde_json::from_str(r#"{"cycle": 7, "resolution": 0}"#).unwrap();
        assert_eq!(clock.cycle(), 7);
        assert_eq!(clock.resolution(), 1);

        let json = serde_json::to_string(&Clock::new(16)).unwrap();
        let back: Clock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Clock::new(16));
    }
}
