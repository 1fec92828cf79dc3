//! Core type definitions for the simulation engine.

/// Clock cycle counter.
///
/// Cycles start at 0 and only ever increase.
pub type Cycle = u64;

/// Unique identifier for a block in a network.
pub type BlockId = u64;

/// Unique identifier for a pin in a network.
///
/// Pin ids are allocated by the network and never reused, so a stale id
/// simply fails to resolve once its block has been removed.
pub type PinId = u64;

/// Unique identifier for a wire in a network.
pub type WireId = u64;

/// Key selecting the simulation rule of a block (e.g. `"AND"`, `"SR-SET"`).
pub type BehaviorKey = String;
