//! Error types.
//!
//! Setup-time problems (registry collisions, malformed networks) are errors.
//! Per-cycle conditions such as conflicts or oscillation are not: they are
//! reported as [`Diagnostic`](crate::report::Diagnostic)s in the cycle report.

use thiserror::Error;

use crate::types::{BlockId, Cycle, PinId, WireId};

/// Errors raised while populating a simulation registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Behavior key already registered: {0}")]
    DuplicateKey(String),
}

/// Errors raised by structural edits and network validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Malformed network: {0}")]
    MalformedNetwork(String),

    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),

    #[error("Unknown pin: {0}")]
    UnknownPin(PinId),

    #[error("Block {block} has no pin named {name}")]
    UnknownPinName { block: BlockId, name: String },

    #[error("Unknown wire: {0}")]
    UnknownWire(WireId),
}

/// Errors raised while running a simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Cycle {cycle} cancelled")]
    Cancelled { cycle: Cycle },

    #[error("Network oscillated for {cycles} consecutive cycles")]
    RepeatedOscillation { cycles: u32 },
}

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
