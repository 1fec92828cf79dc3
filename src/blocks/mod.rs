//! Built-in block simulations.
//!
//! # Available Simulations
//!
//! ## Gates
//! - [`GateSimulation`] - AND, OR, NAND, NOR, XOR and NOT over any number of inputs
//!
//! ## Wiring
//! - [`Shortcut`] - ties all pins of its block into one node
//!
//! ## Memory
//! - [`SrLatch`] - SR latch with set or reset priority
//!
//! ## I/O
//! - [`InputPin`] - drives the level set with `Network::set_input`
//! - [`OutputProbe`] - reads its pin, drives nothing

pub mod gates;
pub mod shortcut;
pub mod memory;
pub mod io;

pub use gates::{Gate, GateSimulation};
pub use shortcut::Shortcut;
pub use memory::{Priority, SrLatch};
pub use io::{InputPin, OutputProbe};
