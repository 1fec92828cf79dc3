//! # logicnet
//!
//! A simulation engine for networks of digital logic blocks driven by a
//! logical clock.
//!
//! ## Model
//!
//! - **Logic**: every pin carries a tri-valued level, `False`, `True` or
//!   `Undefined`. Gates follow Kleene's strong three-valued logic.
//! - **Blocks and pins**: a block has a behavior key and an ordered set of
//!   named pins. Wires join pins; pins joined by wires or by a shortcut block
//!   form a *net* and always share one state.
//! - **Simulations**: the behavior key selects a [`BlockSimulation`] from a
//!   [`SimulationRegistry`]. The instance is created the first time the block
//!   is evaluated and keeps its memory for the life of the block.
//! - **Ticks**: each clock tick settles the combinational network by bounded
//!   fixed-point iteration, lets memory elements latch, and settles again.
//!   Contention and oscillation are reported, never fatal.
//!
//! ## Features
//!
//! - `parallel` - Tick independent networks concurrently using rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use logicnet::{BlockDesc, Logic, Network, Simulator};
//!
//! let mut network = Network::new();
//! let a = network.add_block(BlockDesc::input_pin()).unwrap();
//! let b = network.add_block(BlockDesc::input_pin()).unwrap();
//! let and = network.add_block(BlockDesc::gate("AND")).unwrap();
//! network.connect_named(a, "OUT", and, "L").unwrap();
//! network.connect_named(b, "OUT", and, "R").unwrap();
//!
//! network.set_input(a, Logic::True).unwrap();
//! network.set_input(b, Logic::False).unwrap();
//!
//! let mut sim = Simulator::with_default_registry(network);
//! let report = sim.step().unwrap();
//!
//! assert!(report.converged);
//! assert_eq!(sim.network().state_of(and, "OUT").unwrap(), Logic::False);
//! ```
//!
//! ## Parallel Execution
//!
//! ```rust,ignore
//! use logicnet::ParallelRunner;
//!
//! let mut runner = ParallelRunner::new().with_threads(4);
//! // ... add simulators
//! runner.run(1000);
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use logicnet::{SimConfig, Simulator};
//!
//! let config = SimConfig::from_file("simulation.yaml")?;
//! logicnet::init_logging(&config.simulation.log_level);
//! let sim = Simulator::from_config(network, registry, &config);
//! ```

pub mod types;
pub mod logic;
pub mod pin;
pub mod block;
pub mod wire;
pub mod error;
pub mod network;
pub mod clock;
pub mod simulation;
pub mod registry;
pub mod blocks;
pub mod report;
pub mod evaluator;
pub mod engine;
pub mod config;
pub mod stats;
pub mod parallel;

// Re-export commonly used types
pub use types::{BehaviorKey, BlockId, Cycle, PinId, WireId};
pub use logic::{Logic, Resolution};
pub use pin::{Pin, PinDesc, PinDirection};
pub use block::{Block, BlockDesc};
pub use wire::Wire;
pub use error::{NetworkError, NetworkResult, RegistryError, SimError, SimResult};
pub use network::Network;
pub use clock::{Clock, DEFAULT_RESOLUTION};
pub use simulation::{BlockSimulation, Drives, PinView};
pub use registry::{create_default_registry, SimulationFactory, SimulationRegistry};
pub use report::{CycleReport, Diagnostic};
pub use evaluator::{CancelToken, Evaluator, EvaluatorConfig};
pub use engine::Simulator;
pub use config::{ConfigError, SimConfig, SimConfigBuilder};
pub use stats::{SimulationStats, StatsCollector, Timer};
pub use parallel::{ParallelRunner, ParallelRunnerStats};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// takes precedence over `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// logicnet::init_logging("debug");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
