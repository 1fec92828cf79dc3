//! Simulation registry: behavior key to simulation factory.
//!
//! The registry is populated by the caller before the first tick. The
//! evaluator consults it the first time each block is evaluated; a block
//! whose key is missing stays inert.
//!
//! # Example
//!
//! ```
//! use logicnet::registry::SimulationRegistry;
//! use logicnet::blocks::gates::{Gate, GateSimulation};
//!
//! let mut registry = SimulationRegistry::new();
//! registry
//!     .register("AND", |_| Box::new(GateSimulation::new(Gate::And)))
//!     .unwrap();
//!
//! assert!(registry.contains("AND"));
//! assert!(registry.register("AND", |_| Box::new(GateSimulation::new(Gate::Or))).is_err());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::block::Block;
use crate::error::RegistryError;
use crate::simulation::BlockSimulation;

/// Type alias for simulation factory functions.
pub type SimulationFactory = Arc<dyn Fn(&Block) -> Box<dyn BlockSimulation> + Send + Sync>;

/// A registry of simulation factories keyed by behavior key.
///
/// Keys are case-sensitive.
#[derive(Default, Clone)]
pub struct SimulationRegistry {
    factories: HashMap<String, SimulationFactory>,
}

impl SimulationRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `key`.
    ///
    /// Fails with `DuplicateKey` if the key is taken; the existing factory
    /// is kept.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&Block) -> Box<dyn BlockSimulation> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.factories.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        self.factories.insert(key, Arc::new(factory));
        Ok(())
    }

    fn insert<F>(&mut self, key: &str, factory: F)
    where
        F: Fn(&Block) -> Box<dyn BlockSimulation> + Send + Sync + 'static,
    {
        self.factories.insert(key.to_string(), Arc::new(factory));
    }

    /// Returns the factory registered under `key`.
    pub fn resolve(&self, key: &str) -> Option<&SimulationFactory> {
        self.factories.get(key)
    }

    /// Instantiates the simulation for `block`, `None` if its key is unknown.
    pub fn create(&self, block: &Block) -> Option<Box<dyn BlockSimulation>> {
        self.resolve(&block.behavior).map(|f| f(block))
    }

    /// Returns true if a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Returns the number of registered keys.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns an iterator over registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.factories.keys()
    }

    /// Removes a key.
    pub fn unregister(&mut self, key: &str) -> bool {
        self.factories.remove(key).is_some()
    }
}

impl std::fmt::Debug for SimulationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("SimulationRegistry")
            .field("keys", &keys)
            .finish()
    }
}

/// Creates a registry holding every built-in behavior.
///
/// Includes:
/// - `AND`, `OR`, `NAND`, `NOR`, `XOR`, `NOT` - gates
/// - `SHORTCUT` - wire tie
/// - `SR-SET` - set-priority SR latch
/// - `SR-RESET-V` - reset-priority SR latch
/// - `INPUT` - stimulus source
/// - `OUTPUT` - probe
pub fn create_default_registry() -> SimulationRegistry {
    use crate::blocks::gates::{Gate, GateSimulation};
    use crate::blocks::io::{InputPin, OutputProbe};
    use crate::blocks::memory::{Priority, SrLatch};
    use crate::blocks::shortcut::Shortcut;

    let mut registry = SimulationRegistry::new();

    registry.insert("AND", |_| Box::new(GateSimulation::new(Gate::And)));
    registry.insert("OR", |_| Box::new(GateSimulation::new(Gate::Or)));
    registry.insert("NAND", |_| Box::new(GateSimulation::new(Gate::Nand)));
    registry.insert("NOR", |_| Box::new(GateSimulation::new(Gate::Nor)));
    registry.insert("XOR", |_| Box::new(GateSimulation::new(Gate::Xor)));
    registry.insert("NOT", |_| Box::new(GateSimulation::new(Gate::Not)));

    registry.insert("SHORTCUT", |_| Box::new(Shortcut));

    registry.insert("SR-SET", |_| Box::new(SrLatch::new(Priority::Set)));
    registry.insert("SR-RESET-V", |_| Box::new(SrLatch::new(Priority::Reset)));

    registry.insert("INPUT", |_| Box::new(InputPin));
    registry.insert("OUTPUT", |_| Box::new(OutputProbe));

    registry
}
