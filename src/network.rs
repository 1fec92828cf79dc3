//! The network arena: blocks, pins, wires and their structural edits.
//!
//! A [`Network`] owns every block, pin and wire of one diagram together with
//! the simulation instance attached to each block. The external editor layer
//! mutates it between ticks; the evaluator mutates pin states during a tick.
//!
//! Identifiers are handed out monotonically and never reused, so a removed
//! block's id cannot alias a block added later.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::block::{Block, BlockDesc};
use crate::error::{NetworkError, NetworkResult};
use crate::logic::Logic;
use crate::pin::Pin;
use crate::simulation::BlockSimulation;
use crate::types::{BlockId, PinId, WireId};
use crate::wire::Wire;

/// Simulation attached to a block once it has been evaluated.
pub(crate) enum SimSlot {
    /// Resolved behavior.
    Active(Box<dyn BlockSimulation>),
    /// Behavior key not found in the registry. Drives nothing.
    Inert,
}

impl SimSlot {
    pub(crate) fn as_active_mut(&mut self) -> Option<&mut Box<dyn BlockSimulation>> {
        match self {
            SimSlot::Active(sim) => Some(sim),
            SimSlot::Inert => None,
        }
    }

    fn ties_pins(&self) -> bool {
        match self {
            SimSlot::Active(sim) => sim.ties_pins(),
            SimSlot::Inert => false,
        }
    }
}

/// Pins grouped into nets, compiled from the current structure.
#[derive(Clone, Debug, Default)]
pub(crate) struct NetMap {
    /// Pins of each net, in discovery order
    pub nets: Vec<Vec<PinId>>,
    /// Net index of every pin
    pub net_of: HashMap<PinId, usize>,
}

impl NetMap {
    pub(crate) fn len(&self) -> usize {
        self.nets.len()
    }
}

/// A network of blocks joined by wires.
#[derive(Default)]
pub struct Network {
    pub(crate) blocks: HashMap<BlockId, Block>,
    /// Block ids in insertion order; the evaluator visits blocks in this order
    pub(crate) order: Vec<BlockId>,
    pub(crate) pins: HashMap<PinId, Pin>,
    pub(crate) wires: BTreeMap<WireId, Wire>,
    /// Levels driven by `INPUT` blocks
    pub(crate) stimuli: HashMap<BlockId, Logic>,
    pub(crate) sims: HashMap<BlockId, SimSlot>,
    /// Compiled nets, dropped on every structural edit
    pub(crate) nets: Option<NetMap>,
    next_block: BlockId,
    next_pin: PinId,
    next_wire: WireId,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block and creates its pins.
    ///
    /// Fails with `MalformedNetwork` if two pins share a name.
    pub fn add_block(&mut self, desc: BlockDesc) -> NetworkResult<BlockId> {
        let mut seen = HashSet::new();
        for pin in &desc.pins {
            if !seen.insert(pin.name.as_str()) {
                return Err(NetworkError::MalformedNetwork(format!(
                    "Duplicate pin name {} on {} block",
                    pin.name, desc.behavior
                )));
            }
        }

        self.next_block += 1;
        let id = self.next_block;

        let mut block = Block {
            id,
            behavior: desc.behavior,
            pins: Vec::with_capacity(desc.pins.len()),
            directions: Vec::with_capacity(desc.pins.len()),
            pin_names: Vec::with_capacity(desc.pins.len()),
            properties: desc.properties,
        };

        for pin_desc in &desc.pins {
            self.next_pin += 1;
            let pin = Pin::new(self.next_pin, id, pin_desc);
            block.pins.push(pin.id);
            block.directions.push(pin.direction);
            block.pin_names.push(pin.name.clone());
            self.pins.insert(pin.id, pin);
        }

        tracing::debug!(block = id, behavior = %block.behavior, pins = block.pins.len(), "Block added");

        self.blocks.insert(id, block);
        self.order.push(id);
        self.nets = None;
        Ok(id)
    }

    /// Removes a block, its pins, its simulation and every wire ending on it.
    pub fn remove_block(&mut self, id: BlockId) -> NetworkResult<()> {
        let block = self
            .blocks
            .remove(&id)
            .ok_or(NetworkError::UnknownBlock(id))?;

        let doomed: HashSet<PinId> = block.pins.iter().copied().collect();
        let wire_ids: Vec<WireId> = self
            .wires
            .values()
            .filter(|w| doomed.contains(&w.a) || doomed.contains(&w.b))
            .map(|w| w.id)
            .collect();
        for wire_id in wire_ids {
            self.disconnect(wire_id)?;
        }

        for pin in &block.pins {
            self.pins.remove(pin);
        }
        self.order.retain(|b| *b != id);
        self.sims.remove(&id);
        self.stimuli.remove(&id);
        self.nets = None;

        tracing::debug!(block = id, "Block removed");
        Ok(())
    }

    /// Joins two pins with a wire.
    ///
    /// Fails with `MalformedNetwork` if `a` and `b` are the same pin.
    pub fn connect(&mut self, a: PinId, b: PinId) -> NetworkResult<WireId> {
        if a == b {
            return Err(NetworkError::MalformedNetwork(format!(
                "Pin {} wired to itself",
                a
            )));
        }
        if !self.pins.contains_key(&a) {
            return Err(NetworkError::UnknownPin(a));
        }
        if !self.pins.contains_key(&b) {
            return Err(NetworkError::UnknownPin(b));
        }

        self.next_wire += 1;
        let id = self.next_wire;
        self.wires.insert(id, Wire::new(id, a, b));

        if let Some(pin) = self.pins.get_mut(&a) {
            pin.connections.push(b);
        }
        if let Some(pin) = self.pins.get_mut(&b) {
            pin.connections.push(a);
        }
        self.nets = None;
        Ok(id)
    }

    /// Joins two pins given by block and pin name.
    pub fn connect_named(
        &mut self,
        from: BlockId,
        from_pin: &str,
        to: BlockId,
        to_pin: &str,
    ) -> NetworkResult<WireId> {
        let a = self.pin(from, from_pin)?;
        let b = self.pin(to, to_pin)?;
        self.connect(a, b)
    }

    /// Removes a wire.
    pub fn disconnect(&mut self, id: WireId) -> NetworkResult<()> {
        let wire = self.wires.remove(&id).ok_or(NetworkError::UnknownWire(id))?;

        // Only one peer entry goes per wire: parallel wires keep theirs.
        for (end, peer) in [(wire.a, wire.b), (wire.b, wire.a)] {
            if let Some(pin) = self.pins.get_mut(&end) {
                if let Some(pos) = pin.connections.iter().position(|p| *p == peer) {
                    pin.connections.remove(pos);
                }
            }
        }
        self.nets = None;
        Ok(())
    }

    /// Looks up a pin by block and name.
    pub fn pin(&self, block: BlockId, name: &str) -> NetworkResult<PinId> {
        let b = self
            .blocks
            .get(&block)
            .ok_or(NetworkError::UnknownBlock(block))?;
        b.pin_id(name).ok_or_else(|| NetworkError::UnknownPinName {
            block,
            name: name.to_string(),
        })
    }

    /// Sets the level an `INPUT` block drives from the next tick on.
    pub fn set_input(&mut self, block: BlockId, level: Logic) -> NetworkResult<()> {
        if !self.blocks.contains_key(&block) {
            return Err(NetworkError::UnknownBlock(block));
        }
        self.stimuli.insert(block, level);
        Ok(())
    }

    /// Returns the level last set with [`set_input`](Self::set_input).
    pub fn stimulus(&self, block: BlockId) -> Option<Logic> {
        self.stimuli.get(&block).copied()
    }

    /// Overwrites a committed pin state as an initial condition.
    ///
    /// The value is what blocks read in the first iteration of the next tick.
    pub fn preset_pin(&mut self, pin: PinId, level: Logic) -> NetworkResult<()> {
        let p = self.pins.get_mut(&pin).ok_or(NetworkError::UnknownPin(pin))?;
        p.state = level;
        Ok(())
    }

    /// Returns the committed state of a pin.
    pub fn pin_state(&self, pin: PinId) -> Option<Logic> {
        self.pins.get(&pin).map(|p| p.state)
    }

    /// Returns the committed state of a named pin.
    pub fn state_of(&self, block: BlockId, name: &str) -> NetworkResult<Logic> {
        let pin = self.pin(block, name)?;
        self.pin_state(pin).ok_or(NetworkError::UnknownPin(pin))
    }

    /// Returns a block.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Returns a pin.
    pub fn get_pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    /// Returns a wire.
    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(&id)
    }

    /// Iterates over blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.order.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Iterates over wires in creation order.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of pins.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Number of wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Returns true if the block was evaluated and its behavior key did not
    /// resolve.
    pub fn is_inert(&self, block: BlockId) -> bool {
        matches!(self.sims.get(&block), Some(SimSlot::Inert))
    }

    /// Returns true once the block's simulation has been instantiated.
    pub fn is_instantiated(&self, block: BlockId) -> bool {
        self.sims.contains_key(&block)
    }

    /// Committed state of every pin, ordered by pin id.
    pub fn snapshot(&self) -> BTreeMap<PinId, Logic> {
        self.pins.iter().map(|(id, p)| (*id, p.state)).collect()
    }

    /// Puts every pin back to `Undefined` and resets every simulation.
    ///
    /// Stimuli are kept.
    pub fn reset(&mut self) {
        for pin in self.pins.values_mut() {
            pin.state = Logic::Undefined;
        }
        for slot in self.sims.values_mut() {
            if let Some(sim) = slot.as_active_mut() {
                sim.reset();
            }
        }
    }

    /// Checks the structural invariants.
    pub fn validate(&self) -> NetworkResult<()> {
        let mut owner: HashMap<PinId, BlockId> = HashMap::new();
        for block in self.blocks() {
            let mut names = HashSet::new();
            for (i, pin_id) in block.pins.iter().enumerate() {
                if let Some(other) = owner.insert(*pin_id, block.id) {
                    return Err(NetworkError::MalformedNetwork(format!(
                        "Pin {} is owned by blocks {} and {}",
                        pin_id, other, block.id
                    )));
                }
                let pin = self
                    .pins
                    .get(pin_id)
                    .ok_or(NetworkError::UnknownPin(*pin_id))?;
                if pin.block != block.id {
                    return Err(NetworkError::MalformedNetwork(format!(
                        "Pin {} lists block {} but belongs to block {}",
                        pin_id, pin.block, block.id
                    )));
                }
                if !names.insert(block.pin_names[i].as_str()) {
                    return Err(NetworkError::MalformedNetwork(format!(
                        "Duplicate pin name {} on block {}",
                        block.pin_names[i], block.id
                    )));
                }
            }
        }

        for wire in self.wires.values() {
            if wire.is_self_loop() {
                return Err(NetworkError::MalformedNetwork(format!(
                    "Wire {} joins pin {} to itself",
                    wire.id, wire.a
                )));
            }
            for end in [wire.a, wire.b] {
                if !owner.contains_key(&end) {
                    return Err(NetworkError::UnknownPin(end));
                }
            }
        }

        Ok(())
    }

    /// Compiles nets if the structure changed since the last compilation.
    ///
    /// Must run after every block's simulation is instantiated, since tie
    /// blocks are recognized through their simulation.
    pub(crate) fn ensure_nets(&mut self) -> NetworkResult<()> {
        if self.nets.is_some() {
            return Ok(());
        }
        self.validate()?;
        let nets = self.compile_nets();
        tracing::debug!(nets = nets.len(), pins = self.pins.len(), "Nets compiled");
        self.nets = Some(nets);
        Ok(())
    }

    /// Groups pins joined by wires or by tie blocks, breadth-first.
    fn compile_nets(&self) -> NetMap {
        let mut adjacency: HashMap<PinId, Vec<PinId>> = HashMap::new();
        for wire in self.wires.values() {
            adjacency.entry(wire.a).or_default().push(wire.b);
            adjacency.entry(wire.b).or_default().push(wire.a);
        }
        for block in self.blocks() {
            let ties = self.sims.get(&block.id).map_or(false, SimSlot::ties_pins);
            if ties {
                for pair in block.pins.windows(2) {
                    adjacency.entry(pair[0]).or_default().push(pair[1]);
                    adjacency.entry(pair[1]).or_default().push(pair[0]);
                }
            }
        }

        let mut map = NetMap::default();
        let mut queue = VecDeque::new();

        for block in self.blocks() {
            for start in &block.pins {
                if map.net_of.contains_key(start) {
                    continue;
                }
                let index = map.nets.len();
                let mut members = Vec::new();
                map.net_of.insert(*start, index);
                queue.push_back(*start);

                while let Some(pin) = queue.pop_front() {
                    members.push(pin);
                    for peer in adjacency.get(&pin).into_iter().flatten() {
                        if !map.net_of.contains_key(peer) {
                            map.net_of.insert(*peer, index);
                            queue.push_back(*peer);
                        }
                    }
                }
                map.nets.push(members);
            }
        }

        map
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("blocks", &self.blocks.len())
            .field("pins", &self.pins.len())
            .field("wires", &self.wires.len())
            .field("instantiated", &self.sims.len())
            .finish()
    }
}
