//! Agent Components
//!
//! Mobile couriers: identity, position, energy, carried messages and the
//! memory of their previous move. All agents live in the [`Roster`] resource
//! and are addressed by [`AgentId`].

use bevy_ecs::prelude::*;
use courier_events::{ActorSnapshot, AgentSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::faction::{Alliance, Faction};
use super::geometry::{Coordinate, Direction};
use super::message::{MessageLedger, MessageSet};
use crate::error::SimError;
use crate::rng::RandomSource;

/// Index of an agent in the [`Roster`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{:03}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    name: String,
    faction: Faction,
    alliance: Alliance,
    position: Coordinate,
    energy: u32,
    initial_energy: u32,
    messages: MessageSet,
    last_direction: Option<Direction>,
    last_move_blocked: bool,
    alive: bool,
}

impl Agent {
    /// Creates a live agent carrying 1..=`max_messages` fresh messages.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        faction: Faction,
        alliance: Alliance,
        location: Coordinate,
        initial_energy: u32,
        ledger: &mut MessageLedger,
        max_messages: u32,
        rng: &mut impl RandomSource,
    ) -> Result<Self, SimError> {
        if initial_energy == 0 {
            return Err(SimError::ZeroEnergy);
        }
        Ok(Self {
            id,
            name: name.into(),
            faction,
            alliance,
            position: location,
            energy: initial_energy,
            initial_energy,
            messages: ledger.issue_batch(max_messages, rng),
            last_direction: None,
            last_move_blocked: false,
            alive: true,
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn alliance(&self) -> Alliance {
        self.alliance
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn initial_energy(&self) -> u32 {
        self.initial_energy
    }

    pub fn messages(&self) -> &MessageSet {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageSet {
        &mut self.messages
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    pub fn last_move_blocked(&self) -> bool {
        self.last_move_blocked
    }

    /// At or below a fifth of the starting energy; time to head home
    pub fn is_exhausted(&self) -> bool {
        u64::from(self.energy) * 5 <= u64::from(self.initial_energy)
    }

    pub(crate) fn set_position(&mut self, position: Coordinate) {
        self.position = position;
    }

    /// Drains energy, floored at zero. Returns what is left.
    pub(crate) fn spend_energy(&mut self, amount: u32) -> u32 {
        self.energy = self.energy.saturating_sub(amount);
        self.energy
    }

    pub(crate) fn restore_energy(&mut self) {
        self.energy = self.initial_energy;
    }

    pub(crate) fn record_direction(&mut self, direction: Direction) {
        self.last_direction = Some(direction);
    }

    pub(crate) fn set_blocked(&mut self, blocked: bool) {
        self.last_move_blocked = blocked;
    }

    pub(crate) fn die(&mut self) {
        self.energy = 0;
        self.alive = false;
    }

    pub fn actor_snapshot(&self) -> ActorSnapshot {
        ActorSnapshot::new(
            self.id.to_string(),
            self.name.clone(),
            self.faction.name(),
            self.position.to_tile(),
            self.energy,
            self.messages.len(),
        )
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            agent_id: self.id.to_string(),
            name: self.name.clone(),
            faction: self.faction.name().to_string(),
            alliance: self.alliance.name().to_string(),
            position: self.position.to_tile(),
            energy: self.energy,
            initial_energy: self.initial_energy,
            alive: self.alive,
            messages: self.messages.labels(),
        }
    }
}

/// Every agent in the simulation, in creation order
#[derive(Resource, Debug, Clone, Default)]
pub struct Roster {
    agents: Vec<Agent>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next pushed agent will receive
    pub fn next_id(&self) -> AgentId {
        AgentId(self.agents.len())
    }

    pub fn push(&mut self, agent: Agent) -> AgentId {
        let id = agent.id();
        self.agents.push(agent);
        id
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.0)
    }

    /// Two distinct agents mutably at once
    pub fn pair_mut(&mut self, a: AgentId, b: AgentId) -> Result<(&mut Agent, &mut Agent), SimError> {
        if a == b || a.0 >= self.agents.len() {
            return Err(SimError::UnknownAgent(a));
        }
        if b.0 >= self.agents.len() {
            return Err(SimError::UnknownAgent(b));
        }
        if a.0 < b.0 {
            let (left, right) = self.agents.split_at_mut(b.0);
            Ok((&mut left[a.0], &mut right[0]))
        } else {
            let (left, right) = self.agents.split_at_mut(a.0);
            Ok((&mut right[0], &mut left[b.0]))
        }
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(Agent::id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn living(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_alive())
    }
}
