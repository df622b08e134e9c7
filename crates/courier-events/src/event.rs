//! Event Types
//!
//! Every observable turn outcome of the courier simulation.

use serde::{Deserialize, Serialize};

use crate::Tile;

/// Primary event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Spawn,
    Movement,
    Barrier,
    Union,
    Exchange,
    Battle,
    Truce,
    Deposit,
    Death,
}

impl EventType {
    /// True for the event types produced by two agents meeting.
    pub fn is_encounter(&self) -> bool {
        matches!(
            self,
            EventType::Union | EventType::Exchange | EventType::Battle | EventType::Truce
        )
    }
}

/// What stopped a walk without relocating the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierKind {
    Obstacle,
    ForeignSafeZone,
}

/// Why an agent died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Travel drained the last energy point
    Exhaustion,
    /// A barrier penalty drained the last energy point
    BarrierHit,
}

/// Snapshot of an agent's state at the time of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub agent_id: String,
    pub name: String,
    pub faction: String,
    pub position: Tile,
    pub energy: u32,
    pub message_count: usize,
}

impl ActorSnapshot {
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        faction: impl Into<String>,
        position: Tile,
        energy: u32,
        message_count: usize,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            faction: faction.into(),
            position,
            energy,
            message_count,
        }
    }
}

/// Results and state changes of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventOutcome {
    Spawned {
        messages: Vec<String>,
    },
    Moved {
        from: Tile,
        to: Tile,
        /// True when the destination restored the agent's energy
        restored: bool,
    },
    Blocked {
        at: Tile,
        barrier: BarrierKind,
        energy_lost: u32,
    },
    Union {
        actor_before: usize,
        target_before: usize,
        after: usize,
    },
    Exchange {
        rolled: u32,
        given: usize,
        received: usize,
    },
    Battle {
        actor_choice: String,
        target_choice: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
        rolled: u32,
        transferred: usize,
        discarded: usize,
    },
    Truce {
        /// Name of the agent whose safe zone prevented the battle
        sheltered: String,
    },
    Deposit {
        master: String,
        delivered: usize,
        master_total: usize,
    },
    Death {
        at: Tile,
        cause: DeathCause,
    },
}

/// A complete simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// Round in which the event occurred
    pub step: u64,
    pub event_type: EventType,
    /// The agent whose turn produced the event
    pub actor: ActorSnapshot,
    /// The other party of an encounter, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ActorSnapshot>,
    pub outcome: EventOutcome,
}

impl Event {
    pub fn new(
        event_id: impl Into<String>,
        step: u64,
        event_type: EventType,
        actor: ActorSnapshot,
        outcome: EventOutcome,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            step,
            event_type,
            actor,
            target: None,
            outcome,
        }
    }

    pub fn with_target(mut self, target: ActorSnapshot) -> Self {
        self.target = Some(target);
        self
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}
