//! Snapshot Types
//!
//! Serialization structs for world snapshots and the end-of-run summary.

use serde::{Deserialize, Serialize};

use crate::Tile;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// A roaming agent, alive or dead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: String,
    pub name: String,
    pub faction: String,
    pub alliance: String,
    pub position: Tile,
    pub energy: u32,
    pub initial_energy: u32,
    pub alive: bool,
    pub messages: Vec<String>,
}

/// A faction's collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterSnapshot {
    pub faction: String,
    pub name: String,
    pub position: Tile,
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

/// A tile where an agent died
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadMarkerSnapshot {
    pub position: Tile,
    pub faction: String,
}

/// Complete world state at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub snapshot_id: String,
    pub step: u64,
    pub width: i32,
    pub height: i32,
    /// Number of messages ever generated
    pub total_messages: u64,
    pub masters: Vec<MasterSnapshot>,
    pub agents: Vec<AgentSnapshot>,
    #[serde(default)]
    pub obstacles: Vec<Tile>,
    #[serde(default)]
    pub dead: Vec<DeadMarkerSnapshot>,
}

impl WorldSnapshot {
    pub fn living_agents(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.agents.iter().filter(|a| a.alive)
    }
}

/// How a run was decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictSnapshot {
    /// "complete", "most_messages" or "no_winner"
    pub kind: String,
    pub winners: Vec<String>,
    pub message_count: usize,
}

/// End-of-run report written by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps_run: u64,
    pub seed: u64,
    pub rng: String,
    pub verdict: VerdictSnapshot,
    pub final_state: WorldSnapshot,
}
