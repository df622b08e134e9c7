//! Snapshot Generation
//!
//! Serializable views of the world for summaries and external tooling.

use bevy_ecs::prelude::*;
use courier_events::{generate_snapshot_id, DeadMarkerSnapshot, RunSummary, WorldSnapshot};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::components::{Grid, MasterRegistry, MessageLedger, Roster};
use crate::rng::SimRng;
use crate::systems::Verdict;

/// Resource handing out snapshot ids
#[derive(Resource, Debug, Default)]
pub struct SnapshotGenerator {
    next_snapshot_id: u64,
}

impl SnapshotGenerator {
    pub fn new() -> Self {
        Self { next_snapshot_id: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn snapshot_count(&self) -> u64 {
        self.next_snapshot_id.saturating_sub(1)
    }
}

/// Borrowed view of everything a snapshot reads
pub struct SnapshotSource<'a> {
    pub grid: &'a Grid,
    pub roster: &'a Roster,
    pub masters: &'a MasterRegistry,
    pub ledger: &'a MessageLedger,
}

/// Generate a complete world snapshot
pub fn generate_snapshot(source: &SnapshotSource<'_>, snapshot_id: String, step: u64) -> WorldSnapshot {
    WorldSnapshot {
        snapshot_id,
        step,
        width: source.grid.width(),
        height: source.grid.height(),
        total_messages: source.ledger.total(),
        masters: source.masters.iter().map(|m| m.snapshot(true)).collect(),
        agents: source.roster.iter().map(|a| a.snapshot()).collect(),
        obstacles: source.grid.obstacles().into_iter().map(|c| c.to_tile()).collect(),
        dead: source
            .grid
            .dead_markers()
            .into_iter()
            .map(|(position, faction)| DeadMarkerSnapshot {
                position: position.to_tile(),
                faction: faction.name().to_string(),
            })
            .collect(),
    }
}

/// The end-of-run report: verdict plus final state
pub fn build_summary(final_state: WorldSnapshot, verdict: &Verdict, rng: &SimRng) -> RunSummary {
    RunSummary {
        steps_run: final_state.step,
        seed: rng.seed(),
        rng: rng.kind().as_str().to_string(),
        verdict: verdict.snapshot(),
        final_state,
    }
}

/// Writes any serializable output as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
}
