//! Simulation Driver
//!
//! Owns the ECS world and the round schedule. Building a [`Simulation`]
//! generates the map, parks the Masters and spawns every agent; each
//! [`Simulation::step`] plays one round.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use courier_events::{EventOutcome, EventType, RunSummary, WorldSnapshot};
use std::path::Path;

use crate::components::{Grid, MasterRegistry, MessageLedger, Roster};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::events::{EventLogger, TickEvents};
use crate::output::{build_summary, generate_snapshot, render_grid, render_grid_colored, SnapshotGenerator, SnapshotSource};
use crate::rng::SimRng;
use crate::setup::{self, SpawnSummary};
use crate::systems::{
    check_victory, execute_turns, flush_events, shuffle_turn_order, SimulationState, TurnOrder, Verdict,
};

pub struct Simulation {
    world: World,
    schedule: Schedule,
    spawn_summary: SpawnSummary,
}

impl Simulation {
    /// Builds a ready-to-run simulation, seeding from the wall clock when the
    /// configuration has no seed.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let rng = SimRng::seeded_or_clock(config.run.rng, config.run.seed);
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &SimConfig, mut rng: SimRng) -> Result<Self, SimError> {
        let mut grid = setup::create_grid(&config.map, &mut rng)?;
        let masters = setup::park_masters(&mut grid)?;
        let mut roster = Roster::new();
        let mut ledger = MessageLedger::new();
        let spawn_summary = setup::spawn_all_agents(&mut roster, &mut grid, &mut ledger, config, &mut rng)?;
        tracing::info!(
            seed = rng.seed(),
            rng = rng.kind().as_str(),
            agents = spawn_summary.total_agents,
            messages = spawn_summary.total_messages,
            "simulation ready"
        );

        let mut events = TickEvents::new();
        for agent in roster.iter() {
            events.record(
                0,
                EventType::Spawn,
                agent.actor_snapshot(),
                None,
                EventOutcome::Spawned {
                    messages: agent.messages().labels(),
                },
            );
        }

        let mut world = World::new();
        world.insert_resource(SimulationState::new(config.run.max_steps));
        world.insert_resource(rng);
        world.insert_resource(grid);
        world.insert_resource(masters);
        world.insert_resource(roster);
        world.insert_resource(ledger);
        world.insert_resource(events);
        world.insert_resource(TurnOrder::default());
        world.insert_resource(SnapshotGenerator::new());

        // Turns are strictly sequential; every system shares the one generator
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((shuffle_turn_order, execute_turns, check_victory, flush_events).chain());

        Ok(Self {
            world,
            schedule,
            spawn_summary,
        })
    }

    /// Starts appending every event to a JSONL file
    pub fn attach_event_log(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        self.world.insert_resource(EventLogger::new(path)?);
        Ok(())
    }

    /// Plays one round unless the run is already decided. Returns the verdict
    /// once there is one.
    pub fn step(&mut self) -> Option<&Verdict> {
        if !self.is_finished() {
            self.schedule.run(&mut self.world);
        }
        self.verdict()
    }

    /// Plays rounds until a verdict is reached
    pub fn run(&mut self) -> Verdict {
        loop {
            if let Some(verdict) = self.step() {
                return verdict.clone();
            }
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.state().verdict.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    pub fn current_step(&self) -> u64 {
        self.state().current_step
    }

    pub fn state(&self) -> &SimulationState {
        self.world.resource::<SimulationState>()
    }

    pub fn grid(&self) -> &Grid {
        self.world.resource::<Grid>()
    }

    pub fn roster(&self) -> &Roster {
        self.world.resource::<Roster>()
    }

    pub fn masters(&self) -> &MasterRegistry {
        self.world.resource::<MasterRegistry>()
    }

    pub fn ledger(&self) -> &MessageLedger {
        self.world.resource::<MessageLedger>()
    }

    pub fn rng(&self) -> &SimRng {
        self.world.resource::<SimRng>()
    }

    pub fn spawn_summary(&self) -> &SpawnSummary {
        &self.spawn_summary
    }

    /// Events recorded since the last flush
    pub fn pending_events(&self) -> &TickEvents {
        self.world.resource::<TickEvents>()
    }

    pub fn snapshot(&mut self) -> WorldSnapshot {
        let snapshot_id = self.world.resource_mut::<SnapshotGenerator>().next_id();
        let source = SnapshotSource {
            grid: self.grid(),
            roster: self.roster(),
            masters: self.masters(),
            ledger: self.ledger(),
        };
        generate_snapshot(&source, snapshot_id, self.current_step())
    }

    /// Final snapshot plus verdict, once the run is decided
    pub fn summary(&mut self) -> Option<RunSummary> {
        let verdict = self.verdict()?.clone();
        let final_state = self.snapshot();
        Some(build_summary(final_state, &verdict, self.rng()))
    }

    pub fn render(&self) -> String {
        render_grid(self.grid(), self.roster())
    }

    pub fn render_colored(&self) -> String {
        render_grid_colored(self.grid(), self.roster())
    }
}
