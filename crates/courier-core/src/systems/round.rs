//! Round Systems
//!
//! One schedule run is one round: shuffle the turn order, let every agent
//! take its turn, check the win conditions, then flush the round's events.

use bevy_ecs::prelude::*;

use super::turn::{take_turn, TurnContext};
use super::victory::{complete_collection, most_messages, Verdict};
use crate::components::{AgentId, Grid, MasterRegistry, MessageLedger, Roster};
use crate::events::{EventLogger, TickEvents};
use crate::rng::{RandomSource, SimRng};

/// Global simulation state resource
#[derive(Resource, Debug, Clone, Default)]
pub struct SimulationState {
    /// Rounds started so far
    pub current_step: u64,
    pub max_steps: u64,
    /// Set once the run is decided
    pub verdict: Option<Verdict>,
}

impl SimulationState {
    pub fn new(max_steps: u64) -> Self {
        Self {
            current_step: 0,
            max_steps,
            verdict: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.verdict.is_some()
    }
}

/// This round's permutation of every agent, dead ones included
#[derive(Resource, Debug, Clone, Default)]
pub struct TurnOrder(pub Vec<AgentId>);

/// System that opens a round with a fresh Fisher-Yates permutation
pub fn shuffle_turn_order(
    roster: Res<Roster>,
    mut rng: ResMut<SimRng>,
    mut order: ResMut<TurnOrder>,
    mut state: ResMut<SimulationState>,
) {
    state.current_step += 1;
    let mut ids = roster.ids();
    rng.shuffle(&mut ids);
    order.0 = ids;
}

/// System that runs every agent's turn in order
pub fn execute_turns(
    order: Res<TurnOrder>,
    state: Res<SimulationState>,
    mut roster: ResMut<Roster>,
    mut grid: ResMut<Grid>,
    mut masters: ResMut<MasterRegistry>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<TickEvents>,
) {
    let mut ctx = TurnContext {
        grid: &mut grid,
        masters: &mut masters,
        rng: &mut *rng,
        events: &mut events,
        step: state.current_step,
    };

    for id in &order.0 {
        if let Err(e) = take_turn(&mut roster, *id, &mut ctx) {
            tracing::warn!(agent = %id, error = %e, "turn aborted");
        }
    }
}

/// System that decides the run: a complete collection ends it at once, the
/// last budgeted round falls back to the largest collection
pub fn check_victory(
    masters: Res<MasterRegistry>,
    ledger: Res<MessageLedger>,
    mut state: ResMut<SimulationState>,
) {
    if state.is_finished() {
        return;
    }

    let verdict = complete_collection(&masters, ledger.total()).or_else(|| {
        (state.current_step >= state.max_steps).then(|| most_messages(&masters))
    });

    if let Some(verdict) = verdict {
        tracing::info!(step = state.current_step, verdict = %verdict.describe(), "run decided");
        state.verdict = Some(verdict);
    }
}

/// System that hands the round's events to the JSONL log
pub fn flush_events(mut events: ResMut<TickEvents>, logger: Option<ResMut<EventLogger>>) {
    let batch = events.drain();
    let encounters = batch.iter().filter(|e| e.event_type.is_encounter()).count();
    tracing::debug!(events = batch.len(), encounters, "round events");
    let Some(mut logger) = logger else {
        return;
    };
    if let Err(e) = logger.log_batch(&batch).and_then(|_| logger.flush()) {
        tracing::warn!(error = %e, "failed to write events");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, Coordinate, Faction, MessageId, MessageSet, Occupant};
    use crate::rng::RngKind;
    use bevy_ecs::schedule::ExecutorKind;

    fn world_with(agents: &[(Faction, (i32, i32))], max_steps: u64) -> World {
        let mut world = World::new();
        let mut grid = Grid::with_safe_zones(14, 8, 3, 2).unwrap();
        let mut masters = MasterRegistry::new();
        let mut ledger = MessageLedger::new();
        let mut roster = Roster::new();
        let mut rng = SimRng::new(RngKind::MonteCarlo, 5);

        for faction in Faction::ALL {
            masters.get_or_create(faction, &mut grid).unwrap();
        }
        for (faction, at) in agents {
            let id = roster.next_id();
            let at = Coordinate::from(*at);
            let agent = Agent::new(
                id,
                format!("{faction}{}", id.0),
                *faction,
                faction.alliance(),
                at,
                100,
                &mut ledger,
                5,
                &mut rng,
            )
            .unwrap();
            grid.place(Occupant::Agent(id), at).unwrap();
            roster.push(agent);
        }

        world.insert_resource(grid);
        world.insert_resource(masters);
        world.insert_resource(ledger);
        world.insert_resource(roster);
        world.insert_resource(rng);
        world.insert_resource(TickEvents::new());
        world.insert_resource(TurnOrder::default());
        world.insert_resource(SimulationState::new(max_steps));
        world
    }

    fn round_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((shuffle_turn_order, execute_turns, check_victory, flush_events).chain());
        schedule
    }

    #[test]
    fn test_turn_order_is_a_permutation() {
        let mut world = world_with(
            &[
                (Faction::Human, (5, 3)),
                (Faction::Elf, (8, 3)),
                (Faction::Orc, (5, 5)),
                (Faction::Goblin, (8, 5)),
            ],
            10,
        );
        round_schedule().run(&mut world);

        let mut order = world.resource::<TurnOrder>().0.clone();
        order.sort();
        assert_eq!(order, vec![AgentId(0), AgentId(1), AgentId(2), AgentId(3)]);
        assert_eq!(world.resource::<SimulationState>().current_step, 1);
        assert!(world.resource::<TickEvents>().is_empty());
    }

    #[test]
    fn test_budget_ends_the_run() {
        let mut world = world_with(&[(Faction::Orc, (6, 4))], 3);
        let mut schedule = round_schedule();
        for _ in 0..3 {
            assert!(!world.resource::<SimulationState>().is_finished());
            schedule.run(&mut world);
        }
        assert!(world.resource::<SimulationState>().is_finished());
    }

    #[test]
    fn test_complete_collection_ends_early() {
        let mut world = world_with(&[(Faction::Goblin, (6, 4))], 50);
        let everything: MessageSet = (0..world.resource::<MessageLedger>().total())
            .map(MessageId)
            .collect();
        world
            .resource_mut::<MasterRegistry>()
            .get_mut(Faction::Elf)
            .unwrap()
            .receive(&everything);

        round_schedule().run(&mut world);
        let state = world.resource::<SimulationState>();
        assert!(matches!(
            &state.verdict,
            Some(Verdict::Complete { winners, .. }) if winners == &vec![Faction::Elf]
        ));
    }

    #[test]
    fn test_events_reach_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.jsonl");
        let mut world = world_with(&[(Faction::Human, (6, 4)), (Faction::Goblin, (9, 4))], 5);
        world.insert_resource(EventLogger::new(&path).unwrap());

        let mut schedule = round_schedule();
        for _ in 0..5 {
            schedule.run(&mut world);
        }
        let logged = world.resource::<EventLogger>().event_count();
        let lines = std::fs::read_to_string(&path).unwrap().lines().count() as u64;
        assert_eq!(lines, logged);
    }
}
