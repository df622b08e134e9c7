//! Agent Turn
//!
//! One full turn for one agent: choose a heading and a distance, walk tile by
//! tile, and stop at the map edge, a barrier, or another occupant. Every
//! faction shares this algorithm; a faction's [`MovementPolicy`] only supplies
//! the headings and the longest walk.
//!
//! [`MovementPolicy`]: crate::components::MovementPolicy

use courier_events::{ActorSnapshot, BarrierKind, DeathCause, EventOutcome, EventType};

use super::interaction::{deposit, encounter, Encounter};
use crate::components::{
    Agent, AgentId, Coordinate, Direction, Faction, Grid, MasterRegistry, Occupant, Roster,
};
use crate::error::SimError;
use crate::events::TickEvents;
use crate::rng::RandomSource;

/// Everything a turn may touch besides the roster
pub struct TurnContext<'a, R: RandomSource> {
    pub grid: &'a mut Grid,
    pub masters: &'a mut MasterRegistry,
    pub rng: &'a mut R,
    pub events: &'a mut TickEvents,
    /// Round number stamped on recorded events
    pub step: u64,
}

/// Why a walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// Walked the full planned distance
    Arrived,
    /// Next tile was outside the map; no penalty
    Edge,
    Barrier { kind: BarrierKind, penalty: u32 },
    Encounter(Encounter),
    /// Walked into a Master and deposited
    Master { faction: Faction, delivered: usize },
    Died(DeathCause),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The agent is dead; nothing happens
    Inactive,
    /// No heading was available (homing agent already at its anchor)
    Idle,
    Walked {
        direction: Direction,
        planned: u32,
        travelled: u32,
        halt: Halt,
    },
}

/// Events are buffered during the walk so the movement summary can be
/// recorded ahead of whatever ended it.
struct Pending {
    event_type: EventType,
    actor: ActorSnapshot,
    target: Option<ActorSnapshot>,
    outcome: EventOutcome,
}

fn agent_mut(roster: &mut Roster, id: AgentId) -> Result<&mut Agent, SimError> {
    roster.get_mut(id).ok_or(SimError::UnknownAgent(id))
}

/// Runs one turn for `id`.
///
/// Errors mean the world was inconsistent (an id not in the roster, a grid
/// that disagrees with an agent's position); the caller aborts the turn.
pub fn take_turn<R: RandomSource>(
    roster: &mut Roster,
    id: AgentId,
    ctx: &mut TurnContext<'_, R>,
) -> Result<TurnOutcome, SimError> {
    let agent = agent_mut(roster, id)?;
    if !agent.is_alive() {
        return Ok(TurnOutcome::Inactive);
    }

    let faction = agent.faction();
    let policy = faction.policy();
    let start = agent.position();

    let mut candidates = policy.directions().to_vec();
    if agent.last_move_blocked() {
        if let Some(last) = agent.last_direction() {
            candidates.retain(|d| *d != last);
        }
        agent.set_blocked(false);
    }

    if agent.is_exhausted() {
        let anchor = ctx
            .grid
            .safe_zone_anchor(faction)
            .ok_or_else(|| SimError::UnknownFaction(faction.name().to_string()))?;
        match Direction::toward(start, anchor) {
            Some(home) => candidates = vec![home],
            None => {
                tracing::debug!(agent = agent.name(), "exhausted at anchor, holding position");
                return Ok(TurnOutcome::Idle);
            }
        }
    }

    let Some(direction) = ctx.rng.pick(&candidates).copied() else {
        tracing::debug!(agent = agent.name(), "no heading available");
        return Ok(TurnOutcome::Idle);
    };
    let planned = ctx.rng.range_inclusive(1, i64::from(policy.max_distance())) as u32;
    tracing::debug!(
        agent = agent.name(),
        policy = policy.name(),
        %direction,
        planned,
        energy = agent.energy(),
        "turn begins"
    );

    let mut pending = Vec::new();
    let mut travelled = 0;
    let mut restored = false;
    let mut halt = Halt::Arrived;

    for taken in 0..planned {
        let steps_left = planned - taken;
        let here = agent_mut(roster, id)?.position();
        let next = here.step(direction);

        if !ctx.grid.is_within_bounds(next) {
            halt = Halt::Edge;
            break;
        }

        let barrier = if ctx.grid.is_obstacle(next) {
            Some(BarrierKind::Obstacle)
        } else if ctx.grid.is_other_faction_safe_zone(next, faction) {
            Some(BarrierKind::ForeignSafeZone)
        } else {
            None
        };
        if let Some(kind) = barrier {
            let penalty = if direction.is_diagonal() { 2 * steps_left } else { steps_left };
            let agent = agent_mut(roster, id)?;
            let left = agent.spend_energy(penalty);
            agent.set_blocked(true);
            tracing::trace!(agent = agent.name(), %next, ?kind, penalty, "hit barrier");
            pending.push(Pending {
                event_type: EventType::Barrier,
                actor: agent.actor_snapshot(),
                target: None,
                outcome: EventOutcome::Blocked {
                    at: next.to_tile(),
                    barrier: kind,
                    energy_lost: penalty,
                },
            });

            halt = if left == 0 {
                pending.push(retire(roster, id, ctx.grid, DeathCause::BarrierHit)?);
                Halt::Died(DeathCause::BarrierHit)
            } else {
                Halt::Barrier { kind, penalty }
            };
            break;
        }

        if let Some(occupant) = ctx.grid.occupant_at(next) {
            halt = match occupant {
                Occupant::Master(owner) => {
                    let master = ctx.masters.get_or_create(owner, ctx.grid)?;
                    let agent = agent_mut(roster, id)?;
                    let delivered = deposit(agent, master);
                    pending.push(deposit_event(agent, master.name(), delivered, master.messages().len()));
                    Halt::Master {
                        faction: owner,
                        delivered,
                    }
                }
                Occupant::Agent(other) => {
                    let (actor, target) = roster.pair_mut(id, other)?;
                    let result = encounter(actor, target, ctx.grid, &mut *ctx.rng);
                    tracing::debug!(
                        actor = actor.name(),
                        target = target.name(),
                        kind = ?result.event_type(),
                        "encounter"
                    );
                    pending.push(Pending {
                        event_type: result.event_type(),
                        actor: actor.actor_snapshot(),
                        target: Some(target.actor_snapshot()),
                        outcome: result.to_outcome(actor, target),
                    });
                    Halt::Encounter(result)
                }
            };
            break;
        }

        ctx.grid.relocate(here, next)?;
        let agent = agent_mut(roster, id)?;
        agent.set_position(next);
        travelled += 1;

        let home = ctx.grid.is_safe_zone_of(next, faction);
        if home {
            agent.restore_energy();
            restored = true;
        } else {
            agent.spend_energy(here.manhattan(next));
        }
        tracing::trace!(agent = agent.name(), %next, energy = agent.energy(), "step");

        if agent.energy() == 0 {
            pending.push(retire(roster, id, ctx.grid, DeathCause::Exhaustion)?);
            halt = Halt::Died(DeathCause::Exhaustion);
            break;
        }

        if home {
            let master = ctx.masters.get_or_create(faction, ctx.grid)?;
            let delivered = deposit(agent, master);
            if delivered > 0 {
                pending.push(deposit_event(agent, master.name(), delivered, master.messages().len()));
            }
        }
    }

    let agent = agent_mut(roster, id)?;
    agent.record_direction(direction);

    if travelled > 0 {
        ctx.events.record(
            ctx.step,
            EventType::Movement,
            agent.actor_snapshot(),
            None,
            EventOutcome::Moved {
                from: start.to_tile(),
                to: agent.position().to_tile(),
                restored,
            },
        );
    }
    for event in pending {
        ctx.events
            .record(ctx.step, event.event_type, event.actor, event.target, event.outcome);
    }

    Ok(TurnOutcome::Walked {
        direction,
        planned,
        travelled,
        halt,
    })
}

fn deposit_event(agent: &Agent, master: &str, delivered: usize, master_total: usize) -> Pending {
    tracing::debug!(agent = agent.name(), master, delivered, master_total, "deposit");
    Pending {
        event_type: EventType::Deposit,
        actor: agent.actor_snapshot(),
        target: None,
        outcome: EventOutcome::Deposit {
            master: master.to_string(),
            delivered,
            master_total,
        },
    }
}

/// Energy ran out: the agent leaves the occupancy map for good and its tile
/// becomes an obstacle carrying a dead marker.
fn retire(roster: &mut Roster, id: AgentId, grid: &mut Grid, cause: DeathCause) -> Result<Pending, SimError> {
    let agent = agent_mut(roster, id)?;
    let at: Coordinate = agent.position();

    grid.remove(at);
    grid.mark_dead(at, agent.faction());
    grid.add_obstacle(at);
    agent.die();
    tracing::info!(agent = agent.name(), %at, ?cause, "agent died");

    Ok(Pending {
        event_type: EventType::Death,
        actor: agent.actor_snapshot(),
        target: None,
        outcome: EventOutcome::Death { at: at.to_tile(), cause },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MessageLedger;
    use crate::rng::ScriptedRng;

    struct Fixture {
        grid: Grid,
        masters: MasterRegistry,
        roster: Roster,
        events: TickEvents,
        ledger: MessageLedger,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grid: Grid::with_safe_zones(14, 8, 3, 2).unwrap(),
                masters: MasterRegistry::new(),
                roster: Roster::new(),
                events: TickEvents::new(),
                ledger: MessageLedger::new(),
            }
        }

        /// Spawns an agent holding two fresh messages
        fn spawn(&mut self, faction: Faction, at: (i32, i32)) -> AgentId {
            let id = self.roster.next_id();
            let agent = Agent::new(
                id,
                format!("{faction}{}", id.0),
                faction,
                faction.alliance(),
                at.into(),
                100,
                &mut self.ledger,
                5,
                &mut ScriptedRng::new(&[2]),
            )
            .unwrap();
            self.grid.place(Occupant::Agent(id), at.into()).unwrap();
            self.roster.push(agent)
        }

        fn turn(&mut self, id: AgentId, script: &[i64]) -> TurnOutcome {
            let mut rng = ScriptedRng::new(script);
            let mut ctx = TurnContext {
                grid: &mut self.grid,
                masters: &mut self.masters,
                rng: &mut rng,
                events: &mut self.events,
                step: 1,
            };
            take_turn(&mut self.roster, id, &mut ctx).unwrap()
        }

        fn agent(&self, id: AgentId) -> &Agent {
            self.roster.get(id).unwrap()
        }

        fn drain_energy(&mut self, id: AgentId, to: u32) {
            let agent = self.roster.get_mut(id).unwrap();
            let current = agent.energy();
            agent.spend_energy(current - to);
        }
    }

    // Orthogonal headings are indexed N, S, E, W; diagonal ones NE, NW, SE, SW.
    const NORTH: i64 = 0;
    const SOUTH: i64 = 1;
    const EAST: i64 = 2;
    const WEST: i64 = 3;
    const NORTH_EAST: i64 = 0;

    #[test]
    fn test_open_walk_costs_distance() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Human, (5, 4));

        let outcome = fx.turn(id, &[EAST, 3]);
        assert_eq!(
            outcome,
            TurnOutcome::Walked {
                direction: Direction::East,
                planned: 3,
                travelled: 3,
                halt: Halt::Arrived
            }
        );
        assert_eq!(fx.agent(id).position(), Coordinate::new(8, 4));
        assert_eq!(fx.agent(id).energy(), 97);
        assert_eq!(fx.grid.occupant_at(Coordinate::new(8, 4)), Some(Occupant::Agent(id)));
        assert!(!fx.grid.is_occupied(Coordinate::new(5, 4)));
        assert_eq!(fx.events.events()[0].event_type, EventType::Movement);
    }

    #[test]
    fn test_diagonal_step_costs_two() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Elf, (5, 4));

        fx.turn(id, &[NORTH_EAST, 1]);
        assert_eq!(fx.agent(id).position(), Coordinate::new(6, 5));
        assert_eq!(fx.agent(id).energy(), 98);
    }

    #[test]
    fn test_map_edge_stops_without_penalty() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Human, (13, 4));

        let outcome = fx.turn(id, &[EAST, 2]);
        assert!(matches!(outcome, TurnOutcome::Walked { travelled: 0, halt: Halt::Edge, .. }));
        assert_eq!(fx.agent(id).energy(), 100);
        assert!(!fx.agent(id).last_move_blocked());
        assert!(fx.events.is_empty());
    }

    #[test]
    fn test_obstacle_penalty_and_avoidance() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Human, (5, 4));
        fx.grid.add_obstacle(Coordinate::new(5, 6));

        let outcome = fx.turn(id, &[NORTH, 3]);
        assert!(matches!(
            outcome,
            TurnOutcome::Walked {
                travelled: 1,
                halt: Halt::Barrier {
                    kind: BarrierKind::Obstacle,
                    penalty: 2
                },
                ..
            }
        ));
        // one step walked, then two planned steps forfeited
        assert_eq!(fx.agent(id).energy(), 97);
        assert!(fx.agent(id).last_move_blocked());
        assert_eq!(fx.agent(id).last_direction(), Some(Direction::North));

        // North is struck from the next turn's headings: index 0 is now South
        let outcome = fx.turn(id, &[0, 1]);
        assert!(matches!(outcome, TurnOutcome::Walked { direction: Direction::South, .. }));
        assert!(!fx.agent(id).last_move_blocked());
    }

    #[test]
    fn test_diagonal_barrier_doubles_penalty() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Elf, (5, 4));
        fx.grid.add_obstacle(Coordinate::new(6, 5));

        fx.turn(id, &[NORTH_EAST, 2]);
        assert_eq!(fx.agent(id).position(), Coordinate::new(5, 4));
        assert_eq!(fx.agent(id).energy(), 96);
    }

    #[test]
    fn test_foreign_safe_zone_is_a_barrier() {
        let mut fx = Fixture::new();
        // Goblin zone starts at x = 11 on row 6
        let id = fx.spawn(Faction::Human, (10, 6));

        let outcome = fx.turn(id, &[EAST, 1]);
        assert!(matches!(
            outcome,
            TurnOutcome::Walked {
                halt: Halt::Barrier {
                    kind: BarrierKind::ForeignSafeZone,
                    penalty: 1
                },
                ..
            }
        ));
        assert_eq!(fx.agent(id).position(), Coordinate::new(10, 6));
    }

    #[test]
    fn test_own_safe_zone_restores_and_deposits() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Human, (3, 0));
        fx.drain_energy(id, 50);

        fx.turn(id, &[WEST, 1]);
        assert_eq!(fx.agent(id).position(), Coordinate::new(2, 0));
        assert_eq!(fx.agent(id).energy(), 100);

        let master = fx.masters.get(Faction::Human).unwrap();
        assert_eq!(master.messages(), fx.agent(id).messages());
        assert_eq!(fx.agent(id).messages().len(), 2);
    }

    #[test]
    fn test_walking_into_master_deposits() {
        let mut fx = Fixture::new();
        fx.masters.get_or_create(Faction::Human, &mut fx.grid).unwrap();
        let id = fx.spawn(Faction::Human, (0, 2));

        let outcome = fx.turn(id, &[SOUTH, 2]);
        assert!(matches!(
            outcome,
            TurnOutcome::Walked {
                travelled: 1,
                halt: Halt::Master {
                    faction: Faction::Human,
                    ..
                },
                ..
            }
        ));
        assert_eq!(fx.agent(id).position(), Coordinate::new(0, 1));
        assert_eq!(fx.masters.get(Faction::Human).unwrap().messages().len(), 2);
    }

    #[test]
    fn test_encounter_ends_walk() {
        let mut fx = Fixture::new();
        let a = fx.spawn(Faction::Human, (5, 4));
        let b = fx.spawn(Faction::Human, (7, 4));

        let outcome = fx.turn(a, &[EAST, 3]);
        assert!(matches!(
            outcome,
            TurnOutcome::Walked {
                travelled: 1,
                halt: Halt::Encounter(Encounter::Union { after: 4, .. }),
                ..
            }
        ));
        assert_eq!(fx.agent(a).position(), Coordinate::new(6, 4));
        assert_eq!(fx.agent(a).messages(), fx.agent(b).messages());

        let types: Vec<_> = fx.events.events().iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::Movement, EventType::Union]);
    }

    #[test]
    fn test_homing_at_anchor_skips_turn() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Human, (0, 0));
        fx.drain_energy(id, 20);

        assert_eq!(fx.turn(id, &[EAST, 3]), TurnOutcome::Idle);
        assert_eq!(fx.agent(id).position(), Coordinate::new(0, 0));
        assert_eq!(fx.agent(id).last_direction(), None);
    }

    #[test]
    fn test_homing_overrides_policy() {
        let mut fx = Fixture::new();
        // Orcs home toward (0, 7); from (5, 4) west dominates
        let id = fx.spawn(Faction::Orc, (5, 4));
        fx.drain_energy(id, 10);

        let outcome = fx.turn(id, &[]);
        assert!(matches!(outcome, TurnOutcome::Walked { direction: Direction::West, .. }));
        assert_eq!(fx.agent(id).position(), Coordinate::new(4, 4));
    }

    #[test]
    fn test_exhaustion_death_is_terminal() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Human, (5, 4));
        fx.drain_energy(id, 1);

        // homing heads west; one step drains the last point
        let outcome = fx.turn(id, &[1]);
        assert!(matches!(
            outcome,
            TurnOutcome::Walked {
                halt: Halt::Died(DeathCause::Exhaustion),
                ..
            }
        ));
        let grave = Coordinate::new(4, 4);
        assert!(!fx.agent(id).is_alive());
        assert!(!fx.grid.is_occupied(grave));
        assert!(fx.grid.is_obstacle(grave));
        assert_eq!(fx.grid.dead_marker(grave), Some(Faction::Human));

        let recorded = fx.events.len();
        assert_eq!(fx.turn(id, &[EAST, 3]), TurnOutcome::Inactive);
        assert_eq!(fx.events.len(), recorded);
    }

    #[test]
    fn test_barrier_can_kill() {
        let mut fx = Fixture::new();
        let id = fx.spawn(Faction::Human, (5, 4));
        fx.grid.add_obstacle(Coordinate::new(4, 4));
        fx.drain_energy(id, 2);

        let outcome = fx.turn(id, &[3]);
        assert!(matches!(
            outcome,
            TurnOutcome::Walked {
                halt: Halt::Died(DeathCause::BarrierHit),
                ..
            }
        ));
        assert!(fx.grid.is_obstacle(Coordinate::new(5, 4)));
        assert_eq!(fx.agent(id).energy(), 0);

        let last = fx.events.events().last().unwrap();
        assert_eq!(last.event_type, EventType::Death);
    }
}
