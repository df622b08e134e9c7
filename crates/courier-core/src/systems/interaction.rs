//! Interaction Protocol
//!
//! What happens when a moving agent walks into an occupied tile. The result
//! depends on faction, alliance and safe-zone shelter:
//!
//! - same faction: both sides end with the union of their messages
//! - same alliance: a small random exchange of messages the other side lacks
//! - rival alliances in the open: a Stone / Leaf / Scissors battle
//! - rival alliances with either side at home: nothing happens
//!
//! Walking into a Master deposits messages instead; see [`deposit`].

use courier_events::{EventOutcome, EventType};
use std::fmt;

use crate::components::{Agent, AgentId, Grid, Master, MessageSet};
use crate::rng::RandomSource;

/// Most messages an allied exchange moves in each direction
pub const MAX_EXCHANGE: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Stone,
    Leaf,
    Scissors,
}

impl Choice {
    pub fn draw(rng: &mut impl RandomSource) -> Self {
        match rng.below(3) {
            0 => Choice::Stone,
            1 => Choice::Leaf,
            _ => Choice::Scissors,
        }
    }

    pub fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Stone, Choice::Scissors)
                | (Choice::Leaf, Choice::Stone)
                | (Choice::Scissors, Choice::Leaf)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Choice::Stone => "stone",
            Choice::Leaf => "leaf",
            Choice::Scissors => "scissors",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleReport {
    pub actor_choice: Choice,
    pub target_choice: Choice,
    /// None on a tie
    pub winner: Option<AgentId>,
    /// Messages the loser gave up
    pub rolled: usize,
    /// Messages the winner did not have yet
    pub transferred: usize,
    /// Rolled messages the winner already held; destroyed
    pub discarded: usize,
}

/// Outcome of one agent walking into another
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encounter {
    Union {
        actor_before: usize,
        target_before: usize,
        after: usize,
    },
    Exchange {
        rolled: usize,
        given: usize,
        received: usize,
    },
    Battle(BattleReport),
    Truce {
        sheltered: AgentId,
    },
}

impl Encounter {
    pub fn event_type(&self) -> EventType {
        match self {
            Encounter::Union { .. } => EventType::Union,
            Encounter::Exchange { .. } => EventType::Exchange,
            Encounter::Battle(_) => EventType::Battle,
            Encounter::Truce { .. } => EventType::Truce,
        }
    }

    pub fn to_outcome(&self, actor: &Agent, target: &Agent) -> EventOutcome {
        let name_of = |id: AgentId| {
            if id == actor.id() {
                actor.name().to_string()
            } else {
                target.name().to_string()
            }
        };

        match self {
            Encounter::Union {
                actor_before,
                target_before,
                after,
            } => EventOutcome::Union {
                actor_before: *actor_before,
                target_before: *target_before,
                after: *after,
            },
            Encounter::Exchange {
                rolled,
                given,
                received,
            } => EventOutcome::Exchange {
                rolled: *rolled as u32,
                given: *given,
                received: *received,
            },
            Encounter::Battle(report) => EventOutcome::Battle {
                actor_choice: report.actor_choice.name().to_string(),
                target_choice: report.target_choice.name().to_string(),
                winner: report.winner.map(name_of),
                rolled: report.rolled as u32,
                transferred: report.transferred,
                discarded: report.discarded,
            },
            Encounter::Truce { sheltered } => EventOutcome::Truce {
                sheltered: name_of(*sheltered),
            },
        }
    }
}

/// Resolves `actor` walking into `target`
pub fn encounter(
    actor: &mut Agent,
    target: &mut Agent,
    grid: &Grid,
    rng: &mut impl RandomSource,
) -> Encounter {
    if actor.faction() == target.faction() {
        let actor_before = actor.messages().len();
        let target_before = target.messages().len();
        let after = union_messages(actor.messages_mut(), target.messages_mut());
        return Encounter::Union {
            actor_before,
            target_before,
            after,
        };
    }

    if actor.alliance() == target.alliance() {
        let (rolled, given, received) = exchange_messages(actor.messages_mut(), target.messages_mut(), rng);
        return Encounter::Exchange {
            rolled,
            given,
            received,
        };
    }

    if grid.is_safe_zone_of(actor.position(), actor.faction()) {
        return Encounter::Truce { sheltered: actor.id() };
    }
    if grid.is_safe_zone_of(target.position(), target.faction()) {
        return Encounter::Truce { sheltered: target.id() };
    }

    Encounter::Battle(battle(actor, target, rng))
}

/// Both sets become their union. Returns the union's size.
pub fn union_messages(a: &mut MessageSet, b: &mut MessageSet) -> usize {
    let mut union = a.clone();
    union.absorb(b);
    *b = union.clone();
    *a = union;
    a.len()
}

/// Allied exchange: one roll k in [1, 3], then each side hands the other up
/// to k messages the other lacks. Both donations are drawn from the sets as
/// they stood before either transfer.
///
/// Returns (k, given by `a`, given by `b`).
pub fn exchange_messages(
    a: &mut MessageSet,
    b: &mut MessageSet,
    rng: &mut impl RandomSource,
) -> (usize, usize, usize) {
    let rolled = rng.range_inclusive(1, MAX_EXCHANGE) as usize;
    let from_a = a.clone();
    let from_b = b.clone();

    let given = transfer_unique(&from_a, b, rolled, rng);
    let received = transfer_unique(&from_b, a, rolled, rng);
    (rolled, given, received)
}

/// Copies up to `count` random messages from `source` that `recipient` lacks
fn transfer_unique(
    source: &MessageSet,
    recipient: &mut MessageSet,
    count: usize,
    rng: &mut impl RandomSource,
) -> usize {
    let mut lacking: MessageSet = source.missing_from(recipient).into_iter().collect();
    let mut moved = 0;
    while moved < count {
        let Some(id) = lacking.take_random(rng) else {
            break;
        };
        recipient.insert(id);
        moved += 1;
    }
    moved
}

/// Stone / Leaf / Scissors between rivals; the winner plunders the loser
pub fn battle(actor: &mut Agent, target: &mut Agent, rng: &mut impl RandomSource) -> BattleReport {
    let actor_choice = Choice::draw(rng);
    let target_choice = Choice::draw(rng);

    let mut report = BattleReport {
        actor_choice,
        target_choice,
        winner: None,
        rolled: 0,
        transferred: 0,
        discarded: 0,
    };

    let (winner, loser) = if actor_choice.beats(target_choice) {
        (actor, target)
    } else if target_choice.beats(actor_choice) {
        (target, actor)
    } else {
        return report;
    };

    report.winner = Some(winner.id());
    let (rolled, transferred, discarded) = plunder(winner.messages_mut(), loser.messages_mut(), rng);
    report.rolled = rolled;
    report.transferred = transferred;
    report.discarded = discarded;
    report
}

/// The winner rolls k in [1, |loser|] and takes up to k messages it lacks;
/// whatever part of k it could not use is destroyed from the loser. The loser
/// always ends exactly k messages lighter.
///
/// Returns (k, transferred, discarded).
pub fn plunder(
    winner: &mut MessageSet,
    loser: &mut MessageSet,
    rng: &mut impl RandomSource,
) -> (usize, usize, usize) {
    if loser.is_empty() {
        return (0, 0, 0);
    }
    let rolled = rng.range_inclusive(1, loser.len() as i64) as usize;

    let mut lacking: MessageSet = loser.missing_from(winner).into_iter().collect();
    let mut transferred = 0;
    while transferred < rolled {
        let Some(id) = lacking.take_random(rng) else {
            break;
        };
        loser.remove(id);
        winner.insert(id);
        transferred += 1;
    }

    let mut discarded = 0;
    while transferred + discarded < rolled && loser.take_random(rng).is_some() {
        discarded += 1;
    }
    (rolled, transferred, discarded)
}

/// Hands every message the agent carries to a Master. The agent keeps its
/// copies. Returns how many were new to the Master.
pub fn deposit(agent: &Agent, master: &mut Master) -> usize {
    master.receive(agent.messages())
}
