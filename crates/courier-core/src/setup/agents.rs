//! Agent Spawning
//!
//! Spawns each faction's couriers on random free tiles outside every safe
//! zone, each carrying a fresh batch of messages.

use crate::components::{Agent, AgentId, Faction, Grid, MessageLedger, Occupant, Roster};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::rng::RandomSource;

/// How many agents were spawned, per faction
#[derive(Debug, Clone, Default)]
pub struct SpawnSummary {
    pub total_agents: usize,
    pub total_messages: u64,
    pub by_faction: Vec<(Faction, usize)>,
}

/// Display name of the `index`-th agent of a faction, counting from one
pub fn agent_name(faction: Faction, index: u32) -> String {
    format!("{}{}", faction.name(), index + 1)
}

/// Spawn all agents for a single faction
pub fn spawn_faction_agents(
    roster: &mut Roster,
    grid: &mut Grid,
    ledger: &mut MessageLedger,
    faction: Faction,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> Result<Vec<AgentId>, SimError> {
    let population = &config.population;
    let mut spawned = Vec::with_capacity(population.agents_per_faction as usize);

    for i in 0..population.agents_per_faction {
        let location = grid.random_free_tile(rng, config.map.max_placement_attempts)?;
        let agent = Agent::new(
            roster.next_id(),
            agent_name(faction, i),
            faction,
            faction.alliance(),
            location,
            population.initial_energy,
            ledger,
            population.max_messages_per_agent,
            rng,
        )?;
        grid.place(Occupant::Agent(agent.id()), location)?;
        tracing::debug!(
            agent = agent.name(),
            at = %location,
            messages = agent.messages().len(),
            "spawned agent"
        );
        spawned.push(roster.push(agent));
    }

    Ok(spawned)
}

/// Spawn every faction's agents, Humans first
pub fn spawn_all_agents(
    roster: &mut Roster,
    grid: &mut Grid,
    ledger: &mut MessageLedger,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> Result<SpawnSummary, SimError> {
    let mut summary = SpawnSummary::default();
    for faction in Faction::ALL {
        let spawned = spawn_faction_agents(roster, grid, ledger, faction, config, rng)?;
        summary.total_agents += spawned.len();
        summary.by_faction.push((faction, spawned.len()));
    }
    summary.total_messages = ledger.total();
    Ok(summary)
}
