//! Whole-run scenarios on the default map.

use courier_core::components::{Faction, Occupant};
use courier_core::{RngKind, SimConfig, Simulation, Verdict};

fn seeded(seed: u64) -> SimConfig {
    let mut config = SimConfig::default();
    config.run.seed = Some(seed);
    config
}

/// Checks the world invariants that must hold between rounds
fn assert_consistent(sim: &Simulation) {
    let grid = sim.grid();

    for faction in Faction::ALL {
        // The only obstacles a safe zone can gain are the dead
        for tile in grid.safe_tiles(faction) {
            if grid.is_obstacle(*tile) {
                assert!(grid.dead_marker(*tile).is_some(), "obstacle inside {faction} safe zone at {tile}");
            }
        }
        let anchor = grid.safe_zone_anchor(faction).unwrap();
        assert_eq!(grid.occupant_at(anchor), Some(Occupant::Master(faction)));
    }

    for agent in sim.roster().iter() {
        assert!(agent.energy() <= agent.initial_energy());
        if agent.is_alive() {
            assert!(agent.energy() > 0);
            assert_eq!(grid.occupant_at(agent.position()), Some(Occupant::Agent(agent.id())));
            assert!(!grid.is_other_faction_safe_zone(agent.position(), agent.faction()));
        } else {
            assert_eq!(agent.energy(), 0);
            assert_eq!(grid.dead_marker(agent.position()), Some(agent.faction()));
        }
    }

    for (at, occupant) in grid.occupants() {
        assert!(!grid.is_obstacle(at));
        if let Occupant::Agent(id) = occupant {
            let agent = sim.roster().get(id).unwrap();
            assert!(agent.is_alive(), "dead agent {id} still occupies {at}");
            assert_eq!(agent.position(), at);
        }
    }
}

#[test]
fn test_default_world_layout() {
    let sim = Simulation::new(&seeded(11)).unwrap();
    assert_eq!(sim.grid().width(), 14);
    assert_eq!(sim.grid().height(), 8);
    assert_eq!(sim.roster().len(), 8);
    assert_eq!(sim.spawn_summary().by_faction.len(), 4);

    let total: usize = sim.roster().iter().map(|a| a.messages().len()).sum();
    assert_eq!(total as u64, sim.ledger().total());
    for faction in courier_core::Faction::ALL {
        assert!(sim.grid().safe_tiles(faction).iter().all(|t| !sim.grid().is_obstacle(*t)));
    }
    assert_consistent(&sim);
}

#[test]
fn test_invariants_hold_every_round() {
    for rng in [RngKind::MonteCarlo, RngKind::Uniform] {
        let mut config = seeded(2024);
        config.run.rng = rng;
        config.run.max_steps = 60;
        let mut sim = Simulation::new(&config).unwrap();

        let issued = sim.ledger().total();
        let mut previous: Vec<usize> = sim.masters().iter().map(|m| m.messages().len()).collect();
        while !sim.is_finished() {
            sim.step();
            assert_consistent(&sim);
            assert_eq!(sim.ledger().total(), issued, "no messages are issued after spawn");

            let current: Vec<usize> = sim.masters().iter().map(|m| m.messages().len()).collect();
            for (before, after) in previous.iter().zip(&current) {
                assert!(after >= before, "a Master lost messages");
                assert!(*after as u64 <= issued);
            }
            previous = current;
        }
        assert!(sim.current_step() <= 60);
    }
}

#[test]
fn test_verdict_matches_masters() {
    let mut config = seeded(9);
    config.run.max_steps = 30;
    let mut sim = Simulation::new(&config).unwrap();
    let verdict = sim.run();

    let best = sim.masters().iter().map(|m| m.messages().len()).max().unwrap();
    match &verdict {
        Verdict::Complete { winners, messages } => {
            assert_eq!(*messages as u64, sim.ledger().total());
            for faction in winners {
                assert_eq!(sim.masters().get(*faction).unwrap().messages().len(), *messages);
            }
        }
        Verdict::MostMessages { winners, messages } => {
            assert_eq!(*messages, best);
            assert_eq!(sim.current_step(), 30);
            assert!(!winners.is_empty());
        }
        Verdict::NoWinner => assert_eq!(best, 0),
    }
}

#[test]
fn test_lone_faction_on_open_map() {
    let mut config = seeded(5);
    config.map.obstacle_density = 0.0;
    config.population.agents_per_faction = 1;
    config.run.max_steps = 100;
    let mut sim = Simulation::new(&config).unwrap();
    sim.run();

    // Every obstacle on an open map is a fallen courier
    for tile in sim.grid().obstacles() {
        assert!(sim.grid().dead_marker(tile).is_some());
    }
    assert_consistent(&sim);
    let summary = sim.summary().unwrap();
    assert_eq!(summary.final_state.agents.len(), 4);
    assert_eq!(summary.final_state.masters.len(), 4);
}

#[test]
fn test_summary_serializes_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("summary.json");
    let mut sim = Simulation::new(&seeded(31)).unwrap();
    sim.run();

    let summary = sim.summary().unwrap();
    courier_core::output::write_json(&summary, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["seed"], 31);
    assert_eq!(value["final_state"]["width"], 14);
}
