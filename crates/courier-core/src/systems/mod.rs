//! Simulation Systems
//!
//! The turn algorithm and interaction protocol as plain functions, plus the
//! bevy systems that drive them once per round.

pub mod interaction;
pub mod round;
pub mod turn;
pub mod victory;

pub use interaction::{Choice, Encounter};
pub use round::{
    check_victory, execute_turns, flush_events, shuffle_turn_order, SimulationState, TurnOrder,
};
pub use turn::{take_turn, Halt, TurnContext, TurnOutcome};
pub use victory::Verdict;
