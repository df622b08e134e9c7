//! Simulation Components
//!
//! The spatial model, the couriers and collectors that move through it, and
//! the messages they carry.

pub mod agent;
pub mod faction;
pub mod geometry;
pub mod grid;
pub mod master;
pub mod message;

pub use agent::*;
pub use faction::*;
pub use geometry::*;
pub use grid::*;
pub use master::*;
pub use message::*;
