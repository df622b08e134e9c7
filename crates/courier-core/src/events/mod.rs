//! Event System
//!
//! Events are the engine's record of every turn outcome. They are gathered
//! per round in [`TickEvents`] and optionally appended to a JSONL log.

pub mod logger;

pub use logger::{EventLogger, TickEvents};
