//! Output Generation
//!
//! World snapshots, the end-of-run summary, and the console map.

pub mod render;
pub mod snapshot;

pub use render::*;
pub use snapshot::*;
