pub mod prelude;

pub mod frontier;
pub mod heuristics;
pub mod mdd;
pub mod solver;
pub mod utils;

pub use frontier::*;
pub use heuristics::*;
pub use mdd::*;
pub use prelude::*;
pub use solver::*;

pub use utils::*;

// only useful to the demo binaries
pub mod runner;
