//! This module provides the implementation of the decision diagrams that are
//! compiled over and over by the solver.
mod node_flags;

pub mod layered;

pub use layered::*;
