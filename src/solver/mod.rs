//! This module provides the implementation of the branch-and-bound solver.
pub mod sequential;

pub use sequential::*;
