//! This module provides the implementation of the solver frontier.
use compare::Compare;
use std::cmp::Ordering;

use crate::SubProblem;

/// An open node stamped with its insertion rank, so that nodes with equal
/// bounds leave the queue first-in first-out.
#[derive(Debug, Clone)]
pub(crate) struct Queued<T> {
    pub node: SubProblem<T>,
    pub seq: usize,
}

/// Orders open nodes so that the loosest one (smallest upper bound) pops
/// first, oldest insertion first among equal bounds.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MinBound;
impl<T> Compare<Queued<T>> for MinBound {
    fn compare(&self, l: &Queued<T>, r: &Queued<T>) -> Ordering {
        r.node
            .ub
            .cmp(&l.node.ub)
            .then_with(|| r.seq.cmp(&l.seq))
    }
}

pub mod simple;

pub use simple::*;
