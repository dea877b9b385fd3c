use std::{cmp::Ordering, fmt::Display, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable(pub usize);

impl Variable {
    pub fn id(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub var: Variable,
    pub value: isize,
}

pub trait Problem {
    type State;

    fn nb_variables(&self) -> usize;
    fn initial_state(&self) -> Self::State;
    fn initial_value(&self) -> isize;

    fn for_each_in_domain<F>(&self, var: Variable, state: &Self::State, f: F)
    where
        F: FnMut(Decision);

    fn transition(&self, state: &Self::State, decision: Decision) -> Self::State;
    fn transition_cost(&self, state: &Self::State, decision: Decision) -> isize;

    // rough upper bound on the value attainable below `state`
    fn estimate(&self, _state: &Self::State) -> isize {
        isize::MAX
    }
}

pub trait Relaxation {
    type State;

    // relaxation
    fn merge(&self, states: &mut dyn Iterator<Item = &Self::State>) -> Self::State;
    fn relax(
        &self,
        source: &Self::State,
        dest: &Self::State,
        new: &Self::State,
        decision: Decision,
        cost: isize,
    ) -> isize;
}

pub trait StateRanking {
    type State;

    // Greater means better -> more likely to be kept
    fn compare(&self, a: &Self::State, b: &Self::State) -> Ordering;
}

pub trait VariableHeuristic<State> {
    // Picks the variable the next layer branches on; None once every
    // variable has been decided upon
    fn next_var(
        &self,
        depth: usize,
        next_layer: &mut dyn Iterator<Item = &State>,
    ) -> Option<Variable>;
}

pub trait WidthHeuristic<State> {
    // Estimates a good max width for the diagram rooted in the given subproblem
    fn max_width(&self, sub: &SubProblem<State>) -> usize;
}

pub trait Solver {
    fn maximize(&mut self);
    fn best_value(&self) -> Option<isize>;
    fn best_solution(&self) -> Option<Vec<Decision>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStatus {
    Proved,
    Interrupted,
}
impl Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionStatus::Proved => write!(f, "Proved"),
            ResolutionStatus::Interrupted => write!(f, "Timeout"),
        }
    }
}

pub trait InterruptibleSolver: Solver {
    fn maximize_with_interrupt<I>(&mut self, interrupt: I) -> ResolutionStatus
    where
        I: Fn() -> bool;
    //
    fn best_value_so_far(&self) -> Option<isize>;
    fn best_solution_so_far(&self) -> Option<Vec<Decision>>;
    //
    fn best_upper_bound(&self) -> isize;
    fn best_lower_bound(&self) -> isize;
}

pub trait Frontier {
    type State;

    /// This is how you push a node onto the frontier.
    fn push(&mut self, node: SubProblem<Self::State>);
    /// This method yields the next open node from the frontier.
    /// # Note:
    /// The solver relies on the assumption that a frontier will pop nodes in
    /// ascending upper bound order, first-in first-out among equal bounds.
    /// Hence, it is a requirement for any frontier implementation to enforce
    /// that requirement.
    fn pop(&mut self) -> Option<SubProblem<Self::State>>;
    /// This method clears the frontier: it removes all nodes from the queue.
    fn clear(&mut self);
    /// Yields the length of the queue.
    fn len(&self) -> usize;
    /// The loosest upper bound among the open nodes, or `isize::MIN` when the
    /// queue is empty. This is what the solver publishes as its global upper
    /// bound.
    fn max_ub(&self) -> isize;
    /// Returns true iff the frontier is empty (len == 0)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/* -------------------------------------------------------------------------- */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationType {
    Exact,
    Relaxed,
    Restricted,
}

#[derive(Debug, Clone)]
pub struct SubProblem<T> {
    pub state: Arc<T>,
    pub value: isize,
    pub path: Vec<Decision>,
    pub ub: isize,
    pub depth: usize,
}

pub struct CompilationInput<'a, P, R, O, V>
where
    P: Problem,
    R: Relaxation<State = P::State>,
    O: StateRanking<State = P::State>,
    V: VariableHeuristic<P::State>,
{
    pub comp_type: CompilationType,
    pub max_width: usize,
    pub problem: &'a P,
    pub relaxation: &'a R,
    pub ranking: &'a O,
    pub var_heu: &'a V,
    pub residual: SubProblem<P::State>,
    pub best_lb: isize,
}

pub trait DecisionDiagram {
    type State;

    fn compile<P, R, O, V>(&mut self, input: &CompilationInput<P, R, O, V>)
    where
        P: Problem<State = Self::State>,
        R: Relaxation<State = P::State>,
        O: StateRanking<State = P::State>,
        V: VariableHeuristic<P::State>;

    fn is_exact(&self) -> bool;
    fn best_value(&self) -> Option<isize>;
    fn best_solution(&self) -> Option<Vec<Decision>>;

    /// Detaches the exact cutset of the last compilation and hands each of
    /// its nodes to `func` as an independent subproblem.
    /// # Note:
    /// This only makes sense after a relaxed compilation that turned out
    /// inexact; the cutset is empty in every other case.
    fn drain_cutset<F>(&mut self, func: F)
    where
        F: FnMut(SubProblem<Self::State>);
}

