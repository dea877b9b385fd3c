use std::{hash::Hash, sync::Arc};

use crate::{
    gap, CompilationInput, CompilationType, Decision, DecisionDiagram, Frontier,
    InterruptibleSolver, LayeredMdd, Problem, Relaxation, ResolutionStatus, SimpleFrontier,
    Solver, StateRanking, SubProblem, VariableHeuristic, WidthHeuristic,
};

/// This is the single-threaded branch-and-bound solver. It repeatedly pops
/// the next open subproblem, develops a restricted diagram to improve the
/// incumbent, then a relaxed diagram whose exact cutset spawns the child
/// subproblems.
///
/// # Note:
/// The frontier pops open nodes by ascending upper bound. The global upper
/// bound is therefore maintained as the loosest bound among the open nodes,
/// and it is clamped so that it never increases over the course of a search.
pub struct SequentialSolver<'a, P, R, O, W, V>
where
    P: Problem,
    P::State: Eq + PartialEq + Hash + Clone,
    R: Relaxation<State = P::State>,
    O: StateRanking<State = P::State>,
    W: WidthHeuristic<P::State>,
    V: VariableHeuristic<P::State>,
{
    problem: &'a P,
    relaxation: &'a R,
    ranking: &'a O,
    width_heu: &'a W,
    var_heu: &'a V,

    /// This is the fringe: the set of nodes that must still be explored before
    /// the problem can be considered 'solved'.
    fringe: SimpleFrontier<P::State>,
    /// The diagram buffer which is recycled from one compilation to the next.
    mdd: LayeredMdd<P::State>,

    /// This is a counter that tracks the number of nodes that have effectively
    /// been explored. That is, the number of nodes that have been popped from
    /// the fringe, and for which a restricted and relaxed mdd have been developed.
    explored: usize,
    explored_dd: usize,
    /// This is the value of the best known lower bound.
    best_lb: isize,
    /// This is the value of the best known upper bound.
    best_ub: isize,
    /// If set, this keeps the info about the best solution so far.
    best_sol: Option<Vec<Decision>>,
    /// Set when the interrupt criterion tripped: the search then stops without
    /// claiming optimality.
    interrupted: bool,
    /// 0 is silent; 1 reports bound improvements; 2 adds periodic statistics.
    verbosity: u8,
}

impl<'a, P, R, O, W, V> SequentialSolver<'a, P, R, O, W, V>
where
    P: Problem,
    P::State: Eq + PartialEq + Hash + Clone,
    R: Relaxation<State = P::State>,
    O: StateRanking<State = P::State>,
    W: WidthHeuristic<P::State>,
    V: VariableHeuristic<P::State>,
{
    pub fn new(
        problem: &'a P,
        relaxation: &'a R,
        ranking: &'a O,
        width_heu: &'a W,
        var_heu: &'a V,
    ) -> Self {
        SequentialSolver {
            problem,
            relaxation,
            ranking,
            width_heu,
            var_heu,
            //
            fringe: SimpleFrontier::new(),
            mdd: LayeredMdd::new(),
            //
            explored: 0,
            explored_dd: 0,
            best_lb: isize::MIN,
            best_ub: isize::MAX,
            best_sol: None,
            interrupted: false,
            verbosity: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// This method initializes the problem resolution: it posts the root node
    /// onto the fringe so that the main loop can pick it up.
    fn initialize(&mut self) {
        let root = self.root_node();
        self.fringe.push(root);
    }

    fn root_node(&self) -> SubProblem<P::State> {
        SubProblem {
            state: Arc::new(self.problem.initial_state()),
            value: self.problem.initial_value(),
            path: vec![],
            ub: isize::MAX,
            depth: 0,
        }
    }

    /// This method processes the given `node`: it expands a restricted and
    /// possibly a relaxed mdd rooted in `node` and, if that is necessary,
    /// stores the cutset nodes onto the fringe for further processing.
    fn process_one_node<I>(&mut self, node: SubProblem<P::State>, interrupt: &I)
    where
        I: Fn() -> bool,
    {
        // 1. RESTRICTION
        let width = self.width_heu.max_width(&node);
        let mut compilation = CompilationInput {
            comp_type: CompilationType::Restricted,
            max_width: width,
            problem: self.problem,
            relaxation: self.relaxation,
            ranking: self.ranking,
            var_heu: self.var_heu,
            residual: node,
            //
            best_lb: self.best_lb,
        };

        self.mdd.compile(&compilation);
        self.explored_dd += self.mdd.get_explored();
        self.maybe_update_best();
        if self.mdd.is_exact() {
            return;
        }
        if interrupt() {
            self.interrupted = true;
            return;
        }

        // 2. RELAXATION
        compilation.comp_type = CompilationType::Relaxed;
        compilation.best_lb = self.best_lb;
        self.mdd.compile(&compilation);
        self.explored_dd += self.mdd.get_explored();
        if self.mdd.is_exact() {
            self.maybe_update_best();
        } else {
            self.enqueue_cutset();
        }
    }

    /// This private method updates the best known node and lower bound in
    /// case the best value of the current `mdd` expansion improves the current
    /// bounds.
    fn maybe_update_best(&mut self) {
        let dd_best_value = self.mdd.best_value().unwrap_or(isize::MIN);
        if dd_best_value > self.best_lb {
            self.best_lb = dd_best_value;
            self.best_sol = self.mdd.best_solution();
            if self.verbosity >= 1 {
                println!(
                    "Improved, LB {}, UB {}, gap {:.4}, Fringe sz {}",
                    self.best_lb,
                    self.best_ub,
                    gap(self.best_lb, self.best_ub),
                    self.fringe.len()
                );
            }
        }
    }

    /// Adds the relevant nodes of the cutset of `mdd` to the fringe. Each of
    /// them inherited the relaxed diagram's terminal value as its bound; the
    /// whole cutset is pruned when that bound cannot improve the incumbent.
    fn enqueue_cutset(&mut self) {
        let best_lb = self.best_lb;
        let fringe = &mut self.fringe;
        self.mdd.drain_cutset(|cutset_node| {
            if cutset_node.ub > best_lb {
                fringe.push(cutset_node);
            }
        });
    }

    /// The tightest bound that can be claimed so far is the loosest bound
    /// among the open nodes (never below the incumbent, never above a bound
    /// claimed before).
    fn refresh_upper_bound(&mut self) {
        if self.fringe.is_empty() {
            return;
        }
        let open = self.fringe.max_ub().max(self.best_lb);
        if open < self.best_ub {
            self.best_ub = open;
            if self.verbosity >= 1 {
                println!(
                    "Tightened, LB {}, UB {}, gap {:.4}, Fringe sz {}",
                    self.best_lb,
                    self.best_ub,
                    gap(self.best_lb, self.best_ub),
                    self.fringe.len()
                );
            }
        }
    }

    pub fn get_explored(&self) -> usize {
        self.explored
    }

    pub fn get_explored_dd(&self) -> usize {
        self.explored_dd
    }

    /// Computes the current optimality gap.
    pub fn gap(&self) -> f32 {
        gap(self.best_lb, self.best_ub)
    }
}

impl<'a, P, R, O, W, V> Solver for SequentialSolver<'a, P, R, O, W, V>
where
    P: Problem,
    P::State: Eq + PartialEq + Hash + Clone,
    R: Relaxation<State = P::State>,
    O: StateRanking<State = P::State>,
    W: WidthHeuristic<P::State>,
    V: VariableHeuristic<P::State>,
{
    /// Applies the branch and bound algorithm proposed by Bergman et al. to
    /// solve the problem to optimality.
    fn maximize(&mut self) {
        self.maximize_with_interrupt(|| false);
    }

    /// Returns the best solution that has been identified for this problem.
    fn best_solution(&self) -> Option<Vec<Decision>> {
        self.best_sol.clone()
    }
    /// Returns the value of the best solution that has been identified for
    /// this problem.
    fn best_value(&self) -> Option<isize> {
        self.best_sol.as_ref().map(|_sol| self.best_lb)
    }
}

impl<'a, P, R, O, W, V> InterruptibleSolver for SequentialSolver<'a, P, R, O, W, V>
where
    P: Problem,
    P::State: Eq + PartialEq + Hash + Clone,
    R: Relaxation<State = P::State>,
    O: StateRanking<State = P::State>,
    W: WidthHeuristic<P::State>,
    V: VariableHeuristic<P::State>,
{
    fn maximize_with_interrupt<I>(&mut self, interrupt: I) -> ResolutionStatus
    where
        I: Fn() -> bool,
    {
        self.initialize();

        loop {
            if interrupt() {
                self.interrupted = true;
                break;
            }
            let node = match self.fringe.pop() {
                Some(node) => node,
                None => {
                    // every open node has been accounted for: this is a proof
                    self.best_ub = self.best_lb;
                    break;
                }
            };
            // a node whose bound cannot beat the incumbent is never compiled
            if node.ub <= self.best_lb {
                continue;
            }

            self.explored += 1;
            if self.verbosity >= 2 && self.explored % 100 == 0 {
                println!(
                    "Explored {}, LB {}, UB {}, Fringe sz {}",
                    self.explored,
                    self.best_lb,
                    self.best_ub,
                    self.fringe.len()
                );
            }

            self.process_one_node(node, &interrupt);
            if self.interrupted {
                break;
            }
            self.refresh_upper_bound();
        }

        if let Some(sol) = self.best_sol.as_mut() {
            sol.sort_unstable_by_key(|d| d.var.0)
        }
        if self.interrupted {
            ResolutionStatus::Interrupted
        } else {
            ResolutionStatus::Proved
        }
    }

    fn best_value_so_far(&self) -> Option<isize> {
        self.best_value()
    }

    fn best_solution_so_far(&self) -> Option<Vec<Decision>> {
        self.best_solution()
    }

    fn best_lower_bound(&self) -> isize {
        self.best_lb
    }

    fn best_upper_bound(&self) -> isize {
        self.best_ub
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

/// The solver is mostly exercised end to end: we solve small instances with
/// a known optimum and check the reported value, assignment, and bounds.

#[cfg(test)]
mod test_solver {
    use crate::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct KnapsackState {
        depth: usize,
        capacity: usize,
    }
    struct Knapsack {
        capacity: usize,
        profit: Vec<usize>,
        weight: Vec<usize>,
    }

    const TAKE_IT: isize = 1;
    const LEAVE_IT_OUT: isize = 0;

    impl Problem for Knapsack {
        type State = KnapsackState;
        fn nb_variables(&self) -> usize {
            self.profit.len()
        }
        fn initial_state(&self) -> Self::State {
            KnapsackState {
                depth: 0,
                capacity: self.capacity,
            }
        }
        fn initial_value(&self) -> isize {
            0
        }
        fn for_each_in_domain<F>(&self, var: Variable, state: &Self::State, mut f: F)
        where
            F: FnMut(Decision),
        {
            if state.capacity >= self.weight[var.id()] {
                f(Decision { var, value: TAKE_IT });
            }
            f(Decision {
                var,
                value: LEAVE_IT_OUT,
            });
        }
        fn transition(&self, state: &Self::State, dec: Decision) -> Self::State {
            let mut ret = *state;
            ret.depth += 1;
            if dec.value == TAKE_IT {
                ret.capacity -= self.weight[dec.var.id()]
            }
            ret
        }
        fn transition_cost(&self, _state: &Self::State, dec: Decision) -> isize {
            self.profit[dec.var.id()] as isize * dec.value
        }
    }
    struct KPRelax;
    impl Relaxation for KPRelax {
        type State = KnapsackState;

        fn merge(&self, states: &mut dyn Iterator<Item = &Self::State>) -> Self::State {
            states.max_by_key(|state| state.capacity).copied().unwrap()
        }
        fn relax(
            &self,
            _source: &Self::State,
            _dest: &Self::State,
            _merged: &Self::State,
            _decision: Decision,
            cost: isize,
        ) -> isize {
            cost
        }
    }
    struct KPRanking;
    impl StateRanking for KPRanking {
        type State = KnapsackState;

        fn compare(&self, a: &Self::State, b: &Self::State) -> std::cmp::Ordering {
            a.capacity.cmp(&b.capacity)
        }
    }

    fn knapsack() -> Knapsack {
        Knapsack {
            capacity: 50,
            profit: vec![60, 100, 120],
            weight: vec![10, 20, 30],
        }
    }

    fn bigger_knapsack() -> Knapsack {
        Knapsack {
            capacity: 50,
            profit: vec![60, 210, 12, 5, 100, 120, 110],
            weight: vec![10, 45, 20, 4, 20, 30, 50],
        }
    }

    #[test]
    fn by_default_best_lb_is_min_infinity() {
        let problem = knapsack();
        let ranking = KPRanking;
        let width = NbUnassigned {
            nb_vars: problem.nb_variables(),
        };
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        assert_eq!(isize::MIN, solver.best_lower_bound());
    }

    #[test]
    fn by_default_best_ub_is_plus_infinity() {
        let problem = knapsack();
        let ranking = KPRanking;
        let width = NbUnassigned {
            nb_vars: problem.nb_variables(),
        };
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        assert_eq!(isize::MAX, solver.best_upper_bound());
        assert_eq!(1.0, solver.gap());
    }

    #[test]
    fn no_solution_before_solving() {
        let problem = knapsack();
        let ranking = KPRanking;
        let width = NbUnassigned {
            nb_vars: problem.nb_variables(),
        };
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        assert!(solver.best_value().is_none());
        assert!(solver.best_solution().is_none());
    }

    #[test]
    fn maximize_yields_the_optimum() {
        let problem = knapsack();
        let ranking = KPRanking;
        let width = NbUnassigned {
            nb_vars: problem.nb_variables(),
        };
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let mut solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        let status = solver.maximize_with_interrupt(|| false);

        assert_eq!(ResolutionStatus::Proved, status);
        assert_eq!(Some(220), solver.best_value());
        assert_eq!(
            solver.best_solution().unwrap(),
            vec![
                Decision { var: Variable(0), value: 0 },
                Decision { var: Variable(1), value: 1 },
                Decision { var: Variable(2), value: 1 },
            ]
        );
    }

    #[test]
    fn maximize_yields_the_optimum_on_the_larger_instance() {
        let problem = bigger_knapsack();
        let ranking = KPRanking;
        let width = NbUnassigned {
            nb_vars: problem.nb_variables(),
        };
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let mut solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        solver.maximize();

        assert_eq!(Some(220), solver.best_value());
        assert_eq!(
            solver.best_solution().unwrap(),
            vec![
                Decision { var: Variable(0), value: 0 },
                Decision { var: Variable(1), value: 0 },
                Decision { var: Variable(2), value: 0 },
                Decision { var: Variable(3), value: 0 },
                Decision { var: Variable(4), value: 1 },
                Decision { var: Variable(5), value: 1 },
                Decision { var: Variable(6), value: 0 },
            ]
        );
    }

    #[test]
    fn when_the_problem_is_solved_both_bounds_meet_the_best_value() {
        let problem = knapsack();
        let ranking = KPRanking;
        let width = NbUnassigned {
            nb_vars: problem.nb_variables(),
        };
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let mut solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        solver.maximize();

        assert_eq!(220, solver.best_lower_bound());
        assert_eq!(220, solver.best_upper_bound());
        assert_eq!(0.0, solver.gap());
    }

    #[test]
    fn a_width_of_one_still_proves_the_optimum() {
        let problem = bigger_knapsack();
        let ranking = KPRanking;
        let width = Fixed(1);
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let mut solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        let status = solver.maximize_with_interrupt(|| false);

        assert_eq!(ResolutionStatus::Proved, status);
        assert_eq!(Some(220), solver.best_value());
        assert_eq!(220, solver.best_lower_bound());
        assert_eq!(220, solver.best_upper_bound());
    }

    #[test]
    fn an_immediate_interrupt_returns_promptly_with_no_proof() {
        let problem = bigger_knapsack();
        let ranking = KPRanking;
        let width = NbUnassigned {
            nb_vars: problem.nb_variables(),
        };
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };
        let mut solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        let status = solver.maximize_with_interrupt(|| true);

        assert_eq!(ResolutionStatus::Interrupted, status);
        assert!(solver.best_value_so_far().is_none());
        assert_eq!(isize::MIN, solver.best_lower_bound());
        assert_eq!(isize::MAX, solver.best_upper_bound());
        assert_eq!(1.0, solver.gap());
    }

    #[test]
    fn two_runs_on_the_same_input_produce_identical_results() {
        let problem = bigger_knapsack();
        let ranking = KPRanking;
        let width = Fixed(2);
        let var_heu = NaturalOrder {
            nb_vars: problem.nb_variables(),
        };

        let mut first = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);
        first.maximize();
        let mut second = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);
        second.maximize();

        assert_eq!(first.best_value(), second.best_value());
        assert_eq!(first.best_solution(), second.best_solution());
        assert_eq!(first.best_lower_bound(), second.best_lower_bound());
        assert_eq!(first.best_upper_bound(), second.best_upper_bound());
    }

    /// Three 0-1 variables whose objective is the plain sum of the values:
    /// the optimum is 3 and its assignment is all ones.
    struct TernarySum;
    impl Problem for TernarySum {
        type State = usize;
        fn nb_variables(&self) -> usize {
            3
        }
        fn initial_state(&self) -> usize {
            0
        }
        fn initial_value(&self) -> isize {
            0
        }
        fn for_each_in_domain<F>(&self, var: Variable, _state: &usize, mut f: F)
        where
            F: FnMut(Decision),
        {
            f(Decision { var, value: 0 });
            f(Decision { var, value: 1 });
        }
        fn transition(&self, state: &usize, _dec: Decision) -> usize {
            state + 1
        }
        fn transition_cost(&self, _state: &usize, dec: Decision) -> isize {
            dec.value
        }
    }
    struct SumRelax;
    impl Relaxation for SumRelax {
        type State = usize;
        fn merge(&self, states: &mut dyn Iterator<Item = &usize>) -> usize {
            *states.next().unwrap()
        }
        fn relax(&self, _: &usize, _: &usize, _: &usize, _: Decision, cost: isize) -> isize {
            cost
        }
    }
    struct SumRanking;
    impl StateRanking for SumRanking {
        type State = usize;
        fn compare(&self, a: &usize, b: &usize) -> std::cmp::Ordering {
            a.cmp(b)
        }
    }

    #[test]
    fn the_sum_of_three_binary_variables_is_maximized_by_all_ones() {
        let problem = TernarySum;
        let ranking = SumRanking;
        let width = NbUnassigned { nb_vars: 3 };
        let var_heu = NaturalOrder { nb_vars: 3 };
        let mut solver = SequentialSolver::new(&problem, &SumRelax, &ranking, &width, &var_heu);

        solver.maximize();

        assert_eq!(Some(3), solver.best_value());
        assert_eq!(
            solver.best_solution().unwrap(),
            vec![
                Decision { var: Variable(0), value: 1 },
                Decision { var: Variable(1), value: 1 },
                Decision { var: Variable(2), value: 1 },
            ]
        );
        assert_eq!(3, solver.best_lower_bound());
        assert_eq!(3, solver.best_upper_bound());
    }

    #[test]
    fn a_problem_with_no_variable_returns_its_root_immediately() {
        let problem = Knapsack {
            capacity: 50,
            profit: vec![],
            weight: vec![],
        };
        let ranking = KPRanking;
        let width = Fixed(1);
        let var_heu = NaturalOrder { nb_vars: 0 };
        let mut solver = SequentialSolver::new(&problem, &KPRelax, &ranking, &width, &var_heu);

        let status = solver.maximize_with_interrupt(|| false);

        assert_eq!(ResolutionStatus::Proved, status);
        assert_eq!(Some(0), solver.best_value());
        assert_eq!(Some(vec![]), solver.best_solution());
        assert_eq!(0, solver.best_lower_bound());
        assert_eq!(0, solver.best_upper_bound());
    }
}
