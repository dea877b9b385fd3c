// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! These tests solve tiny arrangements with a known optimal cost. Remember
//! that the model negates all costs, so an arrangement of cost `c` shows up
//! as an objective value of `-c`.

use bbmdd::{
    Decision, Fixed, InterruptibleSolver, NaturalOrder, NbUnassigned, Problem, ResolutionStatus,
    SequentialSolver, Solver, StateRanking, VariableHeuristic, WidthHeuristic,
};

use crate::{
    heuristics::MinlaRanking, instance::MinlaInstance, model::Minla, relax::MinlaRelax,
    state::State,
};

fn triangle() -> MinlaInstance {
    MinlaInstance::from_edges(3, &[(0, 1, 1), (0, 2, 1), (1, 2, 1)])
}

fn two_components() -> MinlaInstance {
    // a single edge next to a triangle, with no edge in between
    MinlaInstance::from_edges(5, &[(0, 1, 1), (2, 3, 1), (2, 4, 1), (3, 4, 1)])
}

fn path_of_four() -> MinlaInstance {
    MinlaInstance::from_edges(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1)])
}

type Outcome = (
    ResolutionStatus,
    Option<isize>,
    isize,
    isize,
    Option<Vec<Decision>>,
);

fn solve(instance: MinlaInstance, width: Option<usize>) -> Outcome {
    let model = Minla::new(instance);
    let relax = MinlaRelax::new(&model);
    let ranking = MinlaRanking;
    let var_heu = NaturalOrder {
        nb_vars: model.nb_variables(),
    };

    match width {
        Some(w) => run(&model, &relax, &ranking, &Fixed(w), &var_heu),
        None => {
            let adaptive = NbUnassigned {
                nb_vars: model.nb_variables(),
            };
            run(&model, &relax, &ranking, &adaptive, &var_heu)
        }
    }
}

fn run<O, W, V>(model: &Minla, relax: &MinlaRelax, ranking: &O, width: &W, var_heu: &V) -> Outcome
where
    O: StateRanking<State = State>,
    W: WidthHeuristic<State>,
    V: VariableHeuristic<State>,
{
    let mut solver = SequentialSolver::new(model, relax, ranking, width, var_heu);
    let status = solver.maximize_with_interrupt(|| false);
    (
        status,
        solver.best_value(),
        solver.best_lower_bound(),
        solver.best_upper_bound(),
        solver.best_solution(),
    )
}

/// the placed vertices must form a permutation of the vertex set
fn assert_is_permutation(nb_vertices: usize, solution: &[Decision]) {
    let mut placed: Vec<isize> = solution.iter().map(|d| d.value).collect();
    placed.sort_unstable();
    let expected: Vec<isize> = (0..nb_vertices as isize).collect();
    assert_eq!(expected, placed);
}

#[test]
fn every_arrangement_of_a_triangle_costs_four() {
    let (status, value, lb, ub, solution) = solve(triangle(), None);

    assert_eq!(ResolutionStatus::Proved, status);
    assert_eq!(Some(-4), value);
    assert_eq!(-4, lb);
    assert_eq!(-4, ub);
    assert_is_permutation(3, &solution.unwrap());
}

#[test]
fn a_width_of_one_still_proves_the_triangle() {
    let (status, value, lb, ub, solution) = solve(triangle(), Some(1));

    assert_eq!(ResolutionStatus::Proved, status);
    assert_eq!(Some(-4), value);
    assert_eq!(-4, lb);
    assert_eq!(-4, ub);
    assert_is_permutation(3, &solution.unwrap());
}

#[test]
fn a_path_is_arranged_in_order() {
    let (status, value, lb, ub, solution) = solve(path_of_four(), None);

    assert_eq!(ResolutionStatus::Proved, status);
    assert_eq!(Some(-3), value);
    assert_eq!(-3, lb);
    assert_eq!(-3, ub);
    assert_is_permutation(4, &solution.unwrap());
}

#[test]
fn a_path_under_width_one_keeps_its_bounds_valid() {
    let (status, value, lb, ub, _) = solve(path_of_four(), Some(1));

    // the bounds must bracket the optimum and meet once the proof is done
    assert_eq!(ResolutionStatus::Proved, status);
    assert_eq!(Some(-3), value);
    assert!(lb <= -3);
    assert!(ub >= -3);
    assert_eq!(lb, ub);
}

#[test]
fn disconnected_components_add_their_optima() {
    let (status, value, lb, ub, solution) = solve(two_components(), None);

    // the edge alone costs 1, the triangle costs 4
    assert_eq!(ResolutionStatus::Proved, status);
    assert_eq!(Some(-5), value);
    assert_eq!(-5, lb);
    assert_eq!(-5, ub);
    assert_is_permutation(5, &solution.unwrap());
}

#[test]
fn two_runs_on_the_same_instance_are_identical() {
    let first = solve(two_components(), Some(2));
    let second = solve(two_components(), Some(2));

    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
    assert_eq!(first.3, second.3);
    assert_eq!(first.4, second.4);
}
