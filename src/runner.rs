use peak_alloc::PeakAlloc;
use std::{
    hash::Hash,
    time::{Duration, Instant},
};
use structopt::StructOpt;

use crate::{
    gap, Fixed, InterruptibleSolver, NaturalOrder, NbUnassigned, Problem, Relaxation,
    SequentialSolver, Solver, StateRanking, VariableHeuristic, WidthHeuristic,
};

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

#[derive(Debug, StructOpt)]
pub enum Args {
    Solve {
        #[structopt(short, long)]
        file: String,
        #[structopt(short, long)]
        width: Option<usize>,
        #[structopt(short, long, default_value = "60")]
        timeout: usize,
        #[structopt(short, long, default_value = "0")]
        verbosity: u8,
    },
    PrintHeader,
}

/// Solves the given model within the given wall-clock budget and prints one
/// result line plus the incumbent assignment. When no width is imposed, each
/// diagram gets as many nodes per layer as there are unassigned variables.
/// Returns the best upper bound that could be claimed.
pub fn solve_timeout<P, R, O>(
    name: &'static str,
    to: Duration,
    width: Option<usize>,
    model: &P,
    relax: &R,
    ranking: &O,
    verbosity: u8,
) -> isize
where
    P: Problem,
    P::State: Eq + PartialEq + Hash + Clone,
    R: Relaxation<State = P::State>,
    O: StateRanking<State = P::State>,
{
    let var_heu = NaturalOrder {
        nb_vars: model.nb_variables(),
    };

    match width {
        Some(w) => run(name, to, &Fixed(w), model, relax, ranking, &var_heu, verbosity),
        None => {
            let adaptive = NbUnassigned {
                nb_vars: model.nb_variables(),
            };
            run(name, to, &adaptive, model, relax, ranking, &var_heu, verbosity)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run<P, R, O, W, V>(
    name: &'static str,
    to: Duration,
    width: &W,
    model: &P,
    relax: &R,
    ranking: &O,
    var_heu: &V,
    verbosity: u8,
) -> isize
where
    P: Problem,
    P::State: Eq + PartialEq + Hash + Clone,
    R: Relaxation<State = P::State>,
    O: StateRanking<State = P::State>,
    W: WidthHeuristic<P::State>,
    V: VariableHeuristic<P::State>,
{
    let start = Instant::now();
    let mut solver =
        SequentialSolver::new(model, relax, ranking, width, var_heu).with_verbosity(verbosity);
    let status = solver.maximize_with_interrupt(move || start.elapsed().gt(&to));

    let duration = start.elapsed();
    let best_value = solver
        .best_value()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "not found".to_owned());

    let lb = solver.best_lower_bound();
    let ub = solver.best_upper_bound();

    println!(
        "{:>30} | {:>15} | {:>8.2} | {:>8.2} | {:>15} | {:>15} | {:>15} | {:>5.4} | {:>15} | {:>15}",
        name,
        status,
        duration.as_secs_f32(),
        PEAK_ALLOC.peak_usage_as_mb(),
        best_value,
        lb,
        ub,
        gap(lb, ub),
        solver.get_explored(),
        solver.get_explored_dd(),
    );

    if let Some(solution) = solver.best_solution() {
        let listing = solution
            .iter()
            .map(|d| format!("x{}={}", d.var.id(), d.value))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", listing);
    }

    ub
}

pub fn resolution_header() {
    println!(
        "{:>30} | {:>15} | {:>8} | {:>8} | {:>15} | {:>15} | {:>15} | {:>5.4} | {:>15} | {:>15}",
        "NAME", "STATUS", "DURATION", "RAM_(MB)", "BEST-VAL", "LB", "UB", "GAP", "NODES B&B", "NODES DD"
    );
}
