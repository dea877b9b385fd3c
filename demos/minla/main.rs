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

//! This binary solves minimum linear arrangement instances with the
//! branch-and-bound decision diagram solver.

use std::{fs::File, path::Path, time::Duration};

use anyhow::Context;
use structopt::StructOpt;

use bbmdd::runner::{resolution_header, solve_timeout, Args};

use heuristics::MinlaRanking;
use instance::MinlaInstance;
use model::Minla;
use relax::MinlaRelax;

mod heuristics;
mod instance;
mod model;
mod relax;
mod state;

#[cfg(test)]
mod tests;

fn main() -> anyhow::Result<()> {
    let args = Args::from_args();

    match args {
        Args::Solve {
            file,
            width,
            timeout,
            verbosity,
        } => run_resolution(file, width, timeout, verbosity),
        Args::PrintHeader => {
            resolution_header();
            Ok(())
        }
    }
}

fn run_resolution(
    file: String,
    width: Option<usize>,
    timeout: usize,
    verbosity: u8,
) -> anyhow::Result<()> {
    let path = Path::new(&file);
    let name = path
        .file_stem()
        .map(|s| s.to_str().unwrap_or("-- unknown --"))
        .unwrap_or("-- unknown --")
        .to_owned();

    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let instance =
        MinlaInstance::try_from(file).with_context(|| format!("cannot parse {}", path.display()))?;
    let model = Minla::new(instance);
    let relax = MinlaRelax::new(&model);
    let ranking = MinlaRanking;

    let name: &'static str = Box::leak(name.into_boxed_str());
    let timeout = Duration::from_secs(timeout as u64);

    let _ub = solve_timeout(name, timeout, width, &model, &relax, &ranking, verbosity);

    Ok(())
}
