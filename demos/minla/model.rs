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

//! This module contains the definition of the dynamic programming formulation
//! of the minimum linear arrangement. (Implementation of the `Problem` trait).

use std::ops::Not;

use bitset_fixed::BitSet;

use bbmdd::{BitSetIter, Decision, Problem, Variable};

use crate::{instance::MinlaInstance, state::State};

/// This is the structure encapsulating the arrangement problem. Positions are
/// filled from left to right; placing a vertex costs the total weight of the
/// edges crossing the boundary between the placed prefix and the rest of the
/// graph. The arrangement cost is to be minimized while the solver maximizes,
/// so every cost is negated.
#[derive(Debug, Clone)]
pub struct Minla {
    pub instance: MinlaInstance,
    pub initial: State,
}
impl Minla {
    pub fn new(inst: MinlaInstance) -> Self {
        let n = inst.nb_vertices;
        let state = State {
            must_place: BitSet::new(n).not(),
            maybe_place: None,
            cut: vec![0; n],
            depth: 0,
        };
        Self {
            instance: inst,
            initial: state,
        }
    }
}

impl Problem for Minla {
    type State = State;

    fn nb_variables(&self) -> usize {
        self.instance.nb_vertices
    }

    fn initial_state(&self) -> State {
        self.initial.clone()
    }

    fn initial_value(&self) -> isize {
        0
    }

    fn for_each_in_domain<F>(&self, var: Variable, state: &Self::State, mut f: F)
    where
        F: FnMut(Decision),
    {
        let mut complete_arrangement = self.nb_variables() - state.depth;

        for i in BitSetIter::new(&state.must_place) {
            complete_arrangement -= 1;
            f(Decision {
                var,
                value: i as isize,
            })
        }

        if complete_arrangement > 0 {
            if let Some(maybe_place) = &state.maybe_place {
                for i in BitSetIter::new(maybe_place) {
                    f(Decision {
                        var,
                        value: i as isize,
                    })
                }
            }
        }
    }

    fn transition(&self, state: &State, d: Decision) -> State {
        let d = d.value as usize;

        // if it is a true move
        let mut remaining = state.must_place.clone();
        remaining.set(d, false);
        // if it is a possible move
        let mut maybes = state.maybe_place.clone();
        if let Some(maybe) = maybes.as_mut() {
            maybe.set(d, false);
        }

        let mut cut = state.cut.clone();
        cut[d] = 0;

        for i in BitSetIter::new(&remaining) {
            cut[i] += self.instance.weights[(d, i)];
        }

        if let Some(maybe) = maybes.as_ref() {
            for i in BitSetIter::new(maybe) {
                cut[i] += self.instance.weights[(d, i)];
            }
        }

        State {
            must_place: remaining,
            maybe_place: maybes,
            cut,
            depth: state.depth + 1,
        }
    }

    fn transition_cost(&self, state: &State, d: Decision) -> isize {
        let d = d.value as usize;

        let mut cut = 0;
        let mut complete_arrangement = self.nb_variables() - (state.depth + 1);

        for i in BitSetIter::new(&state.must_place) {
            if i != d {
                cut += state.cut[i] + self.instance.weights[(d, i)];
                complete_arrangement -= 1;
            }
        }

        if complete_arrangement > 0 {
            if let Some(maybe) = state.maybe_place.as_ref() {
                let mut temp = vec![];
                for i in BitSetIter::new(maybe) {
                    if i != d {
                        temp.push(state.cut[i] + self.instance.weights[(d, i)]);
                    }
                }
                temp.sort_unstable();
                cut += temp.iter().take(complete_arrangement).sum::<isize>();
            }
        }

        // the arrangement cost is minimized but the solver works with a
        // maximization perspective, so the cost is negated
        -cut
    }

    fn estimate(&self, state: &State) -> isize {
        // every pending vertex but the next one placed keeps its tie to the
        // placed prefix on the cut for at least one more step
        let mut total = 0;
        let mut heaviest = 0;
        for i in BitSetIter::new(&state.must_place) {
            total += state.cut[i];
            heaviest = heaviest.max(state.cut[i]);
        }
        -(total - heaviest)
    }
}
