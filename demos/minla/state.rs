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

//! This module contains the definition of the state used when solving a
//! minimum linear arrangement with decision diagrams.

use bitset_fixed::BitSet;

/// The state of a partial arrangement: the vertices that must still be given
/// a position, the ones that possibly remain (relaxed states only), and for
/// each of them the total weight of the edges tying it to the placed prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    /// The vertices that remain to place on every path to this state
    pub must_place: BitSet,
    /// The vertices that remain to place on some paths to this state only.
    /// It is `None` for an exact state.
    pub maybe_place: Option<BitSet>,
    /// For each pending vertex, the weight connecting it to the placed prefix
    pub cut: Vec<isize>,
    /// The number of positions that have been filled so far
    pub depth: usize,
}
