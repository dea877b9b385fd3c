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

//! This module contains everything that is necessary to parse a minimum
//! linear arrangement instance and turn it into structs usable in Rust.
//! Chances are high that this module will be of little to no interest to you.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    num::ParseIntError,
};

use bbmdd::Matrix;
use thiserror::Error;

/// The errors that can arise while reading an instance file
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed number: {0}")]
    ParseInt(#[from] ParseIntError),
    #[error("the file contains no {0}")]
    Missing(&'static str),
    #[error("vertex {0} is out of range")]
    VertexOutOfRange(usize),
}

/// This structure represents an instance of the minimum linear arrangement:
/// a weighted undirected graph whose vertices must be laid out on a line.
///
/// The file format is plain text: the first line gives the number of vertices
/// and the number of edges, and each subsequent line gives one edge as
/// `u v [weight]` (the weight defaults to one).
#[derive(Debug, Clone)]
pub struct MinlaInstance {
    /// The number of vertices in the graph
    pub nb_vertices: usize,
    /// The symmetric matrix of edge weights (0 when there is no edge)
    pub weights: Matrix<isize>,
}

impl MinlaInstance {
    /// Builds an instance straight from an edge list; this is how the tests
    /// create their fixtures.
    pub fn from_edges(nb_vertices: usize, edges: &[(usize, usize, isize)]) -> Self {
        let mut weights = Matrix::new_default(nb_vertices, nb_vertices, 0);
        for (u, v, w) in edges.iter().copied() {
            weights[(u, v)] += w;
            weights[(v, u)] += w;
        }
        Self {
            nb_vertices,
            weights,
        }
    }
}

impl TryFrom<File> for MinlaInstance {
    type Error = Error;

    fn try_from(file: File) -> Result<Self, Error> {
        Self::try_from(BufReader::new(file))
    }
}
impl<S: Read> TryFrom<BufReader<S>> for MinlaInstance {
    type Error = Error;

    fn try_from(buf: BufReader<S>) -> Result<Self, Error> {
        let mut lc = 0;
        let mut nb_vertices = 0;
        let mut weights = Matrix::new_default(0, 0, 0);

        for line in buf.lines() {
            let line = line?;
            let line = line.trim();

            // skip empty lines
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split(&[' ', ',', '\t']).filter(|s| !s.is_empty());

            // first line is the number of vertices (the edge count that may
            // follow it is ignored: edges are read until the file ends)
            if lc == 0 {
                nb_vertices = tokens
                    .next()
                    .ok_or(Error::Missing("vertex count"))?
                    .parse::<usize>()?;
                weights = Matrix::new_default(nb_vertices, nb_vertices, 0);
            } else {
                let u = tokens
                    .next()
                    .ok_or(Error::Missing("edge endpoint"))?
                    .parse::<usize>()?;
                let v = tokens
                    .next()
                    .ok_or(Error::Missing("edge endpoint"))?
                    .parse::<usize>()?;
                let w = match tokens.next() {
                    Some(w) => w.parse::<isize>()?,
                    None => 1,
                };

                if u >= nb_vertices {
                    return Err(Error::VertexOutOfRange(u));
                }
                if v >= nb_vertices {
                    return Err(Error::VertexOutOfRange(v));
                }

                weights[(u, v)] += w;
                weights[(v, u)] += w;
            }

            lc += 1;
        }

        if lc == 0 {
            return Err(Error::Missing("vertex count"));
        }

        Ok(MinlaInstance {
            nb_vertices,
            weights,
        })
    }
}
