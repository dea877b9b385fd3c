use std::{collections::hash_map::Entry, hash::Hash, sync::Arc};

use rustc_hash::FxHashMap;

use crate::{
    prelude::{
        CompilationInput, CompilationType, Decision, Problem, Relaxation, StateRanking,
        VariableHeuristic,
    },
    DecisionDiagram, SubProblem,
};

use super::node_flags::NodeFlags;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
struct NodeId(usize);

#[derive(Debug, Clone, Copy)]
struct EdgeId(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    state: Arc<T>,
    value: isize,
    best: Option<EdgeId>,
    inbound: Option<EdgeId>,
    //
    depth: usize,
    //
    flags: NodeFlags,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: NodeId,
    decision: Decision,
    cost: isize,
    next: Option<EdgeId>,
}

/// A layered decision diagram compiled one layer at a time. Each layer is
/// keyed by state so that equal states collapse into a single node (max
/// incoming value, exactness of all incoming paths). When a layer outgrows
/// the width bound, a restricted compilation drops its least promising nodes
/// and a relaxed compilation merges them into a single relaxed node. The
/// deepest layer built before the first merge is remembered as the exact
/// cutset.
#[derive(Debug, Clone)]
pub struct LayeredMdd<T>
where
    T: Eq + PartialEq + Hash + Clone,
{
    root_pa: Vec<Decision>,
    //
    nodes: Vec<Node<T>>,
    edges: Vec<Edge>,
    //
    prev_l: Vec<NodeId>,
    next_l: FxHashMap<Arc<T>, NodeId>,
    cutset: Vec<NodeId>,
    //
    best_n: Option<NodeId>,
    //
    exact: bool,
    approximate: bool,
    //
    explored: usize,
}
impl<T> Default for LayeredMdd<T>
where
    T: Eq + PartialEq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
impl<T> DecisionDiagram for LayeredMdd<T>
where
    T: Eq + PartialEq + Hash + Clone,
{
    type State = T;

    fn compile<P, R, O, V>(&mut self, input: &CompilationInput<P, R, O, V>)
    where
        P: Problem<State = Self::State>,
        R: Relaxation<State = P::State>,
        O: StateRanking<State = P::State>,
        V: VariableHeuristic<P::State>,
    {
        self._compile(input)
    }

    fn is_exact(&self) -> bool {
        self.exact
    }

    fn best_value(&self) -> Option<isize> {
        self._best_value()
    }

    fn best_solution(&self) -> Option<Vec<Decision>> {
        self._best_solution()
    }

    fn drain_cutset<F>(&mut self, func: F)
    where
        F: FnMut(SubProblem<T>),
    {
        self._drain_cutset(func)
    }
}
impl<T> LayeredMdd<T>
where
    T: Eq + PartialEq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            root_pa: vec![],
            nodes: vec![],
            edges: vec![],
            prev_l: Default::default(),
            next_l: Default::default(),
            cutset: vec![],
            best_n: None,
            exact: true,
            approximate: false,
            explored: 0,
        }
    }
    fn clear(&mut self) {
        self.root_pa.clear();
        self.nodes.clear();
        self.edges.clear();
        self.prev_l.clear();
        self.next_l.clear();
        self.cutset.clear();
        self.best_n = None;
        self.exact = true;
        self.approximate = false;
        self.explored = 0;
    }

    fn _is_exact(&self, comp_type: CompilationType) -> bool {
        !self.approximate
            || (comp_type == CompilationType::Relaxed && self.has_exact_best_path(self.best_n))
    }

    fn has_exact_best_path(&self, node: Option<NodeId>) -> bool {
        if let Some(node_id) = node {
            let n = &self.nodes[node_id.0];
            if n.flags.is_exact() {
                true
            } else {
                !n.flags.is_relaxed()
                    && self.has_exact_best_path(n.best.map(|e| self.edges[e.0].from))
            }
        } else {
            true
        }
    }

    fn _best_value(&self) -> Option<isize> {
        self.best_n.map(|id| self.nodes[id.0].value)
    }

    fn _best_solution(&self) -> Option<Vec<Decision>> {
        self.best_n.map(|id| self._best_path(id))
    }

    fn _best_path(&self, id: NodeId) -> Vec<Decision> {
        Self::_best_path_partial_borrow(id, &self.root_pa, &self.nodes, &self.edges)
    }

    fn _best_path_partial_borrow(
        id: NodeId,
        root_pa: &[Decision],
        nodes: &[Node<T>],
        edges: &[Edge],
    ) -> Vec<Decision> {
        let mut sol = root_pa.to_owned();
        let mut edge_id = nodes[id.0].best;
        while let Some(eid) = edge_id {
            let edge = edges[eid.0];
            sol.push(edge.decision);
            edge_id = nodes[edge.from.0].best;
        }
        sol
    }

    /// Every cutset node inherits the terminal value of the diagram as its
    /// upper bound: that value bounds any completion below the diagram root,
    /// hence below any cutset node as well.
    fn _drain_cutset<F>(&mut self, mut func: F)
    where
        F: FnMut(SubProblem<T>),
    {
        if let Some(best_value) = self._best_value() {
            for node_id in self.cutset.drain(..) {
                let node = &self.nodes[node_id.0];

                func(SubProblem {
                    state: node.state.clone(),
                    value: node.value,
                    path: Self::_best_path_partial_borrow(
                        node_id,
                        &self.root_pa,
                        &self.nodes,
                        &self.edges,
                    ),
                    ub: best_value,
                    depth: node.depth,
                })
            }
        }
    }

    pub fn get_explored(&self) -> usize {
        self.explored
    }

    fn _compile<P, R, O, V>(&mut self, input: &CompilationInput<P, R, O, V>)
    where
        P: Problem<State = T>,
        R: Relaxation<State = P::State>,
        O: StateRanking<State = P::State>,
        V: VariableHeuristic<P::State>,
    {
        self.clear();

        let mut curr_l = vec![];

        input
            .residual
            .path
            .iter()
            .copied()
            .for_each(|x| self.root_pa.push(x));

        let root_depth = input.residual.depth;

        let root_s = input.residual.state.clone();
        let root_v = input.residual.value;
        let root_n = Node {
            state: root_s.clone(),
            value: root_v,
            best: None,
            inbound: None,
            depth: root_depth,
            flags: NodeFlags::new_exact(),
        };

        self.nodes.push(root_n);
        self.next_l.insert(root_s, NodeId(0));

        let mut depth = root_depth;

        while let Some(var) = input
            .var_heu
            .next_var(depth, &mut self.next_l.keys().map(|s| s.as_ref()))
        {
            self.prev_l.clear();
            for node_id in curr_l.drain(..) {
                self.prev_l.push(node_id);
            }
            for (_, node_id) in self.next_l.drain() {
                curr_l.push(node_id);
            }

            if curr_l.is_empty() {
                // dead end: the subproblem admits no completion
                return;
            }

            match input.comp_type {
                CompilationType::Exact => { /* do nothing: you want to explore the complete DD */ }
                CompilationType::Restricted => {
                    if curr_l.len() > input.max_width {
                        self.restrict(input, &mut curr_l)
                    }
                }
                CompilationType::Relaxed => {
                    // never merge the first layer below the root: the cutset
                    // must lie strictly below it for the search to progress
                    if curr_l.len() > input.max_width && depth > root_depth + 1 {
                        self.relax(input, &mut curr_l)
                    }
                }
            }

            for node_id in curr_l.iter() {
                let state = self.nodes[node_id.0].state.clone();
                let rub = input.problem.estimate(state.as_ref());
                let ub = rub.saturating_add(self.nodes[node_id.0].value);

                if ub > input.best_lb {
                    let mut branched = 0_usize;
                    input
                        .problem
                        .for_each_in_domain(var, state.as_ref(), |decision| {
                            branched += 1;
                            self.branch_on(*node_id, decision, input.problem)
                        });

                    self.explored += 1;

                    if branched == 0 {
                        // empty domain: the node carries over unchanged
                        self.pass_through(*node_id, state, depth + 1);
                    }
                }
            }

            depth += 1;
        }

        //
        self.best_n = self
            .next_l
            .values()
            .copied()
            .max_by_key(|id| self.nodes[id.0].value);
        self.exact = self._is_exact(input.comp_type);
    }

    fn branch_on<P: Problem<State = T>>(
        &mut self,
        from_id: NodeId,
        decision: Decision,
        problem: &P,
    ) {
        let state = self.nodes[from_id.0].state.as_ref();
        let next_state = Arc::new(problem.transition(state, decision));
        let cost = problem.transition_cost(state, decision);

        match self.next_l.entry(next_state.clone()) {
            Entry::Vacant(e) => {
                let node_id = NodeId(self.nodes.len());
                let edge_id = EdgeId(self.edges.len());

                self.edges.push(Edge {
                    from: from_id,
                    decision,
                    cost,
                    next: None,
                });
                self.nodes.push(Node {
                    state: next_state,
                    value: self.nodes[from_id.0].value.saturating_add(cost),
                    best: Some(edge_id),
                    inbound: Some(edge_id),
                    //
                    depth: self.nodes[from_id.0].depth + 1,
                    //
                    flags: self.nodes[from_id.0].flags,
                });

                e.insert(node_id);
            }
            Entry::Occupied(e) => {
                let node_id = *e.get();
                let exact = self.nodes[from_id.0].flags.is_exact();
                let value = self.nodes[from_id.0].value.saturating_add(cost);
                let node = &mut self.nodes[node_id.0];

                let edge_id = EdgeId(self.edges.len());
                self.edges.push(Edge {
                    from: from_id,
                    decision,
                    cost,
                    next: node.inbound,
                });

                node.inbound = Some(edge_id);
                // strictly greater: equal values keep the earlier path
                if value > node.value {
                    node.value = value;
                    node.best = Some(edge_id);
                }
                // the node is exact iff every path reaching it is
                if !exact {
                    node.flags.set_exact(false);
                }
            }
        }
    }

    /// Carries a node whose domain was empty into the next layer, merging it
    /// with an equal state if one was produced by a sibling. The node keeps
    /// its state and value but now lives at the depth of the layer it was
    /// carried into, exactly as if it had been branched there.
    fn pass_through(&mut self, node_id: NodeId, state: Arc<T>, depth: usize) {
        match self.next_l.entry(state) {
            Entry::Vacant(e) => {
                self.nodes[node_id.0].depth = depth;
                e.insert(node_id);
            }
            Entry::Occupied(e) => {
                let other = *e.get();
                let value = self.nodes[node_id.0].value;
                let best = self.nodes[node_id.0].best;
                let exact = self.nodes[node_id.0].flags.is_exact();
                let node = &mut self.nodes[other.0];
                node.depth = depth;
                if value > node.value {
                    node.value = value;
                    node.best = best;
                }
                if !exact {
                    node.flags.set_exact(false);
                }
            }
        }
    }

    fn restrict<P, R, O, V>(
        &mut self,
        input: &CompilationInput<P, R, O, V>,
        curr_l: &mut Vec<NodeId>,
    ) where
        P: Problem<State = T>,
        R: Relaxation<State = P::State>,
        O: StateRanking<State = P::State>,
        V: VariableHeuristic<P::State>,
    {
        assert!(
            input.max_width >= 1,
            "the width heuristic must allow at least one node per layer"
        );
        self.approximate = true;
        curr_l.sort_unstable_by(|a, b| {
            self.nodes[a.0]
                .value
                .cmp(&self.nodes[b.0].value)
                .then_with(|| {
                    input
                        .ranking
                        .compare(self.nodes[a.0].state.as_ref(), self.nodes[b.0].state.as_ref())
                })
                .reverse()
        }); // reverse because greater means more likely to be kept
        curr_l.truncate(input.max_width);
    }

    fn relax<P, R, O, V>(
        &mut self,
        input: &CompilationInput<P, R, O, V>,
        curr_l: &mut Vec<NodeId>,
    ) where
        P: Problem<State = T>,
        R: Relaxation<State = P::State>,
        O: StateRanking<State = P::State>,
        V: VariableHeuristic<P::State>,
    {
        assert!(
            input.max_width >= 1,
            "the width heuristic must allow at least one node per layer"
        );
        if !self.approximate {
            // this is the first approximation of the compilation: the layer
            // built just before is the deepest one to be fully exact
            for id in self.prev_l.iter() {
                self.cutset.push(*id);
            }
        }

        self.approximate = true;
        curr_l.sort_unstable_by(|a, b| {
            self.nodes[a.0]
                .value
                .cmp(&self.nodes[b.0].value)
                .then_with(|| {
                    input
                        .ranking
                        .compare(self.nodes[a.0].state.as_ref(), self.nodes[b.0].state.as_ref())
                })
                .reverse()
        }); // reverse because greater means more likely to be kept

        //--
        let (keep, merge) = curr_l.split_at_mut(input.max_width - 1);
        let merged = Arc::new(
            input
                .relaxation
                .merge(&mut merge.iter().map(|node_id| self.nodes[node_id.0].state.as_ref())),
        );

        let recycled = keep
            .iter()
            .find(|node_id| self.nodes[node_id.0].state.eq(&merged))
            .copied();

        let merged_id = recycled.unwrap_or_else(|| {
            let node_id = NodeId(self.nodes.len());
            self.nodes.push(Node {
                state: merged.clone(),
                value: isize::MIN,
                best: None,    // yet
                inbound: None, // yet
                //
                depth: self.nodes[merge[0].0].depth,
                //
                flags: NodeFlags::new_relaxed(),
            });
            node_id
        });

        self.nodes[merged_id.0].flags.set_relaxed(true);

        for drop_id in merge {
            let mut edge_id = self.nodes[drop_id.0].inbound;
            while let Some(eid) = edge_id {
                let edge = self.edges[eid.0];
                let src = self.nodes[edge.from.0].state.as_ref();

                let rcost = input.relaxation.relax(
                    src,
                    self.nodes[drop_id.0].state.as_ref(),
                    merged.as_ref(),
                    edge.decision,
                    edge.cost,
                );

                let new_eid = EdgeId(self.edges.len());
                let new_edge = Edge {
                    from: edge.from,
                    decision: edge.decision,
                    cost: rcost,
                    next: self.nodes[merged_id.0].inbound,
                };
                self.edges.push(new_edge);
                self.nodes[merged_id.0].inbound = Some(new_eid);

                let new_value = self.nodes[edge.from.0].value.saturating_add(rcost);
                if new_value >= self.nodes[merged_id.0].value {
                    self.nodes[merged_id.0].best = Some(new_eid);
                    self.nodes[merged_id.0].value = new_value;
                }

                edge_id = edge.next;
            }
        }

        if recycled.is_some() {
            curr_l.truncate(input.max_width);
        } else {
            curr_l.truncate(input.max_width - 1);
            curr_l.push(merged_id);
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
