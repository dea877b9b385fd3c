use crate::{SubProblem, Variable, VariableHeuristic, WidthHeuristic};

/// Imposes the same maximum layer width on every compiled diagram.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub usize);
impl<T> WidthHeuristic<T> for Fixed {
    fn max_width(&self, _sub: &SubProblem<T>) -> usize {
        self.0
    }
}

/// Grants each diagram as many nodes per layer as there are variables left
/// to assign below its root. This is the policy used when the embedding does
/// not impose a width.
#[derive(Debug, Clone, Copy)]
pub struct NbUnassigned {
    pub nb_vars: usize,
}
impl<T> WidthHeuristic<T> for NbUnassigned {
    fn max_width(&self, sub: &SubProblem<T>) -> usize {
        self.nb_vars - sub.depth
    }
}

/// Branches on the variables in their natural order: x0 first, then x1, ...
#[derive(Debug, Clone, Copy)]
pub struct NaturalOrder {
    pub nb_vars: usize,
}
impl<T> VariableHeuristic<T> for NaturalOrder {
    fn next_var(
        &self,
        depth: usize,
        _next_layer: &mut dyn Iterator<Item = &T>,
    ) -> Option<Variable> {
        if depth < self.nb_vars {
            Some(Variable(depth))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test_heuristics {
    use std::sync::Arc;

    use crate::{Fixed, NaturalOrder, NbUnassigned, SubProblem, Variable, VariableHeuristic, WidthHeuristic};

    fn sub(depth: usize) -> SubProblem<usize> {
        SubProblem {
            state: Arc::new(0),
            value: 0,
            path: vec![],
            ub: isize::MAX,
            depth,
        }
    }

    #[test]
    fn fixed_ignores_the_subproblem() {
        assert_eq!(100, Fixed(100).max_width(&sub(0)));
        assert_eq!(100, Fixed(100).max_width(&sub(7)));
    }

    #[test]
    fn nb_unassigned_shrinks_with_depth() {
        let width = NbUnassigned { nb_vars: 5 };
        assert_eq!(5, width.max_width(&sub(0)));
        assert_eq!(2, width.max_width(&sub(3)));
        assert_eq!(1, width.max_width(&sub(4)));
    }

    #[test]
    fn natural_order_walks_the_variables_then_stops() {
        let var_heu = NaturalOrder { nb_vars: 3 };
        let states: Vec<usize> = vec![];
        assert_eq!(Some(Variable(0)), var_heu.next_var(0, &mut states.iter()));
        assert_eq!(Some(Variable(2)), var_heu.next_var(2, &mut states.iter()));
        assert_eq!(None, var_heu.next_var(3, &mut states.iter()));
    }
}
