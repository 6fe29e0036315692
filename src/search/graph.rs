use std::fmt::Debug;
use std::hash::Hash;

use crate::search::RouteWeight;

/// One weighted edge produced during expansion.
#[derive(Clone, Debug)]
pub struct Edge<V> {
    pub target: V,
    pub weight: RouteWeight,
}

impl<V> Edge<V> {
    pub fn new(target: V, weight: RouteWeight) -> Self {
        Edge { target, weight }
    }
}

/// What the search needs from a graph: edge expansion in both directions
/// and admissible potentials toward either end of the query.
///
/// Expansion takes `&mut self` because real graphs lease shards and fill
/// geometry caches while expanding.
pub trait AStarGraph {
    type Vertex: Clone + Eq + Hash + Debug;

    /// Edges leaving `from` (`outgoing`) or arriving at it.
    fn edges(&mut self, from: &Self::Vertex, outgoing: bool, out: &mut Vec<Edge<Self::Vertex>>);

    /// Lower bound in seconds from `vertex` to the query's finish
    /// (`to_finish`) or from its start. Zero is always admissible.
    fn heuristic(&mut self, vertex: &Self::Vertex, to_finish: bool) -> f64;
}
