use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::hash::Hash;

use log::{trace, warn};
use rustc_hash::FxHashMap;

use crate::search::{AStarGraph, Cancellable, Edge, NeverCancel, RouteWeight, WEIGHT_EPSILON};

/// Default cadence, in settled vertices, of the progress visitor and the
/// cancellation poll.
pub const PROGRESS_PERIOD: u32 = 128;
/// Denser cadence used while collecting leap candidates.
pub const LEAP_PROGRESS_PERIOD: u32 = 40;
/// The waves reconsider which queue to drain every this many steps.
pub const QUEUE_SWITCH_PERIOD: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    Cancelled,
    NoPath,
}

/// A found path in expansion order, start first.
#[derive(Debug, Clone, PartialEq)]
pub struct Path<V> {
    pub vertices: Vec<V>,
    pub weight: RouteWeight,
}

pub struct SearchOptions<'a, V> {
    pub cancel: &'a dyn Cancellable,
    pub on_visit: Option<&'a mut dyn FnMut(&V)>,
    /// Settled vertices between progress reports; cancellation is polled
    /// at the same cadence.
    pub progress_period: u32,
    /// Accept larger negative reduced weights instead of flagging them.
    /// Precomputed leap weights are allowed to undershoot the heuristic.
    pub tolerate_bad_reduced_weight: bool,
}

impl<'a, V> SearchOptions<'a, V> {
    pub fn new(cancel: &'a dyn Cancellable) -> Self {
        SearchOptions {
            cancel,
            on_visit: None,
            progress_period: PROGRESS_PERIOD,
            tolerate_bad_reduced_weight: false,
        }
    }
}

impl<V> Default for SearchOptions<'static, V> {
    fn default() -> Self {
        SearchOptions::new(&NeverCancel)
    }
}

struct State<V> {
    weight: RouteWeight,
    vertex: V,
}

impl<V> PartialEq for State<V> {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl<V> Eq for State<V> {}

impl<V> Ord for State<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight.cmp(&other.weight)
    }
}

impl<V> PartialOrd for State<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Wave<V> {
    /// Expands outgoing edges (forward wave) or ingoing ones.
    outgoing: bool,
    /// Sign applied to the shared potential; zero disables potentials
    /// and degrades the wave to Dijkstra.
    sign: f64,
    queue: BinaryHeap<Reverse<State<V>>>,
    best: FxHashMap<V, RouteWeight>,
    parent: FxHashMap<V, V>,
}

impl<V: Clone + Eq + Hash> Wave<V> {
    fn new(outgoing: bool, sign: f64, origin: V) -> Self {
        let mut wave = Wave {
            outgoing,
            sign,
            queue: BinaryHeap::new(),
            best: FxHashMap::default(),
            parent: FxHashMap::default(),
        };
        wave.best.insert(origin.clone(), RouteWeight::ZERO);
        wave.queue.push(Reverse(State {
            weight: RouteWeight::ZERO,
            vertex: origin,
        }));
        wave
    }

    fn top(&self) -> Option<RouteWeight> {
        self.queue.peek().map(|Reverse(state)| state.weight)
    }
}

/// Memoised consistent potential: half the difference of the two
/// admissible bounds. Forward waves add it with a positive sign,
/// backward waves negate it.
fn potential<G: AStarGraph>(
    graph: &mut G,
    cache: &mut FxHashMap<G::Vertex, f64>,
    vertex: &G::Vertex,
) -> f64 {
    if let Some(&p) = cache.get(vertex) {
        return p;
    }
    let p = 0.5 * (graph.heuristic(vertex, true) - graph.heuristic(vertex, false));
    cache.insert(vertex.clone(), p);
    p
}

/// Settles one vertex of `wave` and relaxes its edges. Returns the
/// settled vertex and its reduced distance, or `None` for a stale entry.
fn step<G: AStarGraph>(
    graph: &mut G,
    wave: &mut Wave<G::Vertex>,
    potentials: &mut FxHashMap<G::Vertex, f64>,
    edges: &mut Vec<Edge<G::Vertex>>,
    tolerate_bad_reduced_weight: bool,
) -> Option<(G::Vertex, RouteWeight)> {
    let Reverse(State { weight, vertex }) = wave.queue.pop()?;
    if wave.best.get(&vertex).is_some_and(|&b| weight > b) {
        return None;
    }

    let p_from = if wave.sign == 0.0 {
        0.0
    } else {
        wave.sign * potential(graph, potentials, &vertex)
    };

    graph.edges(&vertex, wave.outgoing, edges);
    for edge in edges.drain(..) {
        let p_to = if wave.sign == 0.0 {
            0.0
        } else {
            wave.sign * potential(graph, potentials, &edge.target)
        };
        let mut reduced = edge.weight.offset(p_to - p_from);
        if reduced.seconds() < 0.0 {
            if reduced.seconds() < -WEIGHT_EPSILON && !tolerate_bad_reduced_weight {
                warn!(
                    "negative reduced weight {} on edge to {:?}",
                    reduced.seconds(),
                    edge.target
                );
            }
            reduced = reduced.clamped_to_zero();
        }

        let next = weight + reduced;
        if wave.best.get(&edge.target).is_none_or(|&b| next < b) {
            wave.best.insert(edge.target.clone(), next);
            wave.parent.insert(edge.target.clone(), vertex.clone());
            wave.queue.push(Reverse(State {
                weight: next,
                vertex: edge.target,
            }));
        }
    }

    Some((vertex, weight))
}

/// Bidirectional A* with consistent potentials.
///
/// Both waves settle vertices on reduced weights; a candidate route is
/// registered whenever one wave settles a vertex the other has already
/// labelled, and the search stops once the queue tops prove no better
/// meeting point exists.
pub fn find_path_bidirectional<G: AStarGraph>(
    graph: &mut G,
    start: G::Vertex,
    finish: G::Vertex,
    mut options: SearchOptions<'_, G::Vertex>,
) -> Result<Path<G::Vertex>, SearchError> {
    if start == finish {
        return Ok(Path {
            vertices: vec![start],
            weight: RouteWeight::ZERO,
        });
    }

    let mut potentials = FxHashMap::default();
    // Reduced sums miss a constant: p_f(start) + p_r(finish).
    let correction =
        potential(graph, &mut potentials, &start) - potential(graph, &mut potentials, &finish);

    let mut fwd = Wave::new(true, 1.0, start.clone());
    let mut bwd = Wave::new(false, -1.0, finish.clone());
    let mut edges = Vec::new();

    let mut best: Option<(RouteWeight, G::Vertex)> = None;
    let mut steps = 0u32;
    let mut use_forward = true;

    while !fwd.queue.is_empty() && !bwd.queue.is_empty() {
        if steps % options.progress_period == 0 && options.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if steps % QUEUE_SWITCH_PERIOD == 0 {
            use_forward = match (fwd.top(), bwd.top()) {
                (Some(f), Some(b)) => f <= b,
                (f, _) => f.is_some(),
            };
        }
        steps += 1;

        let (wave, other) = if use_forward {
            (&mut fwd, &bwd)
        } else {
            (&mut bwd, &fwd)
        };
        let Some((vertex, weight)) = step(
            graph,
            wave,
            &mut potentials,
            &mut edges,
            options.tolerate_bad_reduced_weight,
        ) else {
            continue;
        };

        if let Some(&other_weight) = other.best.get(&vertex) {
            let sum = weight + other_weight;
            if best.as_ref().is_none_or(|(b, _)| sum < *b) {
                best = Some((sum, vertex.clone()));
            }
        }

        if steps % options.progress_period == 0 {
            if let Some(on_visit) = options.on_visit.as_mut() {
                on_visit(&vertex);
            }
        }

        if let (Some((best_sum, _)), Some(ft), Some(bt)) = (&best, fwd.top(), bwd.top()) {
            if ft + bt >= *best_sum {
                break;
            }
        }
    }

    let Some((sum, meeting)) = best else {
        trace!("no path after {steps} settled vertices");
        return Err(SearchError::NoPath);
    };

    let mut vertices = vec![meeting.clone()];
    let mut cursor = meeting.clone();
    while let Some(prev) = fwd.parent.get(&cursor) {
        vertices.push(prev.clone());
        cursor = prev.clone();
    }
    vertices.reverse();
    cursor = meeting;
    while let Some(next) = bwd.parent.get(&cursor) {
        vertices.push(next.clone());
        cursor = next.clone();
    }

    trace!("path of {} vertices after {steps} settled", vertices.len());
    Ok(Path {
        vertices,
        weight: sum.offset(correction),
    })
}

/// A rejoin found by [`adjust_route`]: the fresh prefix ends at a vertex
/// of the previous route.
#[derive(Debug, Clone)]
pub struct Adjusted<V> {
    pub path: Path<V>,
    pub meeting: V,
}

/// Forward-only search from a new position toward any vertex of the
/// previous route. `remaining` maps old-route vertices to the weight
/// still ahead of them; the best total of fresh prefix plus remainder
/// wins.
pub fn adjust_route<G: AStarGraph>(
    graph: &mut G,
    start: G::Vertex,
    remaining: &FxHashMap<G::Vertex, RouteWeight>,
    mut options: SearchOptions<'_, G::Vertex>,
) -> Result<Adjusted<G::Vertex>, SearchError> {
    let mut wave = Wave::new(true, 0.0, start);
    let mut potentials = FxHashMap::default();
    let mut edges = Vec::new();

    let mut best: Option<(RouteWeight, G::Vertex)> = None;
    let mut steps = 0u32;

    while let Some(top) = wave.top() {
        if steps % options.progress_period == 0 && options.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        steps += 1;

        // The remainder is nonnegative, so nothing past the best total
        // can improve it.
        if best.as_ref().is_some_and(|(b, _)| top >= *b) {
            break;
        }

        let Some((vertex, weight)) =
            step(graph, &mut wave, &mut potentials, &mut edges, true)
        else {
            continue;
        };

        if let Some(&rest) = remaining.get(&vertex) {
            let total = weight + rest;
            if best.as_ref().is_none_or(|(b, _)| total < *b) {
                best = Some((total, vertex.clone()));
            }
        }

        if steps % options.progress_period == 0 {
            if let Some(on_visit) = options.on_visit.as_mut() {
                on_visit(&vertex);
            }
        }
    }

    let Some((_, meeting)) = best else {
        return Err(SearchError::NoPath);
    };

    let weight = wave.best.get(&meeting).copied().unwrap_or(RouteWeight::ZERO);
    let mut vertices = vec![meeting.clone()];
    let mut cursor = meeting.clone();
    while let Some(prev) = wave.parent.get(&cursor) {
        vertices.push(prev.clone());
        cursor = prev.clone();
    }
    vertices.reverse();

    Ok(Adjusted {
        path: Path { vertices, weight },
        meeting,
    })
}
