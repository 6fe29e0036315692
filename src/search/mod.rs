//! Generic bidirectional A* over abstract vertices.
//!
//! The search knows nothing about roads: it sees a graph trait exposing
//! outgoing/ingoing edges and admissible bounds, and runs two waves with
//! consistent potentials until their queue tops prove optimality. The
//! same machinery warm-starts route adjustment after a deviation.

#[doc(hidden)]
pub mod astar;
#[doc(hidden)]
pub mod cancel;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod weight;

#[doc(inline)]
pub use astar::{
    adjust_route, find_path_bidirectional, Adjusted, Path, SearchError, SearchOptions,
    LEAP_PROGRESS_PERIOD, PROGRESS_PERIOD, QUEUE_SWITCH_PERIOD,
};
#[doc(inline)]
pub use cancel::{Cancellable, Deadline, NeverCancel};
#[doc(inline)]
pub use graph::{AStarGraph, Edge};
#[doc(inline)]
pub use weight::{RouteWeight, WEIGHT_EPSILON};
