//! Two-phase leap routing for continental distances: a coarse search
//! over shard entry/exit transitions, diverse candidate collection,
//! first/last-hop probing, then hop-by-hop dense resolution.

#[doc(hidden)]
pub mod candidates;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod resolve;

#[doc(inline)]
pub use candidates::{
    bucket_candidates, collect_candidates, CANDIDATE_TIME_BUDGET, MAX_DISTINCT_ENDPOINTS,
    MAX_PER_BUCKET,
};
#[doc(inline)]
pub use graph::{LeapBans, LeapsGraph};
#[doc(inline)]
pub use resolve::{collapse_reverse_loops, pick_candidate, resolve_leaps, route_with_leaps};
