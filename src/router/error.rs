use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::search::SearchError;
use crate::shard::ShardError;

/// Why a route calculation failed.
#[derive(Debug)]
pub enum RouterError {
    /// The first checkpoint has no admissible snap within the largest
    /// search radius.
    StartPointNotFound,
    /// The last checkpoint has no admissible snap.
    EndPointNotFound,
    /// A via checkpoint has no admissible snap.
    IntermediatePointNotFound,
    /// The search exhausted the graph without a path.
    RouteNotFound,
    /// A checkpoint falls outside every loaded shard.
    NeedMoreMaps,
    /// A broken invariant, never the caller's fault.
    InternalError(String),
    Cancelled,
    /// A path was found but could not be turned into a presentable
    /// route. Fatal; never retried.
    RouteReconstructionError,
}

impl Display for RouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::StartPointNotFound => write!(f, "no road near the start point"),
            RouterError::EndPointNotFound => write!(f, "no road near the end point"),
            RouterError::IntermediatePointNotFound => {
                write!(f, "no road near an intermediate point")
            }
            RouterError::RouteNotFound => write!(f, "no route between the checkpoints"),
            RouterError::NeedMoreMaps => write!(f, "a checkpoint is outside the loaded shards"),
            RouterError::InternalError(what) => write!(f, "internal error: {what}"),
            RouterError::Cancelled => write!(f, "route calculation cancelled"),
            RouterError::RouteReconstructionError => {
                write!(f, "found path could not be reconstructed")
            }
        }
    }
}

impl Error for RouterError {}

impl From<ShardError> for RouterError {
    fn from(err: ShardError) -> Self {
        match err {
            ShardError::MissingShard(_) => RouterError::NeedMoreMaps,
            other => RouterError::InternalError(other.to_string()),
        }
    }
}

impl RouterError {
    /// Maps a search failure onto the route-level kind.
    pub fn from_search(err: SearchError) -> Self {
        match err {
            SearchError::Cancelled => RouterError::Cancelled,
            SearchError::NoPath => RouterError::RouteNotFound,
        }
    }
}
