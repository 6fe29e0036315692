use std::fmt::{Display, Formatter};

use crate::codec::CodecError;
use crate::graph::ShardId;

/// Failures of the cross-shard layer. `NoSection` is expected on shards
/// without border data; callers degrade to a detail mode instead of
/// failing the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchError {
    NoSection(ShardId),
    Corrupt(ShardId, CodecError),
}

impl Display for StitchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StitchError::NoSection(shard) => {
                write!(f, "shard {shard} has no cross-shard section")
            }
            StitchError::Corrupt(shard, err) => {
                write!(f, "cross-shard section of shard {shard} is corrupt: {err}")
            }
        }
    }
}

impl std::error::Error for StitchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StitchError::Corrupt(_, err) => Some(err),
            StitchError::NoSection(_) => None,
        }
    }
}
