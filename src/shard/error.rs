use std::fmt::{Display, Formatter};

use crate::codec::CodecError;
use crate::graph::ShardId;
use crate::shard::Section;

/// Failures while materialising a shard into the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShardError {
    /// The source has no shard with this id.
    MissingShard(ShardId),
    /// The shard exists but lacks a required section.
    MissingSection(ShardId, Section),
    /// A section was present but unreadable.
    Corrupt(ShardId, CodecError),
}

impl Display for ShardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShardError::MissingShard(shard) => write!(f, "shard {shard} is not available"),
            ShardError::MissingSection(shard, section) => {
                write!(f, "shard {shard} has no {section} section")
            }
            ShardError::Corrupt(shard, err) => {
                write!(f, "shard {shard} section is corrupt: {err}")
            }
        }
    }
}

impl std::error::Error for ShardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShardError::Corrupt(_, err) => Some(err),
            _ => None,
        }
    }
}
