use geo::Point;
use strum::{Display, EnumIter};

use crate::graph::{GeometryProvider, ShardId};

/// Named binary sections a shard may carry. A shard without a section
/// simply lacks the corresponding capability.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter)]
pub enum Section {
    /// Joint layout of the routing graph.
    Routing,
    /// Border transitions and their precomputed in-shard weights.
    CrossShard,
    RoadAccess,
    Restrictions,
    Cameras,
    /// Present when the shard carries public-transport data.
    Transit,
}

///// Everything the engine asks of the outside world: shard lookup and
/// discovery plus section bytes and raw feature geometry.
///
/// Implementations are expected to be cheap to query repeatedly; the
/// engine caches decoded graphs, not raw bytes.
pub trait ShardSource: GeometryProvider {
    /// Whether a shard with this id is available at all.
    fn contains(&self, shard: ShardId) -> bool;

    /// The shard covering a coordinate, if any is available.
    fn shard_at(&self, point: Point<f64>) -> Option<ShardId>;

    /// Human-readable shard name for diagnostics.
    fn shard_name(&self, shard: ShardId) -> String;

    /// Shards adjacent to `shard`, used to walk border transitions.
    fn neighbors(&self, shard: ShardId) -> Vec<ShardId>;

    fn read_section(&self, shard: ShardId, section: Section) -> Option<Vec<u8>>;

    fn has_section(&self, shard: ShardId, section: Section) -> bool {
        self.read_section(shard, section).is_some()
    }
}
