#![doc = include_str!("../readme.md")]
#![allow(dead_code)]

#[cfg(test)]
pub(crate) mod test_fixtures;

pub mod codec;
pub mod graph;
pub mod leap;
pub mod model;
pub mod route;
pub mod router;
pub mod search;
pub mod shard;
pub mod snap;
pub mod stitch;
pub mod world;

pub use graph::{RoadPoint, Segment, ShardId};
pub use model::VehicleType;
pub use route::Route;
pub use router::{Router, RouterError};
