//! Graph primitives and the per-shard road graph.
//!
//! A [`Segment`] is a directed reference to one geometry edge between two
//! consecutive points of a road feature within a shard. Joints (named by
//! [`JointId`]) fuse road points that share a real-world position into
//! one intersection, which is what turns a bag of per-feature polylines
//! into a routable network.

#[doc(hidden)]
pub mod geometry;
#[doc(hidden)]
pub mod index;
#[doc(hidden)]
pub mod segment;
#[doc(hidden)]
#[cfg(test)]
mod test;

#[doc(inline)]
pub use geometry::{Geometry, GeometryProvider, RoadData, RoadGeometry};
#[doc(inline)]
pub use index::{IndexGraph, JointId, RoadAccess, TransitInfo, INVALID_JOINT};
#[doc(inline)]
pub use segment::{FeatureId, RoadPoint, Segment, ShardId, FAKE_FEATURE_ID, FAKE_SHARD_ID};
