//! The world facade: one logical graph spanning every shard, pinned
//! guide tracks layered over it, the resolution modes a search can run
//! it at, and the synthetic start/finish layer built per subroute.

#[doc(hidden)]
pub mod fake;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod guides;
#[doc(hidden)]
pub mod mode;
#[doc(hidden)]
pub mod starter;
#[cfg(test)]
mod test;

#[doc(inline)]
pub use fake::{FakeGraph, FakeSegmentData};
#[doc(inline)]
pub use graph::WorldGraph;
#[doc(inline)]
pub use guides::{GuideTracks, GUIDE_ATTACH_M, GUIDE_SHARD_ID};
#[doc(inline)]
pub use mode::Mode;
#[doc(inline)]
pub use starter::Starter;
