//! Cross-shard stitching: border transitions, their twins across the
//! border, and the per-shard connector with precomputed enter-to-exit
//! weights that leap search rides on.

#[doc(hidden)]
pub mod connector;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod serialization;
#[cfg(test)]
mod test;

#[doc(inline)]
pub use connector::{Connector, Transition};
#[doc(inline)]
pub use error::StitchError;
#[doc(inline)]
pub use graph::CrossShardGraph;
#[doc(inline)]
pub use serialization::{read_connector, write_connector};
