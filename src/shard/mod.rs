//! Shard lifecycle: the source abstraction over stored shards and the
//! arena that materialises, leases and evicts them.
//!
//! Decoding a shard is expensive, so the arena keeps every decoded
//! shard until `clear` runs between route calculations; only shards
//! without a live lease are dropped.

#[doc(hidden)]
pub mod arena;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod source;

#[doc(inline)]
pub use arena::{ShardArena, ShardLease, ShardSlot};
#[doc(inline)]
pub use error::ShardError;
#[doc(inline)]
pub use source::{Section, ShardSource};
