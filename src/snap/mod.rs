//! Checkpoint snapping: projecting raw coordinates onto the road
//! network and packaging the result as fake endings.
//!
//! Snapping widens through fixed radii, rejects candidates fenced off
//! behind other roads, prefers the closest codirectional road when a
//! movement bearing is known, and avoids starting a route into a
//! cul-de-sac.

#[doc(hidden)]
pub mod dead_end;
#[doc(hidden)]
pub mod ending;
#[doc(hidden)]
pub mod finder;
#[doc(hidden)]
pub mod index;
#[cfg(test)]
mod test;

#[doc(inline)]
pub use dead_end::{DeadEndCache, DEAD_END_TEST_LIMIT};
#[doc(inline)]
pub use ending::{FakeEnding, Projection};
#[doc(inline)]
pub use finder::{find_ending, SnapParams, CODIRECTIONAL_COS, MAX_CANDIDATES, SNAP_RADII_M};
#[doc(inline)]
pub use index::{SegmentEntry, SnapIndex};
