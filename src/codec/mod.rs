//! Persisted binary sections.
//!
//! The routing graph section stores, per vehicle-mask combination, the
//! joint layout of every road: gamma-coded feature and point deltas plus
//! a new/repeat joint id stream. Sections carry their byte length so a
//! reader can skip masks it does not care about, and a version field
//! gates the whole layout.

#[doc(hidden)]
pub mod bits;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod sections;

#[doc(inline)]
pub use bits::{BitReader, BitWriter};
#[doc(inline)]
pub use error::CodecError;
#[doc(inline)]
pub use graph::{DeserializedGraph, ExportRoad, GraphSerializer, VERSION};
#[doc(inline)]
pub use sections::*;
