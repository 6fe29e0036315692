//! The route model: the presentable result of a search, with per-step
//! accumulated distance, ETA and weight.

#[doc(hidden)]
pub mod route;

#[doc(inline)]
pub use route::{Route, RouteSegment};
