//! The orchestration layer: checkpoint snapping, per-leg mode choice,
//! route shaping and adjustment of a previous route.

#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod redress;
#[doc(hidden)]
pub mod router;
#[cfg(test)]
mod test;

#[doc(inline)]
pub use error::RouterError;
#[doc(inline)]
pub use redress::{redress, redress_real, RedressedStep};
#[doc(inline)]
pub use router::{
    Router, ADJUST_MAX_OFF_ROUTE_M, ADJUST_MIN_REMAINING_M, LEAP_DISTANCE_M,
};
