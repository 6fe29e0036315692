//! Vehicle profiles.
//!
//! The engine is constructed for exactly one [`VehicleType`]; the profile
//! is a closed variant supplying the speed model, one-way handling and
//! the off-road speed used for snapping projections.

#[doc(hidden)]
pub mod estimator;
#[doc(hidden)]
#[cfg(test)]
mod test;
#[doc(hidden)]
pub mod vehicle;

#[doc(inline)]
pub use estimator::{EdgeEstimator, Purpose};
#[doc(inline)]
pub use vehicle::{HighwayCategory, RoadClass, SpeedKmh, VehicleModel, VehicleType};
