use geo::{Distance, Haversine, Point};

use crate::model::{SpeedKmh, VehicleModel};

const KMH_TO_MPS: f64 = 1000.0 / 3600.0;

/// What a weight is computed for: the search optimises `Weight`, the
/// user-facing timings use `Eta`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Purpose {
    Weight,
    Eta,
}

/// Turns lengths and modeled speeds into edge costs in seconds.
#[derive(Clone, Copy, Debug)]
pub struct EdgeEstimator {
    max_speed_mps: f64,
    offroad_speed_mps: f64,
}

impl EdgeEstimator {
    pub fn new(model: &VehicleModel) -> Self {
        EdgeEstimator {
            max_speed_mps: model.max_speed().weight * KMH_TO_MPS,
            offroad_speed_mps: model.offroad_speed().weight * KMH_TO_MPS,
        }
    }

    pub fn max_speed_mps(&self) -> f64 {
        self.max_speed_mps
    }

    pub fn offroad_speed_mps(&self) -> f64 {
        self.offroad_speed_mps
    }

    /// Cost in seconds of travelling `len_m` at `speed`.
    pub fn segment_cost(&self, len_m: f64, speed: SpeedKmh, purpose: Purpose) -> f64 {
        let kmh = match purpose {
            Purpose::Weight => speed.weight,
            Purpose::Eta => speed.eta,
        };
        // A zero modeled speed would make the edge a sink.
        debug_assert!(kmh > 0.0);
        len_m / (kmh * KMH_TO_MPS)
    }

    /// Cost in seconds of leaving the road network between two points
    /// (checkpoint projections).
    pub fn offroad_cost(&self, from: Point<f64>, to: Point<f64>) -> f64 {
        Haversine.distance(from, to) / self.offroad_speed_mps
    }

    /// Admissible great-circle lower bound between two points.
    pub fn heuristic(&self, from: Point<f64>, to: Point<f64>) -> f64 {
        Haversine.distance(from, to) / self.max_speed_mps
    }
}
