use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Sub};

/// Two weights closer than this are considered equal by the search.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Cost of a partial route: seconds of modeled travel plus the number of
/// entries into no-pass-through areas.
///
/// Ordering is lexicographic. A route that crosses fewer restricted
/// neighbourhoods always wins, however slow it is; seconds only break
/// the tie. Weights never hold NaN.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RouteWeight {
    weight: f64,
    pass_through_changes: u32,
}

impl RouteWeight {
    pub const ZERO: RouteWeight = RouteWeight {
        weight: 0.0,
        pass_through_changes: 0,
    };

    pub fn from_seconds(weight: f64) -> Self {
        RouteWeight {
            weight,
            pass_through_changes: 0,
        }
    }

    pub fn new(weight: f64, pass_through_changes: u32) -> Self {
        RouteWeight {
            weight,
            pass_through_changes,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.weight
    }

    pub fn pass_through_changes(&self) -> u32 {
        self.pass_through_changes
    }

    /// Adds seconds without touching the pass-through count; used to
    /// apply search potentials.
    pub fn offset(self, seconds: f64) -> Self {
        RouteWeight {
            weight: self.weight + seconds,
            ..self
        }
    }

    /// A negative weight component within tolerance is rounded up; the
    /// caller decides what to do with anything worse.
    pub fn clamped_to_zero(self) -> Self {
        RouteWeight {
            weight: self.weight.max(0.0),
            ..self
        }
    }

    pub fn is_almost_equal(&self, other: &RouteWeight) -> bool {
        self.pass_through_changes == other.pass_through_changes
            && (self.weight - other.weight).abs() <= WEIGHT_EPSILON
    }
}

impl Display for RouteWeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}s", self.weight)?;
        if self.pass_through_changes > 0 {
            write!(f, " (+{} pass-through)", self.pass_through_changes)?;
        }
        Ok(())
    }
}

impl Eq for RouteWeight {}

impl Ord for RouteWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pass_through_changes
            .cmp(&other.pass_through_changes)
            .then_with(|| self.weight.total_cmp(&other.weight))
    }
}

impl PartialOrd for RouteWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for RouteWeight {
    type Output = RouteWeight;

    fn add(self, rhs: RouteWeight) -> RouteWeight {
        RouteWeight {
            weight: self.weight + rhs.weight,
            pass_through_changes: self.pass_through_changes + rhs.pass_through_changes,
        }
    }
}

impl AddAssign for RouteWeight {
    fn add_assign(&mut self, rhs: RouteWeight) {
        *self = *self + rhs;
    }
}

impl Sub for RouteWeight {
    type Output = RouteWeight;

    fn sub(self, rhs: RouteWeight) -> RouteWeight {
        RouteWeight {
            weight: self.weight - rhs.weight,
            pass_through_changes: self.pass_through_changes.saturating_sub(rhs.pass_through_changes),
        }
    }
}
