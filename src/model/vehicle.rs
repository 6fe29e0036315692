use strum::{Display, EnumIter};

/// The vehicle profile the engine was constructed for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter)]
pub enum VehicleType {
    Pedestrian,
    Bicycle,
    Car,
    Transit,
}

impl VehicleType {
    /// Bit in the persisted per-road vehicle mask.
    pub fn mask(&self) -> u8 {
        match self {
            VehicleType::Pedestrian => 1,
            VehicleType::Bicycle => 1 << 1,
            VehicleType::Car => 1 << 2,
            VehicleType::Transit => 1 << 3,
        }
    }
}

/// Road classification as delivered by the (external) classifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter)]
pub enum RoadClass {
    Motorway,
    MotorwayLink,
    Trunk,
    TrunkLink,
    Primary,
    PrimaryLink,
    Secondary,
    SecondaryLink,
    Tertiary,
    TertiaryLink,
    Unclassified,
    Residential,
    LivingStreet,
    Service,
    Track,
    Path,
    Footway,
    Cycleway,
    Steps,
    Ferry,
}

/// Coarse grouping used only to bucket leap candidates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter)]
pub enum HighwayCategory {
    Major,
    Primary,
    Usual,
    Minor,
    Transit,
}

impl HighwayCategory {
    pub const COUNT: usize = 5;

    pub fn index(&self) -> usize {
        match self {
            HighwayCategory::Major => 0,
            HighwayCategory::Primary => 1,
            HighwayCategory::Usual => 2,
            HighwayCategory::Minor => 3,
            HighwayCategory::Transit => 4,
        }
    }
}

impl From<RoadClass> for HighwayCategory {
    fn from(class: RoadClass) -> Self {
        use RoadClass::*;
        match class {
            Motorway | MotorwayLink | Trunk | TrunkLink => HighwayCategory::Major,
            Primary | PrimaryLink => HighwayCategory::Primary,
            Secondary | SecondaryLink | Tertiary | TertiaryLink => HighwayCategory::Usual,
            Ferry => HighwayCategory::Transit,
            _ => HighwayCategory::Minor,
        }
    }
}

/// Modeled speed of a road, split into the weight component (what the
/// search optimises) and the ETA component (what the user is told).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpeedKmh {
    pub weight: f64,
    pub eta: f64,
}

impl SpeedKmh {
    pub const fn new(weight: f64, eta: f64) -> Self {
        SpeedKmh { weight, eta }
    }

    pub const fn uniform(speed: f64) -> Self {
        SpeedKmh::new(speed, speed)
    }
}

/// Speed model, one-way/access rules and off-road speed for one vehicle
/// type. Selected once at engine construction.
#[derive(Clone, Copy, Debug)]
pub struct VehicleModel {
    vehicle: VehicleType,
    offroad_kmh: f64,
    max_kmh: f64,
}

impl VehicleModel {
    pub fn new(vehicle: VehicleType) -> Self {
        let offroad_kmh = match vehicle {
            VehicleType::Pedestrian => 3.0,
            VehicleType::Bicycle => 3.0,
            VehicleType::Car => 10.0,
            VehicleType::Transit => 3.0,
        };

        let max_kmh = match vehicle {
            VehicleType::Pedestrian => 5.0,
            VehicleType::Bicycle => 20.0,
            VehicleType::Car => 120.0,
            VehicleType::Transit => 80.0,
        };

        VehicleModel {
            vehicle,
            offroad_kmh,
            max_kmh,
        }
    }

    pub fn vehicle(&self) -> VehicleType {
        self.vehicle
    }

    /// The global maximum modeled speed; divides the great-circle
    /// heuristic so it stays admissible.
    pub fn max_speed(&self) -> SpeedKmh {
        SpeedKmh::uniform(self.max_kmh)
    }

    pub fn offroad_speed(&self) -> SpeedKmh {
        SpeedKmh::uniform(self.offroad_kmh)
    }

    /// Modeled speed for a road, or `None` when the vehicle cannot use
    /// the road at all. A `maxspeed` hint caps the ETA component.
    pub fn speed(&self, class: RoadClass, maxspeed_kmh: Option<f64>) -> Option<SpeedKmh> {
        let base = match self.vehicle {
            VehicleType::Car => car_speed(class),
            VehicleType::Bicycle => bicycle_speed(class),
            VehicleType::Pedestrian | VehicleType::Transit => pedestrian_speed(class),
        }?;

        Some(match maxspeed_kmh {
            Some(cap) if cap < base.eta => SpeedKmh::new(base.weight.min(cap), cap),
            _ => base,
        })
    }

    /// Whether a one-way tag binds this vehicle. Pedestrians walk both
    /// ways on one-way streets.
    pub fn obeys_one_way(&self) -> bool {
        !matches!(
            self.vehicle,
            VehicleType::Pedestrian | VehicleType::Transit
        )
    }

    /// Roads which the search may enter but not pass through (living
    /// neighbourhoods).
    pub fn is_pass_through_allowed(&self, class: RoadClass) -> bool {
        if self.vehicle != VehicleType::Car {
            return true;
        }
        !matches!(class, RoadClass::Service | RoadClass::LivingStreet)
    }
}

fn car_speed(class: RoadClass) -> Option<SpeedKmh> {
    use RoadClass::*;
    Some(match class {
        Motorway => SpeedKmh::new(117.0, 104.0),
        MotorwayLink => SpeedKmh::new(82.0, 73.0),
        Trunk => SpeedKmh::new(93.0, 83.0),
        TrunkLink => SpeedKmh::new(70.0, 62.0),
        Primary => SpeedKmh::new(75.0, 67.0),
        PrimaryLink => SpeedKmh::new(60.0, 54.0),
        Secondary => SpeedKmh::new(58.0, 52.0),
        SecondaryLink => SpeedKmh::new(50.0, 45.0),
        Tertiary => SpeedKmh::new(50.0, 45.0),
        TertiaryLink => SpeedKmh::new(40.0, 36.0),
        Unclassified => SpeedKmh::new(40.0, 36.0),
        Residential => SpeedKmh::new(30.0, 27.0),
        LivingStreet => SpeedKmh::new(10.0, 9.0),
        Service => SpeedKmh::new(15.0, 14.0),
        Track => SpeedKmh::new(10.0, 9.0),
        Ferry => SpeedKmh::new(10.0, 10.0),
        Path | Footway | Cycleway | Steps => return None,
    })
}

fn bicycle_speed(class: RoadClass) -> Option<SpeedKmh> {
    use RoadClass::*;
    Some(match class {
        Motorway | MotorwayLink | Steps => return None,
        Trunk | TrunkLink => SpeedKmh::uniform(18.0),
        Primary | PrimaryLink => SpeedKmh::uniform(18.0),
        Secondary | SecondaryLink => SpeedKmh::uniform(18.0),
        Tertiary | TertiaryLink => SpeedKmh::uniform(18.0),
        Unclassified | Residential | LivingStreet => SpeedKmh::uniform(15.0),
        Service | Track => SpeedKmh::uniform(12.0),
        Path => SpeedKmh::uniform(10.0),
        Footway => SpeedKmh::uniform(7.0),
        Cycleway => SpeedKmh::uniform(20.0),
        Ferry => SpeedKmh::uniform(10.0),
    })
}

fn pedestrian_speed(class: RoadClass) -> Option<SpeedKmh> {
    use RoadClass::*;
    Some(match class {
        Motorway | MotorwayLink => return None,
        Steps => SpeedKmh::uniform(3.0),
        Ferry => SpeedKmh::uniform(10.0),
        _ => SpeedKmh::uniform(5.0),
    })
}
