use approx::assert_relative_eq;
use geo::{Distance, Haversine, Point};
use strum::IntoEnumIterator;

use crate::model::{
    EdgeEstimator, HighwayCategory, Purpose, RoadClass, SpeedKmh, VehicleModel, VehicleType,
};

#[test]
fn vehicle_masks_are_disjoint() {
    let mut seen = 0u8;
    for vehicle in VehicleType::iter() {
        assert_eq!(seen & vehicle.mask(), 0);
        seen |= vehicle.mask();
    }
}

#[test]
fn every_road_class_maps_to_a_category() {
    for class in RoadClass::iter() {
        let category = HighwayCategory::from(class);
        assert!(category.index() < HighwayCategory::COUNT);
    }
    assert_eq!(
        HighwayCategory::from(RoadClass::Motorway),
        HighwayCategory::Major
    );
    assert_eq!(
        HighwayCategory::from(RoadClass::Ferry),
        HighwayCategory::Transit
    );
}

#[test]
fn cars_are_kept_off_footways() {
    let car = VehicleModel::new(VehicleType::Car);
    assert!(car.speed(RoadClass::Footway, None).is_none());
    assert!(car.speed(RoadClass::Steps, None).is_none());
    assert!(car.speed(RoadClass::Residential, None).is_some());
}

#[test]
fn maxspeed_caps_eta_and_never_raises_weight() {
    let car = VehicleModel::new(VehicleType::Car);
    let free = car.speed(RoadClass::Motorway, None).unwrap();
    let capped = car.speed(RoadClass::Motorway, Some(50.0)).unwrap();

    assert_relative_eq!(capped.eta, 50.0);
    assert!(capped.weight <= free.weight);

    // A cap above the modeled speed changes nothing.
    let loose = car.speed(RoadClass::Motorway, Some(300.0)).unwrap();
    assert_eq!(loose, free);
}

#[test]
fn pedestrians_ignore_one_way_tags() {
    assert!(!VehicleModel::new(VehicleType::Pedestrian).obeys_one_way());
    assert!(VehicleModel::new(VehicleType::Car).obeys_one_way());
    assert!(VehicleModel::new(VehicleType::Bicycle).obeys_one_way());
}

#[test]
fn cars_cannot_pass_through_service_roads() {
    let car = VehicleModel::new(VehicleType::Car);
    assert!(!car.is_pass_through_allowed(RoadClass::Service));
    assert!(!car.is_pass_through_allowed(RoadClass::LivingStreet));
    assert!(car.is_pass_through_allowed(RoadClass::Residential));

    let pedestrian = VehicleModel::new(VehicleType::Pedestrian);
    assert!(pedestrian.is_pass_through_allowed(RoadClass::Service));
}

#[test]
fn heuristic_never_exceeds_any_segment_cost() {
    let model = VehicleModel::new(VehicleType::Car);
    let estimator = EdgeEstimator::new(&model);

    let a = Point::new(13.3888, 52.5170);
    let b = Point::new(13.3990, 52.5208);

    let lower_bound = estimator.heuristic(a, b);
    for class in RoadClass::iter() {
        let Some(speed) = model.speed(class, None) else {
            continue;
        };
        let len = Haversine.distance(a, b);
        let cost = estimator.segment_cost(len, speed, Purpose::Weight);
        assert!(lower_bound <= cost + 1e-9, "{class} beats the heuristic");
    }
}

#[test]
fn offroad_cost_uses_the_offroad_speed() {
    let model = VehicleModel::new(VehicleType::Pedestrian);
    let estimator = EdgeEstimator::new(&model);

    let a = Point::new(0.0, 0.0);
    let b = Point::new(0.0, 0.01);

    let meters = Haversine.distance(a, b);
    let expected = meters / estimator.offroad_speed_mps();
    assert_relative_eq!(estimator.offroad_cost(a, b), expected);
}

#[test]
fn uniform_speed_has_equal_components() {
    let speed = SpeedKmh::uniform(42.0);
    assert_eq!(speed.weight, speed.eta);
}
