use approx::assert_abs_diff_eq;

use crate::geometry::*;

#[test]
fn test_haversine_one_degree_on_equator() {
    let d = haversine_km(0.0, 0.0, 0.0, 1.0);
    assert_abs_diff_eq!(d, EARTH_RADIUS_KM * std::f64::consts::PI / 180.0, epsilon = 1e-9);
}

#[test]
fn test_haversine_known_distance() {
    // Delhi to Mumbai, ~1150 km
    let d = haversine_km(28.6139, 77.2090, 19.0760, 72.8777);
    assert!((d - 1150.0).abs() < 20.0, "got {:.1} km", d);
}

#[test]
fn test_haversine_symmetric_and_zero() {
    let (a, b) = ((12.97, 77.59), (13.08, 80.27));
    let ab = haversine_km(a.0, a.1, b.0, b.1);
    let ba = haversine_km(b.0, b.1, a.0, a.1);
    assert_abs_diff_eq!(ab, ba, epsilon = 1e-9);
    assert!(ab > 0.0);
    assert_eq!(haversine_km(a.0, a.1, a.0, a.1), 0.0);
}

#[test]
fn test_haversine_antipodal_is_finite() {
    let d = haversine_km(0.0, 0.0, 0.0, 180.0);
    assert!(d.is_finite());
    assert_abs_diff_eq!(d, EARTH_RADIUS_KM * std::f64::consts::PI, epsilon = 1e-6);
}

#[test]
fn test_bearing_cardinal_directions() {
    assert_abs_diff_eq!(bearing_deg(0.0, 0.0, 1.0, 0.0), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(bearing_deg(0.0, 0.0, 0.0, 1.0), 90.0, epsilon = 1e-9);
    assert_abs_diff_eq!(bearing_deg(0.0, 0.0, -1.0, 0.0), 180.0, epsilon = 1e-9);
    assert_abs_diff_eq!(bearing_deg(0.0, 0.0, 0.0, -1.0), 270.0, epsilon = 1e-9);
}

#[test]
fn test_bearing_range_and_asymmetry() {
    let there = bearing_deg(28.6, 77.2, 19.0, 72.8);
    let back = bearing_deg(19.0, 72.8, 28.6, 77.2);
    for b in [there, back] {
        assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
    }
    // close to, but not exactly, opposite on a sphere
    let diff = (there - back).rem_euclid(360.0);
    assert!((diff - 180.0).abs() < 5.0);
    assert!((diff - 180.0).abs() > 1e-6);
}

#[test]
fn test_angle_segment() {
    assert_eq!(angle_segment(0.0, 5.0), 0);
    assert_eq!(angle_segment(4.999, 5.0), 0);
    assert_eq!(angle_segment(5.0, 5.0), 1);
    assert_eq!(angle_segment(359.9, 5.0), 71);
    assert_eq!(angle_segment(90.0, 20.0), 4);
    assert_eq!(angle_segment(270.0, 20.0), 13);
    assert_eq!(segment_count(5.0), 72);
    assert_eq!(segment_count(20.0), 18);
}

#[test]
#[should_panic(expected = "segment size should be strictly positive")]
fn test_angle_segment_rejects_zero_size() {
    angle_segment(10.0, 0.0);
}

#[test]
fn test_coordinate_serializes_as_pair() {
    let c = Coordinate::new(12.5, 77.25);
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "[12.5,77.25]");
    let back: Coordinate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
    assert_abs_diff_eq!(c.distance_km(&back), 0.0);
}
