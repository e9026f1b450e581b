//! Geographic utilities: distance, area, bounds and center calculations.
//!
//! Distances are great-circle (haversine) on a sphere of Earth's mean
//! radius. Enclosed areas use the Chamberlain-Duquette spherical-excess
//! algorithm from the `geo` crate, which is rotation- and
//! winding-invariant in magnitude and accurate well beyond walking scale.

use geo::{ChamberlainDuquetteArea, Coord, LineString, Polygon};

use crate::{Bounds, GeoPoint};

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two GPS points in meters.
///
/// Symmetric, and zero for coincident points.
///
/// # Example
/// ```
/// use perimeter_tracker::{geo_utils::haversine_distance, GeoPoint};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
/// let distance = haversine_distance(&london, &paris);
/// assert!(distance > 340_000.0 && distance < 350_000.0);
/// ```
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Total distance along a path in meters.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Geodesic area of the polygon implied by a ring of GPS points, in
/// square meters.
///
/// The ring is treated as closed: the last point connects back to the
/// first whether or not the caller repeated it. Returns 0.0 for rings of
/// fewer than 3 points. The magnitude is invariant to which point the
/// ring starts at and to winding direction.
pub fn enclosed_area(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let exterior = LineString::new(
        ring.iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect(),
    );

    // Polygon::new closes an open exterior ring
    let polygon = Polygon::new(exterior, vec![]);
    polygon.chamberlain_duquette_unsigned_area()
}

/// Bounding box for a set of GPS points.
pub fn compute_bounds(points: &[GeoPoint]) -> Option<Bounds> {
    Bounds::from_points(points)
}

/// Center point of a set of GPS points (bounds midpoint).
pub fn compute_center(points: &[GeoPoint]) -> Option<GeoPoint> {
    compute_bounds(points).map(|b| b.center())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ring(side_degrees: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, side_degrees),
            GeoPoint::new(side_degrees, side_degrees),
            GeoPoint::new(side_degrees, 0.0),
        ]
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = GeoPoint::new(51.5074, -0.1278);
        let b = GeoPoint::new(48.8566, 2.3522);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_haversine_identity() {
        let a = GeoPoint::new(41.0082, 28.9784);
        assert_eq!(haversine_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // London to Paris is roughly 344 km great-circle
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let distance = haversine_distance(&london, &paris);
        assert!(distance > 340_000.0 && distance < 348_000.0);
    }

    #[test]
    fn test_haversine_small_distance() {
        // 0.0001 degrees of latitude is about 11.1 meters
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0001, 0.0);
        let distance = haversine_distance(&a, &b);
        assert!(distance > 10.0 && distance < 12.0);
    }

    #[test]
    fn test_polyline_length_is_pairwise_sum() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.0001),
            GeoPoint::new(0.0001, 0.0001),
        ];
        let expected = haversine_distance(&points[0], &points[1])
            + haversine_distance(&points[1], &points[2]);
        assert!((polyline_length(&points) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_enclosed_area_degenerate_rings() {
        assert_eq!(enclosed_area(&[]), 0.0);
        assert_eq!(enclosed_area(&[GeoPoint::new(0.0, 0.0)]), 0.0);
        assert_eq!(
            enclosed_area(&[GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0001, 0.0001)]),
            0.0
        );
    }

    #[test]
    fn test_enclosed_area_square_magnitude() {
        // 0.001 degrees at the equator is ~111 m, so the square is ~12,300 m^2
        let area = enclosed_area(&square_ring(0.001));
        assert!(area > 11_000.0 && area < 13_500.0, "area was {area}");
    }

    #[test]
    fn test_enclosed_area_rotation_invariant() {
        let ring = square_ring(0.001);
        let area = enclosed_area(&ring);

        for rotation in 1..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(rotation);
            let rotated_area = enclosed_area(&rotated);
            assert!(
                (area - rotated_area).abs() < 1e-6,
                "rotation {rotation}: {area} vs {rotated_area}"
            );
        }
    }

    #[test]
    fn test_enclosed_area_winding_invariant() {
        let ring = square_ring(0.001);
        let mut reversed = ring.clone();
        reversed.reverse();
        assert!((enclosed_area(&ring) - enclosed_area(&reversed)).abs() < 1e-6);
    }

    #[test]
    fn test_enclosed_area_explicitly_closed_ring() {
        let mut ring = square_ring(0.001);
        let open_area = enclosed_area(&ring);
        ring.push(ring[0]);
        let closed_area = enclosed_area(&ring);
        assert!((open_area - closed_area).abs() < 1e-6);
    }

    #[test]
    fn test_compute_center() {
        let ring = square_ring(0.001);
        let center = compute_center(&ring).unwrap();
        assert!((center.latitude - 0.0005).abs() < 1e-9);
        assert!((center.longitude - 0.0005).abs() < 1e-9);
    }
}
