//! # Perimeter Tracker
//!
//! Walked-route tracking with return-to-start detection and enclosed-area
//! measurement.
//!
//! This library provides:
//! - A tracking session state machine that accumulates a GPS path,
//!   cumulative distance and elapsed time from live readings
//! - Return-to-start proximity detection gating route completion
//! - Geodesic area measurement of the closed route polygon
//! - An async supervisor that serializes readings, clock ticks and
//!   commands into a single event stream
//!
//! Map rendering and textual presentation are reached through the
//! [`RenderSurface`] and [`PresentationAdapter`] traits; the library never
//! talks to a UI directly.
//!
//! ## Quick Start
//!
//! ```rust
//! use perimeter_tracker::{GeoPoint, TrackerConfig, TrackingSession};
//!
//! let mut session = TrackingSession::new(TrackerConfig::default());
//!
//! session.start(GeoPoint::new(41.0082, 28.9784)).unwrap();
//! session.ingest(GeoPoint::new(41.0083, 28.9785));
//! session.ingest(GeoPoint::new(41.0084, 28.9784));
//!
//! assert!(session.cumulative_distance() > 0.0);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

// Unified error handling
pub mod error;
pub use error::{Result, TrackerError};

// Geographic utilities (distance, area, bounds, center calculations)
pub mod geo_utils;
pub use geo_utils::{
    compute_bounds, compute_center, enclosed_area, haversine_distance, polyline_length,
};

// Tracking session state machine
pub mod session;
pub use session::{RouteSummary, SessionEvent, SessionStatus, TrackingSession};

// Location source abstraction (one-shot and continuous readings)
pub mod location;
pub use location::{
    location_channel, ChannelLocationSource, LocationError, LocationErrorKind, LocationFeed,
    LocationSource, LocationSubscription, LocationUpdate,
};

// Render/presentation boundaries and event fan-out
pub mod surface;
pub use surface::{
    EventDispatcher, NullPresentation, NullSurface, PresentationAdapter, RenderSurface,
};

// Async supervisor merging readings, ticks and commands
pub mod supervisor;
pub use supervisor::{RouteTracker, TrackerCommand, TrackerHandle};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use perimeter_tracker::GeoPoint;
/// let point = GeoPoint::new(41.0082, 28.9784); // Istanbul
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box for a recorded route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Configuration for route tracking.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Maximum distance to the start point for a route to be finishable.
    /// Default: 20.0 meters (accounts for GPS variance of 5-10m)
    pub proximity_threshold: f64,

    /// Minimum number of path points required to enclose an area.
    /// Default: 3
    pub min_ring_size: usize,

    /// Interval between elapsed-time clock ticks.
    /// Default: 1 second
    pub tick_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 20.0,
            min_ring_size: 3,
            tick_interval: Duration::from_secs(1),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(41.0082, 28.9784).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_from_points() {
        let points = vec![
            GeoPoint::new(41.0082, 28.9784),
            GeoPoint::new(41.0090, 28.9770),
            GeoPoint::new(41.0075, 28.9790),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds.min_lat, 41.0075);
        assert_eq!(bounds.max_lat, 41.0090);
        assert_eq!(bounds.min_lng, 28.9770);
        assert_eq!(bounds.max_lng, 28.9790);

        let center = bounds.center();
        assert!(center.latitude > bounds.min_lat && center.latitude < bounds.max_lat);
    }

    #[test]
    fn test_bounds_empty_input() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.proximity_threshold, 20.0);
        assert_eq!(config.min_ring_size, 3);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }
}
