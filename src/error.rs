//! Unified error handling for the perimeter-tracker library.
//!
//! All errors are local and recoverable: a rejected operation leaves the
//! tracking session in its prior state, and a failed location reading never
//! aborts an in-progress route.

use thiserror::Error;

use crate::location::LocationError;

/// Unified error type for tracker operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// A location reading could not be obtained
    #[error(transparent)]
    Location(#[from] LocationError),

    /// `start` was called while a session is already active
    #[error("a tracking session is already active")]
    SessionAlreadyActive,

    /// `finish` was called before returning close enough to the start point
    #[error(
        "cannot finish: last point is {distance_to_start:.1}m from start, must be within {threshold:.1}m"
    )]
    FinishNotEligible {
        distance_to_start: f64,
        threshold: f64,
    },

    /// `finish` was called before the path could enclose an area
    #[error("cannot finish: route has {point_count} points, minimum {minimum_required} required")]
    InsufficientRingSize {
        point_count: usize,
        minimum_required: usize,
    },

    /// A reading carried out-of-range or non-finite coordinates
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
