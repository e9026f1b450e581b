//! Tracking session state machine.
//!
//! A [`TrackingSession`] owns path accumulation, distance accumulation,
//! elapsed time and start-proximity evaluation for one walked route. It is
//! the sole mutator of its own state: readings, clock ticks and the finish
//! request arrive as method calls, and every accepted mutation yields a
//! [`SessionEvent`] for collaborators to react to.
//!
//! Sessions cycle `Idle -> Active -> Completed -> Idle`; `Completed` is
//! transient, and a finished session is immediately ready for reuse.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::{geo_utils, Bounds, GeoPoint, TrackerConfig};

// ============================================================================
// Session Types
// ============================================================================

/// Lifecycle state of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No route is being recorded
    Idle,
    /// Readings are being accumulated
    Active,
    /// A route was just finalized; the session resets to `Idle` before
    /// `finish` returns
    Completed,
}

/// Final measurements of a completed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    /// The recorded path, in recording order
    pub path: Vec<GeoPoint>,
    /// Geodesic area of the closed route polygon
    pub area_square_meters: f64,
    /// Cumulative walked distance
    pub distance_meters: f64,
    /// Wall-clock seconds the session was active
    pub elapsed_secs: u64,
    /// Bounding box of the path, for map fitting
    pub bounds: Option<Bounds>,
    /// When the route was finalized
    pub completed_at: DateTime<Utc>,
}

impl RouteSummary {
    /// Serialize the summary as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// State-delta emitted by an accepted session mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A session started; collaborators place the start marker and begin
    /// the elapsed-time display
    Started { start: GeoPoint },
    /// A reading was appended to the path
    PositionUpdated {
        point: GeoPoint,
        cumulative_distance: f64,
        finish_eligible: bool,
    },
    /// The elapsed-time clock advanced
    TimeAdvanced { elapsed_secs: u64 },
    /// The route was finalized and the session reset for reuse
    Finished(RouteSummary),
}

// ============================================================================
// Tracking Session
// ============================================================================

/// The route-tracking state machine.
///
/// Owns the path, cumulative distance, elapsed time and finish
/// eligibility of the in-progress route. All mutation happens through
/// [`start`](Self::start), [`ingest`](Self::ingest), [`tick`](Self::tick),
/// [`finish`](Self::finish) and [`abort`](Self::abort); callers serialize
/// these into a single event stream so no two mutations race.
#[derive(Debug)]
pub struct TrackingSession {
    config: TrackerConfig,
    status: SessionStatus,
    path: Vec<GeoPoint>,
    start_point: Option<GeoPoint>,
    cumulative_distance: f64,
    elapsed_secs: u64,
    finish_eligible: bool,
    started_at: Option<DateTime<Utc>>,
}

impl TrackingSession {
    /// Create an idle session with the given configuration.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            status: SessionStatus::Idle,
            path: Vec::new(),
            start_point: None,
            cumulative_distance: 0.0,
            elapsed_secs: 0,
            finish_eligible: false,
            started_at: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    pub fn start_point(&self) -> Option<GeoPoint> {
        self.start_point
    }

    /// Running sum of pairwise distances between consecutive path points,
    /// in meters.
    pub fn cumulative_distance(&self) -> f64 {
        self.cumulative_distance
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// When the in-progress route began, if one is active.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// True while the route can be finished: the session is active, the
    /// path is large enough to enclose an area, and the last reading is
    /// within the proximity threshold of the start.
    pub fn finish_eligible(&self) -> bool {
        self.finish_eligible
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Begin recording a route at the first reading.
    ///
    /// Only valid while idle: a second `start` is rejected with
    /// [`TrackerError::SessionAlreadyActive`] and leaves the in-progress
    /// route untouched, since a silent restart would discard it.
    pub fn start(&mut self, reading: GeoPoint) -> Result<SessionEvent> {
        if self.status == SessionStatus::Active {
            return Err(TrackerError::SessionAlreadyActive);
        }
        if !reading.is_valid() {
            return Err(TrackerError::InvalidCoordinate {
                latitude: reading.latitude,
                longitude: reading.longitude,
            });
        }

        self.reset_state();
        self.start_point = Some(reading);
        self.path.push(reading);
        self.status = SessionStatus::Active;
        self.started_at = Some(Utc::now());

        info!(
            "session started at ({:.6}, {:.6})",
            reading.latitude, reading.longitude
        );
        Ok(SessionEvent::Started { start: reading })
    }

    /// Ingest a continuous reading.
    ///
    /// Returns `None` without faulting when the session is not active
    /// (readings arriving after `finish` are silently dropped) or when the
    /// reading carries invalid coordinates. Duplicate coincident readings
    /// are accepted and add zero distance.
    pub fn ingest(&mut self, reading: GeoPoint) -> Option<SessionEvent> {
        if self.status != SessionStatus::Active {
            debug!(
                "dropping reading ({:.6}, {:.6}): session is {:?}",
                reading.latitude, reading.longitude, self.status
            );
            return None;
        }
        if !reading.is_valid() {
            warn!(
                "skipping invalid reading ({}, {})",
                reading.latitude, reading.longitude
            );
            return None;
        }

        let Some(&last) = self.path.last() else {
            return None;
        };
        let hop = geo_utils::haversine_distance(&last, &reading);

        self.path.push(reading);
        self.cumulative_distance += hop;
        self.finish_eligible = self.evaluate_eligibility();

        debug!(
            "position updated: {} points, {:.1}m, eligible={}",
            self.path.len(),
            self.cumulative_distance,
            self.finish_eligible
        );
        Some(SessionEvent::PositionUpdated {
            point: reading,
            cumulative_distance: self.cumulative_distance,
            finish_eligible: self.finish_eligible,
        })
    }

    /// Advance the elapsed-time clock by one tick.
    ///
    /// Returns `None` when the session is not active; the clock is a side
    /// channel independent of readings.
    pub fn tick(&mut self) -> Option<SessionEvent> {
        if self.status != SessionStatus::Active {
            return None;
        }
        self.elapsed_secs += 1;
        Some(SessionEvent::TimeAdvanced {
            elapsed_secs: self.elapsed_secs,
        })
    }

    /// Finalize the route: compute the enclosed area, freeze distance and
    /// elapsed time into a [`RouteSummary`], and reset to idle for reuse.
    ///
    /// Only valid while finish-eligible. A too-small ring is rejected with
    /// [`TrackerError::InsufficientRingSize`], a route still too far from
    /// its start with [`TrackerError::FinishNotEligible`]; both leave the
    /// session untouched.
    pub fn finish(&mut self) -> Result<SessionEvent> {
        if self.status != SessionStatus::Active || self.path.len() < self.config.min_ring_size {
            return Err(TrackerError::InsufficientRingSize {
                point_count: self.path.len(),
                minimum_required: self.config.min_ring_size,
            });
        }

        let distance_to_start = match (self.start_point, self.path.last()) {
            (Some(start), Some(last)) => geo_utils::haversine_distance(last, &start),
            _ => f64::INFINITY,
        };
        if distance_to_start >= self.config.proximity_threshold {
            return Err(TrackerError::FinishNotEligible {
                distance_to_start,
                threshold: self.config.proximity_threshold,
            });
        }

        let summary = RouteSummary {
            path: self.path.clone(),
            area_square_meters: geo_utils::enclosed_area(&self.path),
            distance_meters: self.cumulative_distance,
            elapsed_secs: self.elapsed_secs,
            bounds: Bounds::from_points(&self.path),
            completed_at: Utc::now(),
        };
        self.status = SessionStatus::Completed;

        info!(
            "session finished: {:.1}m over {}s enclosing {:.1}m^2",
            summary.distance_meters, summary.elapsed_secs, summary.area_square_meters
        );
        self.reset_state();
        Ok(SessionEvent::Finished(summary))
    }

    /// Cancel an in-progress route, discarding all accumulated state.
    ///
    /// Returns false when there was nothing to abort.
    pub fn abort(&mut self) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }
        info!("session aborted after {} points", self.path.len());
        self.reset_state();
        true
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn evaluate_eligibility(&self) -> bool {
        if self.status != SessionStatus::Active || self.path.len() < self.config.min_ring_size {
            return false;
        }
        match (self.start_point, self.path.last()) {
            (Some(start), Some(last)) => {
                geo_utils::haversine_distance(last, &start) < self.config.proximity_threshold
            }
            _ => false,
        }
    }

    fn reset_state(&mut self) {
        self.status = SessionStatus::Idle;
        self.path.clear();
        self.start_point = None;
        self.cumulative_distance = 0.0;
        self.elapsed_secs = 0;
        self.finish_eligible = false;
        self.started_at = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
