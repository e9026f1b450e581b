//! Render and presentation boundaries.
//!
//! The core never talks to a map or a UI directly: it emits
//! [`SessionEvent`]s, and the [`EventDispatcher`] translates each one into
//! calls on a [`RenderSurface`] (map drawing) and a
//! [`PresentationAdapter`] (textual displays and button enablement).
//! Headless consumers plug in [`NullSurface`] / [`NullPresentation`].

use log::debug;

use crate::location::LocationError;
use crate::session::{RouteSummary, SessionEvent};
use crate::GeoPoint;

// ============================================================================
// Collaborator Contracts
// ============================================================================

/// Map drawing surface consumed by the core.
pub trait RenderSurface {
    /// Place the marker at the route's start point.
    fn place_start_marker(&mut self, point: GeoPoint);
    /// Begin a new path polyline at the origin.
    fn begin_path(&mut self, origin: GeoPoint);
    /// Extend the path polyline with a new point.
    fn extend_path(&mut self, point: GeoPoint);
    /// Remove the in-progress path polyline.
    fn remove_path(&mut self);
    /// Draw the closed-area polygon of a finished route.
    fn draw_enclosed_area(&mut self, ring: &[GeoPoint]);
    /// Pan the view to a point.
    fn pan_to(&mut self, center: GeoPoint);
    /// Fit the view to a finished route's area.
    fn fit_to_area(&mut self, ring: &[GeoPoint]);
}

/// Textual display and control-state adapter consumed by the core.
pub trait PresentationAdapter {
    fn on_session_started(&mut self);
    fn on_distance_changed(&mut self, meters: f64);
    fn on_time_changed(&mut self, seconds: u64);
    fn on_finish_eligibility_changed(&mut self, eligible: bool);
    fn on_session_finished(&mut self, summary: &RouteSummary);
    fn on_location_error(&mut self, code: u16, message: &str);
}

/// A render surface that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn place_start_marker(&mut self, _point: GeoPoint) {}
    fn begin_path(&mut self, _origin: GeoPoint) {}
    fn extend_path(&mut self, _point: GeoPoint) {}
    fn remove_path(&mut self) {}
    fn draw_enclosed_area(&mut self, _ring: &[GeoPoint]) {}
    fn pan_to(&mut self, _center: GeoPoint) {}
    fn fit_to_area(&mut self, _ring: &[GeoPoint]) {}
}

/// A presentation adapter that displays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl PresentationAdapter for NullPresentation {
    fn on_session_started(&mut self) {}
    fn on_distance_changed(&mut self, _meters: f64) {}
    fn on_time_changed(&mut self, _seconds: u64) {}
    fn on_finish_eligibility_changed(&mut self, _eligible: bool) {}
    fn on_session_finished(&mut self, _summary: &RouteSummary) {}
    fn on_location_error(&mut self, _code: u16, _message: &str) {}
}

// ============================================================================
// Event Dispatcher
// ============================================================================

/// Fans session events out to the render surface and the presentation
/// adapter.
///
/// Eligibility is forwarded only when it changes, so the adapter sees an
/// actual toggle rather than a repeat on every reading.
#[derive(Debug)]
pub struct EventDispatcher<R, P> {
    render: R,
    presentation: P,
    last_eligibility: bool,
}

impl<R: RenderSurface, P: PresentationAdapter> EventDispatcher<R, P> {
    pub fn new(render: R, presentation: P) -> Self {
        Self {
            render,
            presentation,
            last_eligibility: false,
        }
    }

    /// Apply one session event to both collaborators.
    pub fn dispatch(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started { start } => {
                self.render.place_start_marker(*start);
                self.render.begin_path(*start);
                self.render.pan_to(*start);
                self.presentation.on_session_started();
                self.presentation.on_distance_changed(0.0);
                self.presentation.on_time_changed(0);
                self.presentation.on_finish_eligibility_changed(false);
                self.last_eligibility = false;
            }
            SessionEvent::PositionUpdated {
                point,
                cumulative_distance,
                finish_eligible,
            } => {
                self.render.extend_path(*point);
                self.render.pan_to(*point);
                self.presentation.on_distance_changed(*cumulative_distance);
                if *finish_eligible != self.last_eligibility {
                    debug!("finish eligibility changed to {finish_eligible}");
                    self.presentation
                        .on_finish_eligibility_changed(*finish_eligible);
                    self.last_eligibility = *finish_eligible;
                }
            }
            SessionEvent::TimeAdvanced { elapsed_secs } => {
                self.presentation.on_time_changed(*elapsed_secs);
            }
            SessionEvent::Finished(summary) => {
                self.render.remove_path();
                self.render.draw_enclosed_area(&summary.path);
                self.render.fit_to_area(&summary.path);
                self.presentation.on_session_finished(summary);
                if self.last_eligibility {
                    self.presentation.on_finish_eligibility_changed(false);
                    self.last_eligibility = false;
                }
            }
        }
    }

    /// Surface a location failure to the presentation adapter.
    pub fn notify_location_error(&mut self, error: &LocationError) {
        self.presentation
            .on_location_error(error.kind.code(), &error.message);
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn into_parts(self) -> (R, P) {
        (self.render, self.presentation)
    }
}

// ============================================================================
// Tests
// ============================================================================
