//! Async supervisor that drives a tracking session.
//!
//! [`RouteTracker`] owns the session, the location subscription, the
//! elapsed-time clock and a command channel, and merges all of them into
//! one serialized event stream: each reading, tick or command is fully
//! applied before the next is considered, so no two mutations of session
//! state ever race. Finishing or aborting cancels the subscription and
//! the clock in the same step, leaving no stray event able to mutate a
//! completed session.

use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::error::Result;
use crate::location::{LocationSource, LocationUpdate};
use crate::session::{RouteSummary, SessionEvent, TrackingSession};
use crate::surface::{EventDispatcher, PresentationAdapter, RenderSurface};
use crate::TrackerConfig;

const COMMAND_BUFFER: usize = 16;

/// External request delivered to a running tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerCommand {
    /// Finalize the route (rejected while not finish-eligible)
    Finish,
    /// Cancel the route, discarding accumulated state
    Abort,
}

/// Clonable sender half used to control a running tracker.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<TrackerCommand>,
}

impl TrackerHandle {
    /// Request route finalization. Returns false once the run has ended.
    pub async fn finish(&self) -> bool {
        self.commands.send(TrackerCommand::Finish).await.is_ok()
    }

    /// Request cancellation. Returns false once the run has ended.
    pub async fn abort(&self) -> bool {
        self.commands.send(TrackerCommand::Abort).await.is_ok()
    }
}

/// Supervises one route recording from first fix to finish or abort.
pub struct RouteTracker<S, R, P> {
    session: TrackingSession,
    source: S,
    dispatcher: EventDispatcher<R, P>,
    commands: mpsc::Receiver<TrackerCommand>,
    command_tx: mpsc::Sender<TrackerCommand>,
}

impl<S, R, P> RouteTracker<S, R, P>
where
    S: LocationSource,
    R: RenderSurface,
    P: PresentationAdapter,
{
    pub fn new(config: TrackerConfig, source: S, render: R, presentation: P) -> Self {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        Self {
            session: TrackingSession::new(config),
            source,
            dispatcher: EventDispatcher::new(render, presentation),
            commands,
            command_tx,
        }
    }

    /// Handle for sending commands into the run loop.
    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle {
            commands: self.command_tx.clone(),
        }
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    /// Record one route.
    ///
    /// Obtains the first fix, starts the session, then serializes
    /// subscription updates, clock ticks and commands until the route is
    /// finished (`Ok(Some(summary))`) or aborted (`Ok(None)`). A failed
    /// initial fix is surfaced to the presentation adapter and returned;
    /// transient failures mid-route are surfaced and the run continues.
    pub async fn run(mut self) -> Result<Option<RouteSummary>> {
        let first = match self.source.current_reading().await {
            Ok(point) => point,
            Err(error) => {
                self.dispatcher.notify_location_error(&error);
                return Err(error.into());
            }
        };

        let event = self.session.start(first)?;
        self.dispatcher.dispatch(&event);

        let mut subscription = self.source.subscribe()?;
        let tick = self.session.config().tick_interval;
        let mut clock = time::interval_at(Instant::now() + tick, tick);

        let outcome = loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(TrackerCommand::Finish) => match self.session.finish() {
                        Ok(event) => {
                            subscription.cancel();
                            self.dispatcher.dispatch(&event);
                            if let SessionEvent::Finished(summary) = event {
                                break Some(summary);
                            }
                            break None;
                        }
                        Err(error) => warn!("finish rejected: {error}"),
                    },
                    Some(TrackerCommand::Abort) | None => {
                        subscription.cancel();
                        self.session.abort();
                        break None;
                    }
                },
                update = subscription.next_update() => match update {
                    Some(LocationUpdate::Reading(point)) => {
                        if let Some(event) = self.session.ingest(point) {
                            self.dispatcher.dispatch(&event);
                        }
                    }
                    Some(LocationUpdate::Failed(error)) => {
                        // Transient: the in-progress route is untouched
                        warn!("location reading failed: {error}");
                        self.dispatcher.notify_location_error(&error);
                    }
                    None => {
                        warn!("location stream ended, aborting route");
                        self.session.abort();
                        break None;
                    }
                },
                _ = clock.tick() => {
                    if let Some(event) = self.session.tick() {
                        self.dispatcher.dispatch(&event);
                    }
                }
            }
        };

        match &outcome {
            Some(summary) => info!(
                "route recorded: {:.1}m, {:.1}m^2",
                summary.distance_meters, summary.area_square_meters
            ),
            None => info!("route recording aborted"),
        }
        Ok(outcome)
    }

    /// Spawn the run loop onto the current runtime.
    pub fn spawn(self) -> (TrackerHandle, JoinHandle<Result<Option<RouteSummary>>>)
    where
        S: Send + 'static,
        R: Send + 'static,
        P: Send + 'static,
    {
        let handle = self.handle();
        (handle, tokio::spawn(self.run()))
    }
}

// ============================================================================
// Tests
// ============================================================================
