//! Location source abstraction over a device's position readings.
//!
//! A [`LocationSource`] produces one-shot fixes and continuous update
//! streams. Delivery order matches real-world temporal order, but
//! underlying devices may emit duplicate or jittered readings; consumers
//! must tolerate both (coincident coordinates simply add zero distance).
//!
//! [`ChannelLocationSource`] is the channel-backed implementation: the
//! [`LocationFeed`] half is held by whatever adapts the platform's
//! geolocation callbacks, the source half is consumed by the tracker.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::GeoPoint;

// ============================================================================
// Errors
// ============================================================================

/// Why a location reading could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorKind {
    /// The user denied the platform's location permission prompt
    PermissionDenied,
    /// The device has no position fix
    PositionUnavailable,
    /// The reading did not arrive in time
    Timeout,
}

impl LocationErrorKind {
    /// Numeric code matching the geolocation convention (1/2/3).
    pub fn code(&self) -> u16 {
        match self {
            LocationErrorKind::PermissionDenied => 1,
            LocationErrorKind::PositionUnavailable => 2,
            LocationErrorKind::Timeout => 3,
        }
    }
}

impl std::fmt::Display for LocationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LocationErrorKind::PermissionDenied => "permission denied",
            LocationErrorKind::PositionUnavailable => "position unavailable",
            LocationErrorKind::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// A failed location reading.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("location unavailable ({kind}): {message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::PermissionDenied, message)
    }

    pub fn position_unavailable(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::PositionUnavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::Timeout, message)
    }
}

// ============================================================================
// Source Contract
// ============================================================================

/// One delivery from a continuous location subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationUpdate {
    /// A position reading
    Reading(GeoPoint),
    /// A transient failure; the subscription stays live
    Failed(LocationError),
}

/// Abstraction over a device's ability to produce position readings.
#[async_trait]
pub trait LocationSource {
    /// Obtain a single position fix.
    async fn current_reading(&mut self) -> Result<GeoPoint, LocationError>;

    /// Begin continuous delivery of position updates.
    fn subscribe(&mut self) -> Result<LocationSubscription, LocationError>;
}

/// Handle to a continuous stream of location updates.
///
/// Dropping the subscription stops delivery; [`cancel`](Self::cancel) does
/// the same explicitly and is idempotent.
#[derive(Debug)]
pub struct LocationSubscription {
    updates: mpsc::Receiver<LocationUpdate>,
    cancelled: bool,
}

impl LocationSubscription {
    /// Wrap a receiver of location updates.
    pub fn new(updates: mpsc::Receiver<LocationUpdate>) -> Self {
        Self {
            updates,
            cancelled: false,
        }
    }

    /// Next update, or `None` once the subscription is cancelled or the
    /// producer has gone away.
    pub async fn next_update(&mut self) -> Option<LocationUpdate> {
        if self.cancelled {
            return None;
        }
        self.updates.recv().await
    }

    /// Stop delivery. Safe to call repeatedly; updates buffered before the
    /// cancellation are discarded, not delivered.
    pub fn cancel(&mut self) {
        self.updates.close();
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

// ============================================================================
// Channel-backed Source
// ============================================================================

/// Create a connected [`LocationFeed`] / [`ChannelLocationSource`] pair.
///
/// `capacity` bounds the number of undelivered updates; a real device
/// adapter pushes into the feed as platform callbacks fire.
pub fn location_channel(capacity: usize) -> (LocationFeed, ChannelLocationSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        LocationFeed { tx },
        ChannelLocationSource { updates: Some(rx) },
    )
}

/// Producer half: pushes readings and failures into the source.
#[derive(Debug, Clone)]
pub struct LocationFeed {
    tx: mpsc::Sender<LocationUpdate>,
}

impl LocationFeed {
    /// Deliver a position reading. Returns false once the consumer side
    /// has been cancelled or dropped.
    pub async fn push_reading(&self, point: GeoPoint) -> bool {
        self.tx.send(LocationUpdate::Reading(point)).await.is_ok()
    }

    /// Deliver a transient failure.
    pub async fn push_failure(&self, error: LocationError) -> bool {
        self.tx.send(LocationUpdate::Failed(error)).await.is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half: a [`LocationSource`] fed through a channel.
#[derive(Debug)]
pub struct ChannelLocationSource {
    updates: Option<mpsc::Receiver<LocationUpdate>>,
}

#[async_trait]
impl LocationSource for ChannelLocationSource {
    async fn current_reading(&mut self) -> Result<GeoPoint, LocationError> {
        let updates = self.updates.as_mut().ok_or_else(|| {
            LocationError::position_unavailable("location updates already subscribed")
        })?;

        match updates.recv().await {
            Some(LocationUpdate::Reading(point)) => Ok(point),
            Some(LocationUpdate::Failed(error)) => Err(error),
            None => Err(LocationError::position_unavailable("location feed closed")),
        }
    }

    fn subscribe(&mut self) -> Result<LocationSubscription, LocationError> {
        let updates = self.updates.take().ok_or_else(|| {
            LocationError::position_unavailable("location updates already subscribed")
        })?;
        Ok(LocationSubscription::new(updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LocationErrorKind::PermissionDenied.code(), 1);
        assert_eq!(LocationErrorKind::PositionUnavailable.code(), 2);
        assert_eq!(LocationErrorKind::Timeout.code(), 3);

        let err = LocationError::timeout("no fix within 5s");
        assert!(err.to_string().contains("timeout"));
        assert!(err.to_string().contains("no fix within 5s"));
    }

    #[tokio::test]
    async fn test_current_reading_returns_first_fix() {
        let (feed, mut source) = location_channel(8);
        assert!(feed.push_reading(GeoPoint::new(41.0, 29.0)).await);

        let fix = source.current_reading().await.unwrap();
        assert_eq!(fix, GeoPoint::new(41.0, 29.0));
    }

    #[tokio::test]
    async fn test_current_reading_surfaces_failure() {
        let (feed, mut source) = location_channel(8);
        assert!(
            feed.push_failure(LocationError::permission_denied("denied"))
                .await
        );

        let err = source.current_reading().await.unwrap_err();
        assert_eq!(err.kind, LocationErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_subscription_delivers_in_order() {
        let (feed, mut source) = location_channel(8);
        let mut subscription = source.subscribe().unwrap();

        feed.push_reading(GeoPoint::new(1.0, 1.0)).await;
        feed.push_reading(GeoPoint::new(2.0, 2.0)).await;

        assert_eq!(
            subscription.next_update().await,
            Some(LocationUpdate::Reading(GeoPoint::new(1.0, 1.0)))
        );
        assert_eq!(
            subscription.next_update().await,
            Some(LocationUpdate::Reading(GeoPoint::new(2.0, 2.0)))
        );
    }

    #[tokio::test]
    async fn test_subscribe_twice_fails() {
        let (_feed, mut source) = location_channel(8);
        assert!(source.subscribe().is_ok());
        assert!(source.subscribe().is_err());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_stops_delivery() {
        let (feed, mut source) = location_channel(8);
        let mut subscription = source.subscribe().unwrap();

        feed.push_reading(GeoPoint::new(1.0, 1.0)).await;
        subscription.cancel();
        subscription.cancel();

        assert!(subscription.is_cancelled());
        assert_eq!(subscription.next_update().await, None);
        assert!(feed.is_closed());
        assert!(!feed.push_reading(GeoPoint::new(2.0, 2.0)).await);
    }
}
