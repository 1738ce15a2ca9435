//! Device position lookup.
//!
//! The controller only cares whether it got coordinates or should fall back to the
//! default location name, so [`locate`] collapses every failure mode (no capability,
//! denial, unavailable, timeout) into [`Located::UseFallback`].

use async_trait::async_trait;
use log::{debug, info};
use std::{
    fmt::Debug,
    sync::Mutex,
    time::{Duration, Instant},
};
use thiserror::Error;

use crate::model::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position that may be returned without asking again.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("permission to read the device position was denied")]
    PermissionDenied,
    #[error("device position is unavailable")]
    Unavailable,
    #[error("timed out waiting for the device position")]
    Timeout,
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Located {
    At(Coordinates),
    UseFallback,
}

/// Ask `geolocator` for a position, bounded by `options.timeout`.
pub async fn locate(geolocator: Option<&dyn Geolocator>, options: &PositionOptions) -> Located {
    let Some(geolocator) = geolocator else {
        debug!("No geolocation capability; using fallback location");
        return Located::UseFallback;
    };

    let outcome = tokio::time::timeout(options.timeout, geolocator.current_position(options))
        .await
        .unwrap_or(Err(PositionError::Timeout));

    match outcome {
        Ok(coords) => {
            debug!("Device position: {}, {}", coords.latitude, coords.longitude);
            Located::At(coords)
        }
        Err(err) => {
            info!("Geolocation failed ({err}); using fallback location");
            Located::UseFallback
        }
    }
}

/// A position known ahead of time (configuration or command line).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        Ok(self.0)
    }
}

/// A capability that is present but always refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Denied;

#[async_trait]
impl Geolocator for Denied {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        Err(PositionError::PermissionDenied)
    }
}

/// Reuses the last successful position while it is younger than
/// `options.maximum_age`.
#[derive(Debug)]
pub struct CachedGeolocator<G> {
    inner: G,
    last: Mutex<Option<(Instant, Coordinates)>>,
}

impl<G: Geolocator> CachedGeolocator<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    fn cached(&self, maximum_age: Duration) -> Option<Coordinates> {
        let last = *self.last.lock().ok()?;
        last.filter(|(at, _)| at.elapsed() <= maximum_age)
            .map(|(_, coords)| coords)
    }
}

#[async_trait]
impl<G: Geolocator> Geolocator for CachedGeolocator<G> {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        if let Some(coords) = self.cached(options.maximum_age) {
            debug!("Using cached device position");
            return Ok(coords);
        }

        let coords = self.inner.current_position(options).await?;
        if let Ok(mut last) = self.last.lock() {
            *last = Some((Instant::now(), coords));
        }
        Ok(coords)
    }
}
