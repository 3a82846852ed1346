use futures::future::BoxFuture;
use thiserror::Error;

pub use locator::{LocationEvent, Locator};

use crate::api::Geocoder;
use crate::models::Coordinates;

mod locator;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
}

/// Source of the device position. Each call may take arbitrary time.
pub trait LocationProvider: Send + Sync {
    /// Fresh position fix, `None` when the device could not get one.
    fn current_position(&self) -> BoxFuture<Result<Option<Coordinates>, LocationError>>;

    /// Last position the device remembers, if any.
    fn last_known_position(&self) -> BoxFuture<Result<Option<Coordinates>, LocationError>> {
        Box::pin(async { Ok(None) })
    }
}

/// Position given on the command line. Terminals have no positioning
/// hardware, so without one location access counts as denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(Option<Coordinates>);

impl FixedPosition {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self(position)
    }
}

impl LocationProvider for FixedPosition {
    fn current_position(&self) -> BoxFuture<Result<Option<Coordinates>, LocationError>> {
        let position = self.0;

        Box::pin(async move { position.map(Some).ok_or(LocationError::PermissionDenied) })
    }
}

/// Place description for `coordinates`, or the coordinates themselves with
/// five decimals when the geocoder fails or knows nothing.
pub async fn describe_coordinates(geocoder: &dyn Geocoder, coordinates: Coordinates) -> String {
    match geocoder.reverse(coordinates).await {
        Ok(Some(label)) if !label.trim().is_empty() => label,
        Ok(_) => coordinates.to_string(),
        Err(e) => {
            log::warn!("reverse geocoding {} failed: {:#}", coordinates, e);
            coordinates.to_string()
        }
    }
}
