use futures::future::BoxFuture;

pub use nominatim::Nominatim;

use crate::models::Coordinates;

mod nominatim;

pub trait Geocoder: Sync + Send {
    /// Resolves coordinates to a short place description, `None` when the
    /// service knows nothing about the place.
    fn reverse(&self, coordinates: Coordinates) -> BoxFuture<anyhow::Result<Option<String>>>;
}
