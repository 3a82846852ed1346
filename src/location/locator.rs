use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::Geocoder;

use super::{describe_coordinates, LocationError, LocationProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationEvent {
    /// Place description or formatted coordinates.
    Resolved(String),
    /// The device has no position to offer.
    NotFound,
    PermissionDenied,
}

/// Runs at most one location lookup at a time in the background.
///
/// Every lookup gets a generation number. `active` holds the generation of
/// the running lookup, or zero when idle, so a cancelled task can neither
/// clear the flag of a newer lookup nor deliver its result.
pub struct Locator {
    provider: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn Geocoder>,

    active: Arc<AtomicU64>,
    generation: u64,
    task: Option<JoinHandle<()>>,

    events_tx: mpsc::UnboundedSender<(u64, LocationEvent)>,
    events_rx: mpsc::UnboundedReceiver<(u64, LocationEvent)>,
}

impl Locator {
    pub fn new(provider: Arc<dyn LocationProvider>, geocoder: Arc<dyn Geocoder>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            provider,
            geocoder,
            active: Arc::default(),
            generation: 0,
            task: None,
            events_tx,
            events_rx,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst) != IDLE
    }

    /// Starts a lookup. Returns false without doing anything while another
    /// one is still running.
    pub fn request(&mut self) -> bool {
        let generation = self.generation + 1;

        if self
            .active
            .compare_exchange(IDLE, generation, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        self.generation = generation;

        let guard = BusyGuard {
            active: self.active.clone(),
            generation,
        };
        let provider = self.provider.clone();
        let geocoder = self.geocoder.clone();
        let events = self.events_tx.clone();

        self.task = Some(tokio::spawn(async move {
            let _guard = guard;

            let event = lookup(provider.as_ref(), geocoder.as_ref()).await;

            if events.send((generation, event)).is_err() {
                log::debug!("location result dropped, locator is gone");
            }
        }));

        true
    }

    /// Drops the running lookup and any result not yet polled. A new lookup
    /// may start right away.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.active.store(IDLE, Ordering::SeqCst);
        self.generation += 1;

        while self.events_rx.try_recv().is_ok() {}
    }

    /// Returns the result of a finished lookup. Results of cancelled
    /// lookups are discarded.
    pub fn poll(&mut self) -> Option<LocationEvent> {
        loop {
            let (generation, event) = self.events_rx.try_recv().ok()?;

            if generation == self.generation {
                self.task = None;

                return Some(event);
            }

            log::debug!("discard result of cancelled lookup {}", generation);
        }
    }
}

impl Drop for Locator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

const IDLE: u64 = 0;

/// Marks the locator idle when the lookup task ends, whichever way it ends,
/// unless the lookup was cancelled in the meantime.
struct BusyGuard {
    active: Arc<AtomicU64>,
    generation: u64,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let _ = self.active.compare_exchange(
            self.generation,
            IDLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

async fn lookup(provider: &dyn LocationProvider, geocoder: &dyn Geocoder) -> LocationEvent {
    let position = match provider.current_position().await {
        Ok(None) => provider.last_known_position().await,
        other => other,
    };

    match position {
        Ok(Some(coordinates)) => {
            LocationEvent::Resolved(describe_coordinates(geocoder, coordinates).await)
        }
        Ok(None) => LocationEvent::NotFound,
        Err(LocationError::PermissionDenied) => {
            log::info!("location lookup denied");
            LocationEvent::PermissionDenied
        }
    }
}
