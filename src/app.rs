use std::fmt;

use crate::advisor::{self, Recommendation};
use crate::location::{LocationEvent, Locator};
use crate::models::{Station, StationDraft, Threshold};
use crate::price::{format_amount_for_display, format_digits_as_amount, parse_localized_amount};
use crate::store::{StationStore, StoreError};
use crate::storage::{Storage, STATIONS_KEY, USE_75_PERCENT_KEY};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    AlcoholPrice,
    GasolinePrice,
    Name,
    Location,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::AlcoholPrice,
        Field::GasolinePrice,
        Field::Name,
        Field::Location,
    ];

    pub fn is_price(&self) -> bool {
        matches!(self, Field::AlcoholPrice | Field::GasolinePrice)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::AlcoholPrice => "Alcohol price",
            Field::GasolinePrice => "Gasoline price",
            Field::Name => "Station name",
            Field::Location => "Location",
        }
    }
}

/// Values typed into the home screen. Prices are kept as displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct Form {
    pub alcohol_price: String,
    pub gasoline_price: String,
    pub name: String,
    pub location: String,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            alcohol_price: format_digits_as_amount(""),
            gasoline_price: format_digits_as_amount(""),
            name: String::new(),
            location: String::new(),
        }
    }
}

impl Form {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::AlcoholPrice => &self.alcohol_price,
            Field::GasolinePrice => &self.gasoline_price,
            Field::Name => &self.name,
            Field::Location => &self.location,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::AlcoholPrice => &mut self.alcohol_price,
            Field::GasolinePrice => &mut self.gasoline_price,
            Field::Name => &mut self.name,
            Field::Location => &mut self.location,
        }
    }
}

/// Everything the user is working on right now.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub form: Form,
    /// Id of the station loaded into the form, if any.
    pub editing: Option<String>,
    pub threshold: Threshold,
    pub result: Option<Recommendation>,
}

impl Session {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }
}

/// Short user facing messages about the outcome of an action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    StationSaved,
    StationUpdated,
    StationDeleted,
    StationMissing,
    InvalidValues,
    LimitReached(usize),
    LocationDenied,
    LocationFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::StationSaved => f.write_str("Station saved."),
            Notice::StationUpdated => f.write_str("Station updated."),
            Notice::StationDeleted => f.write_str("Station deleted."),
            Notice::StationMissing => f.write_str("The station being edited no longer exists."),
            Notice::InvalidValues => f.write_str("Enter valid prices before saving."),
            Notice::LimitReached(max) => {
                write!(f, "You can save up to {max} stations. Delete one first.")
            }
            Notice::LocationDenied => {
                f.write_str("Location access is disabled. Start with --position LAT,LON.")
            }
            Notice::LocationFailed => f.write_str("Could not get the current location."),
        }
    }
}

/// Owns the station list and the session, mirrors changes to storage.
pub struct App<S: Storage> {
    storage: S,
    stations: StationStore,
    session: Session,
    locator: Locator,
}

impl<S: Storage> App<S> {
    pub fn new(storage: S, locator: Locator) -> Self {
        Self {
            storage,
            stations: StationStore::new(),
            session: Session::default(),
            locator,
        }
    }

    /// Restores threshold choice and saved stations.
    pub async fn load(&mut self) {
        let use_75 = match self.storage.get_bool(USE_75_PERCENT_KEY).await {
            Ok(v) => v.unwrap_or(false),
            Err(e) => {
                log::error!("load threshold setting failed: {:#}", e);
                false
            }
        };

        let raw = match self.storage.get(STATIONS_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("load stations failed: {:#}", e);
                None
            }
        };

        self.session.threshold = Threshold::from_use_75(use_75);
        self.stations = StationStore::from_json(raw.as_deref());

        log::info!(
            "loaded {} stations, threshold {}",
            self.stations.len(),
            self.session.threshold
        );
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stations(&self) -> &[Station] {
        self.stations.stations()
    }

    pub fn is_locating(&self) -> bool {
        self.locator.is_busy()
    }

    /// Types `c` into `field`. Price fields take digits only and are
    /// re-rendered as cents after every key.
    pub fn input(&mut self, field: Field, c: char) {
        let value = self.session.form.value_mut(field);

        if field.is_price() {
            if c.is_ascii_digit() {
                value.push(c);
                *value = format_digits_as_amount(value);
            }
        } else if !c.is_control() {
            value.push(c);
        }
    }

    pub fn erase(&mut self, field: Field) {
        let value = self.session.form.value_mut(field);
        value.pop();

        if field.is_price() {
            *value = format_digits_as_amount(value);
        }
    }

    pub async fn toggle_threshold(&mut self) {
        let threshold = self.session.threshold.toggled();
        self.session.threshold = threshold;

        if let Err(e) = self
            .storage
            .set_bool(USE_75_PERCENT_KEY, threshold.is_75())
            .await
        {
            log::error!("persist threshold setting failed: {:#}", e);
        }
    }

    pub fn calculate(&mut self) -> &Recommendation {
        let form = &self.session.form;

        let recommendation = advisor::evaluate(
            parse_localized_amount(&form.alcohol_price).ok(),
            parse_localized_amount(&form.gasoline_price).ok(),
            self.session.threshold,
            &form.name,
        );

        log::debug!("calculated: {:?}", recommendation);

        self.session.result.insert(recommendation)
    }

    /// Saves the form as a new station, or updates the station being edited.
    pub async fn save_station(&mut self) -> Notice {
        let form = &self.session.form;

        let (alcohol_price, gasoline_price) = match (
            parse_localized_amount(&form.alcohol_price),
            parse_localized_amount(&form.gasoline_price),
        ) {
            (Ok(a), Ok(g)) => (a, g),
            (Err(e), _) | (_, Err(e)) => {
                log::debug!("reject station: {}", e);
                return Notice::InvalidValues;
            }
        };

        let draft = StationDraft {
            name: form.name.clone(),
            alcohol_price,
            gasoline_price,
            location: form.location.clone(),
        };

        let editing = self.session.editing.clone();

        let saved = self
            .stations
            .upsert(draft, editing.as_deref())
            .map(|s| (s.id.clone(), s.name.clone()));

        let notice = match saved {
            Ok((id, name)) => {
                log::info!("saved station {} ({})", id, name);

                if editing.is_some() {
                    Notice::StationUpdated
                } else {
                    Notice::StationSaved
                }
            }
            Err(StoreError::Capacity(max)) => return Notice::LimitReached(max),
            Err(StoreError::NotFound(id)) => {
                log::warn!("station {} vanished while editing", id);
                self.reset_form();

                return Notice::StationMissing;
            }
        };

        self.persist_stations().await;
        self.reset_form();

        notice
    }

    /// Loads a saved station into the form.
    pub fn start_editing(&mut self, id: &str) -> bool {
        let Some(station) = self.stations.get(id) else {
            return false;
        };

        self.locator.cancel();

        self.session.form = Form {
            alcohol_price: format_amount_for_display(station.alcohol_price),
            gasoline_price: format_amount_for_display(station.gasoline_price),
            name: station.name.clone(),
            location: station.location.clone(),
        };
        self.session.editing = Some(station.id.clone());
        self.session.result = None;

        true
    }

    pub async fn delete_station(&mut self, id: &str) -> Option<Notice> {
        if !self.stations.remove(id) {
            return None;
        }

        log::info!("deleted station {}", id);

        self.persist_stations().await;

        if self.session.editing.as_deref() == Some(id) {
            self.reset_form();
        }

        Some(Notice::StationDeleted)
    }

    /// Empties the form, leaves edit mode and forgets the last result.
    pub fn clear_form(&mut self) {
        self.reset_form();
        self.session.result = None;
    }

    /// Starts looking up the current location. No effect while a lookup is
    /// already running.
    pub fn request_location(&mut self) -> bool {
        self.locator.request()
    }

    /// Applies a finished location lookup to the form.
    pub fn poll_location(&mut self) -> Option<Notice> {
        match self.locator.poll()? {
            LocationEvent::Resolved(location) => {
                self.session.form.location = location;
                None
            }
            LocationEvent::NotFound => Some(Notice::LocationFailed),
            LocationEvent::PermissionDenied => Some(Notice::LocationDenied),
        }
    }

    fn reset_form(&mut self) {
        self.locator.cancel();
        self.session.form = Form::default();
        self.session.editing = None;
    }

    /// Best effort: the in-memory list stays authoritative on failure.
    async fn persist_stations(&self) {
        let res = if self.stations.is_empty() {
            self.storage.remove(STATIONS_KEY).await
        } else {
            match self.stations.to_json() {
                Ok(json) => self.storage.set(STATIONS_KEY, &json).await,
                Err(e) => Err(e.into()),
            }
        };

        if let Err(e) = res {
            log::error!("persist stations failed: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{App, Field, Form, Notice};
    use crate::location::tests::FakeGeocoder;
    use crate::location::{FixedPosition, Locator};
    use crate::models::{Coordinates, Fuel, Threshold, DEFAULT_STATION_NAME};
    use crate::storage::{Sqlite, Storage, STATIONS_KEY, USE_75_PERCENT_KEY};
    use crate::store::MAX_STATIONS;

    async fn new_app(position: Option<Coordinates>) -> (Sqlite, App<Sqlite>) {
        let db = Sqlite::new(":memory:").await.unwrap();
        let locator = Locator::new(
            Arc::new(FixedPosition::new(position)),
            Arc::new(FakeGeocoder::Found("Av. Paulista, 1578, São Paulo")),
        );

        (db.clone(), App::new(db, locator))
    }

    fn type_into<S: Storage>(app: &mut App<S>, field: Field, text: &str) {
        for c in text.chars() {
            app.input(field, c);
        }
    }

    fn fill<S: Storage>(app: &mut App<S>, name: &str, alcohol: &str, gasoline: &str) {
        type_into(app, Field::Name, name);
        type_into(app, Field::AlcoholPrice, alcohol);
        type_into(app, Field::GasolinePrice, gasoline);
    }

    async fn wait_location<S: Storage>(app: &mut App<S>) -> Option<Notice> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if !app.is_locating() {
                    if let Some(notice) = app.poll_location() {
                        return Some(notice);
                    }
                    if !app.session().form.location.is_empty() {
                        return None;
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("location lookup timed out")
    }

    #[tokio::test]
    async fn masked_price_input() {
        let (_, mut app) = new_app(None).await;

        assert_eq!(app.session().form.alcohol_price, "0,00");

        type_into(&mut app, Field::AlcoholPrice, "3x49");
        assert_eq!(app.session().form.alcohol_price, "3,49");

        app.erase(Field::AlcoholPrice);
        assert_eq!(app.session().form.alcohol_price, "0,34");

        type_into(&mut app, Field::Name, "Posto 1");
        app.erase(Field::Name);
        assert_eq!(app.session().form.name, "Posto ");
    }

    #[tokio::test]
    async fn calculate() {
        let (_, mut app) = new_app(None).await;

        fill(&mut app, "", "300", "420");
        assert_eq!(app.calculate().fuel(), Some(Fuel::Gasoline));

        app.toggle_threshold().await;
        assert_eq!(app.calculate().fuel(), Some(Fuel::Alcohol));

        app.clear_form();
        assert!(app.session().result.is_none());
        assert_eq!(app.calculate().fuel(), None);
    }

    #[tokio::test]
    async fn threshold_is_persisted() {
        let (db, mut app) = new_app(None).await;

        app.toggle_threshold().await;
        assert_eq!(app.session().threshold, Threshold::SeventyFive);
        assert_eq!(db.get_bool(USE_75_PERCENT_KEY).await.unwrap(), Some(true));

        let mut restored = App::new(
            db.clone(),
            Locator::new(Arc::new(FixedPosition::default()), Arc::new(FakeGeocoder::Nothing)),
        );
        restored.load().await;
        assert_eq!(restored.session().threshold, Threshold::SeventyFive);
    }

    #[tokio::test]
    async fn save_and_reload() {
        let (db, mut app) = new_app(None).await;

        fill(&mut app, "Posto A", "319", "479");
        assert_eq!(app.save_station().await, Notice::StationSaved);
        assert_eq!(app.session().form, Form::default());

        fill(&mut app, "", "299", "459");
        assert_eq!(app.save_station().await, Notice::StationSaved);

        assert_eq!(app.stations().len(), 2);
        assert_eq!(app.stations()[0].name, DEFAULT_STATION_NAME);
        assert_eq!(app.stations()[1].name, "Posto A");
        assert_eq!(app.stations()[1].alcohol_price, 3.19);

        let mut restored = App::new(
            db.clone(),
            Locator::new(Arc::new(FixedPosition::default()), Arc::new(FakeGeocoder::Nothing)),
        );
        restored.load().await;

        assert_eq!(restored.stations(), app.stations());
    }

    #[tokio::test]
    async fn rejects_unparseable_prices() {
        let (db, mut app) = new_app(None).await;

        app.session.form.alcohol_price = "abc".to_string();
        assert_eq!(app.save_station().await, Notice::InvalidValues);
        assert!(app.stations().is_empty());
        assert_eq!(db.get(STATIONS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn limit_reached() {
        let (_, mut app) = new_app(None).await;

        for i in 0..MAX_STATIONS {
            fill(&mut app, &format!("Posto {i}"), "300", "400");
            assert_eq!(app.save_station().await, Notice::StationSaved);
        }

        fill(&mut app, "One more", "300", "400");
        assert_eq!(app.save_station().await, Notice::LimitReached(MAX_STATIONS));
        assert_eq!(app.stations().len(), MAX_STATIONS);
        // Form is kept so the user can still calculate with it.
        assert_eq!(app.session().form.name, "One more");
    }

    #[tokio::test]
    async fn edit_station() {
        let (_, mut app) = new_app(None).await;

        fill(&mut app, "Old", "300", "400");
        app.save_station().await;
        fill(&mut app, "Other", "310", "410");
        app.save_station().await;

        let station = app.stations()[1].clone();
        assert!(app.start_editing(&station.id));
        assert!(app.session().is_editing());
        assert_eq!(app.session().form.alcohol_price, "3,00");
        assert_eq!(app.session().form.gasoline_price, "4,00");
        assert_eq!(app.session().form.name, "Old");

        app.erase(Field::Name);
        app.erase(Field::Name);
        app.erase(Field::Name);
        type_into(&mut app, Field::Name, "New");
        type_into(&mut app, Field::AlcoholPrice, "5");

        assert_eq!(app.save_station().await, Notice::StationUpdated);
        assert!(!app.session().is_editing());

        let updated = &app.stations()[1];
        assert_eq!(updated.id, station.id);
        assert_eq!(updated.created_at, station.created_at);
        assert_eq!(updated.name, "New");
        assert_eq!(updated.alcohol_price, 30.05);
        assert_eq!(app.stations().len(), 2);

        assert!(!app.start_editing("unknown"));
    }

    #[tokio::test]
    async fn edited_station_deleted_meanwhile() {
        let (_, mut app) = new_app(None).await;

        fill(&mut app, "Gone", "300", "400");
        app.save_station().await;

        let id = app.stations()[0].id.clone();
        app.start_editing(&id);
        app.stations.remove(&id);

        assert_eq!(app.save_station().await, Notice::StationMissing);
        assert!(app.stations().is_empty());
        assert!(!app.session().is_editing());
    }

    #[tokio::test]
    async fn delete_station() {
        let (db, mut app) = new_app(None).await;

        fill(&mut app, "Keep", "300", "400");
        app.save_station().await;
        fill(&mut app, "Drop", "300", "400");
        app.save_station().await;

        let id = app.stations()[0].id.clone();
        app.start_editing(&id);

        assert_eq!(app.delete_station(&id).await, Some(Notice::StationDeleted));
        assert_eq!(app.delete_station(&id).await, None);
        assert!(!app.session().is_editing());
        assert_eq!(app.stations().len(), 1);

        let keep = app.stations()[0].id.clone();
        app.delete_station(&keep).await;

        // An empty list is stored as an absent key.
        assert_eq!(db.get(STATIONS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_storage_loads_empty() {
        let (db, mut app) = new_app(None).await;

        db.set(STATIONS_KEY, "{oops").await.unwrap();
        app.load().await;

        assert!(app.stations().is_empty());
        assert_eq!(app.session().threshold, Threshold::Seventy);
    }

    #[tokio::test]
    async fn locate() {
        let (_, mut app) = new_app(Some(Coordinates::new(-23.5614, -46.6559))).await;

        assert!(app.request_location());
        assert_eq!(wait_location(&mut app).await, None);
        assert_eq!(app.session().form.location, "Av. Paulista, 1578, São Paulo");
    }

    #[tokio::test]
    async fn locate_again_after_clear() {
        let (_, mut app) = new_app(Some(Coordinates::new(-23.5614, -46.6559))).await;

        assert!(app.request_location());
        app.clear_form();
        assert!(!app.is_locating());

        assert!(app.request_location());
        assert_eq!(wait_location(&mut app).await, None);
        assert_eq!(app.session().form.location, "Av. Paulista, 1578, São Paulo");
    }

    #[tokio::test]
    async fn cleared_form_ignores_finished_lookup() {
        let (_, mut app) = new_app(Some(Coordinates::new(-23.5614, -46.6559))).await;

        assert!(app.request_location());
        tokio::time::sleep(Duration::from_millis(20)).await;
        app.clear_form();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(app.poll_location(), None);
        assert_eq!(app.session().form.location, "");
    }

    #[tokio::test]
    async fn locate_denied() {
        let (_, mut app) = new_app(None).await;

        assert!(app.request_location());
        assert_eq!(wait_location(&mut app).await, Some(Notice::LocationDenied));
        assert_eq!(app.session().form.location, "");
    }
}
