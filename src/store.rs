use std::collections::HashSet;

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    or_default, Station, StationDraft, DEFAULT_STATION_LOCATION, DEFAULT_STATION_NAME,
};

pub const MAX_STATIONS: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("station limit reached ({0} stations)")]
    Capacity(usize),

    #[error("station {0} not found")]
    NotFound(String),
}

/// In-memory list of saved stations, newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StationStore {
    stations: Vec<Station>,
}

impl StationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the list from its persisted JSON form, see [`deserialize`].
    pub fn from_json(raw: Option<&str>) -> Self {
        Self {
            stations: deserialize(raw),
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.stations.len() >= MAX_STATIONS
    }

    /// Creates a new station when `editing_id` is `None`, otherwise replaces
    /// the station with that id keeping its `id` and `created_at`.
    pub fn upsert(
        &mut self,
        draft: StationDraft,
        editing_id: Option<&str>,
    ) -> Result<&Station, StoreError> {
        let Some(id) = editing_id else {
            if self.is_full() {
                return Err(StoreError::Capacity(MAX_STATIONS));
            }

            let station = Station {
                id: new_id(),
                name: draft.name_or_default(),
                alcohol_price: draft.alcohol_price,
                gasoline_price: draft.gasoline_price,
                location: draft.location_or_default(),
                created_at: now_millis(),
            };

            self.stations.insert(0, station);

            return Ok(&self.stations[0]);
        };

        let idx = self
            .stations
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let station = &mut self.stations[idx];
        station.name = draft.name_or_default();
        station.alcohol_price = draft.alcohol_price;
        station.gasoline_price = draft.gasoline_price;
        station.location = draft.location_or_default();

        Ok(station)
    }

    /// Removes station by id, returns false if there was none.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.stations.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.stations.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.stations)
    }
}

/// Decodes the persisted station list.
///
/// Anything that is not a JSON array yields an empty list. Each element is
/// decoded on its own: records without usable prices are dropped, other
/// missing fields get defaults.
pub fn deserialize(raw: Option<&str>) -> Vec<Station> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return vec![];
    };

    let items: Vec<Value> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            log::warn!("discard malformed stations list: {}", e);
            return vec![];
        }
    };

    let total = items.len();
    let mut stations: Vec<Station> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(decode_station)
        .collect();

    if stations.len() < total {
        log::warn!("dropped {} unreadable stations", total - stations.len());
    }

    let mut seen = HashSet::new();
    for station in stations.iter_mut() {
        if !seen.insert(station.id.clone()) {
            let id = new_id();
            log::warn!("station id {} is repeated, using {}", station.id, id);
            station.id = id.clone();
            seen.insert(id);
        }
    }

    if stations.len() > MAX_STATIONS {
        log::warn!(
            "dropped {} stations over the limit of {}",
            stations.len() - MAX_STATIONS,
            MAX_STATIONS
        );
        stations.truncate(MAX_STATIONS);
    }

    stations
}

fn decode_station(obj: &Map<String, Value>) -> Option<Station> {
    let alcohol_price = number(obj.get("alcoholPrice"))?;
    let gasoline_price = number(obj.get("gasolinePrice"))?;

    let id = text(obj.get("id")).unwrap_or_default();
    let name = text(obj.get("name")).unwrap_or_default();
    let location = text(obj.get("location")).unwrap_or_default();

    let created_at = match millis(obj.get("createdAt")) {
        Some(ms) if ms != 0 => ms,
        _ => now_millis(),
    };

    Some(Station {
        id: if id.trim().is_empty() { new_id() } else { id },
        name: or_default(&name, DEFAULT_STATION_NAME),
        alcohol_price,
        gasoline_price,
        location: or_default(&location, DEFAULT_STATION_LOCATION),
        created_at,
    })
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    n.is_finite().then_some(n)
}

/// Integer timestamps are read exactly, anything else goes through `number`.
fn millis(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) if n.is_i64() => n.as_i64(),
        Value::String(s) if s.trim().parse::<i64>().is_ok() => s.trim().parse().ok(),
        other => number(Some(other)).map(|ms| ms as i64),
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
