use serde::Serialize;

pub const DEFAULT_STATION_NAME: &str = "Unnamed station";
pub const DEFAULT_STATION_LOCATION: &str = "Location not provided";

/// Saved fueling station with its last known prices.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    pub alcohol_price: f64,
    pub gasoline_price: f64,
    pub location: String,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

impl Station {
    /// Returns false when the location is blank or still the placeholder.
    pub fn has_location(&self) -> bool {
        let location = self.location.trim();

        !location.is_empty() && !location.eq_ignore_ascii_case(DEFAULT_STATION_LOCATION)
    }
}

/// Editable part of a `Station`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StationDraft {
    pub name: String,
    pub alcohol_price: f64,
    pub gasoline_price: f64,
    pub location: String,
}

impl StationDraft {
    pub fn name_or_default(&self) -> String {
        or_default(&self.name, DEFAULT_STATION_NAME)
    }

    pub fn location_or_default(&self) -> String {
        or_default(&self.location, DEFAULT_STATION_LOCATION)
    }
}

pub(crate) fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
