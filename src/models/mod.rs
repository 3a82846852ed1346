use std::fmt;

pub(crate) use station::or_default;
pub use station::{Station, StationDraft, DEFAULT_STATION_LOCATION, DEFAULT_STATION_NAME};

mod station;

/// Alcohol to gasoline price ratio, in percent, up to which alcohol pays off.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Threshold {
    #[default]
    Seventy,
    SeventyFive,
}

impl Threshold {
    pub fn from_use_75(use_75: bool) -> Self {
        if use_75 {
            Self::SeventyFive
        } else {
            Self::Seventy
        }
    }

    pub fn is_75(&self) -> bool {
        matches!(self, Self::SeventyFive)
    }

    pub fn percent(&self) -> f64 {
        match self {
            Self::Seventy => 70.0,
            Self::SeventyFive => 75.0,
        }
    }

    pub fn toggled(&self) -> Self {
        Self::from_use_75(!self.is_75())
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent() as u32)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fuel {
    Alcohol,
    Gasoline,
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alcohol => f.write_str("Alcohol"),
            Self::Gasoline => f.write_str("Gasoline"),
        }
    }
}

/// Geographic position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinates {
    type Err = String;

    /// Parses `"LAT,LON"` as given on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;

        let latitude: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
        let longitude: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("coordinates out of range: {s}"));
        }

        Ok(Self::new(latitude, longitude))
    }
}
