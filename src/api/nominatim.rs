use std::sync::Arc;

use anyhow::Context;
use futures::future::BoxFuture;
use reqwest::{redirect::Policy, ClientBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize};

use crate::models::Coordinates;

use super::Geocoder;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const LANGUAGE: &str = "pt-BR";

/// Reverse geocoding through an OpenStreetMap Nominatim instance.
pub struct Nominatim {
    addr: Arc<Url>,
    client: reqwest::Client,
}

impl Nominatim {
    pub fn new(addr: &str) -> anyhow::Result<Self> {
        let addr = Arc::new(addr.parse::<Url>().context("parse geocoder url")?);
        let client = ClientBuilder::new()
            .user_agent(APP_USER_AGENT)
            .redirect(Policy::default())
            .build()
            .context("build http client")?;

        Ok(Self { addr, client })
    }

    async fn get<T: DeserializeOwned>(
        client: reqwest::Client,
        addr: Arc<Url>,
        path: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<T> {
        let uri = addr.join(path).context("build url")?;
        let res = client
            .get(uri)
            .query(query)
            .send()
            .await
            .context("get")?
            .error_for_status()?;

        res.json().await.context("unmarshal json")
    }
}

impl Geocoder for Nominatim {
    fn reverse(&self, coordinates: Coordinates) -> BoxFuture<anyhow::Result<Option<String>>> {
        let addr = self.addr.clone();
        let client = self.client.clone();

        Box::pin(async move {
            let query = [
                ("format", "jsonv2".to_string()),
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("accept-language", LANGUAGE.to_string()),
            ];

            let place: Place = Self::get(client, addr, "/reverse", &query).await?;

            if let Some(err) = place.error.as_deref() {
                log::debug!("geocoder has no place for {}: {}", coordinates, err);
                return Ok(None);
            }

            Ok(place.label())
        })
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    address: Address,
    display_name: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    road: Option<String>,
    house_number: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
}

impl Place {
    /// Street, number, neighbourhood, city and state; the full display
    /// name when none of them is known.
    fn label(self) -> Option<String> {
        let Address {
            road,
            house_number,
            suburb,
            city,
            town,
            village,
            state,
        } = self.address;

        let parts: Vec<String> = [road, house_number, suburb, city.or(town).or(village), state]
            .into_iter()
            .flatten()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if !parts.is_empty() {
            return Some(parts.join(", "));
        }

        self.display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
    }
}
