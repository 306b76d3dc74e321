// Nominatim /reverse client.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use super::{Address, LookupError, ReverseLookup};
use crate::geo::Coordinate;

const REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("travel-logbook/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<AddressComponents>,
}

#[derive(Debug, Deserialize, Default)]
struct AddressComponents {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    suburb: Option<String>,
    county: Option<String>,
}

pub struct NominatimClient {
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(NominatimClient { client })
    }
}

impl ReverseLookup for NominatimClient {
    fn lookup(&self, coord: Coordinate) -> Result<Option<Address>, LookupError> {
        let response = self
            .client
            .get(REVERSE_URL)
            .query(&[
                ("format", "jsonv2"),
                ("lat", &coord.lat.to_string()),
                ("lon", &coord.lon.to_string()),
                ("accept-language", "en"),
            ])
            .send()
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;

        let body: ReverseResponse = response.json().map_err(classify)?;

        // Nominatim reports "unable to geocode" as an error object with a
        // 200 status; it deserializes to a response with neither field set.
        let Some(display_name) = body.display_name else {
            return Ok(None);
        };

        let components = body.address.unwrap_or_default();
        Ok(Some(Address {
            city: components.city,
            town: components.town,
            village: components.village,
            suburb: components.suburb,
            county: components.county,
            display_name,
        }))
    }
}

fn classify(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::TimedOut
    } else {
        LookupError::Other(e.into())
    }
}
