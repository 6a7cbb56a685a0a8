use async_trait::async_trait;
use reqwest::{header, Client};
use shared::protocol::{GeocodePlace, GeocodeQuery};
use tracing::debug;
use url::Url;

use crate::error::GeocodeError;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidate matches for a free-text query, best first. Empty means no match.
    async fn search(&self, query: &str) -> Result<Vec<GeocodePlace>, GeocodeError>;
}

pub struct MissingGeocoder;

#[async_trait]
impl Geocoder for MissingGeocoder {
    async fn search(&self, _query: &str) -> Result<Vec<GeocodePlace>, GeocodeError> {
        Err(GeocodeError::Unavailable)
    }
}

/// OpenStreetMap Nominatim `/search` client.
pub struct NominatimGeocoder {
    http: Client,
    search_url: Url,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, GeocodeError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            search_url: base.join("search")?,
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodePlace>, GeocodeError> {
        let body = self
            .http
            .get(self.search_url.clone())
            .query(&GeocodeQuery::json(query))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let places: Vec<GeocodePlace> = serde_json::from_str(&body)?;
        debug!(query, matches = places.len(), "geocoding lookup complete");
        Ok(places)
    }
}

#[cfg(test)]
#[path = "tests/geocoder_tests.rs"]
mod tests;
