pub mod errors;

use std::time::Duration;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::manager_forecast::models::ForecastFeed;
use crate::manager_owm::errors::OWMError;

/// Struct for fetching weather data from OpenWeatherMap
pub struct OWM {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    search_limit: usize,
}

impl OWM {
    /// Returns an OWM struct ready for fetching weather data
    ///
    /// A missing API key is accepted here, every request will then fail with
    /// `OWMError::MissingApiKey` instead
    ///
    /// # Arguments
    ///
    /// * 'base_url' - scheme and host of the API, e.g. https://api.openweathermap.org
    /// * 'api_key' - OpenWeatherMap API key
    /// * 'timeout_secs' - request timeout in seconds
    /// * 'search_limit' - max number of cities returned from a city search
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64, search_limit: usize) -> Result<OWM, OWMError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            search_limit,
        })
    }

    /// Current weather at the given coordinates, as delivered by OpenWeatherMap
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude of the location
    /// * 'lon' - longitude of the location
    pub async fn current_by_coords(&self, lat: f64, lon: f64) -> Result<Value, OWMError> {
        self.get_json("/data/2.5/weather", &[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_string()),
        ]).await
    }

    /// Current weather for a city name, as delivered by OpenWeatherMap
    ///
    /// # Arguments
    ///
    /// * 'city' - name of the city, optionally followed by country code
    pub async fn current_by_city(&self, city: &str) -> Result<Value, OWMError> {
        self.get_json("/data/2.5/weather", &[
            ("q", city.to_string()),
            ("units", "metric".to_string()),
        ]).await
    }

    /// Retrieves the five day forecast in three hour steps for the given coordinates
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude of the location
    /// * 'lon' - longitude of the location
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastFeed, OWMError> {
        self.get_json("/data/2.5/forecast", &[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_string()),
        ]).await
    }

    /// Cities matching a free text query, as delivered by the OpenWeatherMap geocoding API
    ///
    /// # Arguments
    ///
    /// * 'query' - city name to search for
    pub async fn search_cities(&self, query: &str) -> Result<Value, OWMError> {
        self.get_json("/geo/1.0/direct", &[
            ("q", query.to_string()),
            ("limit", self.search_limit.to_string()),
        ]).await
    }

    /// Makes a GET request and parses the body, separating 404 from other failures
    ///
    /// # Arguments
    ///
    /// * 'path' - path below the base url
    /// * 'query' - query parameters, the API key is added here
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, OWMError> {
        let api_key = self.api_key.as_deref().ok_or(OWMError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, path);
        debug!("requesting {}", url);

        let req = self.client
            .get(url)
            .query(query)
            .query(&[("appid", api_key)])
            .send().await?;

        let status = req.status();
        if status == StatusCode::NOT_FOUND {
            return Err(OWMError::NotFound(format!("nothing found at {}", path)));
        }
        if !status.is_success() {
            return Err(OWMError::Upstream(format!("Error while fetching {} from OpenWeatherMap: {}", path, status)));
        }

        let json = req.text().await?;
        Ok(serde_json::from_str(&json)?)
    }
}
