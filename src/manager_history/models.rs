use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::manager_history::errors::HistoryError;

/// A lookup as submitted by a client, not yet validated
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCandidate {
    pub city_name: Option<String>,
    pub country: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub temperature: Option<i64>,
    pub weather_condition: Option<String>,
}

impl HistoryCandidate {
    /// Checks that city name, latitude and longitude are present and not blank.
    /// Blank optional strings are turned into absent values, everything else is kept as given.
    pub fn validate(self) -> Result<NewEntry, HistoryError> {
        Ok(NewEntry {
            city_name: required(self.city_name, "cityName")?,
            country: optional(self.country),
            lat: required(self.lat, "lat")?,
            lon: required(self.lon, "lon")?,
            temperature: self.temperature,
            weather_condition: optional(self.weather_condition),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, HistoryError> {
    optional(value).ok_or_else(|| HistoryError::Validation(format!("{} is required", field)))
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A validated lookup waiting for an id and a timestamp from the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub city_name: String,
    pub country: Option<String>,
    pub lat: String,
    pub lon: String,
    pub temperature: Option<i64>,
    pub weather_condition: Option<String>,
}

impl NewEntry {
    pub fn into_entry(self, id: u64, searched_at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id,
            city_name: self.city_name,
            country: self.country,
            lat: self.lat,
            lon: self.lon,
            temperature: self.temperature,
            weather_condition: self.weather_condition,
            searched_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub city_name: String,
    pub country: Option<String>,
    pub lat: String,
    pub lon: String,
    pub temperature: Option<i64>,
    pub weather_condition: Option<String>,
    pub searched_at: DateTime<Utc>,
}
