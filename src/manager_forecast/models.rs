use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, TimestampSeconds};
use crate::manager_forecast::errors::MalformedSampleError;

/// Forecast document as delivered by the provider, every field optional so that
/// a single broken item does not reject the whole document
#[derive(Deserialize, Debug, Default)]
pub struct ForecastFeed {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ForecastItem {
    #[serde_as(as = "DefaultOnError<Option<TimestampSeconds<i64>>>")]
    #[serde(default)]
    pub dt: Option<DateTime<Utc>>,
    #[serde(default)]
    pub main: Option<MainValues>,
    #[serde(default)]
    pub weather: Vec<WeatherDescription>,
    #[serde(default)]
    pub wind: Option<Wind>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default, Clone)]
pub struct MainValues {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub humidity: Option<u8>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct WeatherDescription {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Wind {
    #[serde(default)]
    pub speed: Option<f64>,
}

/// One forecast time slot, typically three hours wide
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub valid_time: DateTime<Utc>,
    pub temp_max: f64,
    pub temp_min: f64,
    pub condition_text: String,
    pub condition_icon: String,
    pub humidity_percent: u8,
    pub wind_speed: f64,
}

impl TryFrom<&ForecastItem> for ForecastSample {
    type Error = MalformedSampleError;

    fn try_from(item: &ForecastItem) -> Result<Self, Self::Error> {
        let valid_time = item.dt
            .ok_or(MalformedSampleError("missing or invalid timestamp".to_string()))?;
        let main = item.main.as_ref()
            .ok_or_else(|| MalformedSampleError(format!("no temperatures for {}", valid_time)))?;
        let (temp_max, temp_min) = match (main.temp_max, main.temp_min) {
            (Some(max), Some(min)) => (max, min),
            _ => return Err(MalformedSampleError(format!("incomplete temperatures for {}", valid_time))),
        };

        // Only the first weather entry describes the slot
        let weather = item.weather.first();

        Ok(ForecastSample {
            valid_time,
            temp_max,
            temp_min,
            condition_text: weather.and_then(|w| w.description.clone()).unwrap_or_default(),
            condition_icon: weather.and_then(|w| w.icon.clone()).unwrap_or_default(),
            humidity_percent: main.humidity.unwrap_or(0),
            wind_speed: item.wind.as_ref().and_then(|w| w.speed).unwrap_or(0.0),
        })
    }
}

/// Aggregated forecast for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub day_name: String,
    pub high: f64,
    pub low: f64,
    pub condition: String,
    pub icon: String,
    pub humidity: u8,
    pub wind: f64,
}
