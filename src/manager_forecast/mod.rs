pub mod errors;
pub mod models;

use std::collections::HashMap;
use chrono::{Local, NaiveDate, TimeZone};
use log::warn;
use crate::manager_forecast::models::{DaySummary, ForecastFeed, ForecastSample};

/// Collapses forecast samples into per calendar day summaries, days taken in local time
///
/// # Arguments
///
/// * 'samples' - forecast samples, normally in chronological order
/// * 'max_days' - maximum number of days to return
pub fn aggregate(samples: &[ForecastSample], max_days: usize) -> Vec<DaySummary> {
    aggregate_in(samples, max_days, &Local)
}

/// Collapses forecast samples into per calendar day summaries using the given timezone
/// to decide which day a sample belongs to.
///
/// Days are returned in the order they are first seen among the samples. High and low
/// are the max and min over all samples of a day, while condition, icon, humidity and wind
/// are kept from the first sample seen for that day. Once `max_days` distinct days have been
/// seen, samples belonging to any further day are ignored, but samples for days already
/// present still update them regardless of where in the input they appear.
///
/// # Arguments
///
/// * 'samples' - forecast samples, normally in chronological order
/// * 'max_days' - maximum number of days to return
/// * 'tz' - timezone that defines the calendar day boundaries
pub fn aggregate_in<Tz: TimeZone>(samples: &[ForecastSample], max_days: usize, tz: &Tz) -> Vec<DaySummary> {
    // HashMap has no stable iteration order, so days lives in a Vec and the map only indexes it
    let mut days: Vec<DaySummary> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for s in samples {
        let date = s.valid_time.with_timezone(tz).date_naive();

        match index.get(&date) {
            Some(&i) => {
                let day = &mut days[i];
                day.high = day.high.max(s.temp_max);
                day.low = day.low.min(s.temp_min);
            }
            None if days.len() >= max_days => continue,
            None => {
                index.insert(date, days.len());
                days.push(DaySummary {
                    date,
                    day_name: date.format("%A").to_string(),
                    high: s.temp_max,
                    low: s.temp_min,
                    condition: s.condition_text.clone(),
                    icon: s.condition_icon.clone(),
                    humidity: s.humidity_percent,
                    wind: s.wind_speed,
                });
            }
        }
    }

    days
}

/// Converts the items of a provider forecast into samples, skipping and logging
/// items that can't be placed in a day
///
/// # Arguments
///
/// * 'feed' - forecast document from the provider
pub fn samples_from_feed(feed: &ForecastFeed) -> Vec<ForecastSample> {
    feed.list
        .iter()
        .filter_map(|item| match ForecastSample::try_from(item) {
            Ok(sample) => Some(sample),
            Err(e) => {
                warn!("skipping forecast sample: {}", e);
                None
            }
        })
        .collect()
}

/// Aggregates a provider forecast into at most `max_days` day summaries
///
/// # Arguments
///
/// * 'feed' - forecast document from the provider
/// * 'max_days' - maximum number of days to return
pub fn aggregate_feed(feed: &ForecastFeed, max_days: usize) -> Vec<DaySummary> {
    aggregate(&samples_from_feed(feed), max_days)
}
