//! Query-to-response shaping for the climate endpoints.
//!
//! Everything here is a stateless read against an [`ObservationStore`]: find the
//! latest date in the dataset, derive the trailing one-year window from it, and
//! shape observations into the per-day maps and temperature summaries served by
//! the API.

use crate::db::{self, DateOrder, ObservationFilter, ObservationStore};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};
use time::{macros::format_description, Date};
use utoipa::ToSchema;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No observations available")]
    EmptyDataset,
    #[error("Data store unavailable: {0}")]
    DataStoreUnavailable(#[from] db::Error),
    #[error("Invalid date, expected YYYY-MM-DD: {0}")]
    InvalidDateFormat(String),
}

/// Closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Date,
    pub end: Date,
}

impl DateWindow {
    /// The year ending on `end`, inclusive on both sides.
    pub fn trailing_year(end: Date) -> Result<Self, Error> {
        Ok(Self {
            start: one_year_before(end)?,
            end,
        })
    }

    fn filter(&self) -> ObservationFilter {
        ObservationFilter::between(format_date(self.start), format_date(self.end))
    }
}

/// Precipitation per day across all stations.
///
/// Keyed by date only: when several stations report on the same day, the row
/// returned last by the store wins and the others are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DailyPrecipitation(pub BTreeMap<String, Option<f64>>);

/// Temperature per day for a single station, last row wins on duplicate dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DailyTemperatures(pub BTreeMap<String, f64>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StationNames {
    pub name: Vec<String>,
}

/// Min/avg/max temperature over a date range. All fields are `None` when the
/// range holds no observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureStats {
    #[serde(rename = "Min_temp")]
    pub min: Option<f64>,
    #[serde(rename = "Avg_temp")]
    pub avg: Option<f64>,
    #[serde(rename = "Max_temp")]
    pub max: Option<f64>,
}

impl TemperatureStats {
    pub fn from_temperatures(temperatures: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for temperature in temperatures {
            count += 1;
            sum += temperature;
            min = min.min(temperature);
            max = max.max(temperature);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            min: Some(min),
            avg: Some(sum / count as f64),
            max: Some(max),
        }
    }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<Date, Error> {
    if value.len() != 10 {
        return Err(Error::InvalidDateFormat(value.to_owned()));
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDateFormat(value.to_owned()))
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Same month and day one year earlier; Feb 29 falls back to Feb 28.
pub fn one_year_before(date: Date) -> Result<Date, Error> {
    let year = date.year() - 1;
    date.replace_year(year)
        .or_else(|_| Date::from_calendar_date(year, date.month(), date.day() - 1))
        .map_err(|e| Error::InvalidDateFormat(format!("{}: {}", format_date(date), e)))
}

pub struct ClimateService {
    store: Arc<dyn ObservationStore>,
}

impl ClimateService {
    pub fn new(store: Arc<dyn ObservationStore>) -> Self {
        Self { store }
    }

    /// Most recent date present in the dataset.
    pub async fn latest_date(&self) -> Result<Date, Error> {
        let latest = self
            .store
            .query_observations(&ObservationFilter::all(), Some(DateOrder::Descending), Some(1))
            .await?;
        let observation = latest.into_iter().next().ok_or(Error::EmptyDataset)?;
        parse_date(&observation.date)
    }

    pub async fn trailing_year_window(&self) -> Result<DateWindow, Error> {
        let window = DateWindow::trailing_year(self.latest_date().await?)?;
        debug!(
            "trailing year window: {} to {}",
            format_date(window.start),
            format_date(window.end)
        );
        Ok(window)
    }

    pub async fn daily_precipitation(&self) -> Result<DailyPrecipitation, Error> {
        let window = self.trailing_year_window().await?;
        let observations = self
            .store
            .query_observations(&window.filter(), None, None)
            .await?;

        let mut by_date = BTreeMap::new();
        for observation in observations {
            by_date.insert(observation.date, observation.precipitation);
        }
        Ok(DailyPrecipitation(by_date))
    }

    /// Names of stations with at least one observation, in station-table order.
    /// Stations sharing a name are listed once.
    pub async fn station_names(&self) -> Result<StationNames, Error> {
        let observed: HashSet<String> = self
            .store
            .group_count_by_station()
            .await?
            .into_iter()
            .filter(|c| c.count > 0)
            .map(|c| c.station_id)
            .collect();

        let name = self
            .store
            .query_stations()
            .await?
            .into_iter()
            .filter(|station| observed.contains(&station.station_id))
            .map(|station| station.name)
            .unique()
            .collect();

        Ok(StationNames { name })
    }

    /// Station with the most observations. Equal counts resolve to the
    /// lexicographically smallest station id.
    pub async fn busiest_station(&self) -> Result<String, Error> {
        let busiest = self
            .store
            .group_count_by_station()
            .await?
            .into_iter()
            .filter(|c| c.count > 0)
            .max_by(|a, b| {
                a.count
                    .cmp(&b.count)
                    .then_with(|| b.station_id.cmp(&a.station_id))
            })
            .ok_or(Error::EmptyDataset)?;

        debug!(
            "busiest station: {} ({} observations)",
            busiest.station_id, busiest.count
        );
        Ok(busiest.station_id)
    }

    pub async fn busiest_station_trailing_year_temperatures(
        &self,
    ) -> Result<DailyTemperatures, Error> {
        let station_id = self.busiest_station().await?;
        let window = self.trailing_year_window().await?;
        let observations = self
            .store
            .query_observations(&window.filter().for_station(station_id), None, None)
            .await?;

        let mut by_date = BTreeMap::new();
        for observation in observations {
            by_date.insert(observation.date, observation.temperature);
        }
        Ok(DailyTemperatures(by_date))
    }

    /// Temperature summary for `start <= date <= end`, or `date >= start` when
    /// `end` is omitted.
    pub async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, Error> {
        parse_date(start)?;
        let filter = match end {
            Some(end) => {
                parse_date(end)?;
                ObservationFilter::between(start, end)
            }
            None => ObservationFilter::since(start),
        };

        let observations = self.store.query_observations(&filter, None, None).await?;
        Ok(TemperatureStats::from_temperatures(
            observations.iter().map(|o| o.temperature),
        ))
    }
}
