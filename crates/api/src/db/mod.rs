mod sqlite;

pub use sqlite::{SqliteStore, StoreSettings};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
}

/// A single daily reading from one station.
///
/// `date` is kept exactly as stored (`YYYY-MM-DD`), so it sorts lexically in
/// chronological order and can be echoed back to callers verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Observation {
    pub station_id: String,
    pub date: String,
    pub precipitation: Option<f64>,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Station {
    pub station_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationCount {
    pub station_id: String,
    pub count: i64,
}

/// Row filter for [`ObservationStore::query_observations`].
///
/// Both date bounds are inclusive and compared as strings against the stored
/// `date` column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    pub station_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl ObservationFilter {
    /// Matches every observation.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            station_id: None,
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Open-ended range, `date >= start`.
    pub fn since(start: impl Into<String>) -> Self {
        Self {
            station_id: None,
            start: Some(start.into()),
            end: None,
        }
    }

    pub fn for_station(mut self, station_id: impl Into<String>) -> Self {
        self.station_id = Some(station_id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Ascending,
    Descending,
}

impl DateOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            DateOrder::Ascending => "ASC",
            DateOrder::Descending => "DESC",
        }
    }
}

/// Read-only access to the observation dataset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObservationStore: Sync + Send {
    /// Observations matching `filter`. Without `order_by`, rows come back in the
    /// store's natural order.
    async fn query_observations(
        &self,
        filter: &ObservationFilter,
        order_by: Option<DateOrder>,
        limit: Option<u32>,
    ) -> Result<Vec<Observation>, Error>;
    async fn query_stations(&self) -> Result<Vec<Station>, Error>;
    /// Number of observations per station. Stations without observations are absent.
    async fn group_count_by_station(&self) -> Result<Vec<StationCount>, Error>;
}
