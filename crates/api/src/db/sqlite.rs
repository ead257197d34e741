use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    QueryBuilder, Row, Sqlite,
};
use std::time::Duration;

use super::{
    DateOrder, Error, Observation, ObservationFilter, ObservationStore, Station, StationCount,
};

/// Connection pool sizing for the dataset file.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_connections: climate_api_core::DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(climate_api_core::DEFAULT_ACQUIRE_TIMEOUT),
        }
    }
}

/// Observation store backed by the `measurement` and `station` tables of a
/// SQLite file. The file is never written to.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(path: &str, settings: StoreSettings) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open observation database: {}", path))?;

        info!("SQLite observation store opened read-only at: {}", path);
        Ok(Self { pool })
    }

    /// Wrap an existing pool, e.g. an in-memory database seeded by a test.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .context("Database integrity check failed")?;
        if result != "ok" {
            return Err(anyhow::anyhow!(
                "Database integrity check failed: {}",
                result
            ));
        }

        Ok(())
    }

    fn row_to_observation(row: &SqliteRow) -> Result<Observation, sqlx::Error> {
        Ok(Observation {
            station_id: row.try_get("station")?,
            date: row.try_get("date")?,
            precipitation: row.try_get("prcp")?,
            temperature: row.try_get("tobs")?,
        })
    }
}

fn build_observation_query<'a>(
    filter: &ObservationFilter,
    order_by: Option<DateOrder>,
    limit: Option<u32>,
) -> QueryBuilder<'a, Sqlite> {
    let mut query = QueryBuilder::new("SELECT station, date, prcp, tobs FROM measurement");
    let mut clause = " WHERE ";

    if let Some(station_id) = &filter.station_id {
        query.push(clause).push("station = ").push_bind(station_id.clone());
        clause = " AND ";
    }
    if let Some(start) = &filter.start {
        query.push(clause).push("date >= ").push_bind(start.clone());
        clause = " AND ";
    }
    if let Some(end) = &filter.end {
        query.push(clause).push("date <= ").push_bind(end.clone());
    }
    if let Some(order) = order_by {
        query.push(" ORDER BY date ").push(order.as_sql());
    }
    if let Some(limit) = limit {
        query.push(" LIMIT ").push_bind(i64::from(limit));
    }

    query
}

#[async_trait]
impl ObservationStore for SqliteStore {
    async fn query_observations(
        &self,
        filter: &ObservationFilter,
        order_by: Option<DateOrder>,
        limit: Option<u32>,
    ) -> Result<Vec<Observation>, Error> {
        let mut query = build_observation_query(filter, order_by, limit);
        debug!("observation query: {}", query.sql());

        let rows = query.build().fetch_all(&self.pool).await?;
        let observations = rows
            .iter()
            .map(Self::row_to_observation)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(observations)
    }

    async fn query_stations(&self) -> Result<Vec<Station>, Error> {
        let rows = sqlx::query("SELECT station, name FROM station")
            .fetch_all(&self.pool)
            .await?;

        let mut stations = Vec::with_capacity(rows.len());
        for row in rows {
            stations.push(Station {
                station_id: row.try_get("station")?,
                name: row.try_get("name")?,
            });
        }
        Ok(stations)
    }

    async fn group_count_by_station(&self) -> Result<Vec<StationCount>, Error> {
        let rows = sqlx::query(
            "SELECT station, COUNT(*) AS count
             FROM measurement
             GROUP BY station
             ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push(StationCount {
                station_id: row.try_get("station")?,
                count: row.try_get("count")?,
            });
        }
        Ok(counts)
    }
}
