use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use climate_api::{
    app, db, AppState, DateOrder, Observation, ObservationFilter, ObservationStore, SqliteStore,
    Station, StationCount,
};
use hyper::{header, Method};
use mockall::mock;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

const FIXTURE: &str = include_str!("../fixtures/hawaii.sql");

mock! {
    pub ObservationAccess {}
    #[async_trait]
    impl ObservationStore for ObservationAccess {
        async fn query_observations(
            &self,
            filter: &ObservationFilter,
            order_by: Option<DateOrder>,
            limit: Option<u32>,
        ) -> Result<Vec<Observation>, db::Error>;
        async fn query_stations(&self) -> Result<Vec<Station>, db::Error>;
        async fn group_count_by_station(&self) -> Result<Vec<StationCount>, db::Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub async fn spawn_app(store: Arc<dyn ObservationStore>) -> TestApp {
    let app_state = AppState::new(store);
    TestApp {
        app: app(app_state),
    }
}

/// In-memory copy of the fixture dataset. A single connection keeps the
/// in-memory database alive for the life of the pool.
pub async fn seeded_store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    sqlx::raw_sql(FIXTURE)
        .execute(&pool)
        .await
        .expect("Failed to load fixture");
    SqliteStore::from_pool(pool)
}

/// Fixture tables with every measurement removed.
pub async fn empty_store() -> SqliteStore {
    let store = seeded_store().await;
    sqlx::query("DELETE FROM measurement")
        .execute(store.pool())
        .await
        .expect("Failed to clear measurements");
    store
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(app, uri).await;
    let json = serde_json::from_slice(&body).expect("Response body is not JSON");
    (status, json)
}

pub fn observation(
    station_id: &str,
    date: &str,
    precipitation: Option<f64>,
    temperature: f64,
) -> Observation {
    Observation {
        station_id: station_id.to_string(),
        date: date.to_string(),
        precipitation,
        temperature,
    }
}

pub fn station(station_id: &str, name: &str) -> Station {
    Station {
        station_id: station_id.to_string(),
        name: name.to_string(),
    }
}

pub fn count(station_id: &str, count: i64) -> StationCount {
    StationCount {
        station_id: station_id.to_string(),
        count,
    }
}
