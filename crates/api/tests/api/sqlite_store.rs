use crate::helpers::{empty_store, get_json, seeded_store, spawn_app};
use axum::http::StatusCode;
use climate_api::{ClimateService, DateWindow};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn precipitation_over_fixture() {
    let test_app = spawn_app(Arc::new(seeded_store().await)).await;

    let (status, body) = get_json(&test_app.app, "/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    // 2016-08-22 falls outside the window; shared dates keep the last row read
    assert_eq!(
        body,
        json!({
            "2016-08-23": 1.79,
            "2017-01-01": 0.0,
            "2017-01-05": null,
            "2017-01-10": 0.1,
            "2017-08-22": 0.0,
            "2017-08-23": 0.12
        })
    );
}

#[tokio::test]
async fn stations_over_fixture() {
    let test_app = spawn_app(Arc::new(seeded_store().await)).await;

    let (status, body) = get_json(&test_app.app, "/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "name": [
                "WAIKIKI 717.2, HI US",
                "KANEOHE 838.1, HI US",
                "WAIHEE 837.5, HI US"
            ]
        })
    );
}

#[tokio::test]
async fn tobs_over_fixture() {
    let test_app = spawn_app(Arc::new(seeded_store().await)).await;

    let (status, body) = get_json(&test_app.app, "/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "2016-08-23": 77.0,
            "2017-01-01": 58.0,
            "2017-01-10": 62.0,
            "2017-08-22": 76.0,
            "2017-08-23": 76.0
        })
    );
}

#[tokio::test]
async fn temperature_stats_over_fixture() {
    let test_app = spawn_app(Arc::new(seeded_store().await)).await;

    let (status, body) = get_json(&test_app.app, "/api/v1.0/2017-01-01/2017-01-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"Min_temp": 58.0, "Avg_temp": 60.0, "Max_temp": 62.0})
    );

    let (status, body) = get_json(&test_app.app, "/api/v1.0/2017-08-23").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"Min_temp": 76.0, "Avg_temp": 79.0, "Max_temp": 81.0})
    );

    let (status, body) = get_json(&test_app.app, "/api/v1.0/2099-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"Min_temp": null, "Avg_temp": null, "Max_temp": null})
    );
}

#[tokio::test]
async fn window_and_busiest_station_over_fixture() {
    let service = ClimateService::new(Arc::new(seeded_store().await));

    let latest = service.latest_date().await.unwrap();
    let window = service.trailing_year_window().await.unwrap();
    assert_eq!(window.end, latest);
    assert_eq!(window, DateWindow::trailing_year(latest).unwrap());

    assert_eq!(service.busiest_station().await.unwrap(), "USC00519281");
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let service = ClimateService::new(Arc::new(seeded_store().await));

    assert_eq!(
        service.daily_precipitation().await.unwrap(),
        service.daily_precipitation().await.unwrap()
    );
    assert_eq!(
        service.station_names().await.unwrap(),
        service.station_names().await.unwrap()
    );
    assert_eq!(
        service
            .busiest_station_trailing_year_temperatures()
            .await
            .unwrap(),
        service
            .busiest_station_trailing_year_temperatures()
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn empty_dataset_over_fixture_schema() {
    let test_app = spawn_app(Arc::new(empty_store().await)).await;

    for uri in ["/api/v1.0/precipitation", "/api/v1.0/tobs"] {
        let (status, body) = get_json(&test_app.app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "EmptyDataset");
    }

    let (status, body) = get_json(&test_app.app, "/api/v1.0/stations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": []}));

    let (status, body) = get_json(&test_app.app, "/api/v1.0/2017-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"Min_temp": null, "Avg_temp": null, "Max_temp": null})
    );
}
