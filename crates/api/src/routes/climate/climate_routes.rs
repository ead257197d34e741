use axum::{
    extract::{Path, State},
    Json,
};
use log::debug;
use std::sync::Arc;

use super::ErrorResponse;
use crate::{
    climate::{DailyPrecipitation, DailyTemperatures, Error, StationNames, TemperatureStats},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation per day over the year ending at the latest observation; one value per date, last station read wins", content_type = "application/json", body = DailyPrecipitation),
        (status = NOT_FOUND, description = "Dataset has no observations", body = ErrorResponse),
        (status = SERVICE_UNAVAILABLE, description = "Failed to query observation store", body = ErrorResponse)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DailyPrecipitation>, Error> {
    let precipitation = state.climate.daily_precipitation().await?;
    debug!("precipitation days: {}", precipitation.0.len());
    Ok(Json(precipitation))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Distinct names of stations with observations", content_type = "application/json", body = StationNames),
        (status = SERVICE_UNAVAILABLE, description = "Failed to query observation store", body = ErrorResponse)
    ))]
pub async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<StationNames>, Error> {
    let names = state.climate.station_names().await?;
    Ok(Json(names))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature per day for the busiest station over the year ending at the latest observation", content_type = "application/json", body = DailyTemperatures),
        (status = NOT_FOUND, description = "Dataset has no observations", body = ErrorResponse),
        (status = SERVICE_UNAVAILABLE, description = "Failed to query observation store", body = ErrorResponse)
    ))]
pub async fn tobs(State(state): State<Arc<AppState>>) -> Result<Json<DailyTemperatures>, Error> {
    let temperatures = state
        .climate
        .busiest_station_trailing_year_temperatures()
        .await?;
    debug!("tobs days: {}", temperatures.0.len());
    Ok(Json(temperatures))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "Inclusive first date, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Min, average and max temperature from start through the latest observation; null fields when no data", content_type = "application/json", body = TemperatureStats),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = ErrorResponse),
        (status = SERVICE_UNAVAILABLE, description = "Failed to query observation store", body = ErrorResponse)
    ))]
pub async fn temperature_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStats>, Error> {
    let stats = state.climate.temperature_stats(&start, None).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "Inclusive first date, YYYY-MM-DD"),
        ("end" = String, Path, description = "Inclusive last date, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Min, average and max temperature between start and end; null fields when no data", content_type = "application/json", body = TemperatureStats),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = ErrorResponse),
        (status = SERVICE_UNAVAILABLE, description = "Failed to query observation store", body = ErrorResponse)
    ))]
pub async fn temperature_stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, Error> {
    let stats = state
        .climate
        .temperature_stats(&start, Some(&end))
        .await?;
    Ok(Json(stats))
}
