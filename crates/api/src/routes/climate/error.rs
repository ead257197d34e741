use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::climate::Error;

/// Error body returned by every climate endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidDateFormat(_) => StatusCode::BAD_REQUEST,
            Error::EmptyDataset => StatusCode::NOT_FOUND,
            Error::DataStoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Error::InvalidDateFormat(_) => "InvalidDateFormat",
            Error::EmptyDataset => "EmptyDataset",
            Error::DataStoreUnavailable(_) => "DataStoreUnavailable",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // store details stay in the log
        let message = match &self {
            Error::DataStoreUnavailable(_) => {
                error!("error querying observations: {}", self);
                "Observation store is unavailable".to_string()
            }
            Error::EmptyDataset => {
                warn!("{}", self);
                self.to_string()
            }
            Error::InvalidDateFormat(_) => self.to_string(),
        };

        let body = ErrorResponse {
            error: self.error_type().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
