pub mod climate_routes;
mod error;

pub use climate_routes::*;
pub use error::ErrorResponse;
