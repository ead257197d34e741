pub mod climate;
pub mod db;
pub mod routes;
pub mod startup;
pub mod utils;

pub use climate::{
    ClimateService, DailyPrecipitation, DailyTemperatures, DateWindow, StationNames,
    TemperatureStats,
};
pub use db::{
    DateOrder, Observation, ObservationFilter, ObservationStore, SqliteStore, Station,
    StationCount, StoreSettings,
};
pub use routes::*;
pub use startup::*;
pub use utils::*;
