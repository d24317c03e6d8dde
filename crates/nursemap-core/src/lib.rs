//! Domain core for nursemap: geographic primitives, the facility dataset,
//! the nearby-facility ranker, and application configuration.

pub mod app_config;
pub mod config;
pub mod dataset;
pub mod error;
pub mod facility;
pub mod geo;
pub mod ranker;

pub use app_config::{AppConfig, DatasetSource, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{load_dataset, parse_dataset, Dataset};
pub use error::{ConfigError, CoreError, DatasetError};
pub use facility::{AgeClass, Facility, FacilityId, SlotTable};
pub use geo::{distance_meters, Bounds, Point, METERS_PER_DEGREE};
pub use ranker::{
    rank, RankedFacility, SearchFilter, SearchRadius, MAX_RESULTS, WALKING_METERS_PER_MINUTE,
};
